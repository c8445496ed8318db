//! Command tree validation.
//!
//! Catches structural problems that would make parsing ambiguous before any
//! input is tokenized: empty or malformed names, duplicate arguments or
//! sub-commands within one command, and positional arguments whose type
//! cannot take a value.
//!
//! # Examples
//!
//! ```
//! use argtree_core::*;
//!
//! let mut tree = CommandTree::new(Command::new("tool"));
//! tree.add_argument(tree.root(), Argument::new("verbose", BoolType));
//! assert!(validate_tree(&tree).is_empty());
//!
//! // Invalid: a positional flag can never be bound
//! tree.add_argument(tree.root(), Argument::new("dry", BoolType).positional());
//! assert_eq!(
//!     validate_tree(&tree),
//!     vec![TreeError::ZeroValuePositional("dry".to_string())]
//! );
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::{CommandId, CommandTree};

/// Characters with lexical meaning that cannot appear in names.
const RESERVED_CHARS: &[char] = &[
    '"', '\'', '\\', '=', '[', ']', '(', ')', '{', '}', '<', '>',
];

/// Command tree validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TreeError {
    /// A command or sub-command name is empty or whitespace-only.
    #[error("command name cannot be empty")]
    EmptyCommandName,
    /// An argument name is empty.
    #[error("argument name cannot be empty in command '{0}'")]
    EmptyArgumentName(String),
    /// A name contains whitespace or a character with lexical meaning.
    #[error("invalid name: {0}")]
    InvalidName(String),
    /// Two arguments in the same command share a name.
    #[error("duplicate argument '{name}' in command '{command}'")]
    DuplicateArgument { command: String, name: String },
    /// Two sub-commands of the same command share a name.
    #[error("duplicate sub-command '{name}' in command '{command}'")]
    DuplicateSubCommand { command: String, name: String },
    /// A positional argument whose type takes no values.
    #[error("positional argument '{0}' must take at least one value")]
    ZeroValuePositional(String),
    /// A group name is empty.
    #[error("group name cannot be empty in command '{0}'")]
    EmptyGroupName(String),
}

/// Validates a whole command tree, returning every problem found.
pub fn validate_tree(tree: &CommandTree) -> Vec<TreeError> {
    let mut errors = Vec::new();
    for id in tree.command_ids() {
        validate_command(tree, id, &mut errors);
    }
    errors
}

fn validate_command(tree: &CommandTree, id: CommandId, errors: &mut Vec<TreeError>) {
    let command = tree.command(id);
    let command_name = command.name().to_string();

    for name in command.names() {
        if name.trim().is_empty() {
            errors.push(TreeError::EmptyCommandName);
        } else if !is_valid_name(name) {
            errors.push(TreeError::InvalidName(name.clone()));
        }
    }

    let mut seen_args: HashSet<&str> = HashSet::new();
    for &arg_id in command.arguments() {
        let argument = tree.argument(arg_id);
        for name in argument.names() {
            if name.is_empty() {
                errors.push(TreeError::EmptyArgumentName(command_name.clone()));
                continue;
            }
            if !is_valid_name(name) {
                errors.push(TreeError::InvalidName(name.clone()));
                continue;
            }
            if !seen_args.insert(name) {
                errors.push(TreeError::DuplicateArgument {
                    command: command_name.clone(),
                    name: name.clone(),
                });
            }
        }
        if argument.is_positional() && argument.arg_type().value_count().is_zero() {
            errors.push(TreeError::ZeroValuePositional(argument.name().to_string()));
        }
    }

    let mut seen_subs: HashSet<&str> = HashSet::new();
    for &sub_id in command.sub_commands() {
        for name in tree.command(sub_id).names() {
            if !seen_subs.insert(name) {
                errors.push(TreeError::DuplicateSubCommand {
                    command: command_name.clone(),
                    name: name.clone(),
                });
            }
        }
    }

    let mut pending: Vec<_> = command.groups().to_vec();
    while let Some(group_id) = pending.pop() {
        let group = tree.group(group_id);
        if group.name().trim().is_empty() {
            errors.push(TreeError::EmptyGroupName(command_name.clone()));
        }
        pending.extend_from_slice(group.sub_groups());
    }
}

fn is_valid_name(name: &str) -> bool {
    !name
        .chars()
        .any(|c| c.is_whitespace() || RESERVED_CHARS.contains(&c))
}
