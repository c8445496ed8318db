//! Serializable command tree definitions.
//!
//! A [`CommandDefinition`] describes a command tree as plain data, suitable
//! for JSON or YAML files. [`CommandDefinition::into_tree`] turns it into a
//! validated [`CommandTree`].
//!
//! # Example YAML
//!
//! ```yaml
//! name: tool
//! arguments:
//!   - name: verbose
//!     aliases: [v]
//!     type: { kind: counter }
//! sub_commands:
//!   - name: run
//!     error_code: 2
//!     arguments:
//!       - name: script
//!         positional: true
//!         required: true
//!         type: { kind: string }
//!     groups:
//!       - name: mode
//!         exclusive: true
//!         arguments: [fast, safe]
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    ArgType, Argument, BoolType, Command, CommandId, CommandTree, CounterType, EnumType,
    ErrorLevel, FloatType, GroupId, IntType, KeyValueType, PrefixChar, Range, StringType, TreeError,
    TupleOf, Value, validate_tree,
};

/// Errors raised while building a tree from a definition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefinitionError {
    /// A group lists an argument that the command does not declare.
    #[error("group '{group}' references unknown argument '{argument}'")]
    UnknownGroupMember { group: String, argument: String },
    /// An argument is listed in more than one group.
    #[error("argument '{0}' belongs to more than one group")]
    ArgumentInMultipleGroups(String),
    /// A prefix character outside the supported set.
    #[error("invalid prefix character '{0}'")]
    InvalidPrefix(char),
    /// A tuple type whose element type itself takes no single value.
    #[error("tuple element type must take exactly one value")]
    InvalidTupleElement,
    /// The resulting tree failed validation.
    #[error("invalid command tree: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidTree(Vec<TreeError>),
}

/// Serializable description of an argument type.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDefinition {
    Bool,
    Counter,
    Int {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        min: Option<i64>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<i64>,
    },
    Float,
    #[default]
    String,
    Enum {
        variants: Vec<String>,
    },
    KeyValue,
    Tuple {
        of: Box<TypeDefinition>,
        #[serde(default = "default_tuple_min")]
        min: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        max: Option<usize>,
    },
}

fn default_tuple_min() -> usize {
    1
}

impl TypeDefinition {
    /// Builds the argument type described by this definition.
    pub fn build(&self) -> Result<Box<dyn ArgType>, DefinitionError> {
        Ok(match self {
            TypeDefinition::Bool => Box::new(BoolType),
            TypeDefinition::Counter => Box::new(CounterType),
            TypeDefinition::Int { min, max } => {
                let mut ty = IntType::new();
                if let Some(min) = min {
                    ty = ty.with_min(*min);
                }
                if let Some(max) = max {
                    ty = ty.with_max(*max);
                }
                Box::new(ty)
            }
            TypeDefinition::Float => Box::new(FloatType),
            TypeDefinition::String => Box::new(StringType),
            TypeDefinition::Enum { variants } => Box::new(EnumType::new(variants.clone())),
            TypeDefinition::KeyValue => Box::new(KeyValueType),
            TypeDefinition::Tuple { of, min, max } => {
                let inner = of.build()?;
                if inner.value_count() != Range::ONE {
                    return Err(DefinitionError::InvalidTupleElement);
                }
                let count = match max {
                    Some(max) => Range::between(*min, *max),
                    None => Range::at_least(*min),
                };
                Box::new(TupleOf::boxed(inner, count))
            }
        })
    }
}

/// Serializable description of an argument.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArgumentDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_prefix")]
    pub prefix: char,
    #[serde(default)]
    pub positional: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, rename = "type")]
    pub arg_type: TypeDefinition,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
}

fn default_prefix() -> char {
    PrefixChar::default().as_char()
}

impl ArgumentDefinition {
    pub fn new(name: &str, arg_type: TypeDefinition) -> Self {
        Self {
            name: name.to_string(),
            aliases: Vec::new(),
            description: None,
            prefix: default_prefix(),
            positional: false,
            required: false,
            unique: false,
            arg_type,
            default: None,
        }
    }

    fn build(&self) -> Result<Argument, DefinitionError> {
        let prefix =
            PrefixChar::from_char(self.prefix).ok_or(DefinitionError::InvalidPrefix(self.prefix))?;
        let mut argument = Argument::boxed(self.name.clone(), self.arg_type.build()?).with_prefix(prefix);
        for alias in &self.aliases {
            argument = argument.with_alias(alias.clone());
        }
        if let Some(desc) = &self.description {
            argument = argument.with_description(desc);
        }
        if self.positional {
            argument = argument.positional();
        }
        if self.required {
            argument = argument.required();
        }
        if self.unique {
            argument = argument.unique();
        }
        if let Some(default) = &self.default {
            argument = argument.with_default(default.clone());
        }
        Ok(argument)
    }
}

/// Serializable description of a group. Members are argument names of the
/// owning command.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GroupDefinition {
    pub name: String,
    #[serde(default)]
    pub exclusive: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDefinition>,
}

/// Serializable description of a command and its sub-commands.
///
/// # Examples
///
/// ```
/// use argtree_core::CommandDefinition;
///
/// let json = r#"{
///     "name": "tool",
///     "arguments": [
///         { "name": "count", "type": { "kind": "int", "min": 0 } },
///         { "name": "a", "type": { "kind": "bool" } },
///         { "name": "b", "type": { "kind": "bool" } }
///     ],
///     "groups": [ { "name": "ab", "exclusive": true, "arguments": ["a", "b"] } ],
///     "sub_commands": [ { "name": "run" } ]
/// }"#;
///
/// let definition: CommandDefinition = serde_json::from_str(json).unwrap();
/// let tree = definition.into_tree().unwrap();
/// assert_eq!(tree.command(tree.root()).arguments().len(), 3);
/// assert!(tree.find_sub_command(tree.root(), "run").is_some());
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CommandDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub aliases: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_level: Option<ErrorLevel>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exit_level: Option<ErrorLevel>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub arguments: Vec<ArgumentDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<GroupDefinition>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_commands: Vec<CommandDefinition>,
}

impl CommandDefinition {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            ..Default::default()
        }
    }

    /// Builds and validates the command tree rooted at this definition.
    pub fn into_tree(self) -> Result<CommandTree, DefinitionError> {
        let mut tree = CommandTree::new(self.command());
        let root = tree.root();
        self.populate(&mut tree, root)?;

        let errors = validate_tree(&tree);
        if !errors.is_empty() {
            return Err(DefinitionError::InvalidTree(errors));
        }
        Ok(tree)
    }

    fn command(&self) -> Command {
        let mut command = Command::new(self.name.clone());
        for alias in &self.aliases {
            command = command.with_alias(alias.clone());
        }
        if let Some(desc) = &self.description {
            command = command.with_description(desc);
        }
        if let Some(code) = self.error_code {
            command = command.with_error_code(code);
        }
        if let Some(level) = self.display_level {
            command = command.with_display_level(level);
        }
        if let Some(level) = self.exit_level {
            command = command.with_exit_level(level);
        }
        command
    }

    fn populate(&self, tree: &mut CommandTree, id: CommandId) -> Result<(), DefinitionError> {
        let mut membership: Vec<(&str, GroupId, &str)> = Vec::new();
        for group in &self.groups {
            let group_id = tree.add_group(id, group.name.clone(), group.exclusive);
            collect_members(tree, group, group_id, &mut membership)?;
        }

        if let Some((member, _, group)) = membership
            .iter()
            .find(|(member, _, _)| !self.arguments.iter().any(|a| a.name == *member))
        {
            return Err(DefinitionError::UnknownGroupMember {
                group: group.to_string(),
                argument: member.to_string(),
            });
        }

        // declaration order decides positional order, so groups do not reorder arguments
        for argument in &self.arguments {
            let built = argument.build()?;
            match membership.iter().find(|(member, _, _)| *member == argument.name) {
                Some((_, group_id, _)) => tree.add_argument_to_group(*group_id, built),
                None => tree.add_argument(id, built),
            };
        }

        for sub in &self.sub_commands {
            let sub_id = tree.add_sub_command(id, sub.command());
            sub.populate(tree, sub_id)?;
        }
        Ok(())
    }
}

fn collect_members<'a>(
    tree: &mut CommandTree,
    group: &'a GroupDefinition,
    group_id: GroupId,
    membership: &mut Vec<(&'a str, GroupId, &'a str)>,
) -> Result<(), DefinitionError> {
    for member in &group.arguments {
        if membership.iter().any(|(m, _, _)| *m == member.as_str()) {
            return Err(DefinitionError::ArgumentInMultipleGroups(member.clone()));
        }
        membership.push((member.as_str(), group_id, group.name.as_str()));
    }
    for sub_group in &group.groups {
        let sub_id = tree.add_sub_group(group_id, sub_group.name.clone(), sub_group.exclusive);
        collect_members(tree, sub_group, sub_id, membership)?;
    }
    Ok(())
}
