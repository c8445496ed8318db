//! Command tree definitions.
//!
//! Commands, arguments and groups live in a flat arena owned by
//! [`CommandTree`]. Relations between them (parent command, child commands,
//! group membership, nested groups) are stored as typed indices, so the tree
//! can be walked in any direction without shared ownership.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{ArgType, ErrorLevel, Value};

macro_rules! arena_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
        pub struct $name(usize);

        impl $name {
            /// Position of this entry in its arena.
            pub const fn index(self) -> usize {
                self.0
            }
        }
    };
}

arena_id!(
    /// Stable handle to a [`Command`] inside a [`CommandTree`].
    CommandId
);
arena_id!(
    /// Stable handle to an [`Argument`] inside a [`CommandTree`].
    ArgumentId
);
arena_id!(
    /// Stable handle to a [`Group`] inside a [`CommandTree`].
    GroupId
);

/// Characters that may introduce an argument name.
///
/// # Examples
///
/// ```
/// use argtree_core::PrefixChar;
///
/// assert_eq!(PrefixChar::default().as_char(), '-');
/// assert_eq!(PrefixChar::from_char('/'), Some(PrefixChar::Slash));
/// assert!(PrefixChar::is_valid('+'));
/// assert!(!PrefixChar::is_valid('a'));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrefixChar {
    #[default]
    Minus,
    Plus,
    Slash,
    At,
    Percent,
    Caret,
    Tilde,
}

impl PrefixChar {
    pub const ALL: [PrefixChar; 7] = [
        PrefixChar::Minus,
        PrefixChar::Plus,
        PrefixChar::Slash,
        PrefixChar::At,
        PrefixChar::Percent,
        PrefixChar::Caret,
        PrefixChar::Tilde,
    ];

    pub const fn as_char(self) -> char {
        match self {
            PrefixChar::Minus => '-',
            PrefixChar::Plus => '+',
            PrefixChar::Slash => '/',
            PrefixChar::At => '@',
            PrefixChar::Percent => '%',
            PrefixChar::Caret => '^',
            PrefixChar::Tilde => '~',
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.as_char() == c)
    }

    pub fn is_valid(c: char) -> bool {
        Self::from_char(c).is_some()
    }
}

impl fmt::Display for PrefixChar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// A command or sub-command.
///
/// Use the builder methods to describe the command, then hand it to
/// [`CommandTree::new`] (root) or [`CommandTree::add_sub_command`].
///
/// # Examples
///
/// ```
/// use argtree_core::{Command, ErrorLevel};
///
/// let cmd = Command::new("remote")
///     .with_alias("rmt")
///     .with_description("Manage remotes")
///     .with_error_code(4)
///     .with_display_level(ErrorLevel::Warning);
///
/// assert!(cmd.has_name("rmt"));
/// assert_eq!(cmd.error_code(), 4);
/// ```
#[derive(Debug, Clone)]
pub struct Command {
    names: Vec<String>,
    description: Option<String>,
    error_code: i32,
    display_level: Option<ErrorLevel>,
    exit_level: Option<ErrorLevel>,
    parent: Option<CommandId>,
    arguments: Vec<ArgumentId>,
    sub_commands: Vec<CommandId>,
    groups: Vec<GroupId>,
}

impl Command {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            names: vec![name.into()],
            description: None,
            error_code: 1,
            display_level: None,
            exit_level: None,
            parent: None,
            arguments: Vec::new(),
            sub_commands: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    /// Code OR-ed into the exit code when this command fails.
    pub fn with_error_code(mut self, code: i32) -> Self {
        self.error_code = code;
        self
    }

    /// Minimum level a diagnostic needs to be displayed.
    pub fn with_display_level(mut self, level: ErrorLevel) -> Self {
        self.display_level = Some(level);
        self
    }

    /// Minimum level a diagnostic needs to make this command fail.
    pub fn with_exit_level(mut self, level: ErrorLevel) -> Self {
        self.exit_level = Some(level);
        self
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn has_name(&self, name: &str) -> bool {
        self.names.iter().any(|n| n == name)
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn error_code(&self) -> i32 {
        self.error_code
    }

    pub fn parent(&self) -> Option<CommandId> {
        self.parent
    }

    /// Arguments in declaration order.
    pub fn arguments(&self) -> &[ArgumentId] {
        &self.arguments
    }

    pub fn sub_commands(&self) -> &[CommandId] {
        &self.sub_commands
    }

    /// Top-level groups of this command.
    pub fn groups(&self) -> &[GroupId] {
        &self.groups
    }
}

/// An argument of a command.
///
/// # Examples
///
/// ```
/// use argtree_core::{Argument, CounterType, PrefixChar, StringType};
///
/// let verbose = Argument::new("verbose", CounterType).with_alias("v");
/// assert!(verbose.matches_name("--verbose"));
/// assert!(verbose.matches_name("-v"));
/// assert!(!verbose.matches_name("verbose"));
///
/// let file = Argument::new("file", StringType)
///     .positional()
///     .required()
///     .with_prefix(PrefixChar::Plus);
/// assert!(file.matches_name("+file"));
/// assert!(file.is_positional() && file.is_required());
/// ```
#[derive(Debug)]
pub struct Argument {
    names: Vec<String>,
    description: Option<String>,
    prefix: PrefixChar,
    positional: bool,
    required: bool,
    unique: bool,
    arg_type: Box<dyn ArgType>,
    default: Option<Value>,
    command: CommandId,
    group: Option<GroupId>,
}

impl Argument {
    pub fn new(name: impl Into<String>, arg_type: impl ArgType + 'static) -> Self {
        Self::boxed(name, Box::new(arg_type))
    }

    pub fn boxed(name: impl Into<String>, arg_type: Box<dyn ArgType>) -> Self {
        Self {
            names: vec![name.into()],
            description: None,
            prefix: PrefixChar::default(),
            positional: false,
            required: false,
            unique: false,
            arg_type,
            default: None,
            command: CommandTree::ROOT,
            group: None,
        }
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.names.push(alias.into());
        self
    }

    pub fn with_description(mut self, desc: &str) -> Self {
        self.description = Some(desc.to_string());
        self
    }

    pub fn with_prefix(mut self, prefix: PrefixChar) -> Self {
        self.prefix = prefix;
        self
    }

    /// Allows binding the argument by position until the first named token.
    pub fn positional(mut self) -> Self {
        self.positional = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    /// When used, required arguments anywhere in the tree are no longer enforced.
    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// Primary name.
    pub fn name(&self) -> &str {
        &self.names[0]
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn prefix(&self) -> PrefixChar {
        self.prefix
    }

    pub fn is_positional(&self) -> bool {
        self.positional
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    pub fn arg_type(&self) -> &dyn ArgType {
        self.arg_type.as_ref()
    }

    /// Command owning this argument. Set when the argument is added to a tree.
    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn group(&self) -> Option<GroupId> {
        self.group
    }

    /// Declared default, falling back to the type's initial value.
    pub fn default_value(&self) -> Option<Value> {
        self.default
            .clone()
            .or_else(|| self.arg_type.initial_value())
    }

    /// Returns `true` if `token` is one of the names behind one or two prefix characters.
    pub fn matches_name(&self, token: &str) -> bool {
        let prefix = self.prefix.as_char();
        let Some(rest) = token.strip_prefix(prefix) else {
            return false;
        };
        let double = rest.strip_prefix(prefix);
        self.names
            .iter()
            .any(|name| rest == name || double == Some(name.as_str()))
    }

    /// Returns `true` if one of the names is exactly the character `c`.
    pub fn has_short_name(&self, c: char) -> bool {
        self.names.iter().any(|name| {
            let mut chars = name.chars();
            chars.next() == Some(c) && chars.next().is_none()
        })
    }
}

/// A group of arguments, optionally exclusive.
#[derive(Debug, Clone)]
pub struct Group {
    name: String,
    exclusive: bool,
    command: CommandId,
    parent: Option<GroupId>,
    arguments: Vec<ArgumentId>,
    sub_groups: Vec<GroupId>,
}

impl Group {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// At most one argument of this group and its sub-groups may be used.
    pub fn is_exclusive(&self) -> bool {
        self.exclusive
    }

    pub fn command(&self) -> CommandId {
        self.command
    }

    pub fn parent(&self) -> Option<GroupId> {
        self.parent
    }

    pub fn arguments(&self) -> &[ArgumentId] {
        &self.arguments
    }

    pub fn sub_groups(&self) -> &[GroupId] {
        &self.sub_groups
    }
}

/// Arena holding a whole command tree.
///
/// # Examples
///
/// ```
/// use argtree_core::{Argument, Command, CommandTree, CounterType, IntType, StringType};
///
/// let mut tree = CommandTree::new(Command::new("git"));
/// let root = tree.root();
/// tree.add_argument(root, Argument::new("verbose", CounterType).with_alias("v"));
///
/// let remote = tree.add_sub_command(root, Command::new("remote"));
/// tree.add_argument(remote, Argument::new("name", StringType).positional());
///
/// let format = tree.add_group(remote, "format", true);
/// tree.add_argument_to_group(format, Argument::new("json", IntType::new()));
///
/// assert_eq!(tree.find_sub_command(root, "remote"), Some(remote));
/// assert!(tree.find_argument(root, "-v").is_some());
/// assert_eq!(tree.positional_arguments(remote).len(), 1);
/// assert_eq!(tree.command(remote).arguments().len(), 2);
/// ```
#[derive(Debug)]
pub struct CommandTree {
    commands: Vec<Command>,
    arguments: Vec<Argument>,
    groups: Vec<Group>,
}

impl CommandTree {
    /// Id of the root command.
    pub const ROOT: CommandId = CommandId(0);

    pub fn new(root: Command) -> Self {
        let mut root = root;
        root.parent = None;
        root.arguments.clear();
        root.sub_commands.clear();
        root.groups.clear();
        Self {
            commands: vec![root],
            arguments: Vec::new(),
            groups: Vec::new(),
        }
    }

    pub fn root(&self) -> CommandId {
        Self::ROOT
    }

    pub fn add_sub_command(&mut self, parent: CommandId, command: Command) -> CommandId {
        let id = CommandId(self.commands.len());
        let mut command = command;
        command.parent = Some(parent);
        command.arguments.clear();
        command.sub_commands.clear();
        command.groups.clear();
        self.commands.push(command);
        self.commands[parent.0].sub_commands.push(id);
        id
    }

    pub fn add_argument(&mut self, command: CommandId, argument: Argument) -> ArgumentId {
        let id = ArgumentId(self.arguments.len());
        let mut argument = argument;
        argument.command = command;
        argument.group = None;
        self.arguments.push(argument);
        self.commands[command.0].arguments.push(id);
        id
    }

    /// Adds a top-level group to `command`.
    pub fn add_group(&mut self, command: CommandId, name: impl Into<String>, exclusive: bool) -> GroupId {
        let id = self.push_group(command, None, name.into(), exclusive);
        self.commands[command.0].groups.push(id);
        id
    }

    /// Adds a group nested inside `parent`.
    pub fn add_sub_group(&mut self, parent: GroupId, name: impl Into<String>, exclusive: bool) -> GroupId {
        let command = self.groups[parent.0].command;
        let id = self.push_group(command, Some(parent), name.into(), exclusive);
        self.groups[parent.0].sub_groups.push(id);
        id
    }

    /// Adds an argument to the group's command and makes it a member of the group.
    pub fn add_argument_to_group(&mut self, group: GroupId, argument: Argument) -> ArgumentId {
        let command = self.groups[group.0].command;
        let id = self.add_argument(command, argument);
        self.arguments[id.0].group = Some(group);
        self.groups[group.0].arguments.push(id);
        id
    }

    fn push_group(
        &mut self,
        command: CommandId,
        parent: Option<GroupId>,
        name: String,
        exclusive: bool,
    ) -> GroupId {
        let id = GroupId(self.groups.len());
        self.groups.push(Group {
            name,
            exclusive,
            command,
            parent,
            arguments: Vec::new(),
            sub_groups: Vec::new(),
        });
        id
    }

    pub fn command(&self, id: CommandId) -> &Command {
        &self.commands[id.0]
    }

    pub fn argument(&self, id: ArgumentId) -> &Argument {
        &self.arguments[id.0]
    }

    pub fn group(&self, id: GroupId) -> &Group {
        &self.groups[id.0]
    }

    pub fn command_count(&self) -> usize {
        self.commands.len()
    }

    pub fn argument_count(&self) -> usize {
        self.arguments.len()
    }

    pub fn group_count(&self) -> usize {
        self.groups.len()
    }

    pub fn command_ids(&self) -> impl Iterator<Item = CommandId> + use<> {
        (0..self.commands.len()).map(CommandId)
    }

    pub fn argument_ids(&self) -> impl Iterator<Item = ArgumentId> + use<> {
        (0..self.arguments.len()).map(ArgumentId)
    }

    /// Finds a direct sub-command of `command` by name or alias.
    pub fn find_sub_command(&self, command: CommandId, name: &str) -> Option<CommandId> {
        self.command(command)
            .sub_commands
            .iter()
            .copied()
            .find(|&id| self.command(id).has_name(name))
    }

    /// Finds an argument of `command` whose prefixed name is exactly `token`.
    pub fn find_argument(&self, command: CommandId, token: &str) -> Option<ArgumentId> {
        self.command(command)
            .arguments
            .iter()
            .copied()
            .find(|&id| self.argument(id).matches_name(token))
    }

    /// Finds an argument of `command` by bare name, without prefix.
    pub fn find_argument_by_name(&self, command: CommandId, name: &str) -> Option<ArgumentId> {
        self.command(command)
            .arguments
            .iter()
            .copied()
            .find(|&id| self.argument(id).names.iter().any(|n| n == name))
    }

    /// Finds an argument of `command` with the single-character name `c`,
    /// optionally restricted to a prefix.
    pub fn find_short_argument(
        &self,
        command: CommandId,
        c: char,
        prefix: Option<PrefixChar>,
    ) -> Option<ArgumentId> {
        self.command(command)
            .arguments
            .iter()
            .copied()
            .find(|&id| {
                let arg = self.argument(id);
                arg.has_short_name(c) && prefix.is_none_or(|p| arg.prefix == p)
            })
    }

    /// Positional arguments of `command`, in declaration order.
    pub fn positional_arguments(&self, command: CommandId) -> Vec<ArgumentId> {
        self.command(command)
            .arguments
            .iter()
            .copied()
            .filter(|&id| self.argument(id).positional)
            .collect()
    }

    /// Groups containing `argument`, innermost first.
    pub fn group_ancestry(&self, argument: ArgumentId) -> Vec<GroupId> {
        let mut chain = Vec::new();
        let mut current = self.argument(argument).group;
        while let Some(id) = current {
            chain.push(id);
            current = self.group(id).parent;
        }
        chain
    }

    /// Effective display threshold, inherited from the closest ancestor that sets one.
    pub fn display_level(&self, command: CommandId) -> ErrorLevel {
        self.inherited(command, |c| c.display_level)
            .unwrap_or(ErrorLevel::Info)
    }

    /// Effective exit threshold, inherited from the closest ancestor that sets one.
    pub fn exit_level(&self, command: CommandId) -> ErrorLevel {
        self.inherited(command, |c| c.exit_level)
            .unwrap_or(ErrorLevel::Error)
    }

    fn inherited(
        &self,
        command: CommandId,
        field: impl Fn(&Command) -> Option<ErrorLevel>,
    ) -> Option<ErrorLevel> {
        let mut current = Some(command);
        while let Some(id) = current {
            let cmd = self.command(id);
            if let Some(level) = field(cmd) {
                return Some(level);
            }
            current = cmd.parent;
        }
        None
    }
}
