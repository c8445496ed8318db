//! Final argument values of a parse, one node per command level.

use std::collections::{BTreeMap, BTreeSet};

use argtree_core::{CommandId, CommandTree, Value};
use serde::Serialize;

use crate::config::ParserConfig;
use crate::state::Session;

/// Values of one command level and, if one was given, its sub-command.
///
/// Values are keyed by the argument's primary name. Aliases resolve to the
/// same entry.
///
/// # Examples
///
/// ```
/// use argtree_core::*;
/// use argtree_parser::ArgumentParser;
///
/// let mut tree = CommandTree::new(Command::new("tool"));
/// let root = tree.root();
/// tree.add_argument(root, Argument::new("name", StringType).with_alias("n"));
/// let sub = tree.add_sub_command(root, Command::new("run"));
/// tree.add_argument(sub, Argument::new("port", IntType::new()));
///
/// let mut parser = ArgumentParser::new(tree).unwrap();
/// let outcome = parser.parse("-n demo run --port 8080").unwrap();
/// let args = &outcome.arguments;
///
/// assert_eq!(args.get_as::<String>("name").as_deref(), Some("demo"));
/// assert_eq!(args.get_as::<i64>("run.port"), Some(8080));
/// assert!(args.was_used("run.port"));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParsedArguments {
    command: String,
    #[serde(skip)]
    command_names: Vec<String>,
    arguments: BTreeMap<String, Option<Value>>,
    #[serde(skip)]
    aliases: BTreeMap<String, String>,
    #[serde(skip)]
    used: BTreeSet<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sub_command: Option<Box<ParsedArguments>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    forward_value: Option<String>,
    #[serde(skip)]
    separator: char,
}

impl ParsedArguments {
    pub(crate) fn build(tree: &CommandTree, session: &Session, config: &ParserConfig) -> Self {
        Self::build_level(tree, session, config, tree.root())
    }

    fn build_level(tree: &CommandTree, session: &Session, config: &ParserConfig, id: CommandId) -> Self {
        let command = tree.command(id);
        let level = session.level(id);
        let mut arguments = BTreeMap::new();
        let mut aliases = BTreeMap::new();
        let mut used = BTreeSet::new();

        for &arg in command.arguments() {
            let argument = tree.argument(arg);
            let state = session.argument(arg);
            let name = argument.name().to_string();
            for alias in argument.names().iter().skip(1) {
                aliases.insert(alias.clone(), name.clone());
            }
            if state.usage_count > 0 {
                used.insert(name.clone());
            }
            arguments.insert(name, state.finished.clone().flatten());
        }

        let sub_command = level
            .tokenizer
            .sub_command
            .filter(|&sub| session.level(sub).tokenizer.finished)
            .map(|sub| Box::new(Self::build_level(tree, session, config, sub)));

        Self {
            command: command.name().to_string(),
            command_names: command.names().to_vec(),
            arguments,
            aliases,
            used,
            sub_command,
            forward_value: level.parser.forward_value.clone(),
            separator: config.path_separator,
        }
    }

    /// Name of the command these values belong to.
    pub fn command(&self) -> &str {
        &self.command
    }

    /// The sub-command that was given, if any.
    pub fn sub_command(&self) -> Option<&ParsedArguments> {
        self.sub_command.as_deref()
    }

    /// Text following `-- ` on this level.
    pub fn forward_value(&self) -> Option<&str> {
        self.forward_value.as_deref()
    }

    /// Value of an argument of this level, by name or alias.
    pub fn value(&self, name: &str) -> Option<&Value> {
        let name = self.aliases.get(name).map_or(name, String::as_str);
        self.arguments.get(name)?.as_ref()
    }

    /// Looks up a value by path: sub-command names followed by an argument
    /// name, joined by the configured separator (`run.port`).
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (level, name) = self.resolve(path)?;
        level.value(name)
    }

    /// Looks up a value by path and converts it.
    pub fn get_as<T>(&self, path: &str) -> Option<T>
    where
        T: for<'v> TryFrom<&'v Value>,
    {
        self.get(path).and_then(|value| T::try_from(value).ok())
    }

    /// Returns `true` if the argument at `path` appeared in the input.
    pub fn was_used(&self, path: &str) -> bool {
        self.resolve(path).is_some_and(|(level, name)| {
            let name = level.aliases.get(name).map_or(name, String::as_str);
            level.used.contains(name)
        })
    }

    /// Iterates over `(name, value)` pairs of this level.
    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&Value>)> {
        self.arguments
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_ref()))
    }

    fn resolve<'p>(&self, path: &'p str) -> Option<(&ParsedArguments, &'p str)> {
        let segments: Vec<&str> = path.split(self.separator).collect();
        let (name, commands) = segments.split_last()?;
        let mut level = self;
        for segment in commands {
            level = level
                .sub_command()
                .filter(|sub| sub.command_names.iter().any(|n| n == *segment))?;
        }
        Some((level, *name))
    }
}
