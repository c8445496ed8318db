//! Tokenizer, parser and error reporting for argtree command trees.
//!
//! [`ArgumentParser`] takes a validated [`CommandTree`] and turns an input
//! string into [`ParsedArguments`], together with formatted errors and an
//! exit code. Parsing runs in three stages:
//!
//! 1. **Tokenize** — each command level splits its part of the input into
//!    names, name lists, values, tuple delimiters, sub-command names and
//!    forwarded text. A sub-command name hands the rest of the input to the
//!    sub-command.
//! 2. **Parse** — each level binds its tokens to arguments and records
//!    every use, converting values through the argument's type.
//! 3. **Collect** — errors from all levels are filtered by each command's
//!    display threshold, ordered by position, and rendered with a view of
//!    the offending input. Commands whose errors reach their exit threshold
//!    contribute their error code to the exit code.
//!
//! # Example
//!
//! ```
//! use argtree_core::*;
//! use argtree_parser::ArgumentParser;
//!
//! let mut tree = CommandTree::new(Command::new("mycli"));
//! let root = tree.root();
//! tree.add_argument(
//!     root,
//!     Argument::new("what", TupleOf::new(StringType, Range::between(1, 3))),
//! );
//!
//! let mut parser = ArgumentParser::new(tree).unwrap();
//! let outcome = parser.parse("--what [ a b c d ]").unwrap();
//! assert_eq!(outcome.exit_code, 1);
//! assert!(outcome.errors[0].contains("Expected from 1 to 3 values, but got 4."));
//!
//! parser.reset();
//! let outcome = parser.parse("--what [ a b ]").unwrap();
//! assert!(!outcome.has_errors());
//! ```

mod collector;
mod config;
pub mod error;
mod parser;
mod results;
mod state;
mod token;
mod tokenizer;

use argtree_core::{CommandTree, TreeError, Value, validate_tree};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

pub use collector::Diagnostic;
pub use config::{ConfigError, ParserConfig, TupleChars};
pub use results::ParsedArguments;
pub use token::{Token, TokenKind};

use crate::parser::{Parser, finish_level};
use crate::state::Session;
use crate::tokenizer::Tokenizer;

/// Misuse of the parser itself, as opposed to errors in the parsed input.
#[derive(Debug, Error)]
pub enum UsageError {
    /// A command level was tokenized a second time in one run.
    #[error("command '{0}' was already tokenized")]
    AlreadyTokenized(String),

    /// `parse` was called again without `reset`.
    #[error("parser already ran; call reset() before parsing again")]
    NotReset,

    /// The command tree failed validation.
    #[error("invalid command tree: {}", join_errors(.0))]
    InvalidTree(Vec<TreeError>),
}

fn join_errors(errors: &[TreeError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result of one parse run.
#[derive(Debug, Clone, Serialize)]
pub struct ParseOutcome {
    pub arguments: ParsedArguments,
    /// Formatted errors in input order.
    pub errors: Vec<String>,
    /// The same errors, unformatted.
    pub diagnostics: Vec<Diagnostic>,
    /// Bitwise OR of the error codes of every failing command. Zero on success.
    pub exit_code: i32,
}

impl ParseOutcome {
    /// Returns `true` if any command reached its exit threshold.
    pub fn has_errors(&self) -> bool {
        self.exit_code != 0
    }

    /// Shorthand for [`ParsedArguments::get`] on the root.
    pub fn get(&self, path: &str) -> Option<&Value> {
        self.arguments.get(path)
    }

    /// Forwarded text of the deepest level that has one.
    pub fn forward_value(&self) -> Option<&str> {
        let mut current = Some(&self.arguments);
        let mut found = None;
        while let Some(level) = current {
            found = level.forward_value().or(found);
            current = level.sub_command();
        }
        found
    }
}

/// Parses input strings against a command tree.
///
/// A parser runs once; call [`reset`](Self::reset) to parse again. Reset
/// discards all recorded state, so parsing the same input after a reset
/// gives the same outcome.
#[derive(Debug)]
pub struct ArgumentParser {
    tree: CommandTree,
    config: ParserConfig,
    session: Option<Session>,
}

impl ArgumentParser {
    /// Creates a parser with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns [`UsageError::InvalidTree`] if the tree fails validation.
    pub fn new(tree: CommandTree) -> Result<Self, UsageError> {
        Self::with_config(tree, ParserConfig::default())
    }

    pub fn with_config(tree: CommandTree, config: ParserConfig) -> Result<Self, UsageError> {
        let errors = validate_tree(&tree);
        if !errors.is_empty() {
            return Err(UsageError::InvalidTree(errors));
        }
        Ok(Self {
            tree,
            config,
            session: None,
        })
    }

    pub fn tree(&self) -> &CommandTree {
        &self.tree
    }

    pub fn config(&self) -> &ParserConfig {
        &self.config
    }

    /// Returns `true` if the parser ran and has not been reset.
    pub fn is_used(&self) -> bool {
        self.session.is_some()
    }

    /// Discards all state recorded by the last run.
    pub fn reset(&mut self) {
        self.session = None;
    }

    /// Tokenizes and parses `input`.
    ///
    /// Errors in the input are reported in the returned [`ParseOutcome`];
    /// `Err` is reserved for misuse of the parser.
    pub fn parse(&mut self, input: &str) -> Result<ParseOutcome, UsageError> {
        if self.session.is_some() {
            return Err(UsageError::NotReset);
        }

        debug!(input = %input, "parse started");
        let tree = &self.tree;
        let root = tree.root();
        let mut session = Session::new(tree, input);
        Tokenizer::new(tree, &self.config, root).tokenize(&mut session, input, 0, 0)?;

        if session.level(root).tokenizer.has_errors() {
            debug!("root level has tokenize errors, skipping parse");
        } else {
            Parser::new(tree, root).parse(&mut session, None);
        }

        for id in session.tokenized_chain(tree) {
            if session.level(id).parser.parsed {
                finish_level(tree, &mut session, id);
            }
        }

        let collected = collector::collect(tree, &session, &self.config);
        let arguments = ParsedArguments::build(tree, &session, &self.config);
        info!(
            errors = collected.errors.len(),
            exit_code = collected.exit_code,
            "parsed input"
        );

        self.session = Some(session);
        Ok(ParseOutcome {
            arguments,
            errors: collected.errors,
            diagnostics: collected.diagnostics,
            exit_code: collected.exit_code,
        })
    }

    /// Joins separate arguments, such as those of a process, into one input
    /// string, escaping characters the tokenizer would otherwise interpret.
    /// An empty argument becomes `''` so it still counts as a value.
    ///
    /// ```
    /// use argtree_parser::ArgumentParser;
    ///
    /// let input = ArgumentParser::join_args(["--name", "two words", "[x]"]);
    /// assert_eq!(input, r"--name two\ words \[x\]");
    /// ```
    pub fn join_args<I, S>(args: I) -> String
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        args.into_iter()
            .map(|arg| escape_arg(arg.as_ref()))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn escape_arg(arg: &str) -> String {
    if arg.is_empty() {
        return "''".to_string();
    }
    let mut escaped = String::with_capacity(arg.len());
    for c in arg.chars() {
        if c.is_whitespace() || matches!(c, '\\' | '"' | '\'' | '[' | ']' | '(' | ')' | '{' | '}' | '<' | '>') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
