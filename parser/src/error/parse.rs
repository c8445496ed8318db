use argtree_core::{ArgumentId, ErrorLevel};
use thiserror::Error;

use super::{Highlight, ParseContext, Rendered};

/// Problems found while matching tokens against a command's arguments.
///
/// Every index is local to the command level that raised the error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// A token matched nothing at all.
    #[error(
        "Token '{contents}' does not correspond with a valid argument, argument list, value, or command."
    )]
    UnmatchedToken { index: isize, contents: String },

    /// A name list continued after an argument that takes no values.
    #[error("Argument '{argument}' does not take any values, but got '{rest}'.")]
    UnmatchedInNameList {
        index: isize,
        argument: String,
        argument_id: ArgumentId,
        rest: String,
    },

    /// A value looks like an argument name written with the wrong prefix.
    #[error("Found argument with name given, but with a different prefix ({expected}).")]
    SimilarArgument {
        index: isize,
        argument_id: ArgumentId,
        expected: char,
    },

    /// One use of an argument received a value count outside its range.
    #[error(
        "Incorrect number of values for argument '{argument}'.\nExpected {expected}, but got {received}."
    )]
    IncorrectValueCount {
        index: isize,
        /// Tokens after `index` covered by the highlight.
        len: usize,
        argument: String,
        argument_id: ArgumentId,
        expected: String,
        received: usize,
    },

    /// An argument was used more or fewer times than allowed.
    #[error(
        "Argument '{argument}' was used an incorrect number of times.\nExpected {expected}, but was used {}.",
        times(.used)
    )]
    IncorrectUsageCount {
        index: isize,
        argument: String,
        argument_id: ArgumentId,
        expected: String,
        used: usize,
    },

    /// A required argument never appeared.
    #[error("Required argument '{argument}' not used.")]
    RequiredArgumentNotUsed {
        index: isize,
        argument: String,
        argument_id: ArgumentId,
        command: String,
    },

    /// More than one member of an exclusive group was used.
    #[error("Multiple arguments in exclusive group '{group}' used.")]
    MultipleExclusiveArguments {
        index: isize,
        group: String,
        argument_id: ArgumentId,
    },
}

fn times(used: &usize) -> String {
    match used {
        1 => "1 time".to_string(),
        n => format!("{n} times"),
    }
}

impl ParseError {
    pub fn level(&self) -> ErrorLevel {
        match self {
            ParseError::UnmatchedToken { .. } => ErrorLevel::Warning,
            ParseError::SimilarArgument { .. } => ErrorLevel::Info,
            _ => ErrorLevel::Error,
        }
    }

    /// Local token index the error is anchored at.
    pub fn index(&self) -> isize {
        match self {
            ParseError::UnmatchedToken { index, .. }
            | ParseError::UnmatchedInNameList { index, .. }
            | ParseError::SimilarArgument { index, .. }
            | ParseError::IncorrectValueCount { index, .. }
            | ParseError::IncorrectUsageCount { index, .. }
            | ParseError::RequiredArgumentNotUsed { index, .. }
            | ParseError::MultipleExclusiveArguments { index, .. } => *index,
        }
    }

    /// The argument the error concerns, if any.
    pub fn argument(&self) -> Option<ArgumentId> {
        match self {
            ParseError::UnmatchedToken { .. } => None,
            ParseError::UnmatchedInNameList { argument_id, .. }
            | ParseError::SimilarArgument { argument_id, .. }
            | ParseError::IncorrectValueCount { argument_id, .. }
            | ParseError::IncorrectUsageCount { argument_id, .. }
            | ParseError::RequiredArgumentNotUsed { argument_id, .. }
            | ParseError::MultipleExclusiveArguments { argument_id, .. } => Some(*argument_id),
        }
    }

    pub fn render(&self, ctx: &ParseContext<'_>) -> Rendered {
        let start = ctx.absolute(self.index());
        let highlight = match self {
            ParseError::IncorrectValueCount { len, .. } => Highlight::span(start, *len),
            ParseError::IncorrectUsageCount { .. } | ParseError::RequiredArgumentNotUsed { .. } => {
                Highlight::arrow(start)
            }
            _ => Highlight::single(start),
        };
        Rendered {
            content: self.to_string(),
            highlight: Some(highlight),
        }
    }
}
