//! Error records raised while tokenizing and parsing, and their rendering.
//!
//! Records store indices local to the command level that raised them. A
//! [`TokenizeContext`] or [`ParseContext`] translates those into absolute
//! positions over the whole input when the record is rendered.

mod context;
mod custom;
mod format;
mod parse;
mod tokenize;

pub use context::{ParseContext, TokenizeContext};
pub use custom::CustomError;
pub use format::ErrorFormatter;
pub use parse::ParseError;
pub use tokenize::{TokenizeError, TokenizeErrorKind};

/// Span of the error view to highlight.
///
/// Units are tokens for parse errors and characters for tokenize errors.
/// `start` is absolute; `-1` addresses the synthetic root-name token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Highlight {
    pub start: isize,
    /// Number of units after `start` that are also highlighted.
    pub offset: usize,
    /// Draw one arrow per unit instead of underlining the whole span.
    pub per_unit: bool,
}

impl Highlight {
    pub fn single(start: isize) -> Self {
        Self {
            start,
            offset: 0,
            per_unit: false,
        }
    }

    pub fn span(start: isize, offset: usize) -> Self {
        Self {
            start,
            offset,
            per_unit: false,
        }
    }

    pub fn arrow(start: isize) -> Self {
        Self {
            start,
            offset: 0,
            per_unit: true,
        }
    }
}

/// Message and highlight produced by an error record, ready for formatting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub content: String,
    pub highlight: Option<Highlight>,
}
