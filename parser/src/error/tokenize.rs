use argtree_core::ErrorLevel;
use thiserror::Error;

use super::{Highlight, Rendered, TokenizeContext};

/// Lexical problems found while splitting input into tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TokenizeErrorKind {
    #[error("Tuple already open.")]
    TupleAlreadyOpen,
    #[error("Unexpected tuple close.")]
    UnexpectedTupleClose,
    #[error("Tuple not closed.")]
    TupleNotClosed,
    #[error("String not closed.")]
    StringNotClosed,
    #[error("Space required between these characters.")]
    SpaceRequired,
}

/// A tokenize error, positioned at a character of the level's input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenizeError {
    pub kind: TokenizeErrorKind,
    /// Token position used to order this error among parse errors.
    pub token_index: usize,
    /// Character position within the level's input.
    pub char_index: usize,
    /// Number of characters to highlight.
    pub len: usize,
}

impl TokenizeError {
    pub fn new(kind: TokenizeErrorKind, token_index: usize, char_index: usize, len: usize) -> Self {
        Self {
            kind,
            token_index,
            char_index,
            len,
        }
    }

    pub fn level(&self) -> ErrorLevel {
        ErrorLevel::Error
    }

    pub fn render(&self, ctx: &TokenizeContext<'_>) -> Rendered {
        let start = ctx.absolute_char(self.char_index) as isize;
        Rendered {
            content: self.kind.to_string(),
            highlight: Some(Highlight::span(start, self.len.saturating_sub(1))),
        }
    }
}
