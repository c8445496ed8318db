//! Token types produced by the tokenizer.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Classification of a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TokenKind {
    /// A prefixed argument name, such as `--what`.
    Name,
    /// A run of short argument names behind one prefix, such as `-vvc`.
    NameList,
    /// A plain value.
    Value,
    /// Opening tuple delimiter.
    TupleStart,
    /// Closing tuple delimiter.
    TupleEnd,
    /// A sub-command name.
    Command,
    /// Everything after a standalone `-- `, unparsed.
    ForwardValue,
}

impl TokenKind {
    pub fn is_value(self) -> bool {
        matches!(self, TokenKind::Value)
    }
}

/// A classified unit of input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub kind: TokenKind,
    pub contents: String,
}

impl Token {
    pub fn new(kind: TokenKind, contents: impl Into<String>) -> Self {
        Self {
            kind,
            contents: contents.into(),
        }
    }

    /// Text used when the token is shown in an error view.
    ///
    /// Values that would not survive re-tokenizing (empty, or containing
    /// whitespace) are quoted.
    pub fn display_text(&self) -> String {
        match self.kind {
            TokenKind::Value
                if self.contents.is_empty() || self.contents.contains(char::is_whitespace) =>
            {
                format!("'{}'", self.contents)
            }
            TokenKind::ForwardValue => format!("-- {}", self.contents),
            _ => self.contents.clone(),
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}({})", self.kind, self.contents)
    }
}
