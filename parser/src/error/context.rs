use argtree_core::CommandTree;

use crate::token::{Token, TokenKind};

/// Positions a tokenize error within the full input.
#[derive(Debug, Clone, Copy)]
pub struct TokenizeContext<'a> {
    input: &'a str,
    root_name: &'a str,
    char_offset: usize,
    token_offset: usize,
}

impl<'a> TokenizeContext<'a> {
    pub fn new(input: &'a str, root_name: &'a str, char_offset: usize, token_offset: usize) -> Self {
        Self {
            input,
            root_name,
            char_offset,
            token_offset,
        }
    }

    /// Full input given to the root command.
    pub fn input(&self) -> &'a str {
        self.input
    }

    pub fn root_name(&self) -> &'a str {
        self.root_name
    }

    pub fn absolute_char(&self, local: usize) -> usize {
        self.char_offset + local
    }

    pub fn absolute_token(&self, local: usize) -> usize {
        self.token_offset + local
    }
}

/// Positions a parse or type error within the tokens of every level.
#[derive(Debug)]
pub struct ParseContext<'a> {
    nesting_offset: usize,
    tokens: &'a [Token],
    /// Synthetic token carrying the root command's name.
    root: Token,
}

impl<'a> ParseContext<'a> {
    pub fn new(tree: &CommandTree, nesting_offset: usize, tokens: &'a [Token]) -> Self {
        let root = Token::new(TokenKind::Command, tree.command(tree.root()).name());
        Self {
            nesting_offset,
            tokens,
            root,
        }
    }

    /// Converts a level-local token index into an absolute one.
    pub fn absolute(&self, local: isize) -> isize {
        self.nesting_offset as isize + local
    }

    /// Tokens of every tokenized level, root first.
    pub fn tokens(&self) -> &'a [Token] {
        self.tokens
    }

    /// Token at an absolute index, clamped into the token list.
    ///
    /// Negative indices and an empty list yield the root token.
    pub fn token_at(&self, absolute: isize) -> &Token {
        if absolute < 0 || self.tokens.is_empty() {
            return &self.root;
        }
        let index = (absolute as usize).min(self.tokens.len() - 1);
        &self.tokens[index]
    }
}
