//! Mutable state of one parse run.
//!
//! The command tree never changes while parsing; everything a run records
//! lives in a [`Session`] indexed by the tree's arena ids. Resetting a
//! parser is dropping its session.

use argtree_core::{ArgumentId, CommandId, CommandTree, GroupId, Value};

use crate::error::{CustomError, ParseError, TokenizeError};
use crate::token::Token;

#[derive(Debug, Default)]
pub(crate) struct Session {
    pub input: String,
    pub levels: Vec<LevelState>,
    pub arguments: Vec<ArgumentState>,
    pub groups: Vec<GroupState>,
}

impl Session {
    pub fn new(tree: &CommandTree, input: &str) -> Self {
        Self {
            input: input.to_string(),
            levels: (0..tree.command_count()).map(|_| LevelState::default()).collect(),
            arguments: vec![ArgumentState::default(); tree.argument_count()],
            groups: vec![GroupState::default(); tree.group_count()],
        }
    }

    pub fn level(&self, id: CommandId) -> &LevelState {
        &self.levels[id.index()]
    }

    pub fn level_mut(&mut self, id: CommandId) -> &mut LevelState {
        &mut self.levels[id.index()]
    }

    pub fn argument(&self, id: ArgumentId) -> &ArgumentState {
        &self.arguments[id.index()]
    }

    pub fn argument_mut(&mut self, id: ArgumentId) -> &mut ArgumentState {
        &mut self.arguments[id.index()]
    }

    pub fn group(&self, id: GroupId) -> &GroupState {
        &self.groups[id.index()]
    }

    pub fn group_mut(&mut self, id: GroupId) -> &mut GroupState {
        &mut self.groups[id.index()]
    }

    /// Tokenized commands from the root down, following sub-command links.
    pub fn tokenized_chain(&self, tree: &CommandTree) -> Vec<CommandId> {
        let mut chain = Vec::new();
        let mut current = Some(tree.root());
        while let Some(id) = current {
            let level = self.level(id);
            if !level.tokenizer.finished {
                break;
            }
            chain.push(id);
            current = level.tokenizer.sub_command;
        }
        chain
    }

    /// Tokens of every tokenized level, concatenated root first.
    pub fn all_tokens(&self, tree: &CommandTree) -> Vec<Token> {
        self.tokenized_chain(tree)
            .into_iter()
            .flat_map(|id| self.level(id).tokenizer.tokens.iter().cloned())
            .collect()
    }
}

#[derive(Debug, Default)]
pub(crate) struct LevelState {
    pub tokenizer: TokenizerState,
    pub parser: ParserState,
}

#[derive(Debug, Default)]
pub(crate) struct TokenizerState {
    pub finished: bool,
    pub tokens: Vec<Token>,
    pub errors: Vec<TokenizeError>,
    /// Absolute character position of this level's input.
    pub char_offset: usize,
    /// Absolute token position of this level's first token.
    pub token_offset: usize,
    pub sub_command: Option<CommandId>,
}

impl TokenizerState {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Default)]
pub(crate) struct ParserState {
    pub parsed: bool,
    pub nesting_offset: usize,
    pub errors: Vec<ParseError>,
    pub custom_errors: Vec<CustomError>,
    pub forward_value: Option<String>,
}

/// Where the values of an argument's latest use came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ParseSnapshot {
    /// Absolute index of the first value, the tuple start, or the name list.
    pub token_index: usize,
    pub value_count: usize,
    pub in_tuple: bool,
    pub positional: bool,
    /// The single value was the remainder of a name list token.
    pub from_name_list: bool,
}

impl ParseSnapshot {
    /// Absolute token index of the `n`th value of this use.
    pub fn value_token(&self, n: usize) -> usize {
        if self.from_name_list {
            self.token_index
        } else if self.in_tuple {
            self.token_index + 1 + n
        } else {
            self.token_index + n
        }
    }
}

#[derive(Debug, Clone, Default)]
pub(crate) struct ArgumentState {
    pub usage_count: usize,
    pub value: Option<Value>,
    /// Local token index of the first and latest use.
    pub first_use: Option<usize>,
    pub last_use: Option<usize>,
    pub snapshot: Option<ParseSnapshot>,
    /// Final value, computed once.
    pub finished: Option<Option<Value>>,
}

#[derive(Debug, Clone, Default)]
pub(crate) struct GroupState {
    /// First member argument used, directly or through a sub-group.
    pub used_by: Option<ArgumentId>,
}
