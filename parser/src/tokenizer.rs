//! Splits raw input into classified tokens, one command level at a time.
//!
//! The tokenizer scans character by character. Quotes group characters
//! into a single value, the configured tuple delimiters bracket a list of
//! values, a backslash escapes the next character, and `-- ` forwards the
//! rest of the input untouched. Each finished word is classified against the
//! current command: an argument name, a run of short names, a sub-command,
//! or a plain value. Once a sub-command is found, the remaining input is
//! handed to a tokenizer for that sub-command and this level stops.

use argtree_core::{CommandId, CommandTree, PrefixChar};
use tracing::{debug, trace};

use crate::UsageError;
use crate::config::ParserConfig;
use crate::error::{TokenizeError, TokenizeErrorKind};
use crate::state::Session;
use crate::token::{Token, TokenKind};

pub(crate) struct Tokenizer<'a> {
    tree: &'a CommandTree,
    config: &'a ParserConfig,
    command: CommandId,
}

impl<'a> Tokenizer<'a> {
    pub fn new(tree: &'a CommandTree, config: &'a ParserConfig, command: CommandId) -> Self {
        Self {
            tree,
            config,
            command,
        }
    }

    /// Tokenizes `input` for this level, then recursively for any
    /// sub-command found in it.
    ///
    /// `char_offset` and `token_offset` place this level within the whole
    /// input.
    pub fn tokenize(
        &self,
        session: &mut Session,
        input: &str,
        char_offset: usize,
        token_offset: usize,
    ) -> Result<(), UsageError> {
        if session.level(self.command).tokenizer.finished {
            return Err(UsageError::AlreadyTokenized(
                self.tree.command(self.command).name().to_string(),
            ));
        }

        let chars: Vec<char> = input.chars().collect();
        let mut scan = Scan::new(self, &chars);
        scan.run();
        let Scan {
            tokens,
            errors,
            sub_command,
            ..
        } = scan;

        debug!(
            command = self.tree.command(self.command).name(),
            tokens = tokens.len(),
            errors = errors.len(),
            "tokenized level"
        );

        let token_count = tokens.len();
        let state = &mut session.level_mut(self.command).tokenizer;
        state.finished = true;
        state.tokens = tokens;
        state.errors = errors;
        state.char_offset = char_offset;
        state.token_offset = token_offset;
        state.sub_command = sub_command.map(|(id, _)| id);

        if let Some((sub, at)) = sub_command {
            let rest: String = chars[at..].iter().collect();
            debug!(
                sub_command = self.tree.command(sub).name(),
                char_offset = char_offset + at,
                "forwarding input to sub-command"
            );
            Tokenizer::new(self.tree, self.config, sub).tokenize(
                session,
                &rest,
                char_offset + at,
                token_offset + token_count,
            )?;
        }
        Ok(())
    }

    fn classify(&self, word: &str, in_tuple: bool) -> TokenKind {
        if in_tuple {
            return TokenKind::Value;
        }
        if self.tree.find_argument(self.command, word).is_some() {
            TokenKind::Name
        } else if self.is_name_list(word) {
            TokenKind::NameList
        } else if self.tree.find_sub_command(self.command, word).is_some() {
            TokenKind::Command
        } else {
            TokenKind::Value
        }
    }

    /// A prefix character followed by one or more short argument names.
    ///
    /// The prefix of each argument is not checked here; the parser reports
    /// mismatches.
    fn is_name_list(&self, word: &str) -> bool {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            return false;
        };
        let rest = chars.as_str();
        PrefixChar::is_valid(first)
            && !rest.is_empty()
            && rest
                .chars()
                .all(|c| self.tree.find_short_argument(self.command, c, None).is_some())
    }
}

/// Scanner state for a single level.
struct Scan<'t, 'c> {
    tokenizer: &'t Tokenizer<'t>,
    chars: &'c [char],
    i: usize,
    word: String,
    tokens: Vec<Token>,
    errors: Vec<TokenizeError>,
    /// Character index of the open tuple delimiter.
    tuple_start: Option<usize>,
    /// Open quote character and its index.
    string_start: Option<(char, usize)>,
    /// Sub-command found, and the index its input starts at.
    sub_command: Option<(CommandId, usize)>,
}

impl<'t, 'c> Scan<'t, 'c> {
    fn new(tokenizer: &'t Tokenizer<'t>, chars: &'c [char]) -> Self {
        Self {
            tokenizer,
            chars,
            i: 0,
            word: String::new(),
            tokens: Vec::new(),
            errors: Vec::new(),
            tuple_start: None,
            string_start: None,
            sub_command: None,
        }
    }

    fn run(&mut self) {
        let tuple_chars = self.tokenizer.config.tuple_chars;
        let (open, close) = (tuple_chars.open(), tuple_chars.close());

        while self.i < self.chars.len() {
            let c = self.chars[self.i];

            if c == '\\' {
                match self.chars.get(self.i + 1) {
                    Some(&escaped) => {
                        self.word.push(escaped);
                        self.i += 2;
                    }
                    None => {
                        self.word.push(c);
                        self.i += 1;
                    }
                }
                continue;
            }

            if let Some((quote, _)) = self.string_start {
                if c == quote {
                    self.string_start = None;
                    let contents = std::mem::take(&mut self.word);
                    self.push(TokenKind::Value, contents);
                    if !self.space_after(self.i, close) {
                        return;
                    }
                } else {
                    self.word.push(c);
                }
                self.i += 1;
                continue;
            }

            if c == '"' || c == '\'' {
                self.string_start = Some((c, self.i));
                self.i += 1;
                continue;
            }

            if c == open {
                if self.tuple_start.is_some() {
                    self.fail(TokenizeErrorKind::TupleAlreadyOpen, self.tokens.len(), self.i, 1);
                    return;
                }
                if self.flush_word(self.i) {
                    return;
                }
                self.push(TokenKind::TupleStart, open.to_string());
                self.tuple_start = Some(self.i);
                self.i += 1;
                continue;
            }

            if c == close {
                if self.tuple_start.is_none() {
                    self.fail(TokenizeErrorKind::UnexpectedTupleClose, self.tokens.len(), self.i, 1);
                    return;
                }
                self.flush_word(self.i);
                self.push(TokenKind::TupleEnd, close.to_string());
                self.tuple_start = None;
                if !self.space_after(self.i, close) {
                    return;
                }
                self.i += 1;
                continue;
            }

            if self.tuple_start.is_none() && self.word.is_empty() && self.forward_marker_at(self.i) {
                let rest: String = self.chars[self.i + 3..].iter().collect();
                self.push(TokenKind::ForwardValue, rest);
                self.i = self.chars.len();
                return;
            }

            if c.is_whitespace() {
                if self.flush_word(self.i) {
                    return;
                }
                self.i += 1;
                continue;
            }

            if c == '=' && self.tuple_start.is_none() {
                let kind = self.tokenizer.classify(&self.word, false);
                if matches!(kind, TokenKind::Name | TokenKind::NameList) {
                    self.flush_word(self.i);
                    self.i += 1;
                    continue;
                }
            }

            self.word.push(c);
            self.i += 1;
        }

        let end = self.chars.len();
        if self.string_start.is_some() {
            let contents = std::mem::take(&mut self.word);
            self.push(TokenKind::Value, contents);
        } else if self.flush_word(end) {
            return;
        }

        let last_token = self.tokens.len().saturating_sub(1);
        if let Some(start) = self.tuple_start {
            self.fail(TokenizeErrorKind::TupleNotClosed, last_token, start, 1);
        }
        if let Some((_, start)) = self.string_start {
            self.fail(TokenizeErrorKind::StringNotClosed, last_token, start, 1);
        }
    }

    /// Pushes the pending word as a classified token.
    ///
    /// Returns `true` if the word names a sub-command, in which case the
    /// rest of the input from `end` belongs to that sub-command.
    fn flush_word(&mut self, end: usize) -> bool {
        if self.word.is_empty() {
            return false;
        }
        let word = std::mem::take(&mut self.word);
        let kind = self.tokenizer.classify(&word, self.tuple_start.is_some());
        if kind == TokenKind::Command {
            let tree = self.tokenizer.tree;
            if let Some(sub) = tree.find_sub_command(self.tokenizer.command, &word) {
                self.push(kind, word);
                self.sub_command = Some((sub, end));
                return true;
            }
        }
        self.push(kind, word);
        false
    }

    fn push(&mut self, kind: TokenKind, contents: String) {
        trace!(?kind, contents = %contents, "token");
        self.tokens.push(Token::new(kind, contents));
    }

    fn fail(&mut self, kind: TokenizeErrorKind, token_index: usize, char_index: usize, len: usize) {
        debug!(?kind, char_index, "tokenize error");
        self.errors
            .push(TokenizeError::new(kind, token_index, char_index, len));
    }

    /// Checks that a closing quote or tuple delimiter at `at` is followed by
    /// whitespace, a tuple close, or the end of input. Records an error
    /// otherwise.
    fn space_after(&mut self, at: usize, close: char) -> bool {
        match self.chars.get(at + 1) {
            None => true,
            Some(&next) if next.is_whitespace() || next == close => true,
            Some(_) => {
                let last = self.tokens.len().saturating_sub(1);
                self.fail(TokenizeErrorKind::SpaceRequired, last, at, 2);
                false
            }
        }
    }

    fn forward_marker_at(&self, at: usize) -> bool {
        self.chars.get(at..at + 3) == Some(&['-', '-', ' '][..])
    }
}

#[cfg(test)]
mod tests {
    use argtree_core::{Argument, BoolType, Command, CounterType, IntType, StringType};

    use super::*;
    use crate::config::TupleChars;

    fn tree() -> CommandTree {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("what", StringType));
        tree.add_argument(root, Argument::new("v", CounterType));
        tree.add_argument(root, Argument::new("q", BoolType));
        let sub = tree.add_sub_command(root, Command::new("sub"));
        tree.add_argument(sub, Argument::new("port", IntType::new()));
        tree
    }

    fn tokenize_with(tree: &CommandTree, config: &ParserConfig, input: &str) -> Session {
        let mut session = Session::new(tree, input);
        Tokenizer::new(tree, config, tree.root())
            .tokenize(&mut session, input, 0, 0)
            .unwrap();
        session
    }

    fn tokenize(tree: &CommandTree, input: &str) -> Session {
        tokenize_with(tree, &ParserConfig::default(), input)
    }

    fn kinds(session: &Session, id: CommandId) -> Vec<(TokenKind, String)> {
        session
            .level(id)
            .tokenizer
            .tokens
            .iter()
            .map(|t| (t.kind, t.contents.clone()))
            .collect()
    }

    fn errors(session: &Session, id: CommandId) -> Vec<TokenizeErrorKind> {
        session.level(id).tokenizer.errors.iter().map(|e| e.kind).collect()
    }

    #[test]
    fn test_classifies_names_values_and_lists() {
        let tree = tree();
        let session = tokenize(&tree, "--what hello -vvq plain");
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Name, "--what".to_string()),
                (TokenKind::Value, "hello".to_string()),
                (TokenKind::NameList, "-vvq".to_string()),
                (TokenKind::Value, "plain".to_string()),
            ]
        );
    }

    #[test]
    fn test_quoted_string_keeps_whitespace() {
        let tree = tree();
        let session = tokenize(&tree, "--what 'hello world' \"\"");
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Name, "--what".to_string()),
                (TokenKind::Value, "hello world".to_string()),
                (TokenKind::Value, String::new()),
            ]
        );
    }

    #[test]
    fn test_escapes() {
        let tree = tree();
        let session = tokenize(&tree, r#"a\ b "x\"y" end\"#);
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Value, "a b".to_string()),
                (TokenKind::Value, "x\"y".to_string()),
                (TokenKind::Value, "end\\".to_string()),
            ]
        );
    }

    #[test]
    fn test_equals_splits_name() {
        let tree = tree();
        let session = tokenize(&tree, "--what=hi key=value");
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Name, "--what".to_string()),
                (TokenKind::Value, "hi".to_string()),
                (TokenKind::Value, "key=value".to_string()),
            ]
        );
    }

    #[test]
    fn test_tuple_values() {
        let tree = tree();
        let session = tokenize(&tree, "--what [ a --what 'b c' ]");
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Name, "--what".to_string()),
                (TokenKind::TupleStart, "[".to_string()),
                (TokenKind::Value, "a".to_string()),
                (TokenKind::Value, "--what".to_string()),
                (TokenKind::Value, "b c".to_string()),
                (TokenKind::TupleEnd, "]".to_string()),
            ]
        );
    }

    #[test]
    fn test_custom_tuple_chars() {
        let tree = tree();
        let config = ParserConfig::default().with_tuple_chars(TupleChars::Parenthesis);
        let session = tokenize_with(&tree, &config, "--what (a b)");
        assert_eq!(
            kinds(&session, tree.root())
                .into_iter()
                .map(|(k, _)| k)
                .collect::<Vec<_>>(),
            vec![
                TokenKind::Name,
                TokenKind::TupleStart,
                TokenKind::Value,
                TokenKind::Value,
                TokenKind::TupleEnd,
            ]
        );
    }

    #[test]
    fn test_forward_value() {
        let tree = tree();
        let session = tokenize(&tree, "--what x -- rest 'of' it");
        assert_eq!(
            kinds(&session, tree.root()).last(),
            Some(&(TokenKind::ForwardValue, "rest 'of' it".to_string()))
        );
    }

    #[test]
    fn test_sub_command_takes_remainder() {
        let tree = tree();
        let sub = tree.find_sub_command(tree.root(), "sub").unwrap();
        let session = tokenize(&tree, "--what x sub --port 80");
        assert_eq!(
            kinds(&session, tree.root()),
            vec![
                (TokenKind::Name, "--what".to_string()),
                (TokenKind::Value, "x".to_string()),
                (TokenKind::Command, "sub".to_string()),
            ]
        );
        assert_eq!(
            kinds(&session, sub),
            vec![
                (TokenKind::Name, "--port".to_string()),
                (TokenKind::Value, "80".to_string()),
            ]
        );
        let sub_state = &session.level(sub).tokenizer;
        assert_eq!(sub_state.token_offset, 3);
        assert_eq!(sub_state.char_offset, 12);
        assert_eq!(session.level(tree.root()).tokenizer.sub_command, Some(sub));
    }

    #[test]
    fn test_sub_command_at_end_is_tokenized_empty() {
        let tree = tree();
        let sub = tree.find_sub_command(tree.root(), "sub").unwrap();
        let session = tokenize(&tree, "sub");
        assert!(session.level(sub).tokenizer.finished);
        assert!(session.level(sub).tokenizer.tokens.is_empty());
    }

    #[test]
    fn test_sub_command_name_inside_tuple_is_value() {
        let tree = tree();
        let session = tokenize(&tree, "--what [sub]");
        assert_eq!(session.level(tree.root()).tokenizer.sub_command, None);
        assert_eq!(kinds(&session, tree.root())[2].0, TokenKind::Value);
    }

    #[test]
    fn test_space_required_after_tuple() {
        let tree = tree();
        let session = tokenize(&tree, "[foo]--what 1");
        let errs = &session.level(tree.root()).tokenizer.errors;
        assert_eq!(errors(&session, tree.root()), vec![TokenizeErrorKind::SpaceRequired]);
        assert_eq!(errs[0].char_index, 4);
        assert_eq!(errs[0].len, 2);
    }

    #[test]
    fn test_space_required_after_string() {
        let tree = tree();
        let session = tokenize(&tree, "'a'b");
        assert_eq!(errors(&session, tree.root()), vec![TokenizeErrorKind::SpaceRequired]);
    }

    #[test]
    fn test_tuple_errors() {
        let tree = tree();
        assert_eq!(
            errors(&tokenize(&tree, "[ a [ b ] ]"), tree.root()),
            vec![TokenizeErrorKind::TupleAlreadyOpen]
        );
        assert_eq!(
            errors(&tokenize(&tree, "a ]"), tree.root()),
            vec![TokenizeErrorKind::UnexpectedTupleClose]
        );
        assert_eq!(
            errors(&tokenize(&tree, "[ a 'b"), tree.root()),
            vec![
                TokenizeErrorKind::TupleNotClosed,
                TokenizeErrorKind::StringNotClosed
            ]
        );
    }

    #[test]
    fn test_unclosed_string_keeps_contents() {
        let tree = tree();
        let session = tokenize(&tree, "--what 'abc");
        assert_eq!(
            kinds(&session, tree.root())[1],
            (TokenKind::Value, "abc".to_string())
        );
        let err = &session.level(tree.root()).tokenizer.errors[0];
        assert_eq!(err.kind, TokenizeErrorKind::StringNotClosed);
        assert_eq!(err.char_index, 7);
    }

    #[test]
    fn test_tokenize_twice_is_rejected() {
        let tree = tree();
        let config = ParserConfig::default();
        let mut session = Session::new(&tree, "x");
        let tokenizer = Tokenizer::new(&tree, &config, tree.root());
        tokenizer.tokenize(&mut session, "x", 0, 0).unwrap();
        assert!(matches!(
            tokenizer.tokenize(&mut session, "x", 0, 0),
            Err(UsageError::AlreadyTokenized(_))
        ));
    }
}
