//! Matches a level's tokens against its command's arguments.
//!
//! Each command level is parsed by its own [`Parser`]. Argument names bind
//! the values that follow them, name lists bind several short arguments at
//! once, plain values fill positional arguments in declaration order, and a
//! sub-command token hands control to the sub-command's parser. After all
//! levels have run, [`finish_level`] turns recorded uses into final values
//! and raises the errors that depend on the whole run (required arguments,
//! exclusive groups, usage counts).

use argtree_core::{ArgumentId, CommandId, CommandTree, PrefixChar, TypeErrors, Value};
use tracing::{debug, trace};

use crate::error::{CustomError, ParseError};
use crate::state::{ParseSnapshot, Session};
use crate::token::{Token, TokenKind};

pub(crate) struct Parser<'a> {
    tree: &'a CommandTree,
    command: CommandId,
    tokens: Vec<Token>,
    current: usize,
    nesting_offset: usize,
    positional: Vec<ArgumentId>,
    next_positional: usize,
    positional_enabled: bool,
    errors: Vec<ParseError>,
    custom_errors: Vec<CustomError>,
    forward_value: Option<String>,
}

impl<'a> Parser<'a> {
    pub fn new(tree: &'a CommandTree, command: CommandId) -> Self {
        Self {
            tree,
            command,
            tokens: Vec::new(),
            current: 0,
            nesting_offset: 0,
            positional: tree.positional_arguments(command),
            next_positional: 0,
            positional_enabled: true,
            errors: Vec::new(),
            custom_errors: Vec::new(),
            forward_value: None,
        }
    }

    /// Parses this level, and through it every sub-command level below.
    pub fn parse(&mut self, session: &mut Session, parent: Option<&Parser<'_>>) {
        self.tokens = session.level(self.command).tokenizer.tokens.clone();
        self.nesting_offset = parent.map_or(0, |p| p.nesting_offset + p.current);

        while self.current < self.tokens.len() {
            let token = self.tokens[self.current].clone();
            match token.kind {
                TokenKind::Name => {
                    self.positional_enabled = false;
                    self.current += 1;
                    match self.tree.find_argument(self.command, &token.contents) {
                        Some(arg) => self.consume(session, arg, false),
                        None => self.unmatched(&token, self.current - 1),
                    }
                }
                TokenKind::NameList => {
                    self.positional_enabled = false;
                    self.name_list(session, &token.contents);
                }
                TokenKind::Value | TokenKind::TupleStart if self.positional_available() => {
                    let arg = self.positional[self.next_positional];
                    self.next_positional += 1;
                    self.consume(session, arg, true);
                }
                TokenKind::Command => {
                    self.current += 1;
                    self.parse_sub_command(session);
                    break;
                }
                TokenKind::ForwardValue => {
                    self.forward_value = Some(token.contents);
                    self.current += 1;
                }
                _ => {
                    self.unmatched(&token, self.current);
                    self.current += 1;
                }
            }
        }

        self.store(session);
    }

    fn positional_available(&self) -> bool {
        self.positional_enabled && self.next_positional < self.positional.len()
    }

    fn parse_sub_command(&mut self, session: &mut Session) {
        let Some(sub) = session.level(self.command).tokenizer.sub_command else {
            return;
        };
        if session.level(sub).tokenizer.has_errors() {
            debug!(
                command = self.tree.command(sub).name(),
                "skipping parse of level with tokenize errors"
            );
            return;
        }
        Parser::new(self.tree, sub).parse(session, Some(&*self));
    }

    fn store(&mut self, session: &mut Session) {
        debug!(
            command = self.tree.command(self.command).name(),
            nesting_offset = self.nesting_offset,
            errors = self.errors.len(),
            custom_errors = self.custom_errors.len(),
            "parsed level"
        );
        let state = &mut session.level_mut(self.command).parser;
        state.parsed = true;
        state.nesting_offset = self.nesting_offset;
        state.errors.append(&mut self.errors);
        state.custom_errors.append(&mut self.custom_errors);
        state.forward_value = self.forward_value.take();
    }

    fn absolute(&self, local: usize) -> usize {
        self.nesting_offset + local
    }

    /// Collects the values for one use of `arg`, starting at the current
    /// token, and records the use if the count fits the argument's range.
    fn consume(&mut self, session: &mut Session, arg: ArgumentId, positional: bool) {
        let range = self.tree.argument(arg).arg_type().value_count();

        if range.is_zero() {
            let name_index = self.current.saturating_sub(1);
            let snapshot = ParseSnapshot {
                token_index: self.absolute(name_index),
                value_count: 0,
                in_tuple: false,
                positional,
                from_name_list: false,
            };
            self.record_use(session, arg, &[], snapshot);
            return;
        }

        let start = self.current;
        let in_tuple = self.tokens.get(start).map(|t| t.kind) == Some(TokenKind::TupleStart);
        let mut values = Vec::new();
        if in_tuple {
            let mut i = start + 1;
            while i < self.tokens.len() && self.tokens[i].kind != TokenKind::TupleEnd {
                values.push(self.tokens[i].contents.clone());
                i += 1;
            }
            self.current = (i + 1).min(self.tokens.len());
        } else {
            let max = range.max_or_unbounded();
            let mut i = start;
            while i < self.tokens.len() && self.tokens[i].kind.is_value() && values.len() < max {
                values.push(self.tokens[i].contents.clone());
                i += 1;
            }
            self.current = i;
        }

        let count = values.len();
        if !range.contains(count) {
            debug!(
                argument = self.tree.argument(arg).name(),
                received = count,
                expected = %range,
                "value count rejected"
            );
            let (index, len) = if in_tuple {
                (start, count + 1)
            } else if count == 0 {
                (start.saturating_sub(1), 0)
            } else {
                (start, count - 1)
            };
            self.errors.push(ParseError::IncorrectValueCount {
                index: index as isize,
                len,
                argument: self.tree.argument(arg).name().to_string(),
                argument_id: arg,
                expected: range.describe("value"),
                received: count,
            });
            return;
        }

        let snapshot = ParseSnapshot {
            token_index: self.absolute(start),
            value_count: count,
            in_tuple,
            positional,
            from_name_list: false,
        };
        self.record_use(session, arg, &values, snapshot);
    }

    /// Binds each short name of a name list token.
    ///
    /// Zero-value arguments are recorded as they are met. The first argument
    /// that takes values ends the list: if it is the last character, it
    /// consumes the following tokens, otherwise the rest of the list is its
    /// single value.
    fn name_list(&mut self, session: &mut Session, contents: &str) {
        let list_index = self.current;
        self.current += 1;

        let mut chars = contents.chars();
        let prefix = chars.next().and_then(PrefixChar::from_char);
        let names: Vec<char> = chars.collect();
        let mut previous: Option<ArgumentId> = None;

        for (k, &c) in names.iter().enumerate() {
            let Some(arg) = self.tree.find_short_argument(self.command, c, prefix) else {
                match previous {
                    Some(prev) => self.errors.push(ParseError::UnmatchedInNameList {
                        index: list_index as isize,
                        argument: self.tree.argument(prev).name().to_string(),
                        argument_id: prev,
                        rest: names[k..].iter().collect(),
                    }),
                    None => self.errors.push(ParseError::UnmatchedToken {
                        index: list_index as isize,
                        contents: contents.to_string(),
                    }),
                }
                return;
            };

            let range = self.tree.argument(arg).arg_type().value_count();
            if range.is_zero() {
                let snapshot = ParseSnapshot {
                    token_index: self.absolute(list_index),
                    value_count: 0,
                    in_tuple: false,
                    positional: false,
                    from_name_list: true,
                };
                self.record_use(session, arg, &[], snapshot);
                previous = Some(arg);
                continue;
            }

            let rest: String = names[k + 1..].iter().collect();
            if rest.is_empty() {
                self.consume(session, arg, false);
            } else if !range.contains(1) {
                self.errors.push(ParseError::IncorrectValueCount {
                    index: list_index as isize,
                    len: 0,
                    argument: self.tree.argument(arg).name().to_string(),
                    argument_id: arg,
                    expected: range.describe("value"),
                    received: 1,
                });
            } else {
                let snapshot = ParseSnapshot {
                    token_index: self.absolute(list_index),
                    value_count: 1,
                    in_tuple: false,
                    positional: false,
                    from_name_list: true,
                };
                self.record_use(session, arg, &[rest], snapshot);
            }
            return;
        }
    }

    /// Records one successful use of `arg` and runs its type conversion.
    fn record_use(&mut self, session: &mut Session, arg: ArgumentId, values: &[String], snapshot: ParseSnapshot) {
        let argument = self.tree.argument(arg);
        let local = snapshot.token_index - self.nesting_offset;
        trace!(
            argument = argument.name(),
            values = snapshot.value_count,
            in_tuple = snapshot.in_tuple,
            positional = snapshot.positional,
            "argument used"
        );

        let state = session.argument_mut(arg);
        state.usage_count += 1;
        state.first_use.get_or_insert(local);
        state.last_use = Some(local);
        state.snapshot = Some(snapshot);
        let previous = state.value.take();

        for group in self.tree.group_ancestry(arg) {
            session.group_mut(group).used_by.get_or_insert(arg);
        }

        let mut type_errors = TypeErrors::new();
        let parsed = argument
            .arg_type()
            .parse(values, previous.as_ref(), &mut type_errors);
        session.argument_mut(arg).value = parsed.or(previous);

        for error in type_errors.into_vec() {
            let absolute = snapshot.value_token(error.value_index);
            self.custom_errors.push(CustomError {
                message: error.message,
                level: error.level,
                index: absolute as isize - self.nesting_offset as isize,
                argument: arg,
            });
        }
    }

    fn unmatched(&mut self, token: &Token, index: usize) {
        self.errors.push(ParseError::UnmatchedToken {
            index: index as isize,
            contents: token.contents.clone(),
        });
        if !token.kind.is_value() {
            return;
        }
        if let Some((arg, expected)) = self.similar_argument(&token.contents) {
            self.errors.push(ParseError::SimilarArgument {
                index: index as isize,
                argument_id: arg,
                expected: expected.as_char(),
            });
        }
    }

    /// An argument whose name appears behind the wrong prefix character.
    fn similar_argument(&self, contents: &str) -> Option<(ArgumentId, PrefixChar)> {
        let mut chars = contents.chars();
        let first = chars.next()?;
        let given = PrefixChar::from_char(first)?;
        let rest = chars.as_str();
        let name = rest.strip_prefix(first).unwrap_or(rest);
        let arg = self.tree.find_argument_by_name(self.command, name)?;
        let expected = self.tree.argument(arg).prefix();
        (expected != given).then_some((arg, expected))
    }
}

/// Finalizes every argument of a parsed level.
pub(crate) fn finish_level(tree: &CommandTree, session: &mut Session, command: CommandId) {
    for &arg in tree.command(command).arguments() {
        finish_argument(tree, session, arg);
    }
}

/// Computes the final value of `arg`, raising errors the first time only.
fn finish_argument(tree: &CommandTree, session: &mut Session, arg: ArgumentId) -> Option<Value> {
    if let Some(done) = &session.argument(arg).finished {
        return done.clone();
    }

    let argument = tree.argument(arg);
    let command = argument.command();
    let state = session.argument(arg).clone();
    let mut errors = Vec::new();

    let value = if state.usage_count == 0 {
        if argument.is_required() && !unique_used_elsewhere(tree, session, arg) {
            let token_count = session.level(command).tokenizer.tokens.len() as isize;
            errors.push(ParseError::RequiredArgumentNotUsed {
                index: token_count - 1,
                argument: argument.name().to_string(),
                argument_id: arg,
                command: tree.command(command).name().to_string(),
            });
            None
        } else {
            argument.default_value()
        }
    } else if let Some(group) = exclusive_conflict(tree, session, arg) {
        errors.push(ParseError::MultipleExclusiveArguments {
            index: state.first_use.unwrap_or_default() as isize,
            group: tree.group(group).name().to_string(),
            argument_id: arg,
        });
        argument.default_value()
    } else if !argument.arg_type().usage_count().contains(state.usage_count) {
        errors.push(ParseError::IncorrectUsageCount {
            index: state.last_use.unwrap_or_default() as isize,
            argument: argument.name().to_string(),
            argument_id: arg,
            expected: argument.arg_type().usage_count().describe("usage"),
            used: state.usage_count,
        });
        None
    } else {
        state.value.or_else(|| argument.default_value())
    };

    trace!(
        argument = argument.name(),
        usages = state.usage_count,
        value = ?value,
        "argument finished"
    );
    session.level_mut(command).parser.errors.extend(errors);
    session.argument_mut(arg).finished = Some(value.clone());
    value
}

fn unique_used_elsewhere(tree: &CommandTree, session: &Session, arg: ArgumentId) -> bool {
    tree.argument_ids().any(|id| {
        id != arg && tree.argument(id).is_unique() && session.argument(id).usage_count > 0
    })
}

/// The innermost exclusive group of `arg` that another argument claimed first.
fn exclusive_conflict(
    tree: &CommandTree,
    session: &Session,
    arg: ArgumentId,
) -> Option<argtree_core::GroupId> {
    tree.group_ancestry(arg).into_iter().find(|&group| {
        tree.group(group).is_exclusive()
            && session
                .group(group)
                .used_by
                .is_some_and(|first| first != arg)
    })
}

#[cfg(test)]
mod tests {
    use argtree_core::{
        Argument, BoolType, Command, CounterType, IntType, Range, StringType, TupleOf,
    };

    use super::*;
    use crate::config::ParserConfig;
    use crate::tokenizer::Tokenizer;

    fn run(tree: &CommandTree, input: &str) -> Session {
        let config = ParserConfig::default();
        let mut session = Session::new(tree, input);
        Tokenizer::new(tree, &config, tree.root())
            .tokenize(&mut session, input, 0, 0)
            .unwrap();
        Parser::new(tree, tree.root()).parse(&mut session, None);
        for id in session.tokenized_chain(tree) {
            if session.level(id).parser.parsed {
                finish_level(tree, &mut session, id);
            }
        }
        session
    }

    fn value(session: &Session, arg: ArgumentId) -> Option<Value> {
        session.argument(arg).finished.clone().flatten()
    }

    #[test]
    fn test_named_and_positional() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        let file = tree.add_argument(root, Argument::new("file", StringType).positional());
        let count = tree.add_argument(root, Argument::new("count", IntType::new()));

        let session = run(&tree, "input.txt --count 3");
        assert_eq!(value(&session, file), Some(Value::from("input.txt")));
        assert_eq!(value(&session, count), Some(Value::Int(3)));
        assert!(session.level(root).parser.errors.is_empty());
    }

    #[test]
    fn test_positional_disabled_after_name() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        let file = tree.add_argument(root, Argument::new("file", StringType).positional());
        tree.add_argument(root, Argument::new("q", BoolType));

        let session = run(&tree, "--q stray");
        assert_eq!(value(&session, file), None);
        assert!(matches!(
            session.level(root).parser.errors[0],
            ParseError::UnmatchedToken { index: 1, .. }
        ));
    }

    #[test]
    fn test_name_list_with_trailing_value() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        let verbose = tree.add_argument(root, Argument::new("v", CounterType));
        let name = tree.add_argument(root, Argument::new("n", StringType));
        let quiet = tree.add_argument(root, Argument::new("q", BoolType));

        let session = run(&tree, "-vvnqv");
        assert_eq!(value(&session, verbose), Some(Value::Int(2)));
        assert_eq!(value(&session, name), Some(Value::from("qv")));
        assert_eq!(value(&session, quiet), Some(Value::Bool(false)));

        let session = run(&tree, "-vn bar");
        assert_eq!(value(&session, name), Some(Value::from("bar")));
    }

    #[test]
    fn test_name_list_prefix_mismatch() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("a", BoolType));
        tree.add_argument(root, Argument::new("b", BoolType).with_prefix(PrefixChar::Plus));

        let session = run(&tree, "-ab");
        assert!(matches!(
            &session.level(root).parser.errors[0],
            ParseError::UnmatchedInNameList { argument, rest, .. } if argument == "a" && rest == "b"
        ));
    }

    #[test]
    fn test_tuple_overflow_reports_true_count() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        let what = tree.add_argument(
            root,
            Argument::new("what", TupleOf::new(StringType, Range::between(1, 3))),
        );

        let session = run(&tree, "--what [ a b c d e ]");
        assert_eq!(session.argument(what).usage_count, 0);
        assert!(matches!(
            session.level(root).parser.errors[0],
            ParseError::IncorrectValueCount { index: 1, len: 6, received: 5, .. }
        ));
    }

    #[test]
    fn test_missing_value_anchors_at_name() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("count", IntType::new()));

        let session = run(&tree, "--count");
        assert!(matches!(
            session.level(root).parser.errors[0],
            ParseError::IncorrectValueCount { index: 0, len: 0, received: 0, .. }
        ));
    }

    #[test]
    fn test_type_error_anchors_at_value() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(
            root,
            Argument::new("nums", TupleOf::new(IntType::new(), Range::AT_LEAST_ONE)),
        );

        let session = run(&tree, "--nums [ 1 x 3 ]");
        let custom = &session.level(root).parser.custom_errors;
        assert_eq!(custom.len(), 1);
        assert_eq!(custom[0].index, 3);
    }

    #[test]
    fn test_similar_argument_hint() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("what", StringType).with_prefix(PrefixChar::Plus));

        let session = run(&tree, "--what");
        let errors = &session.level(root).parser.errors;
        assert!(matches!(errors[0], ParseError::UnmatchedToken { .. }));
        assert!(matches!(
            errors[1],
            ParseError::SimilarArgument { expected: '+', .. }
        ));
    }

    #[test]
    fn test_usage_count_exceeded() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        let name = tree.add_argument(root, Argument::new("name", StringType));

        let session = run(&tree, "--name a --name b");
        assert_eq!(value(&session, name), None);
        assert!(matches!(
            session.level(root).parser.errors[0],
            ParseError::IncorrectUsageCount { used: 2, index: 3, .. }
        ));
    }

    #[test]
    fn test_required_satisfied_by_unique() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("input", StringType).required());
        tree.add_argument(root, Argument::new("help", BoolType).unique());

        let session = run(&tree, "--help");
        assert!(session.level(root).parser.errors.is_empty());

        let session = run(&tree, "");
        assert!(matches!(
            session.level(root).parser.errors[0],
            ParseError::RequiredArgumentNotUsed { index: -1, .. }
        ));
    }

    #[test]
    fn test_nesting_offset_of_sub_command() {
        let mut tree = CommandTree::new(Command::new("tool"));
        let root = tree.root();
        tree.add_argument(root, Argument::new("a", StringType));
        let sub = tree.add_sub_command(root, Command::new("sub"));
        let port = tree.add_argument(sub, Argument::new("port", IntType::new()));

        let session = run(&tree, "--a x sub --port 80");
        assert_eq!(session.level(sub).parser.nesting_offset, 3);
        assert_eq!(value(&session, port), Some(Value::Int(80)));
        assert_eq!(session.argument(port).snapshot.map(|s| s.token_index), Some(4));
    }
}
