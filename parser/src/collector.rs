//! Gathers the errors of every tokenized level into one ordered report.

use argtree_core::{ArgumentId, CommandTree, ErrorLevel};
use serde::Serialize;
use tracing::debug;

use crate::config::ParserConfig;
use crate::error::{ErrorFormatter, ParseContext, ParseError, TokenizeContext};
use crate::state::Session;

/// One collected error, unformatted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub level: ErrorLevel,
    /// Command level that raised the error.
    pub command: String,
    /// Absolute token index the error is anchored at. `-1` is the root
    /// command name.
    pub index: isize,
    pub message: String,
}

#[derive(Debug, Default)]
pub(crate) struct Collected {
    pub errors: Vec<String>,
    pub diagnostics: Vec<Diagnostic>,
    pub exit_code: i32,
}

struct Entry {
    order: isize,
    diagnostic: Diagnostic,
    text: String,
}

/// Collects displayable errors and computes the exit code.
///
/// Errors below a level's display threshold are dropped from the report.
/// Independently, a level whose errors reach its exit threshold contributes
/// its error code to the exit code.
pub(crate) fn collect(tree: &CommandTree, session: &Session, config: &ParserConfig) -> Collected {
    let formatter = ErrorFormatter::new(config);
    let all_tokens = session.all_tokens(tree);
    let root_name = tree.command(tree.root()).name();
    let mut entries: Vec<Entry> = Vec::new();
    let mut exit_code = 0;

    for id in session.tokenized_chain(tree) {
        let command = tree.command(id);
        let display = tree.display_level(id);
        let exit = tree.exit_level(id);
        let level = session.level(id);
        let mut failed = false;

        let mut push = |lvl: ErrorLevel, order: isize, message: String, text: String| {
            entries.push(Entry {
                order,
                diagnostic: Diagnostic {
                    level: lvl,
                    command: command.name().to_string(),
                    index: order,
                    message,
                },
                text,
            });
        };

        let tctx = TokenizeContext::new(
            &session.input,
            root_name,
            level.tokenizer.char_offset,
            level.tokenizer.token_offset,
        );
        for error in &level.tokenizer.errors {
            let lvl = error.level();
            failed |= lvl.is_at_least(exit);
            if lvl.is_at_least(display) {
                let rendered = error.render(&tctx);
                let text = formatter.format_input(lvl, &rendered, &tctx);
                let order = tctx.absolute_token(error.token_index) as isize;
                push(lvl, order, rendered.content, text);
            }
        }

        let pctx = ParseContext::new(tree, level.parser.nesting_offset, &all_tokens);
        let miscounted = miscounted_arguments(&level.parser.errors);
        for error in level.parser.errors.iter().filter(|e| !is_suppressed(e, &miscounted)) {
            let lvl = error.level();
            failed |= lvl.is_at_least(exit);
            if lvl.is_at_least(display) {
                let rendered = error.render(&pctx);
                let text = formatter.format_tokens(lvl, &rendered, &pctx);
                push(lvl, pctx.absolute(error.index()), rendered.content, text);
            }
        }

        for error in &level.parser.custom_errors {
            failed |= error.level.is_at_least(exit);
            if error.level.is_at_least(display) {
                let order = pctx.absolute(error.index);
                let rendered = error.render(order);
                let text = formatter.format_tokens(error.level, &rendered, &pctx);
                push(error.level, order, rendered.content, text);
            }
        }

        if failed {
            debug!(
                command = command.name(),
                code = command.error_code(),
                "level failed"
            );
            exit_code |= command.error_code();
        }
    }

    entries.sort_by_key(|entry| entry.order);
    let (errors, diagnostics) = entries
        .into_iter()
        .map(|entry| (entry.text, entry.diagnostic))
        .unzip();
    Collected {
        errors,
        diagnostics,
        exit_code,
    }
}

/// Arguments that already have a value-count error on this level.
fn miscounted_arguments(errors: &[ParseError]) -> Vec<ArgumentId> {
    errors
        .iter()
        .filter_map(|error| match error {
            ParseError::IncorrectValueCount { argument_id, .. } => Some(*argument_id),
            _ => None,
        })
        .collect()
}

/// A required-argument error is redundant when the argument was given with
/// the wrong number of values.
fn is_suppressed(error: &ParseError, miscounted: &[ArgumentId]) -> bool {
    matches!(error, ParseError::RequiredArgumentNotUsed { .. })
        && error.argument().is_some_and(|arg| miscounted.contains(&arg))
}
