//! Human-readable rendering of error records.
//!
//! A formatted error has a level label, a view of the surrounding input
//! with a marker line under the highlighted part, and the wrapped message:
//!
//! ```text
//! ERROR
//!   tool --what [ 1 2 3 4 5 ]
//!               ^^^^^^^^^^^^^
//!   Incorrect number of values for argument 'what'.
//!   Expected from 1 to 3 values, but got 5.
//! ```

use argtree_core::ErrorLevel;
use unicode_width::UnicodeWidthStr;

use super::{Highlight, ParseContext, Rendered, TokenizeContext};
use crate::config::ParserConfig;

const INDENT: &str = "  ";

/// Characters shown around a tokenize error per unit of `context_window`.
const CHARS_PER_WINDOW_UNIT: usize = 8;

/// Turns [`Rendered`] records into display text.
#[derive(Debug, Clone, Copy)]
pub struct ErrorFormatter<'a> {
    config: &'a ParserConfig,
}

impl<'a> ErrorFormatter<'a> {
    pub fn new(config: &'a ParserConfig) -> Self {
        Self { config }
    }

    /// Formats a record whose highlight addresses tokens.
    pub fn format_tokens(&self, level: ErrorLevel, rendered: &Rendered, ctx: &ParseContext<'_>) -> String {
        let view = rendered.highlight.map(|highlight| {
            // View index 0 is the root token, so absolute -1 maps to it.
            let units: Vec<String> = (-1..ctx.tokens().len() as isize)
                .map(|index| ctx.token_at(index).display_text())
                .collect();
            let shifted = Highlight {
                start: highlight.start + 1,
                ..highlight
            };
            render_view(&units, shifted, self.config.context_window, " ")
        });
        self.assemble(level, view, &rendered.content)
    }

    /// Formats a record whose highlight addresses input characters.
    pub fn format_input(&self, level: ErrorLevel, rendered: &Rendered, ctx: &TokenizeContext<'_>) -> String {
        let units: Vec<String> = ctx.input().chars().map(String::from).collect();
        let view = rendered
            .highlight
            .filter(|_| !units.is_empty())
            .map(|highlight| {
                let window = self.config.context_window * CHARS_PER_WINDOW_UNIT;
                let (line, marks) = render_view(&units, highlight, window, "");
                let lead = ctx.root_name().width() + 1;
                (
                    format!("{} {line}", ctx.root_name()),
                    format!("{}{marks}", " ".repeat(lead)),
                )
            });
        self.assemble(level, view, &rendered.content)
    }

    fn assemble(&self, level: ErrorLevel, view: Option<(String, String)>, content: &str) -> String {
        let mut out = String::new();
        out.push_str(level.label());
        out.push('\n');
        if let Some((line, marks)) = view {
            out.push_str(&format!("{INDENT}{line}\n"));
            out.push_str(&format!("{INDENT}{marks}\n"));
        }
        let width = self.config.line_width.saturating_sub(INDENT.len()).max(1);
        let lines: Vec<String> = content
            .lines()
            .flat_map(|line| wrap(line, width))
            .map(|line| format!("{INDENT}{line}"))
            .collect();
        out.push_str(&lines.join("\n"));
        out
    }
}

/// Renders the units around a highlight, returning the view line and the
/// marker line beneath it.
fn render_view(units: &[String], highlight: Highlight, window: usize, separator: &str) -> (String, String) {
    let last_unit = units.len().saturating_sub(1);
    let first = (highlight.start.max(0) as usize).min(last_unit);
    let last = (first + highlight.offset).min(last_unit);
    let from = first.saturating_sub(window);
    let to = (last + window).min(last_unit);

    let mut line = String::new();
    let mut marks = String::new();
    if from > 0 {
        line.push_str("... ");
        marks.push_str("    ");
    }
    for (i, unit) in units.iter().enumerate().take(to + 1).skip(from) {
        if i > from {
            line.push_str(separator);
            let joined = !highlight.per_unit && i > first && i <= last;
            let fill = if joined { '^' } else { ' ' };
            marks.extend(std::iter::repeat_n(fill, separator.width()));
        }
        let width = unit.width();
        line.push_str(unit);
        if (first..=last).contains(&i) {
            if highlight.per_unit {
                marks.push('^');
                marks.push_str(&" ".repeat(width.saturating_sub(1)));
            } else {
                marks.push_str(&"^".repeat(width.max(1)));
            }
        } else {
            marks.push_str(&" ".repeat(width));
        }
    }
    if to < last_unit {
        line.push_str(" ...");
    }
    (line, marks.trim_end().to_string())
}

/// Greedy word wrap. Words longer than `width` get a line of their own.
fn wrap(line: &str, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in line.split_whitespace() {
        let needed = if current.is_empty() {
            word.width()
        } else {
            current.width() + 1 + word.width()
        };
        if needed > width && !current.is_empty() {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}
