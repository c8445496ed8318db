//! Diagnostic severity levels.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Severity of a diagnostic.
///
/// Ordered so that `Error > Warning > Info > Debug`; thresholds compare with
/// [`ErrorLevel::is_at_least`].
///
/// # Examples
///
/// ```
/// use argtree_core::ErrorLevel;
///
/// assert!(ErrorLevel::Error > ErrorLevel::Warning);
/// assert!(ErrorLevel::Warning.is_at_least(ErrorLevel::Info));
/// assert!(!ErrorLevel::Debug.is_at_least(ErrorLevel::Info));
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ErrorLevel {
    Debug,
    #[default]
    Info,
    Warning,
    Error,
}

impl ErrorLevel {
    /// Returns `true` if this level meets the given threshold.
    pub fn is_at_least(self, threshold: ErrorLevel) -> bool {
        self >= threshold
    }

    /// Upper-case label used in formatted diagnostics.
    pub fn label(self) -> &'static str {
        match self {
            ErrorLevel::Debug => "DEBUG",
            ErrorLevel::Info => "INFO",
            ErrorLevel::Warning => "WARNING",
            ErrorLevel::Error => "ERROR",
        }
    }
}

impl fmt::Display for ErrorLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
