//! Parser configuration.
//!
//! Settings that shape tokenizing and diagnostics rendering. The
//! configuration is plain data and can be stored as YAML.
//!
//! # Example YAML
//!
//! ```yaml
//! tuple_chars: parenthesis
//! path_separator: "."
//! line_width: 100
//! context_window: 5
//! ```

use std::io::{BufReader, BufWriter};
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised while loading or saving a [`ParserConfig`].
#[derive(Debug, Error)]
pub enum ConfigError {
    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// YAML parsing or serialization failure.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),
}

/// Character pair delimiting a tuple of values.
///
/// # Examples
///
/// ```
/// use argtree_parser::TupleChars;
///
/// assert_eq!(TupleChars::default().open(), '[');
/// assert_eq!(TupleChars::Braces.close(), '}');
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "snake_case")]
pub enum TupleChars {
    /// `[` and `]`
    #[default]
    SquareBrackets,
    /// `(` and `)`
    Parenthesis,
    /// `{` and `}`
    Braces,
    /// `<` and `>`
    AngleBrackets,
}

impl TupleChars {
    pub const fn open(self) -> char {
        match self {
            TupleChars::SquareBrackets => '[',
            TupleChars::Parenthesis => '(',
            TupleChars::Braces => '{',
            TupleChars::AngleBrackets => '<',
        }
    }

    pub const fn close(self) -> char {
        match self {
            TupleChars::SquareBrackets => ']',
            TupleChars::Parenthesis => ')',
            TupleChars::Braces => '}',
            TupleChars::AngleBrackets => '>',
        }
    }
}

/// Settings for tokenizing, result lookup and error formatting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    /// Tuple delimiters.
    pub tuple_chars: TupleChars,
    /// Separator for dotted result paths (`sub.arg`).
    pub path_separator: char,
    /// Width at which error contents are wrapped.
    pub line_width: usize,
    /// Tokens shown on each side of a highlighted span.
    pub context_window: usize,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            tuple_chars: TupleChars::default(),
            path_separator: '.',
            line_width: 80,
            context_window: 5,
        }
    }
}

impl ParserConfig {
    /// Loads configuration from a YAML file. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`YamlError`](ConfigError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    pub fn with_tuple_chars(mut self, tuple_chars: TupleChars) -> Self {
        self.tuple_chars = tuple_chars;
        self
    }

    pub fn with_path_separator(mut self, separator: char) -> Self {
        self.path_separator = separator;
        self
    }

    pub fn with_line_width(mut self, width: usize) -> Self {
        self.line_width = width;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config: ParserConfig = serde_yaml::from_str("tuple_chars: braces\n").unwrap();
        assert_eq!(config.tuple_chars, TupleChars::Braces);
        assert_eq!(config.path_separator, '.');
        assert_eq!(config.line_width, 80);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("parser.yml");
        let config = ParserConfig::default()
            .with_tuple_chars(TupleChars::AngleBrackets)
            .with_path_separator('/');
        config.save(&path).unwrap();

        let loaded = ParserConfig::load(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = ParserConfig::load("/nonexistent/argtree.yml").unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
