//! Inclusive count ranges used for value counts and usage counts.

use std::fmt;

use serde::{Deserialize, Serialize};

/// An inclusive range of counts with an optional upper bound.
///
/// Value types use two of these: how many values a single use of an argument
/// takes, and how many times the argument may be used in one command line.
///
/// # Examples
///
/// ```
/// use argtree_core::Range;
///
/// let range = Range::between(1, 3);
/// assert!(range.contains(2));
/// assert!(!range.contains(4));
/// assert_eq!(range.describe("value"), "from 1 to 3 values");
///
/// assert!(Range::at_least(1).contains(1_000));
/// assert!(Range::NONE.is_zero());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    min: usize,
    /// `None` means there is no upper bound.
    max: Option<usize>,
}

impl Range {
    /// Exactly zero.
    pub const NONE: Range = Range::exactly(0);
    /// Exactly one.
    pub const ONE: Range = Range::exactly(1);
    /// Zero or more.
    pub const ANY: Range = Range::at_least(0);
    /// One or more.
    pub const AT_LEAST_ONE: Range = Range::at_least(1);

    /// A range that only contains `n`.
    pub const fn exactly(n: usize) -> Self {
        Self {
            min: n,
            max: Some(n),
        }
    }

    /// A range without an upper bound.
    pub const fn at_least(min: usize) -> Self {
        Self { min, max: None }
    }

    /// A bounded range. The bounds are swapped if given in reverse order.
    pub const fn between(min: usize, max: usize) -> Self {
        if min <= max {
            Self {
                min,
                max: Some(max),
            }
        } else {
            Self {
                min: max,
                max: Some(min),
            }
        }
    }

    pub const fn min(&self) -> usize {
        self.min
    }

    /// Upper bound, or `None` when unbounded.
    pub const fn max(&self) -> Option<usize> {
        self.max
    }

    /// Upper bound usable as a collection limit.
    pub fn max_or_unbounded(&self) -> usize {
        self.max.unwrap_or(usize::MAX)
    }

    pub fn is_unbounded(&self) -> bool {
        self.max.is_none()
    }

    /// Returns `true` when the range is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.max == Some(0)
    }

    pub fn contains(&self, n: usize) -> bool {
        n >= self.min && self.max.is_none_or(|max| n <= max)
    }

    /// Human readable description, pluralizing `noun` where needed.
    ///
    /// ```
    /// use argtree_core::Range;
    ///
    /// assert_eq!(Range::ONE.describe("value"), "1 value");
    /// assert_eq!(Range::exactly(2).describe("value"), "2 values");
    /// assert_eq!(Range::AT_LEAST_ONE.describe("usage"), "at least 1 usage");
    /// ```
    pub fn describe(&self, noun: &str) -> String {
        match self.max {
            Some(max) if max == self.min => format!("{max} {}", plural(noun, max)),
            Some(max) => format!("from {} to {max} {}", self.min, plural(noun, max)),
            None => format!("at least {} {}", self.min, plural(noun, self.min)),
        }
    }
}

impl Default for Range {
    fn default() -> Self {
        Self::ONE
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.max {
            Some(max) if max == self.min => write!(f, "{max}"),
            Some(max) => write!(f, "{}..={max}", self.min),
            None => write!(f, "{}..", self.min),
        }
    }
}

fn plural(noun: &str, count: usize) -> String {
    if count == 1 {
        noun.to_string()
    } else {
        format!("{noun}s")
    }
}
