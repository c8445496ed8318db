use argtree_core::{ArgumentId, ErrorLevel};

use super::{Highlight, Rendered};

/// An error reported by an argument type while converting its values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomError {
    pub message: String,
    pub level: ErrorLevel,
    /// Local token index of the offending value.
    pub index: isize,
    pub argument: ArgumentId,
}

impl CustomError {
    pub fn render(&self, absolute: isize) -> Rendered {
        Rendered {
            content: self.message.clone(),
            highlight: Some(Highlight::single(absolute)),
        }
    }
}
