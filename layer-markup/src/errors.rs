//! Error types for layer-markup.
//!
//! Parsing and unparsing never fail: malformed markup and malformed entity
//! lists have well-defined output. The only fallible operation is picking a
//! syntax by name.

use std::fmt;

/// A syntax name that is neither HTML nor Markdown.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct UnknownSyntax {
    /// The rejected name.
    pub name: String,
}

impl fmt::Display for UnknownSyntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown markup syntax `{}` (expected `html` or `markdown`)", self.name)
    }
}

impl std::error::Error for UnknownSyntax {}
