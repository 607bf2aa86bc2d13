//! Per-call configuration.

use std::fmt;
use std::str::FromStr;

use crate::errors::UnknownSyntax;

/// Knobs shared by every parse and unparse call.
///
/// Passed explicitly instead of living in a global so concurrent calls with
/// different settings cannot race.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Options {
    /// Recognise and emit custom emoji (`<emoji document_id=…>` in HTML,
    /// `[…](emoji/…)` in Markdown). When off, such markup yields no entity
    /// and `CustomEmoji` entities are rendered as plain text.
    pub custom_emoji: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self { custom_emoji: true }
    }
}

impl Options {
    /// Default options with custom emoji disabled.
    pub fn without_custom_emoji() -> Self {
        Self { custom_emoji: false }
    }
}

/// The two supported markup syntaxes.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Syntax {
    /// Telegram-flavoured HTML.
    #[default]
    Html,
    /// Telegram-flavoured Markdown.
    Markdown,
}

impl FromStr for Syntax {
    type Err = UnknownSyntax;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "html" | "htm"      => Ok(Self::Html),
            "markdown" | "md"   => Ok(Self::Markdown),
            _ => Err(UnknownSyntax { name: s.to_owned() }),
        }
    }
}

impl fmt::Display for Syntax {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Html     => "html",
            Self::Markdown => "markdown",
        })
    }
}
