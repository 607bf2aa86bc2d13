//! # layer-markup
//!
//! Converts between Telegram's formatted-text markup and the
//! `(plain_text, entities)` pairs the API sends and receives.
//!
//! ## Features
//! - HTML parser and unparser (`<b>`, `<i>`, `<u>`, `<s>`, `<tg-spoiler>`,
//!   `<code>`, `<pre>`, `<blockquote>`, `<a href>`, `<emoji document_id>`)
//! - Markdown parser and unparser (`**`, `__`, `++`, `~~`, `||`, `` ` ``,
//!   ```` ``` ````, `> … <<`, nested `[text](url)`)
//! - Offsets in UTF-16 code units; surrogate pairs are never split
//! - Whitespace stripping with entity adjustment
//! - Unparsing never fails: overlapping, unsorted or out-of-range entities
//!   still produce output
//!
//! ```
//! use layer_markup::{html, MessageEntity};
//!
//! let (text, entities) = html::parse("<b>Hello</b>, <i>world</i>");
//! assert_eq!(text, "Hello, world");
//! assert_eq!(entities, vec![MessageEntity::bold(0, 5), MessageEntity::italic(7, 5)]);
//!
//! assert_eq!(html::unparse(&text, &entities), "<strong>Hello</strong>, <em>world</em>");
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

mod builder;
pub mod decoration;
pub mod entity;
pub mod errors;
pub mod html;
pub mod markdown;
mod options;
mod strip;
pub mod unparse;
pub mod utf16;

pub use decoration::Decoration;
pub use entity::{inner_text, EntityBuilder, EntityKind, MessageEntity};
pub use errors::UnknownSyntax;
pub use options::{Options, Syntax};
pub use strip::strip_text;

// ─── Syntax-agnostic handles ──────────────────────────────────────────────────

/// A markup syntax bound to its [`Options`].
///
/// Lets callers pick HTML or Markdown at runtime (see [`Syntax::markup`]).
pub trait Markup {
    /// Markup → (plain_text, entities).
    fn parse(&self, markup: &str) -> (String, Vec<MessageEntity>);
    /// (text, entities) → markup.
    fn unparse(&self, text: &str, entities: &[MessageEntity]) -> String;
    /// Which syntax this is.
    fn syntax(&self) -> Syntax;
}

/// HTML with fixed [`Options`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Html {
    /// Options used for every call.
    pub options: Options,
}

/// Markdown with fixed [`Options`].
#[derive(Clone, Copy, Debug, Default)]
pub struct Markdown {
    /// Options used for every call.
    pub options: Options,
}

impl Markup for Html {
    fn parse(&self, markup: &str) -> (String, Vec<MessageEntity>) {
        html::parse_with(markup, &self.options)
    }

    fn unparse(&self, text: &str, entities: &[MessageEntity]) -> String {
        html::unparse_with(text, entities, &self.options)
    }

    fn syntax(&self) -> Syntax { Syntax::Html }
}

impl Markup for Markdown {
    fn parse(&self, markup: &str) -> (String, Vec<MessageEntity>) {
        markdown::parse_with(markup, &self.options)
    }

    fn unparse(&self, text: &str, entities: &[MessageEntity]) -> String {
        markdown::unparse_with(text, entities, &self.options)
    }

    fn syntax(&self) -> Syntax { Syntax::Markdown }
}

impl Syntax {
    /// A handle for this syntax using `options`.
    pub fn markup(self, options: Options) -> Box<dyn Markup + Send + Sync> {
        match self {
            Self::Html     => Box::new(Html { options }),
            Self::Markdown => Box::new(Markdown { options }),
        }
    }
}
