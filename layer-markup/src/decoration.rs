//! Per-kind rendering rules shared by the HTML and Markdown unparsers.

use crate::entity::{EntityKind, MessageEntity};
use crate::options::Options;

/// Link target used for mentions of users without a username.
pub const MENTION_PREFIX: &str = "tg://user?id=";

/// Link target prefix for e-mail addresses.
pub const MAILTO_PREFIX: &str = "mailto:";

/// The syntax-specific half of an unparser.
///
/// Every method receives `value`, the already-rendered (and escaped) inner
/// markup, and returns it wrapped in the syntax's decoration.
/// [`Decoration::apply`] maps an entity kind to the right method.
pub trait Decoration {
    /// Wraps in bold delimiters.
    fn bold(&self, value: &str) -> String;
    /// Wraps in italic delimiters.
    fn italic(&self, value: &str) -> String;
    /// Wraps in underline delimiters.
    fn underline(&self, value: &str) -> String;
    /// Wraps in strikethrough delimiters.
    fn strikethrough(&self, value: &str) -> String;
    /// Wraps in spoiler delimiters.
    fn spoiler(&self, value: &str) -> String;
    /// Wraps in inline-code delimiters.
    fn code(&self, value: &str) -> String;
    /// Code block without a language.
    fn pre(&self, value: &str) -> String;
    /// Code block tagged with `language`.
    fn pre_language(&self, value: &str, language: &str) -> String;
    /// Quoted block.
    fn blockquote(&self, value: &str) -> String;
    /// Link to `link`, which is already escaped with [`Decoration::escape_link`].
    fn link(&self, value: &str, link: &str) -> String;
    /// Custom emoji placeholder.
    fn custom_emoji(&self, value: &str, document_id: i64) -> String;
    /// Escapes plain text so it cannot be mistaken for markup.
    fn quote(&self, value: &str) -> String;
    /// Escapes a raw link target for use in [`Decoration::link`].
    fn escape_link(&self, link: &str) -> String;
    /// `true` if `value` is exactly one complete custom emoji placeholder.
    fn is_custom_emoji(&self, value: &str) -> bool;

    /// Renders `entity` around `value`.
    ///
    /// `raw` is the unescaped text covered by the entity; it is used where
    /// the text itself becomes a link target (`Url`, `Email`).
    fn apply(&self, entity: &MessageEntity, value: &str, raw: &str, options: &Options) -> String {
        use EntityKind as K;

        match &entity.kind {
            K::Bold | K::Italic | K::Underline | K::Strike | K::Spoiler | K::Code | K::Blockquote
                if self.is_custom_emoji(value) =>
            {
                value.to_owned()
            }
            K::Bold       => self.bold(value),
            K::Italic     => self.italic(value),
            K::Underline  => self.underline(value),
            K::Strike     => self.strikethrough(value),
            K::Spoiler    => self.spoiler(value),
            K::Code       => self.code(value),
            K::Blockquote => self.blockquote(value),
            K::Pre { language } if !language.is_empty() => self.pre_language(value, language),
            K::Pre { .. } => self.pre(value),
            K::MentionName { user_id } => self.link(value, &format!("{MENTION_PREFIX}{user_id}")),
            K::TextUrl { url } => self.link(value, &self.escape_link(url)),
            K::Url   => self.link(value, &self.escape_link(raw)),
            K::Email => self.link(value, &self.escape_link(&format!("{MAILTO_PREFIX}{raw}"))),
            K::CustomEmoji { document_id } if options.custom_emoji => {
                self.custom_emoji(value, *document_id)
            }
            // `value` is already quoted by the unparser.
            K::CustomEmoji { .. } => value.to_owned(),
        }
    }
}

/// Parses the user id out of a `tg://user?id=N` link.
pub(crate) fn mention_user_id(link: &str) -> Option<i64> {
    link.strip_prefix(MENTION_PREFIX)?.parse().ok()
}
