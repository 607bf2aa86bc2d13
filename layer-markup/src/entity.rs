//! Message entities: positioned style/link annotations over a text.
//!
//! Offsets and lengths are counted in UTF-16 code units, exactly like the
//! `messageEntity*` constructors of the Telegram API.

use crate::utf16::Utf16Text;

/// The variant-specific part of a [`MessageEntity`].
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "type", rename_all = "snake_case"))]
pub enum EntityKind {
    /// **bold**
    Bold,
    /// *italic*
    Italic,
    /// underline
    Underline,
    /// ~~strikethrough~~
    Strike,
    /// Hidden until tapped.
    Spoiler,
    /// `inline code`
    Code,
    /// Code block, optionally tagged with a language.
    Pre {
        /// Language for syntax highlighting; empty when unset.
        language: String,
    },
    /// Quoted block.
    Blockquote,
    /// Text pointing to `url`.
    TextUrl {
        /// Link target.
        url: String,
    },
    /// The covered text is itself the URL.
    Url,
    /// The covered text is an e-mail address.
    Email,
    /// Mention of a user who may have no username.
    MentionName {
        /// The mentioned user.
        user_id: i64,
    },
    /// Custom emoji backed by a sticker document.
    CustomEmoji {
        /// Document holding the emoji.
        document_id: i64,
    },
}

impl EntityKind {
    /// Lowercase name of the kind, as used in logs and JSON.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bold             => "bold",
            Self::Italic           => "italic",
            Self::Underline        => "underline",
            Self::Strike           => "strike",
            Self::Spoiler          => "spoiler",
            Self::Code             => "code",
            Self::Pre { .. }       => "pre",
            Self::Blockquote       => "blockquote",
            Self::TextUrl { .. }   => "text_url",
            Self::Url              => "url",
            Self::Email            => "email",
            Self::MentionName { .. } => "mention_name",
            Self::CustomEmoji { .. } => "custom_emoji",
        }
    }
}

/// A frozen entity: `kind` applied to `[offset, offset + length)`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MessageEntity {
    /// Start, in UTF-16 code units from the beginning of the text.
    pub offset: i32,
    /// Span, in UTF-16 code units.
    pub length: i32,
    /// What the span means.
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub kind: EntityKind,
}

macro_rules! simple_ctor {
    ($($(#[$doc:meta])* $fn_name:ident => $variant:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $fn_name(offset: i32, length: i32) -> Self {
                Self::new(offset, length, EntityKind::$variant)
            }
        )*
    };
}

impl MessageEntity {
    /// Creates an entity of any kind.
    pub fn new(offset: i32, length: i32, kind: EntityKind) -> Self {
        Self { offset, length, kind }
    }

    simple_ctor! {
        /// [`EntityKind::Bold`] over the given span.
        bold => Bold,
        /// [`EntityKind::Italic`] over the given span.
        italic => Italic,
        /// [`EntityKind::Underline`] over the given span.
        underline => Underline,
        /// [`EntityKind::Strike`] over the given span.
        strike => Strike,
        /// [`EntityKind::Spoiler`] over the given span.
        spoiler => Spoiler,
        /// [`EntityKind::Code`] over the given span.
        code => Code,
        /// [`EntityKind::Blockquote`] over the given span.
        blockquote => Blockquote,
        /// [`EntityKind::Url`] over the given span.
        url => Url,
        /// [`EntityKind::Email`] over the given span.
        email => Email,
    }

    /// [`EntityKind::Pre`]; pass `""` for no language.
    pub fn pre(offset: i32, length: i32, language: impl Into<String>) -> Self {
        Self::new(offset, length, EntityKind::Pre { language: language.into() })
    }

    /// [`EntityKind::TextUrl`] pointing at `url`.
    pub fn text_url(offset: i32, length: i32, url: impl Into<String>) -> Self {
        Self::new(offset, length, EntityKind::TextUrl { url: url.into() })
    }

    /// [`EntityKind::MentionName`] of `user_id`.
    pub fn mention_name(offset: i32, length: i32, user_id: i64) -> Self {
        Self::new(offset, length, EntityKind::MentionName { user_id })
    }

    /// [`EntityKind::CustomEmoji`] showing `document_id`.
    pub fn custom_emoji(offset: i32, length: i32, document_id: i64) -> Self {
        Self::new(offset, length, EntityKind::CustomEmoji { document_id })
    }

    /// One past the last code unit covered (saturating).
    pub fn end(&self) -> i32 {
        self.offset.saturating_add(self.length)
    }
}

// ─── Builder ──────────────────────────────────────────────────────────────────

/// An entity whose closing tag or delimiter has not been seen yet.
///
/// `offset` is fixed when the builder is opened; `length` grows as text is
/// appended. The kind stays mutable so a nested `<code class="language-x">`
/// can set the language of an enclosing `<pre>`.
#[derive(Clone, Debug, PartialEq)]
pub struct EntityBuilder {
    offset: i32,
    length: i32,
    kind: EntityKind,
}

impl EntityBuilder {
    /// Starts an empty entity at `offset`.
    pub fn new(offset: i32, kind: EntityKind) -> Self {
        Self { offset, length: 0, kind }
    }

    /// Accounts for `units` more code units of covered text.
    pub fn grow(&mut self, units: i32) {
        self.length = self.length.saturating_add(units);
    }

    /// Start offset.
    pub fn offset(&self) -> i32 { self.offset }

    /// Code units covered so far.
    pub fn length(&self) -> i32 { self.length }

    /// The kind this builder will freeze into.
    pub fn kind(&self) -> &EntityKind { &self.kind }

    /// Replaces the kind, keeping offset and length.
    pub fn set_kind(&mut self, kind: EntityKind) { self.kind = kind; }

    /// Sets the language if this is a `Pre` builder. Returns whether it was.
    pub fn set_language(&mut self, lang: &str) -> bool {
        match &mut self.kind {
            EntityKind::Pre { language } => {
                lang.clone_into(language);
                true
            }
            _ => false,
        }
    }

    /// Finishes the entity.
    pub fn freeze(self) -> MessageEntity {
        MessageEntity { offset: self.offset, length: self.length, kind: self.kind }
    }
}

// ─── Helpers ──────────────────────────────────────────────────────────────────

/// Returns the text covered by each entity, in the same order.
///
/// Spans are clamped to the text, so malformed entities yield shorter (or
/// empty) strings instead of panicking.
pub fn inner_text(text: &str, entities: &[MessageEntity]) -> Vec<String> {
    let units = Utf16Text::new(text);
    entities
        .iter()
        .map(|e| {
            let start = e.offset.max(0) as usize;
            let end = start.saturating_add(e.length.max(0) as usize);
            units.slice(start, end)
        })
        .collect()
}
