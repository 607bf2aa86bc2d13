//! Telegram-flavoured HTML ↔ (text, entities).
//!
//! Supported tags:
//! - `<b>` / `<strong>` → Bold
//! - `<i>` / `<em>` → Italic
//! - `<u>` → Underline
//! - `<s>` / `<del>` → Strike
//! - `<tg-spoiler>` → Spoiler
//! - `<blockquote>` → Blockquote
//! - `<code>` → Code (inside `<pre>`, `class="language-x"` sets the language)
//! - `<pre>` → Pre
//! - `<a href="...">` → TextUrl, MentionName (`tg://user?id=`), Email (`mailto:`)
//! - `<emoji document_id=...>` → CustomEmoji
//!
//! Anything else is treated as text: unknown tags vanish but keep their
//! content, unmatched closing tags are ignored.

use crate::builder::Accumulator;
use crate::decoration::{self, Decoration, MAILTO_PREFIX};
use crate::entity::{EntityKind, MessageEntity};
use crate::options::Options;
use crate::strip::strip_text;
use crate::unparse;

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parses HTML into (plain_text, entities) with default [`Options`].
pub fn parse(html: &str) -> (String, Vec<MessageEntity>) {
    parse_with(html, &Options::default())
}

/// Parses HTML into (plain_text, entities).
///
/// Entities are listed in the order their tags close. Leading and trailing
/// whitespace is stripped from the text, with entities adjusted to match.
pub fn parse_with(html: &str, options: &Options) -> (String, Vec<MessageEntity>) {
    if html.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut parser = HtmlParser::new(html.len(), options);
    for token in Tokenizer::new(html) {
        match token {
            Token::Start { name, attrs, raw, self_closing } => {
                parser.start_tag(&name, &attrs, raw);
                if self_closing {
                    parser.end_tag(&name);
                }
            }
            Token::End { name } => parser.end_tag(&name),
            Token::Data(text) => parser.data(&text),
        }
    }

    let (text, mut entities) = parser.acc.finish();
    let text = strip_text(&text, &mut entities);
    (text, entities)
}

type Attrs = Vec<(String, Option<String>)>;

fn attr<'a>(attrs: &'a Attrs, key: &str) -> Option<&'a str> {
    attrs.iter().find(|(k, _)| k == key).and_then(|(_, v)| v.as_deref())
}

struct HtmlParser<'o> {
    acc: Accumulator<String>,
    /// Open tags, innermost last, with the text that replaces an `<a>`'s
    /// content (the address of `mailto:` links).
    open_tags: Vec<(String, Option<String>)>,
    options: &'o Options,
}

impl<'o> HtmlParser<'o> {
    fn new(capacity: usize, options: &'o Options) -> Self {
        Self { acc: Accumulator::with_capacity(capacity), open_tags: Vec::new(), options }
    }

    fn start_tag(&mut self, name: &str, attrs: &Attrs, raw: &str) {
        self.open_tags.push((name.to_owned(), None));

        let kind = match name {
            "strong" | "b" => EntityKind::Bold,
            "em" | "i"     => EntityKind::Italic,
            "tg-spoiler"   => EntityKind::Spoiler,
            "u"            => EntityKind::Underline,
            "del" | "s"    => EntityKind::Strike,
            "blockquote"   => EntityKind::Blockquote,
            "code" => {
                // Inside <pre>, <code class="language-x"> only tags the block.
                if let Some(pre) = self.acc.builder_mut("pre") {
                    if let Some(lang) = attr(attrs, "class").and_then(|c| c.strip_prefix("language-")) {
                        pre.set_language(lang);
                    }
                    return;
                }
                EntityKind::Code
            }
            "pre" => EntityKind::Pre { language: String::new() },
            "a" => {
                let Some(href) = attr(attrs, "href") else {
                    log::trace!("[html] <a> without href ignored");
                    return;
                };
                let (kind, substitute) = if let Some(address) = href.strip_prefix(MAILTO_PREFIX) {
                    (EntityKind::Email, Some(address.to_owned()))
                } else if raw == href {
                    (EntityKind::Url, Some(href.to_owned()))
                } else if let Some(user_id) = decoration::mention_user_id(href) {
                    (EntityKind::MentionName { user_id }, None)
                } else {
                    (EntityKind::TextUrl { url: href.to_owned() }, None)
                };
                if let Some(top) = self.open_tags.last_mut() {
                    top.1 = substitute;
                }
                kind
            }
            "emoji" if self.options.custom_emoji => {
                match attr(attrs, "document_id").and_then(|id| id.trim().parse().ok()) {
                    Some(document_id) => EntityKind::CustomEmoji { document_id },
                    None => {
                        log::debug!("[html] <emoji> without a numeric document_id ignored");
                        return;
                    }
                }
            }
            _ => return,
        };

        if !self.acc.open(name.to_owned(), kind) {
            log::trace!("[html] nested <{name}> ignored, one is already open");
        }
    }

    fn data(&mut self, text: &str) {
        let text = match self.open_tags.last() {
            Some((tag, Some(substitute))) if tag == "a" => substitute.as_str(),
            _ => text,
        };
        self.acc.push_str(text);
    }

    fn end_tag(&mut self, name: &str) {
        if self.open_tags.pop().is_none() {
            log::trace!("[html] unmatched </{name}> ignored");
        }

        // A link whose text is its own target is a plain URL.
        if name == "a" {
            let is_url = match (self.acc.builder("a"), self.acc.covered("a")) {
                (Some(b), Some(text)) => {
                    matches!(b.kind(), EntityKind::TextUrl { url } if url == text)
                }
                _ => false,
            };
            if is_url {
                if let Some(b) = self.acc.builder_mut("a") {
                    b.set_kind(EntityKind::Url);
                }
            }
        }

        self.acc.close(name);
    }
}

// ─── Tokenizer ────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq)]
enum Token<'a> {
    Start { name: String, attrs: Attrs, raw: &'a str, self_closing: bool },
    End { name: String },
    /// A run of text between tags, with character references decoded.
    Data(String),
}

enum Markup<'a> {
    Token(Token<'a>),
    /// Comments, doctypes and processing instructions.
    Skip,
}

/// Splits HTML into start tags, end tags and text.
///
/// A `<` that does not begin a well-formed tag is kept as text, so the
/// tokenizer never fails. A tag that meets an unquoted `<` before its `>`
/// is not a tag, and an unterminated comment runs to the end of the input;
/// both keep every lookahead from rescanning the rest of the source.
struct Tokenizer<'a> {
    src: &'a str,
    pos: usize,
}

impl<'a> Tokenizer<'a> {
    fn new(src: &'a str) -> Self {
        Self { src, pos: 0 }
    }

    /// Finds the next position at or after `from` where markup starts.
    fn next_markup(&self, from: usize) -> Option<(usize, Markup<'a>, usize)> {
        let src = self.src;
        let mut i = from;
        while let Some(rel) = src[i..].find('<') {
            let at = i + rel;
            if let Some((markup, len)) = markup_at(&src[at..]) {
                return Some((at, markup, len));
            }
            i = at + 1;
        }
        None
    }
}

impl<'a> Iterator for Tokenizer<'a> {
    type Item = Token<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.pos < self.src.len() {
            match self.next_markup(self.pos) {
                Some((at, _, _)) if at > self.pos => {
                    let data = unescape(&self.src[self.pos..at]);
                    self.pos = at;
                    return Some(Token::Data(data));
                }
                Some((_, Markup::Token(token), len)) => {
                    self.pos += len;
                    return Some(token);
                }
                Some((_, Markup::Skip, len)) => {
                    self.pos += len;
                }
                None => {
                    let data = unescape(&self.src[self.pos..]);
                    self.pos = self.src.len();
                    return Some(Token::Data(data));
                }
            }
        }
        None
    }
}

/// Recognises markup at the start of `s` (which begins with `<`).
fn markup_at(s: &str) -> Option<(Markup<'_>, usize)> {
    let rest = &s[1..];
    if let Some(comment) = rest.strip_prefix("!--") {
        return Some(match comment.find("-->") {
            Some(end) => (Markup::Skip, 4 + end + 3),
            None => (Markup::Skip, s.len()),
        });
    }
    if rest.starts_with('!') || rest.starts_with('?') {
        let end = find_gt(rest)?;
        return Some((Markup::Skip, end + 2));
    }
    if let Some(closing) = rest.strip_prefix('/') {
        if !closing.starts_with(|c: char| c.is_ascii_alphabetic()) {
            return None;
        }
        let end = find_gt(closing)?;
        let name = tag_name(&closing[..end]);
        return Some((Markup::Token(Token::End { name }), end + 3));
    }
    if !rest.starts_with(|c: char| c.is_ascii_alphabetic()) {
        return None;
    }

    let end = find_tag_end(rest)?;
    let raw = &s[..end + 2];
    let mut inner = &rest[..end];
    let self_closing = inner.ends_with('/');
    if self_closing {
        inner = &inner[..inner.len() - 1];
    }
    let name = tag_name(inner);
    let attrs = parse_attrs(&inner[name.len()..]);
    Some((Markup::Token(Token::Start { name, attrs, raw, self_closing }), raw.len()))
}

/// Lowercased tag name at the start of `s`.
fn tag_name(s: &str) -> String {
    let end = s.find(|c: char| c.is_whitespace() || c == '/' || c == '>').unwrap_or(s.len());
    s[..end].to_ascii_lowercase()
}

/// Index of the first `>` in `s`, unless a `<` comes first.
fn find_gt(s: &str) -> Option<usize> {
    let i = s.find(['<', '>'])?;
    (s.as_bytes()[i] == b'>').then_some(i)
}

/// Index of the `>` closing a start tag, skipping over quoted values.
fn find_tag_end(s: &str) -> Option<usize> {
    let mut quote: Option<char> = None;
    for (i, c) in s.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '"' | '\'') => quote = Some(c),
            (None, '>') => return Some(i),
            (None, '<') => return None,
            (None, _) => {}
        }
    }
    None
}

/// Parses `key="value" key='value' key=value key` attribute lists.
fn parse_attrs(s: &str) -> Attrs {
    let mut result = Vec::new();
    let mut rem = s.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    while !rem.is_empty() {
        let key_end = rem
            .find(|c: char| c.is_whitespace() || c == '=' || c == '/')
            .unwrap_or(rem.len());
        let key = rem[..key_end].to_ascii_lowercase();
        rem = rem[key_end..].trim_start();

        let value = if let Some(after_eq) = rem.strip_prefix('=') {
            let after_eq = after_eq.trim_start();
            let (val, rest) = match after_eq.chars().next() {
                Some(q @ ('"' | '\'')) => {
                    let body = &after_eq[1..];
                    match body.find(q) {
                        Some(end) => (&body[..end], &body[end + 1..]),
                        None => (body, ""),
                    }
                }
                _ => {
                    let end = after_eq.find(char::is_whitespace).unwrap_or(after_eq.len());
                    (&after_eq[..end], &after_eq[end..])
                }
            };
            rem = rest;
            Some(unescape(val))
        } else {
            None
        };

        if !key.is_empty() {
            result.push((key, value));
        }
        rem = rem.trim_start_matches(|c: char| c.is_whitespace() || c == '/');
    }
    result
}

/// Decodes character references (`&amp;`, `&#39;`, `&#x1F3C6;`, …).
/// Unknown or malformed references are kept as written.
fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        match decode_reference(rest) {
            Some((c, used)) => {
                out.push(c);
                rest = &rest[used..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Decodes the reference at the start of `s`, returning the character and
/// the number of bytes consumed.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    let semi = s.bytes().take(34).position(|b| b == b';')?;
    let name = &s[1..semi];
    let c = if let Some(num) = name.strip_prefix('#') {
        let code = match num.strip_prefix(['x', 'X']) {
            Some(hex) => u32::from_str_radix(hex, 16).ok()?,
            None => num.parse::<u32>().ok()?,
        };
        char::from_u32(code)?
    } else {
        match name {
            "amp"  => '&',
            "lt"   => '<',
            "gt"   => '>',
            "quot" => '"',
            "apos" => '\'',
            "nbsp" => '\u{00A0}',
            _ => return None,
        }
    };
    Some((c, semi + 1))
}

// ─── Unparsing ────────────────────────────────────────────────────────────────

/// Renders entities as Telegram HTML.
#[derive(Clone, Copy, Debug, Default)]
pub struct HtmlDecoration;

impl Decoration for HtmlDecoration {
    fn bold(&self, value: &str) -> String { format!("<strong>{value}</strong>") }
    fn italic(&self, value: &str) -> String { format!("<em>{value}</em>") }
    fn underline(&self, value: &str) -> String { format!("<u>{value}</u>") }
    fn strikethrough(&self, value: &str) -> String { format!("<del>{value}</del>") }
    fn spoiler(&self, value: &str) -> String { format!("<tg-spoiler>{value}</tg-spoiler>") }
    fn code(&self, value: &str) -> String { format!("<code>{value}</code>") }
    fn pre(&self, value: &str) -> String { format!("<pre>{value}</pre>") }

    fn pre_language(&self, value: &str, language: &str) -> String {
        let language = self.escape_link(language);
        format!("<pre><code class=\"language-{language}\">{value}</code></pre>")
    }

    fn blockquote(&self, value: &str) -> String { format!("<blockquote>{value}</blockquote>") }
    fn link(&self, value: &str, link: &str) -> String { format!("<a href=\"{link}\">{value}</a>") }

    fn custom_emoji(&self, value: &str, document_id: i64) -> String {
        format!("<emoji document_id={document_id}>{value}</emoji>")
    }

    fn quote(&self, value: &str) -> String {
        escape(value, false)
    }

    fn escape_link(&self, link: &str) -> String {
        escape(link, true)
    }

    fn is_custom_emoji(&self, value: &str) -> bool {
        let Some(rest) = value.strip_prefix("<emoji document_id=") else { return false };
        let rest = rest.strip_prefix('"').unwrap_or(rest);
        let digits = rest.len() - rest.trim_start_matches(|c: char| c.is_ascii_digit()).len();
        if digits == 0 {
            return false;
        }
        let rest = &rest[digits..];
        let rest = rest.strip_prefix('"').unwrap_or(rest);
        rest.strip_prefix('>')
            .and_then(|r| r.strip_suffix("</emoji>"))
            .is_some_and(|inner| !inner.contains('<'))
    }
}

fn escape(s: &str, quotes: bool) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if quotes => out.push_str("&quot;"),
            c => out.push(c),
        }
    }
    out
}

/// Renders (text, entities) as HTML with default [`Options`].
pub fn unparse(text: &str, entities: &[MessageEntity]) -> String {
    unparse_with(text, entities, &Options::default())
}

/// Renders (text, entities) as HTML.
///
/// Never fails: unsorted, overlapping or out-of-range entities are handled
/// as described in [`crate::unparse`].
pub fn unparse_with(text: &str, entities: &[MessageEntity], options: &Options) -> String {
    unparse::unparse(&HtmlDecoration, text, entities, options)
}

// ─── Tests ────────────────────────────────────────────────────────────────────
