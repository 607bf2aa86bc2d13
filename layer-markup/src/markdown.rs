//! Telegram-flavoured Markdown ↔ (text, entities).
//!
//! | Syntax                      | Entity                          |
//! |-----------------------------|---------------------------------|
//! | `**bold**`                  | Bold                            |
//! | `__italic__`                | Italic                          |
//! | `++underline++`             | Underline                       |
//! | `~~strike~~`                | Strike                          |
//! | `\|\|spoiler\|\|`           | Spoiler                         |
//! | `` `code` ``                | Code                            |
//! | ```` ```lang\ncode``` ````  | Pre (first line is the language)|
//! | `> quoted<<` (line prefix)  | Blockquote                      |
//! | `[text](url)`               | TextUrl                         |
//! | `[url](url)`                | Url                             |
//! | `[a@b.c](mailto:a@b.c)`     | Email                           |
//! | `[text](tg://user?id=123)`  | MentionName                     |
//! | `[👍](emoji/123)`           | CustomEmoji                     |
//!
//! A backslash before any ASCII punctuation makes it literal, everywhere
//! (including inside code and link targets). Code and pre contents are not
//! scanned for other delimiters. Unmatched delimiters produce no entity.
//!
//! A blockquote runs over consecutive `>`-prefixed lines. It ends at `<<`,
//! at a newline not followed by `>`, or at the end of the input. The
//! unparser always writes the `<<`, so a quote ending mid-line or on a
//! newline comes back intact. Links nest: `[go [👍](emoji/5)](https://x.y)`.

use crate::builder::Accumulator;
use crate::decoration::{self, Decoration, MAILTO_PREFIX};
use crate::entity::{EntityKind, MessageEntity};
use crate::options::Options;
use crate::strip::strip_text;
use crate::unparse;

/// Link target prefix for custom emoji.
pub const EMOJI_PREFIX: &str = "emoji/";

const FENCE: &str = "```";

/// Explicit end of a blockquote.
const QUOTE_END: &str = "<<";

/// Characters [`MarkdownDecoration::quote`] escapes anywhere.
const ESCAPED: &[char] = &['\\', '*', '_', '~', '|', '+', '`', '[', ']', '<'];

/// The key an open builder is tracked under: one per kind of delimiter.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
enum Delim {
    Bold,
    Italic,
    Underline,
    Strike,
    Spoiler,
    Code,
    Pre,
    Blockquote,
    /// Keyed by nesting depth, outermost 0.
    Link(usize),
}

/// Doubled-character delimiters that toggle an entity on and off.
fn toggle(c: char) -> Option<(Delim, EntityKind)> {
    Some(match c {
        '*' => (Delim::Bold, EntityKind::Bold),
        '_' => (Delim::Italic, EntityKind::Italic),
        '+' => (Delim::Underline, EntityKind::Underline),
        '~' => (Delim::Strike, EntityKind::Strike),
        '|' => (Delim::Spoiler, EntityKind::Spoiler),
        _ => return None,
    })
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

/// Parses Markdown into (plain_text, entities) with default [`Options`].
pub fn parse(markdown: &str) -> (String, Vec<MessageEntity>) {
    parse_with(markdown, &Options::default())
}

/// Parses Markdown into (plain_text, entities).
///
/// Entities are listed in the order they close. Leading and trailing
/// whitespace is stripped from the text, with entities adjusted to match.
pub fn parse_with(markdown: &str, options: &Options) -> (String, Vec<MessageEntity>) {
    if markdown.is_empty() {
        return (String::new(), Vec::new());
    }

    let mut parser = MarkdownParser::new(markdown, options);
    parser.run();

    let (text, mut entities) = parser.acc.finish();
    let text = strip_text(&text, &mut entities);
    (text, entities)
}

/// A `[text](url)` whose text is being scanned.
struct PendingLink {
    /// Index of the closing `]`.
    close: usize,
    /// Index just past the closing `)`.
    end: usize,
    url: String,
}

struct MarkdownParser<'o> {
    chars: Vec<char>,
    i: usize,
    acc: Accumulator<Delim>,
    /// Links whose text is being scanned, innermost last.
    links: Vec<PendingLink>,
    /// The matching `]` of every `[`, by index.
    closers: Vec<Option<usize>>,
    /// Indices of every unescaped `)`, ascending.
    parens: Vec<usize>,
    options: &'o Options,
}

impl<'o> MarkdownParser<'o> {
    fn new(src: &str, options: &'o Options) -> Self {
        let chars: Vec<char> = src.chars().collect();
        let (closers, parens) = link_punctuation(&chars);
        Self {
            chars,
            i: 0,
            acc: Accumulator::with_capacity(src.len()),
            links: Vec::new(),
            closers,
            parens,
            options,
        }
    }

    fn at(&self, i: usize) -> Option<char> {
        self.chars.get(i).copied()
    }

    fn starts_with(&self, i: usize, pat: &str) -> bool {
        pat.chars().enumerate().all(|(k, c)| self.at(i + k) == Some(c))
    }

    fn at_line_start(&self) -> bool {
        self.i == 0 || self.at(self.i - 1) == Some('\n')
    }

    /// The escaped character if `\` at `i` escapes one.
    fn escaped(&self, i: usize) -> Option<char> {
        match (self.at(i), self.at(i + 1)) {
            (Some('\\'), Some(c)) if c.is_ascii_punctuation() => Some(c),
            _ => None,
        }
    }

    /// Index just past a `>` line prefix (and one optional space) at `i`.
    fn skip_quote_prefix(&self, i: usize) -> usize {
        let i = i + 1;
        if self.at(i) == Some(' ') { i + 1 } else { i }
    }

    fn run(&mut self) {
        while self.i < self.chars.len() {
            if self.links.last().is_some_and(|l| self.i >= l.close) {
                self.finish_link();
                continue;
            }

            let c = self.chars[self.i];

            if c == '>' && self.at_line_start() && !self.acc.is_open(&Delim::Blockquote) {
                self.acc.open(Delim::Blockquote, EntityKind::Blockquote);
                self.i = self.skip_quote_prefix(self.i);
                continue;
            }

            match c {
                '\\' => match self.escaped(self.i) {
                    Some(e) => {
                        self.acc.push(e);
                        self.i += 2;
                    }
                    None => {
                        self.acc.push('\\');
                        self.i += 1;
                    }
                },
                '\n' if self.acc.is_open(&Delim::Blockquote) => {
                    if self.at(self.i + 1) == Some('>') {
                        self.acc.push('\n');
                        self.i = self.skip_quote_prefix(self.i + 1);
                    } else {
                        self.acc.close(&Delim::Blockquote);
                        self.acc.push('\n');
                        self.i += 1;
                    }
                }
                '`' if self.starts_with(self.i, FENCE) => {
                    if !self.fenced_block() {
                        self.acc.push_str(FENCE);
                        self.i += FENCE.len();
                    }
                }
                '`' => {
                    if !self.inline_code() {
                        self.acc.push('`');
                        self.i += 1;
                    }
                }
                '<' if self.starts_with(self.i, QUOTE_END) && self.acc.is_open(&Delim::Blockquote) => {
                    self.acc.close(&Delim::Blockquote);
                    self.i += QUOTE_END.len();
                }
                '[' => {
                    if !self.open_link() {
                        self.acc.push('[');
                        self.i += 1;
                    }
                }
                c => match toggle(c) {
                    Some((delim, kind)) if self.at(self.i + 1) == Some(c) => {
                        if self.acc.is_open(&delim) {
                            self.acc.close(&delim);
                        } else {
                            self.acc.open(delim, kind);
                        }
                        self.i += 2;
                    }
                    _ => {
                        self.acc.push(c);
                        self.i += 1;
                    }
                },
            }
        }

        while !self.links.is_empty() {
            self.finish_link();
        }
        self.acc.close(&Delim::Blockquote);
    }

    /// Reads verbatim content from `from` up to a run of `fence_len`
    /// backticks. Returns the content and the index past the closing fence.
    fn scan_verbatim(&self, from: usize, fence_len: usize) -> Option<(String, usize)> {
        let in_quote = self.acc.is_open(&Delim::Blockquote);
        let mut content = String::new();
        let mut j = from;
        while j < self.chars.len() {
            if let Some(e) = self.escaped(j) {
                content.push(e);
                j += 2;
                continue;
            }
            match self.chars[j] {
                '`' if (0..fence_len).all(|k| self.at(j + k) == Some('`')) => {
                    return Some((content, j + fence_len));
                }
                '\n' if in_quote && self.at(j + 1) == Some('>') => {
                    content.push('\n');
                    j = self.skip_quote_prefix(j + 1);
                }
                c => {
                    content.push(c);
                    j += 1;
                }
            }
        }
        None
    }

    /// ```` ```lang\ncode``` ````
    fn fenced_block(&mut self) -> bool {
        let Some((block, next)) = self.scan_verbatim(self.i + FENCE.len(), FENCE.len()) else {
            return false;
        };
        let (language, code) = match block.split_once('\n') {
            Some((lang, code)) => (lang.trim().to_owned(), code),
            None => (String::new(), block.as_str()),
        };

        self.acc.open(Delim::Pre, EntityKind::Pre { language });
        self.acc.push_str(code);
        self.acc.close(&Delim::Pre);
        self.i = next;
        true
    }

    /// `` `code` ``
    fn inline_code(&mut self) -> bool {
        let Some((code, next)) = self.scan_verbatim(self.i + 1, 1) else {
            return false;
        };
        self.acc.open(Delim::Code, EntityKind::Code);
        self.acc.push_str(&code);
        self.acc.close(&Delim::Code);
        self.i = next;
        true
    }

    /// Starts a link if `[` at the cursor has a matching `](url)`. A link
    /// inside another must end before the outer text does.
    fn open_link(&mut self) -> bool {
        let Some(close) = self.closers.get(self.i).copied().flatten() else {
            return false;
        };
        if self.at(close + 1) != Some('(') {
            return false;
        }
        let from = close + 2;
        let next = self.parens.partition_point(|&p| p < from);
        let Some(paren) = self.parens.get(next).copied() else {
            return false;
        };
        if self.links.last().is_some_and(|outer| paren >= outer.close) {
            return false;
        }

        let mut url = String::new();
        let mut k = from;
        while k < paren {
            match self.escaped(k) {
                Some(e) => {
                    url.push(e);
                    k += 2;
                }
                None => {
                    url.push(self.chars[k]);
                    k += 1;
                }
            }
        }

        let depth = self.links.len();
        self.acc.open(Delim::Link(depth), EntityKind::TextUrl { url: String::new() });
        self.links.push(PendingLink { close, end: paren + 1, url });
        self.i += 1;
        true
    }

    /// Resolves the kind of the pending link from its target and text.
    fn finish_link(&mut self) {
        let Some(link) = self.links.pop() else { return };
        let key = Delim::Link(self.links.len());
        let text = self.acc.covered(&key).unwrap_or_default();
        let url = link.url;

        let kind = if url.strip_prefix(MAILTO_PREFIX) == Some(text) {
            Some(EntityKind::Email)
        } else if url == text {
            Some(EntityKind::Url)
        } else if let Some(user_id) = decoration::mention_user_id(&url) {
            Some(EntityKind::MentionName { user_id })
        } else if let Some(id) = url.strip_prefix(EMOJI_PREFIX) {
            match id.parse() {
                Ok(document_id) if self.options.custom_emoji => {
                    Some(EntityKind::CustomEmoji { document_id })
                }
                Ok(_) => None,
                Err(_) => Some(EntityKind::TextUrl { url }),
            }
        } else {
            Some(EntityKind::TextUrl { url })
        };

        match kind {
            Some(kind) => {
                if let Some(b) = self.acc.builder_mut(&key) {
                    b.set_kind(kind);
                }
                self.acc.close(&key);
            }
            None => {
                log::trace!("[markdown] custom emoji link ignored, custom emoji disabled");
                self.acc.discard(&key);
            }
        }
        self.i = self.i.max(link.end);
    }
}

/// One pass over the source pairing every `[` with its `]` and listing the
/// unescaped `)`, so link lookahead never rescans the input.
fn link_punctuation(chars: &[char]) -> (Vec<Option<usize>>, Vec<usize>) {
    let mut closers = vec![None; chars.len()];
    let mut parens = Vec::new();
    let mut open = Vec::new();
    let mut j = 0;
    while j < chars.len() {
        match chars[j] {
            '\\' if chars.get(j + 1).is_some_and(char::is_ascii_punctuation) => j += 1,
            '[' => open.push(j),
            ']' => {
                if let Some(o) = open.pop() {
                    closers[o] = Some(j);
                }
            }
            ')' => parens.push(j),
            _ => {}
        }
        j += 1;
    }
    (closers, parens)
}

// ─── Unparsing ────────────────────────────────────────────────────────────────

/// Renders entities as Telegram-flavoured Markdown.
#[derive(Clone, Copy, Debug, Default)]
pub struct MarkdownDecoration;

impl Decoration for MarkdownDecoration {
    fn bold(&self, value: &str) -> String { format!("**{value}**") }
    fn italic(&self, value: &str) -> String { format!("__{value}__") }
    fn underline(&self, value: &str) -> String { format!("++{value}++") }
    fn strikethrough(&self, value: &str) -> String { format!("~~{value}~~") }
    fn spoiler(&self, value: &str) -> String { format!("||{value}||") }
    fn code(&self, value: &str) -> String { format!("`{value}`") }
    fn pre(&self, value: &str) -> String { format!("{FENCE}\n{value}{FENCE}") }

    fn pre_language(&self, value: &str, language: &str) -> String {
        format!("{FENCE}{}\n{value}{FENCE}", self.quote(language))
    }

    fn blockquote(&self, value: &str) -> String {
        format!("> {}{QUOTE_END}", value.replace('\n', "\n> "))
    }

    fn link(&self, value: &str, link: &str) -> String { format!("[{value}]({link})") }

    fn custom_emoji(&self, value: &str, document_id: i64) -> String {
        format!("[{value}]({EMOJI_PREFIX}{document_id})")
    }

    fn quote(&self, value: &str) -> String {
        let mut out = String::with_capacity(value.len());
        let mut line_start = true;
        for c in value.chars() {
            if ESCAPED.contains(&c) || (c == '>' && line_start) {
                out.push('\\');
            }
            out.push(c);
            line_start = c == '\n';
        }
        out
    }

    fn escape_link(&self, link: &str) -> String {
        let mut out = String::with_capacity(link.len());
        for c in link.chars() {
            if matches!(c, '\\' | '(' | ')' | '[' | ']') {
                out.push('\\');
            }
            out.push(c);
        }
        out
    }

    fn is_custom_emoji(&self, value: &str) -> bool {
        let Some(rest) = value.strip_prefix('[') else { return false };
        let Some(close) = rest.find(']') else { return false };
        rest[close + 1..]
            .strip_prefix("(emoji/")
            .and_then(|r| r.strip_suffix(')'))
            .is_some_and(|id| !id.is_empty() && id.bytes().all(|b| b.is_ascii_digit()))
    }
}

/// Renders (text, entities) as Markdown with default [`Options`].
pub fn unparse(text: &str, entities: &[MessageEntity]) -> String {
    unparse_with(text, entities, &Options::default())
}

/// Renders (text, entities) as Markdown.
///
/// Never fails: unsorted, overlapping or out-of-range entities are handled
/// as described in [`crate::unparse`].
pub fn unparse_with(text: &str, entities: &[MessageEntity], options: &Options) -> String {
    unparse::unparse(&MarkdownDecoration, text, entities, options)
}

// ─── Tests ────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_are_literal() {
        let (text, ents) = parse(r"\*\*not bold\*\* a\\b \q");
        assert_eq!(text, r"**not bold** a\b \q");
        assert!(ents.is_empty());
    }

    #[test]
    fn quote_escapes_delimiters() {
        let d = MarkdownDecoration;
        assert_eq!(d.quote("a*b_c [x] C++ > d"), r"a\*b\_c \[x\] C\+\+ > d");
        assert_eq!(d.quote("> q\n> r"), "\\> q\n\\> r");
        assert_eq!(d.quote("a << b"), r"a \<\< b");
    }

    #[test]
    fn unterminated_code_is_text() {
        let (text, ents) = parse("a `b");
        assert_eq!(text, "a `b");
        assert!(ents.is_empty());
    }

    #[test]
    fn unterminated_fence_is_text() {
        let (text, ents) = parse("```rust\nfn x");
        assert_eq!(text, "```rust\nfn x");
        assert!(ents.is_empty());
    }

    #[test]
    fn code_is_verbatim() {
        let (text, ents) = parse("`**x**` y");
        assert_eq!(text, "**x** y");
        assert_eq!(ents, vec![MessageEntity::code(0, 5)]);
    }

    #[test]
    fn fenced_block_language() {
        let (text, ents) = parse("```rust\nfn main() {}```");
        assert_eq!(text, "fn main() {}");
        assert_eq!(ents, vec![MessageEntity::pre(0, 12, "rust")]);

        let (text, ents) = parse("```inline```");
        assert_eq!(text, "inline");
        assert_eq!(ents, vec![MessageEntity::pre(0, 6, "")]);
    }

    #[test]
    fn link_kinds() {
        let (text, ents) = parse("[me](tg://user?id=42) [a@b.c](mailto:a@b.c) [x](https://x.y)");
        assert_eq!(text, "me a@b.c x");
        assert_eq!(ents, vec![
            MessageEntity::mention_name(0, 2, 42),
            MessageEntity::email(3, 5),
            MessageEntity::text_url(9, 1, "https://x.y"),
        ]);
    }

    #[test]
    fn link_without_target_is_text() {
        let (text, ents) = parse("[not a link] (x)");
        assert_eq!(text, "[not a link] (x)");
        assert!(ents.is_empty());
    }

    #[test]
    fn link_target_escapes() {
        let (text, ents) = parse(r"[w](https://en.wikipedia.org/wiki/Rust_\(language\))");
        assert_eq!(text, "w");
        assert_eq!(ents, vec![MessageEntity::text_url(0, 1, "https://en.wikipedia.org/wiki/Rust_(language)")]);
    }

    #[test]
    fn blockquote_lines() {
        let (text, ents) = parse("intro\n> first\n> second\nafter");
        assert_eq!(text, "intro\nfirst\nsecond\nafter");
        assert_eq!(ents, vec![MessageEntity::blockquote(6, 12)]);
    }

    #[test]
    fn blockquote_explicit_end() {
        let (text, ents) = parse("> quoted\n> <<after");
        assert_eq!(text, "quoted\nafter");
        assert_eq!(ents, vec![MessageEntity::blockquote(0, 7)]);

        let (text, ents) = parse("> quoted<< after");
        assert_eq!(text, "quoted after");
        assert_eq!(ents, vec![MessageEntity::blockquote(0, 6)]);

        assert_eq!(parse("a << b"), ("a << b".to_owned(), vec![]));
    }

    #[test]
    fn links_nest() {
        let (text, ents) = parse("[go [👍](emoji/5) now](https://x.y)");
        assert_eq!(text, "go 👍 now");
        assert_eq!(ents, vec![
            MessageEntity::custom_emoji(3, 2, 5),
            MessageEntity::text_url(0, 9, "https://x.y"),
        ]);
    }

    #[test]
    fn inner_link_must_end_inside_outer_text() {
        // the inner target would run past the outer `]`
        let (text, ents) = parse("[a [b](c](https://x.y)");
        assert_eq!(text, "a [b](c");
        assert_eq!(ents, vec![MessageEntity::text_url(0, 7, "https://x.y")]);
    }

    #[test]
    fn link_punctuation_skips_escapes() {
        let chars: Vec<char> = r"[a\]] \) )".chars().collect();
        let (closers, parens) = link_punctuation(&chars);
        assert_eq!(closers[0], Some(4));
        assert_eq!(parens, vec![9]);
    }

    #[test]
    fn custom_emoji_respects_options() {
        let (_, ents) = parse("[👍](emoji/5368324170671202286)");
        assert_eq!(ents, vec![MessageEntity::custom_emoji(0, 2, 5368324170671202286)]);

        let (text, ents) = parse_with("[👍](emoji/5)", &Options::without_custom_emoji());
        assert_eq!(text, "👍");
        assert!(ents.is_empty());
    }

    #[test]
    fn emoji_placeholder_detection() {
        let d = MarkdownDecoration;
        assert!(d.is_custom_emoji("[👍](emoji/5)"));
        assert!(!d.is_custom_emoji("[👍](emoji/)"));
        assert!(!d.is_custom_emoji("[👍](emoji/5) "));
        assert!(!d.is_custom_emoji("**[👍](emoji/5)**"));
    }
}
