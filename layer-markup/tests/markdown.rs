use layer_markup::{markdown, MessageEntity, Options};
use pretty_assertions::assert_eq;

const CHALLENGE: &str = "Telegram Official Android Challenge is over";

fn roundtrip(markup: &str) {
    let (text, entities) = markdown::parse(markup);
    assert_eq!(markdown::unparse(&text, &entities), markup, "entities: {entities:?}");
}

// ─── Reference cases ──────────────────────────────────────────────────────────

#[test]
fn entity_edges() {
    let entities = [MessageEntity::bold(0, 5), MessageEntity::bold(7, 5)];
    assert_eq!(markdown::unparse("Hello, world", &entities), "**Hello**, **world**");
}

#[test]
fn malformed_entities() {
    let text = format!("🏆{CHALLENGE}🏆.");
    let entities = [MessageEntity::text_url(2, 43, "https://example.com")];
    assert_eq!(
        markdown::unparse(&text, &entities),
        format!("🏆[{CHALLENGE}](https://example.com)🏆.")
    );
}

#[test]
fn trailing_malformed_entities() {
    let text = format!("🏆{CHALLENGE}🏆");
    let entities = [MessageEntity::text_url(2, 43, "https://example.com")];
    assert_eq!(
        markdown::unparse(&text, &entities),
        format!("🏆[{CHALLENGE}](https://example.com)🏆")
    );
}

#[test]
fn entities_together() {
    let original = "**⚙️**__Settings__";
    let (text, entities) = markdown::parse(original);
    assert_eq!(text, "⚙️Settings");
    assert_eq!(entities, vec![MessageEntity::bold(0, 2), MessageEntity::italic(2, 8)]);
    assert_eq!(markdown::unparse(&text, &entities), original);
}

#[test]
fn offset_at_emoji() {
    let text = "Hi\n👉 See example";
    let entities = vec![
        MessageEntity::bold(0, 2),
        MessageEntity::italic(3, 2),
        MessageEntity::bold(10, 7),
    ];
    let markup = "**Hi**\n__👉__ See **example**";

    assert_eq!(markdown::parse(markup), (text.to_owned(), entities.clone()));
    assert_eq!(markdown::unparse(text, &entities), markup);
}

// ─── Parsing ──────────────────────────────────────────────────────────────────

#[test]
fn every_toggle() {
    let (text, entities) = markdown::parse("**b** __i__ ++u++ ~~s~~ ||p|| `c`");
    assert_eq!(text, "b i u s p c");
    assert_eq!(entities, vec![
        MessageEntity::bold(0, 1),
        MessageEntity::italic(2, 1),
        MessageEntity::underline(4, 1),
        MessageEntity::strike(6, 1),
        MessageEntity::spoiler(8, 1),
        MessageEntity::code(10, 1),
    ]);
}

#[test]
fn nesting() {
    let (text, entities) = markdown::parse("**a __b__**");
    assert_eq!(text, "a b");
    assert_eq!(entities, vec![MessageEntity::italic(2, 1), MessageEntity::bold(0, 3)]);
    assert_eq!(markdown::unparse(&text, &entities), "**a __b__**");
}

#[test]
fn unclosed_delimiter_yields_no_entity() {
    assert_eq!(markdown::parse("**bold"), ("bold".to_owned(), vec![]));
    assert_eq!(markdown::parse("a * b _ c"), ("a * b _ c".to_owned(), vec![]));
}

#[test]
fn single_characters_are_text() {
    let (text, entities) = markdown::parse("2*3 = 6 and a_b");
    assert_eq!(text, "2*3 = 6 and a_b");
    assert!(entities.is_empty());
}

#[test]
fn delimiters_inside_code_are_literal() {
    let (text, entities) = markdown::parse("**bold `**not**` still**");
    assert_eq!(text, "bold **not** still");
    assert_eq!(entities, vec![MessageEntity::code(5, 7), MessageEntity::bold(0, 18)]);
}

#[test]
fn link_kinds() {
    let (text, entities) = markdown::parse(concat!(
        "[site](https://x.y) ",
        "[https://x.y](https://x.y) ",
        "[me@x.y](mailto:me@x.y) ",
        "[Bob](tg://user?id=42) ",
        "[👍](emoji/5)",
    ));
    assert_eq!(text, "site https://x.y me@x.y Bob 👍");
    assert_eq!(entities, vec![
        MessageEntity::text_url(0, 4, "https://x.y"),
        MessageEntity::url(5, 11),
        MessageEntity::email(17, 6),
        MessageEntity::mention_name(24, 3, 42),
        MessageEntity::custom_emoji(28, 2, 5),
    ]);
}

#[test]
fn formatting_inside_link_text() {
    let (text, entities) = markdown::parse("[**bold** link](https://x.y)");
    assert_eq!(text, "bold link");
    assert_eq!(entities, vec![
        MessageEntity::bold(0, 4),
        MessageEntity::text_url(0, 9, "https://x.y"),
    ]);
}

#[test]
fn links_nest_inside_link_text() {
    let markup = "[go [👍](emoji/5) now](https://x.y)";
    let (text, entities) = markdown::parse(markup);
    assert_eq!(text, "go 👍 now");
    assert_eq!(entities, vec![
        MessageEntity::custom_emoji(3, 2, 5),
        MessageEntity::text_url(0, 9, "https://x.y"),
    ]);
    assert_eq!(markdown::unparse(&text, &entities), markup);

    let (text, entities) = markdown::parse("[[me](tg://user?id=1) and [you](https://y.z)](https://x.y)");
    assert_eq!(text, "me and you");
    assert_eq!(entities, vec![
        MessageEntity::mention_name(0, 2, 1),
        MessageEntity::text_url(7, 3, "https://y.z"),
        MessageEntity::text_url(0, 10, "https://x.y"),
    ]);
}

#[test]
fn brackets_without_target_are_text() {
    assert_eq!(markdown::parse("[a] [b](c"), ("[a] [b](c".to_owned(), vec![]));
}

#[test]
fn blockquote_spans_prefixed_lines() {
    let (text, entities) = markdown::parse("> one\n> **two**\nthree");
    assert_eq!(text, "one\ntwo\nthree");
    assert_eq!(entities, vec![MessageEntity::bold(4, 3), MessageEntity::blockquote(0, 7)]);
}

#[test]
fn blockquote_ending_on_a_newline_roundtrips() {
    let text = "quoted\nafter";
    let entities = vec![MessageEntity::blockquote(0, 7)];
    let markup = markdown::unparse(text, &entities);
    assert_eq!(markup, "> quoted\n> <<after");
    assert_eq!(markdown::parse(&markup), (text.to_owned(), entities));
}

#[test]
fn blockquote_ending_mid_line_roundtrips() {
    let text = "quoted after";
    let entities = vec![MessageEntity::blockquote(0, 6)];
    let markup = markdown::unparse(text, &entities);
    assert_eq!(markup, "> quoted<< after");
    assert_eq!(markdown::parse(&markup), (text.to_owned(), entities));
}

#[test]
fn blockquote_without_end_marker_closes_at_plain_line() {
    let (text, entities) = markdown::parse("> a\n> b\nc");
    assert_eq!(text, "a\nb\nc");
    assert_eq!(entities, vec![MessageEntity::blockquote(0, 3)]);
}

#[test]
fn whitespace_is_stripped() {
    let (text, entities) = markdown::parse("\n  ** hi **\n");
    assert_eq!(text, "hi");
    assert_eq!(entities, vec![MessageEntity::bold(0, 2)]);
}

#[test]
fn custom_emoji_option() {
    let off = Options::without_custom_emoji();
    assert_eq!(markdown::parse_with("[👍](emoji/5)", &off), ("👍".to_owned(), vec![]));

    let entities = [MessageEntity::custom_emoji(0, 2, 5)];
    assert_eq!(markdown::unparse_with("👍", &entities, &off), "👍");
    assert_eq!(markdown::unparse("👍", &entities), "[👍](emoji/5)");
}

// ─── Unparsing ────────────────────────────────────────────────────────────────

#[test]
fn roundtrip_every_kind() {
    roundtrip("**b** __i__ ++u++ ~~s~~ ||p|| `c`");
    roundtrip("```rust\nfn main() {}```");
    roundtrip("```\nno language```");
    roundtrip("> quoted\n> twice<<");
    roundtrip("[link](https://x.y/wiki/A_\\(b\\))");
    roundtrip("[https://x.y](https://x.y)");
    roundtrip("[me@x.y](mailto:me@x.y)");
    roundtrip("[Bob](tg://user?id=7)");
    roundtrip("[🙂](emoji/1)");
}

#[test]
fn plain_text_is_escaped() {
    let text = "2*3 = 6_ [x] C++ ~ | `tick` << \\";
    let markup = markdown::unparse(text, &[]);
    assert_eq!(markup, "2\\*3 = 6\\_ \\[x\\] C\\+\\+ \\~ \\| \\`tick\\` \\<\\< \\\\");
    assert_eq!(markdown::parse(&markup), (text.to_owned(), vec![]));
}

#[test]
fn leading_quote_marker_is_escaped() {
    let text = "> not a quote";
    let markup = markdown::unparse(text, &[]);
    assert_eq!(markup, "\\> not a quote");
    assert_eq!(markdown::parse(&markup).0, text);
}

#[test]
fn code_content_roundtrips() {
    let text = "let x = a_b * `c`;";
    let entities = vec![MessageEntity::code(0, 18)];
    let markup = markdown::unparse(text, &entities);
    assert_eq!(markdown::parse(&markup), (text.to_owned(), entities));
}

#[test]
fn link_targets_escape_brackets() {
    let entities = vec![MessageEntity::text_url(0, 4, "https://x.y/[a](b)")];
    let markup = markdown::unparse("docs", &entities);
    assert_eq!(markup, "[docs](https://x.y/\\[a\\]\\(b\\))");
    assert_eq!(markdown::parse(&markup), ("docs".to_owned(), entities));
}

#[test]
fn overlapping_entities_are_clipped() {
    let entities = [MessageEntity::bold(0, 3), MessageEntity::italic(2, 2)];
    assert_eq!(markdown::unparse("abcd", &entities), "**ab__c__**d");
}
