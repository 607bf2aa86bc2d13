//! Whitespace trimming that keeps entity spans consistent.

use crate::entity::MessageEntity;
use crate::utf16;

/// Trims leading and trailing whitespace from `text`, shifting and clipping
/// `entities` so they keep covering the same characters.
///
/// Zero-length entities, and entities that end up entirely inside the
/// removed whitespace, are dropped. Relative order is preserved.
pub fn strip_text(text: &str, entities: &mut Vec<MessageEntity>) -> String {
    if entities.is_empty() {
        return text.trim().to_owned();
    }

    let trimmed_start = text.trim_start();
    let left_offset = utf16::len(&text[..text.len() - trimmed_start.len()]);
    let trimmed = trimmed_start.trim_end();
    let len_final = utf16::len(trimmed);

    let before = entities.len();
    entities.retain_mut(|e| {
        if e.length <= 0 {
            return false;
        }

        if e.end() <= left_offset {
            return false;
        }
        if e.offset >= left_offset {
            e.offset -= left_offset;
        } else {
            e.length = e.end() - left_offset;
            e.offset = 0;
        }

        if e.end() <= len_final {
            return true;
        }
        if e.offset >= len_final {
            return false;
        }
        e.length = len_final - e.offset;
        true
    });

    if entities.len() != before {
        log::trace!("[strip] dropped {} entities outside the trimmed text", before - entities.len());
    }

    trimmed.to_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_entities_plain_trim() {
        let mut ents = Vec::new();
        assert_eq!(strip_text("  hi \n", &mut ents), "hi");
    }

    #[test]
    fn shifts_past_leading_whitespace() {
        let mut ents = vec![MessageEntity::bold(2, 5)];
        assert_eq!(strip_text("  Hello", &mut ents), "Hello");
        assert_eq!(ents, vec![MessageEntity::bold(0, 5)]);
    }

    #[test]
    fn clips_entity_straddling_the_prefix() {
        let mut ents = vec![MessageEntity::italic(1, 6)];
        assert_eq!(strip_text("   abcd", &mut ents), "abcd");
        assert_eq!(ents, vec![MessageEntity::italic(0, 4)]);
    }

    #[test]
    fn clips_entity_straddling_the_suffix() {
        let mut ents = vec![MessageEntity::code(1, 10)];
        assert_eq!(strip_text("abc   ", &mut ents), "abc");
        assert_eq!(ents, vec![MessageEntity::code(1, 2)]);
    }

    #[test]
    fn drops_empty_and_whitespace_only_entities() {
        let mut ents = vec![
            MessageEntity::bold(0, 2),
            MessageEntity::italic(2, 0),
            MessageEntity::underline(2, 1),
            MessageEntity::strike(5, 2),
        ];
        assert_eq!(strip_text("  x  ", &mut ents), "x");
        assert_eq!(ents, vec![MessageEntity::underline(0, 1)]);
    }

    #[test]
    fn offsets_use_utf16_units() {
        // the emoji is two units; trailing whitespace must not affect it
        let mut ents = vec![MessageEntity::bold(1, 2)];
        assert_eq!(strip_text(" 🏆 ", &mut ents), "🏆");
        assert_eq!(ents, vec![MessageEntity::bold(0, 2)]);
    }
}
