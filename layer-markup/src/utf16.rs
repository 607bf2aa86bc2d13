//! UTF-16 code-unit arithmetic.
//!
//! Telegram measures entity offsets and lengths in UTF-16 code units, while
//! Rust strings are UTF-8. Every scalar above U+FFFF (most emoji) takes two
//! units: a high surrogate (`0xD800..=0xDBFF`) followed by a low surrogate
//! (`0xDC00..=0xDFFF`).

/// Encodes `text` as UTF-16 code units.
pub fn encode(text: &str) -> Vec<u16> {
    text.encode_utf16().collect()
}

/// Decodes UTF-16 code units back into a string.
///
/// A lone surrogate becomes U+FFFD; sequences produced by [`encode`] always
/// decode to the original text.
pub fn decode(units: &[u16]) -> String {
    String::from_utf16_lossy(units)
}

/// The length of a string, according to Telegram.
pub fn len(text: &str) -> i32 {
    i32::try_from(text.encode_utf16().count()).unwrap_or(i32::MAX)
}

fn is_high_surrogate(unit: u16) -> bool { (0xD800..=0xDBFF).contains(&unit) }
fn is_low_surrogate(unit: u16)  -> bool { (0xDC00..=0xDFFF).contains(&unit) }

/// `true` if `index` falls between the two halves of a surrogate pair.
pub fn within_surrogate(units: &[u16], index: usize) -> bool {
    index > 0
        && index < units.len()
        && is_high_surrogate(units[index - 1])
        && is_low_surrogate(units[index])
}

/// A string held as UTF-16 code units, sliceable by code-unit position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Utf16Text {
    units: Vec<u16>,
}

impl Utf16Text {
    /// Encodes `text`.
    pub fn new(text: &str) -> Self {
        Self { units: encode(text) }
    }

    /// Number of code units.
    pub fn len(&self) -> usize { self.units.len() }

    /// `true` for the empty string.
    pub fn is_empty(&self) -> bool { self.units.is_empty() }

    /// The raw code units.
    pub fn units(&self) -> &[u16] { &self.units }

    /// Moves `index` onto a scalar boundary inside the buffer.
    ///
    /// Positions past the end clamp to the end; a position splitting a
    /// surrogate pair moves forward past the low half.
    pub fn boundary(&self, index: usize) -> usize {
        let index = index.min(self.units.len());
        if within_surrogate(&self.units, index) { index + 1 } else { index }
    }

    /// Decodes `[start, end)`, both ends moved with [`Self::boundary`].
    ///
    /// Slicing consecutive ranges `[a, b)`, `[b, c)` yields the same text as
    /// `[a, c)`: nothing is duplicated or dropped.
    pub fn slice(&self, start: usize, end: usize) -> String {
        let start = self.boundary(start);
        let end = self.boundary(end);
        if start >= end {
            return String::new();
        }
        decode(&self.units[start..end])
    }
}

impl From<&str> for Utf16Text {
    fn from(text: &str) -> Self { Self::new(text) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bmp_is_one_unit_each() {
        assert_eq!(encode("abc"), vec![0x61, 0x62, 0x63]);
        assert_eq!(len("héllo"), 5);
    }

    #[test]
    fn astral_is_a_surrogate_pair() {
        // U+1F3C6 TROPHY
        assert_eq!(encode("🏆"), vec![0xD83C, 0xDFC6]);
        assert_eq!(decode(&[0xD83C, 0xDFC6]), "🏆");
        assert_eq!(len("🏆x"), 3);
    }

    #[test]
    fn gear_with_variation_selector_is_two_units() {
        assert_eq!(len("⚙️"), 2);
    }

    #[test]
    fn detects_split_points() {
        let units = encode("a🏆b");
        assert!(!within_surrogate(&units, 0));
        assert!(!within_surrogate(&units, 1));
        assert!(within_surrogate(&units, 2));
        assert!(!within_surrogate(&units, 3));
        assert!(!within_surrogate(&units, 99));
    }

    #[test]
    fn slice_never_splits_a_pair() {
        let t = Utf16Text::new("a🏆b");
        assert_eq!(t.slice(0, 2), "a🏆");
        assert_eq!(t.slice(2, 4), "b");
        assert_eq!(t.slice(1, 3), "🏆");
        assert_eq!(t.slice(3, 100), "b");
        assert_eq!(t.slice(4, 1), "");
    }

    #[test]
    fn lone_surrogate_is_replaced() {
        assert_eq!(decode(&[0xD83C]), "\u{FFFD}");
    }
}
