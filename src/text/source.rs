use super::TextRange;

/// A non-ASCII character: the only places where byte and UTF-16 offsets
/// drift apart.
#[derive(Clone, Copy, Debug)]
struct WideChar {
    byte: usize,
    unit: usize,
    len_utf8: usize,
    len_utf16: usize,
}

/// Source text addressed by UTF-16 code unit offsets.
///
/// Scanners walk the underlying bytes (every structural character of markup
/// and stylesheet syntax is ASCII) and report positions through this index,
/// so callers only ever see UTF-16 offsets. For ASCII-only text the index is
/// empty and conversions are the identity.
#[derive(Clone, Debug)]
pub struct Source<'a> {
    text: &'a str,
    wide: Vec<WideChar>,
    len: usize,
}

impl<'a> Source<'a> {
    pub fn new(text: &'a str) -> Self {
        let mut wide = Vec::new();
        let mut unit = 0;

        for (byte, ch) in text.char_indices() {
            if !ch.is_ascii() {
                wide.push(WideChar {
                    byte,
                    unit,
                    len_utf8: ch.len_utf8(),
                    len_utf16: ch.len_utf16(),
                });
            }
            unit += ch.len_utf16();
        }

        Self {
            text,
            wide,
            len: unit,
        }
    }

    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in UTF-16 code units
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Convert a byte offset to a UTF-16 offset.
    /// Offsets inside a multi-byte character resolve to that character's start.
    pub fn to_unit(&self, byte: usize) -> usize {
        let byte = byte.min(self.text.len());
        let idx = self.wide.partition_point(|w| w.byte <= byte);
        match idx.checked_sub(1).map(|i| self.wide[i]) {
            None => byte,
            Some(w) if byte < w.byte + w.len_utf8 => w.unit,
            Some(w) => w.unit + w.len_utf16 + (byte - w.byte - w.len_utf8),
        }
    }

    /// Convert a UTF-16 offset to a byte offset.
    /// Offsets between the halves of a surrogate pair resolve to the character start.
    pub fn to_byte(&self, unit: usize) -> usize {
        let unit = unit.min(self.len);
        let idx = self.wide.partition_point(|w| w.unit <= unit);
        match idx.checked_sub(1).map(|i| self.wide[i]) {
            None => unit,
            Some(w) if unit < w.unit + w.len_utf16 => w.byte,
            Some(w) => w.byte + w.len_utf8 + (unit - w.unit - w.len_utf16),
        }
    }

    pub fn byte_range(&self, range: TextRange) -> std::ops::Range<usize> {
        let start = self.to_byte(range.start);
        let end = self.to_byte(range.end).max(start);
        start..end
    }

    /// Substring for a UTF-16 range, clamped to the text
    pub fn slice(&self, range: TextRange) -> &'a str {
        &self.text[self.byte_range(range)]
    }

    /// Text from `unit` to the end
    pub fn tail(&self, unit: usize) -> &'a str {
        &self.text[self.to_byte(unit)..]
    }

    /// Character starting at `unit`
    pub fn char_at(&self, unit: usize) -> Option<char> {
        if unit >= self.len {
            return None;
        }
        self.tail(unit).chars().next()
    }

    /// Character ending at `unit`
    pub fn char_before(&self, unit: usize) -> Option<char> {
        self.text[..self.to_byte(unit)].chars().next_back()
    }
}

/// Length of `text` in UTF-16 code units
pub fn utf16_len(text: &str) -> usize {
    text.chars().map(char::len_utf16).sum()
}
