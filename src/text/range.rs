use serde::{Deserialize, Serialize};

/// Half-open `[start, end)` range of UTF-16 code units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextRange {
    pub start: usize,
    pub end: usize,
}

impl TextRange {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Zero-width range at `pos`
    pub const fn empty(pos: usize) -> Self {
        Self {
            start: pos,
            end: pos,
        }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    /// Check whether `pos` lies within the range, both bounds included.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Check whether `pos` lies strictly between the bounds.
    pub fn straddles(&self, pos: usize) -> bool {
        self.start < pos && pos < self.end
    }

    /// Move both bounds forward by `offset`
    pub fn shift(self, offset: usize) -> Self {
        Self {
            start: self.start + offset,
            end: self.end + offset,
        }
    }
}

impl From<(usize, usize)> for TextRange {
    fn from((start, end): (usize, usize)) -> Self {
        Self::new(start, end)
    }
}

/// Result of a select-item command: the overall unit plus the nested ranges
/// a caller cycles through, coarsest first.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct SelectItemModel {
    pub start: usize,
    pub end: usize,
    pub ranges: Vec<TextRange>,
}

impl SelectItemModel {
    pub fn new(start: usize, end: usize) -> Self {
        Self {
            start,
            end,
            ranges: Vec::new(),
        }
    }

    pub fn push(&mut self, range: TextRange) {
        push_range(&mut self.ranges, range);
    }
}

/// Append `range` unless it is empty or equal to the last pushed range.
pub fn push_range(ranges: &mut Vec<TextRange>, range: TextRange) {
    if range.is_empty() {
        return;
    }
    if ranges.last() == Some(&range) {
        return;
    }
    ranges.push(range);
}

/// Ranges of whitespace-separated runs in `value`, shifted by `offset`.
pub fn token_list(value: &str, offset: usize) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    let mut start = None;
    let mut pos = 0;

    for ch in value.chars() {
        if ch.is_whitespace() {
            if let Some(token_start) = start.take() {
                ranges.push(TextRange::new(offset + token_start, offset + pos));
            }
        } else if start.is_none() {
            start = Some(pos);
        }
        pos += ch.len_utf16();
    }

    if let Some(token_start) = start {
        ranges.push(TextRange::new(offset + token_start, offset + pos));
    }

    ranges
}
