//! Markup tag scanner.
//!
//! Reports tag tokens in document order through a callback; the callback
//! returns `ControlFlow::Break` to stop scanning. Also provides the attribute
//! parser used on a single tag's source.

use std::ops::ControlFlow;

use serde::Serialize;

use crate::config::defaults::{DEFAULT_EMPTY_ELEMENTS, DEFAULT_SPECIAL_ELEMENTS};
use crate::text::{Source, TextRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ElementType {
    Open,
    Close,
    SelfClose,
    Comment,
    CData,
    ProcessingInstruction,
}

impl ElementType {
    /// Open or self-closing tag, i.e. a tag that may carry attributes
    pub fn is_opening(self) -> bool {
        matches!(self, ElementType::Open | ElementType::SelfClose)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScannerOptions {
    /// XML dialect: no void elements, no raw-text elements
    pub xml: bool,
    /// Elements whose content is raw text skipped up to the closing tag
    pub special: Vec<String>,
    /// Void element names, consulted by consumers through `is_self_close`
    pub empty: Vec<String>,
    /// Also report comments, CDATA sections and processing instructions
    pub all_tokens: bool,
}

impl Default for ScannerOptions {
    fn default() -> Self {
        Self {
            xml: false,
            special: DEFAULT_SPECIAL_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
            empty: DEFAULT_EMPTY_ELEMENTS.iter().map(|s| s.to_string()).collect(),
            all_tokens: false,
        }
    }
}

impl ScannerOptions {
    pub fn xml() -> Self {
        Self {
            xml: true,
            ..Self::default()
        }
    }

    /// Whether an open tag named `name` never gets a closing tag
    pub fn is_self_close(&self, name: &str) -> bool {
        !self.xml && self.empty.iter().any(|e| e.eq_ignore_ascii_case(name))
    }

    fn is_special(&self, name: &str) -> bool {
        !self.xml && self.special.iter().any(|e| e.eq_ignore_ascii_case(name))
    }

    /// Tag name comparison for the active dialect
    pub fn names_match(&self, a: &str, b: &str) -> bool {
        if self.xml {
            a == b
        } else {
            a.eq_ignore_ascii_case(b)
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MarkupToken<'a> {
    pub name: &'a str,
    pub kind: ElementType,
    pub start: usize,
    pub end: usize,
}

impl MarkupToken<'_> {
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }
}

/// Attribute of a single tag; ranges are relative to the tag source.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeToken {
    pub name: String,
    /// Raw value: quotes and JSX braces are kept
    pub value: Option<String>,
    pub name_range: TextRange,
    pub value_range: Option<TextRange>,
}

const SECTIONS: [(&[u8], &[u8], ElementType, &str); 3] = [
    (b"<!--", b"-->", ElementType::Comment, "#comment"),
    (b"<![CDATA[", b"]]>", ElementType::CData, "#cdata"),
    (b"<?", b"?>", ElementType::ProcessingInstruction, "#pi"),
];

/// Scan `source` for tags, invoking `callback` for each token in order.
pub fn scan<'a, F>(source: &Source<'a>, options: &ScannerOptions, mut callback: F)
where
    F: FnMut(MarkupToken<'a>) -> ControlFlow<()>,
{
    let text = source.as_str();
    let bytes = text.as_bytes();
    let len = bytes.len();
    let mut pos = 0;

    let token = |name: &'a str, kind: ElementType, start: usize, end: usize| MarkupToken {
        name,
        kind,
        start: source.to_unit(start),
        end: source.to_unit(end),
    };

    while pos < len {
        let Some(offset) = bytes[pos..].iter().position(|&b| b == b'<') else {
            break;
        };
        let start = pos + offset;
        let rest = &bytes[start..];

        if let Some(&(open, close, kind, name)) = SECTIONS
            .iter()
            .find(|(open, _, _, _)| rest.starts_with(open))
        {
            let end = find(bytes, start + open.len(), close).map_or(len, |i| i + close.len());
            if options.all_tokens && callback(token(name, kind, start, end)).is_break() {
                return;
            }
            pos = end;
            continue;
        }

        let Some(tag) = read_tag(bytes, start) else {
            pos = start + 1;
            continue;
        };

        let name = &text[tag.name_start..tag.name_end];
        if callback(token(name, tag.kind, start, tag.end)).is_break() {
            return;
        }
        pos = tag.end;

        if tag.kind == ElementType::Open && options.is_special(name) {
            match find_closing_tag(bytes, pos, name.as_bytes()) {
                Some((close_start, close_end)) => {
                    let close = token(name, ElementType::Close, close_start, close_end);
                    if callback(close).is_break() {
                        return;
                    }
                    pos = close_end;
                }
                None => pos = len,
            }
        }
    }
}

/// Parse the attributes of a single tag. When `name` is given, the leading
/// `<name` is skipped without re-reading the name.
pub fn attributes(tag: &str, name: Option<&str>) -> Vec<AttributeToken> {
    let source = Source::new(tag);
    let bytes = tag.as_bytes();
    let len = bytes.len();
    let mut result = Vec::new();

    let mut pos = 0;
    if bytes.first() == Some(&b'<') {
        pos = 1;
        match name {
            Some(name) if bytes[pos..].starts_with(name.as_bytes()) => pos += name.len(),
            _ => {
                while pos < len && is_name_char(bytes[pos]) {
                    pos += 1;
                }
            }
        }
    }

    let range = |start: usize, end: usize| TextRange::new(source.to_unit(start), source.to_unit(end));

    loop {
        pos = skip_spaces(bytes, pos);
        let Some(&b) = bytes.get(pos) else {
            break;
        };
        if b == b'>' || (b == b'/' && matches!(bytes.get(pos + 1), None | Some(b'>'))) {
            break;
        }

        let name_start = pos;
        let name_end = if b == b'{' {
            skip_expression(bytes, pos)
        } else {
            skip_attribute_name(bytes, pos)
        };
        if name_end == name_start {
            pos += 1;
            continue;
        }

        let mut attr = AttributeToken {
            name: tag[name_start..name_end].to_string(),
            value: None,
            name_range: range(name_start, name_end),
            value_range: None,
        };
        pos = name_end;

        let eq = skip_spaces(bytes, pos);
        if bytes.get(eq) == Some(&b'=') {
            let value_start = skip_spaces(bytes, eq + 1);
            let value_end = match bytes.get(value_start) {
                Some(b'"' | b'\'') => skip_quoted(bytes, value_start),
                Some(b'{') => skip_expression(bytes, value_start),
                Some(b'>') | None => value_start,
                Some(_) => skip_unquoted_value(bytes, value_start),
            };
            attr.value = Some(tag[value_start..value_end].to_string());
            attr.value_range = Some(range(value_start, value_end));
            pos = value_end;
        }

        result.push(attr);
    }

    result
}

struct RawTag {
    kind: ElementType,
    name_start: usize,
    name_end: usize,
    end: usize,
}

fn read_tag(bytes: &[u8], start: usize) -> Option<RawTag> {
    let mut pos = start + 1;
    let mut kind = ElementType::Open;
    if bytes.get(pos) == Some(&b'/') {
        kind = ElementType::Close;
        pos += 1;
    }

    let name_start = pos;
    if !bytes.get(pos).is_some_and(u8::is_ascii_alphabetic) {
        return None;
    }
    while pos < bytes.len() && is_name_char(bytes[pos]) {
        pos += 1;
    }
    let name_end = pos;

    if kind == ElementType::Close {
        pos = skip_spaces(bytes, pos);
    } else {
        pos = skip_attributes(bytes, pos);
        if bytes.get(pos) == Some(&b'/') {
            kind = ElementType::SelfClose;
            pos += 1;
        }
    }

    (bytes.get(pos) == Some(&b'>')).then_some(RawTag {
        kind,
        name_start,
        name_end,
        end: pos + 1,
    })
}

fn skip_attributes(bytes: &[u8], mut pos: usize) -> usize {
    loop {
        pos = skip_spaces(bytes, pos);
        match bytes.get(pos) {
            None | Some(b'>' | b'<') => return pos,
            Some(b'/') if bytes.get(pos + 1) == Some(&b'>') => return pos,
            Some(b'"' | b'\'') => pos = skip_quoted(bytes, pos),
            Some(b'{') => pos = skip_expression(bytes, pos),
            Some(b'=') => pos += 1,
            Some(_) => {
                let next = skip_unquoted_value(bytes, pos);
                pos = if next == pos { pos + 1 } else { next };
            }
        }
    }
}

fn skip_attribute_name(bytes: &[u8], mut pos: usize) -> usize {
    while let Some(&b) = bytes.get(pos) {
        if b.is_ascii_whitespace() || matches!(b, b'=' | b'>' | b'<' | b'"' | b'\'' | b'{') {
            break;
        }
        if b == b'/' && matches!(bytes.get(pos + 1), None | Some(b'>')) {
            break;
        }
        pos += 1;
    }
    pos
}

fn skip_unquoted_value(bytes: &[u8], mut pos: usize) -> usize {
    while let Some(&b) = bytes.get(pos) {
        if b.is_ascii_whitespace() || matches!(b, b'>' | b'<' | b'"' | b'\'' | b'=') {
            break;
        }
        if b == b'/' && bytes.get(pos + 1) == Some(&b'>') {
            break;
        }
        pos += 1;
    }
    pos
}

/// Skip a quoted string starting at `pos`; unterminated strings run to the end.
fn skip_quoted(bytes: &[u8], pos: usize) -> usize {
    let quote = bytes[pos];
    match bytes[pos + 1..].iter().position(|&b| b == quote) {
        Some(i) => pos + 1 + i + 1,
        None => bytes.len(),
    }
}

/// Skip a `{...}` expression with nested braces and strings.
fn skip_expression(bytes: &[u8], mut pos: usize) -> usize {
    let mut depth = 0usize;
    while let Some(&b) = bytes.get(pos) {
        match b {
            b'"' | b'\'' | b'`' => {
                pos = skip_quoted(bytes, pos);
                continue;
            }
            b'{' => depth += 1,
            b'}' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return pos + 1;
                }
            }
            _ => {}
        }
        pos += 1;
    }
    pos
}

fn skip_spaces(bytes: &[u8], mut pos: usize) -> usize {
    while bytes.get(pos).is_some_and(u8::is_ascii_whitespace) {
        pos += 1;
    }
    pos
}

fn is_name_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || matches!(b, b'-' | b'_' | b':' | b'.') || b >= 0x80
}

fn find(bytes: &[u8], from: usize, needle: &[u8]) -> Option<usize> {
    if from > bytes.len() {
        return None;
    }
    bytes[from..]
        .windows(needle.len())
        .position(|w| w == needle)
        .map(|i| from + i)
}

/// Locate `</name>` at or after `from`, returning its byte bounds.
fn find_closing_tag(bytes: &[u8], from: usize, name: &[u8]) -> Option<(usize, usize)> {
    let mut pos = from;
    while let Some(start) = find(bytes, pos, b"</") {
        let name_start = start + 2;
        let name_end = name_start + name.len();
        if bytes.len() >= name_end
            && bytes[name_start..name_end].eq_ignore_ascii_case(name)
            && !bytes.get(name_end).copied().is_some_and(is_name_char)
        {
            let close = skip_spaces(bytes, name_end);
            if bytes.get(close) == Some(&b'>') {
                return Some((start, close + 1));
            }
        }
        pos = start + 2;
    }
    None
}
