use std::ops::ControlFlow;

use serde::Serialize;

use crate::scanner::markup::{self, ElementType, ScannerOptions};
use crate::text::{Source, TextRange};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AttributeInfo {
    pub name: String,
    pub name_range: TextRange,
    /// Raw value, quotes and braces included
    pub value: Option<String>,
    pub value_range: Option<TextRange>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagInfo {
    pub name: String,
    pub kind: ElementType,
    pub range: TextRange,
    /// Present for open and self-closing tags only
    pub attributes: Option<Vec<AttributeInfo>>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct TagMatch {
    pub name: String,
    pub open: TextRange,
    pub close: Option<TextRange>,
}

impl TagMatch {
    /// From the open tag start to the close tag end, or the open tag end
    /// for unclosed elements
    pub fn extent(&self) -> TextRange {
        TextRange::new(self.open.start, self.close.unwrap_or(self.open).end)
    }
}

/// Tag whose range strictly contains `pos`.
pub fn get_tag(code: &str, pos: usize) -> Option<TagInfo> {
    let source = Source::new(code);
    let mut found = None;

    markup::scan(&source, &ScannerOptions::default(), |token| {
        if token.range().straddles(pos) {
            found = Some(token);
            return ControlFlow::Break(());
        }
        if token.end > pos {
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });

    let token = found?;
    let attributes = token
        .kind
        .is_opening()
        .then(|| tag_attributes(&source, token.range(), token.name));

    Some(TagInfo {
        name: token.name.to_string(),
        kind: token.kind,
        range: token.range(),
        attributes,
    })
}

/// Attributes of the tag at `range`, in document coordinates.
pub(crate) fn tag_attributes(source: &Source<'_>, range: TextRange, name: &str) -> Vec<AttributeInfo> {
    markup::attributes(source.slice(range), Some(name))
        .into_iter()
        .map(|attr| AttributeInfo {
            name: attr.name,
            name_range: attr.name_range.shift(range.start),
            value: attr.value,
            value_range: attr.value_range.map(|r| r.shift(range.start)),
        })
        .collect()
}

/// Range of an attribute value without its quotes or JSX braces.
pub fn unquoted_value_range(value: &str, range: TextRange) -> TextRange {
    let bytes = value.as_bytes();
    let quoted = match (bytes.first(), bytes.last()) {
        (Some(b'"'), Some(b'"')) | (Some(b'\''), Some(b'\'')) => true,
        (Some(b'{'), Some(b'}')) => true,
        _ => false,
    };
    if quoted && bytes.len() >= 2 {
        TextRange::new(range.start + 1, range.end - 1)
    } else if matches!(bytes.first(), Some(b'"' | b'\'')) {
        // unterminated quote
        TextRange::new((range.start + 1).min(range.end), range.end)
    } else {
        range
    }
}

/// Pair open and close tags of `code` in document order of their open tags.
pub fn get_tag_matches(code: &str, options: &ScannerOptions) -> Vec<TagMatch> {
    let source = Source::new(code);
    let mut matches: Vec<TagMatch> = Vec::new();
    let mut stack: Vec<usize> = Vec::new();

    markup::scan(&source, options, |token| {
        match token.kind {
            ElementType::Open => {
                matches.push(TagMatch {
                    name: token.name.to_string(),
                    open: token.range(),
                    close: None,
                });
                if !options.is_self_close(token.name) {
                    stack.push(matches.len() - 1);
                }
            }
            ElementType::SelfClose => matches.push(TagMatch {
                name: token.name.to_string(),
                open: token.range(),
                close: None,
            }),
            ElementType::Close => {
                while let Some(idx) = stack.pop() {
                    if options.names_match(&matches[idx].name, token.name) {
                        matches[idx].close = Some(token.range());
                        break;
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });

    matches
}

/// Innermost element whose extent contains `pos`.
pub fn find_tag_match(code: &str, pos: usize, options: &ScannerOptions) -> Option<TagMatch> {
    let mut result = None;
    for tag in get_tag_matches(code, options) {
        if tag.open.start > pos {
            break;
        }
        if tag.extent().straddles(pos) {
            result = Some(tag);
        }
    }
    result
}
