use std::ops::ControlFlow;

use serde::Serialize;

use crate::scanner::stylesheet::{self, StyleToken, TokenType, split_value};
use crate::text::{Source, TextRange};

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssProperty {
    pub name: TextRange,
    pub value: TextRange,
    pub value_tokens: Vec<TextRange>,
    /// Start of the whitespace preceding the name
    pub before: usize,
    /// Past the terminating `;`, or the value end
    pub after: usize,
}

/// A rule block: selector through closing brace, with its body bounds.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CssSection {
    pub start: usize,
    pub end: usize,
    pub body_start: usize,
    pub body_end: usize,
    pub properties: Option<Vec<CssProperty>>,
}

/// Innermost rule block enclosing `pos` (bounds included).
pub fn get_css_section(code: &str, pos: usize, with_properties: bool) -> Option<CssSection> {
    let source = Source::new(code);
    let mut stack: Vec<StyleToken> = Vec::new();
    let mut result = None;

    stylesheet::scan(&source, |token| {
        if token.start > pos && stack.is_empty() {
            return ControlFlow::Break(());
        }

        match token.kind {
            TokenType::Selector => stack.push(token),
            TokenType::BlockEnd => {
                if let Some(selector) = stack.pop() {
                    if selector.start <= pos && pos <= token.end {
                        result = Some(CssSection {
                            start: selector.start,
                            end: token.end,
                            body_start: selector.delimiter.map_or(selector.end, |d| d + 1),
                            body_end: token.start,
                            properties: None,
                        });
                        return ControlFlow::Break(());
                    }
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });

    let mut section = result?;
    if with_properties {
        section.properties = Some(parse_properties(
            &source,
            TextRange::new(section.body_start, section.body_end),
        ));
    }
    Some(section)
}

/// Declarations directly inside `body`; nested rule blocks are skipped.
fn parse_properties(source: &Source<'_>, body: TextRange) -> Vec<CssProperty> {
    let body_source = Source::new(source.slice(body));
    let mut properties = Vec::new();
    let mut pending: Option<StyleToken> = None;
    let mut depth = 0usize;

    let shift = |token: StyleToken| StyleToken {
        start: token.start + body.start,
        end: token.end + body.start,
        delimiter: token.delimiter.map(|d| d + body.start),
        ..token
    };

    stylesheet::scan(&body_source, |token| {
        match token.kind {
            TokenType::Selector => depth += 1,
            TokenType::BlockEnd => depth = depth.saturating_sub(1),
            TokenType::PropertyName if depth == 0 => {
                let token = shift(token);
                if let Some(name) = pending.replace(token) {
                    properties.push(empty_property(source, body, name, token.start));
                }
            }
            TokenType::PropertyValue if depth == 0 => {
                if let Some(name) = pending.take() {
                    properties.push(property(source, body, name, shift(token)));
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });

    if let Some(name) = pending {
        properties.push(empty_property(source, body, name, name.end));
    }
    properties
}

fn property(source: &Source<'_>, body: TextRange, name: StyleToken, value: StyleToken) -> CssProperty {
    CssProperty {
        name: name.range(),
        value: value.range(),
        value_tokens: split_value(source.slice(value.range()), value.start),
        before: whitespace_start(source, body.start, name.start),
        after: value.delimiter.map_or(value.end, |d| d + 1),
    }
}

fn empty_property(source: &Source<'_>, body: TextRange, name: StyleToken, at: usize) -> CssProperty {
    CssProperty {
        name: name.range(),
        value: TextRange::empty(at),
        value_tokens: Vec::new(),
        before: whitespace_start(source, body.start, name.start),
        after: name.delimiter.map_or(at, |d| d + 1),
    }
}

fn whitespace_start(source: &Source<'_>, bound: usize, mut pos: usize) -> usize {
    while pos > bound {
        match source.char_before(pos) {
            Some(ch) if ch.is_whitespace() => pos -= ch.len_utf16(),
            _ => break,
        }
    }
    pos
}
