//! Stylesheet token scanner.
//!
//! Splits stylesheet source into selectors, property names, property values
//! and block ends. Nesting is not tracked here; consumers pair selectors with
//! block ends themselves.

use std::ops::ControlFlow;

use serde::Serialize;

use crate::text::{Source, TextRange};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    Selector,
    PropertyName,
    PropertyValue,
    BlockEnd,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct StyleToken {
    pub kind: TokenType,
    pub start: usize,
    pub end: usize,
    /// Position of the terminating `{` (selectors) or `;` (properties)
    pub delimiter: Option<usize>,
}

impl StyleToken {
    pub fn range(&self) -> TextRange {
        TextRange::new(self.start, self.end)
    }
}

/// Statement being accumulated between delimiters, in byte offsets.
#[derive(Default)]
struct Statement {
    start: Option<usize>,
    end: usize,
    colon: Option<usize>,
    name_end: usize,
    value_start: Option<usize>,
}

impl Statement {
    fn mark(&mut self, start: usize, end: usize) {
        if self.start.is_none() {
            self.start = Some(start);
        }
        if self.colon.is_some() && self.value_start.is_none() {
            self.value_start = Some(start);
        }
        self.end = end;
    }
}

/// Scan stylesheet `source`, invoking `callback` for each token in order.
pub fn scan<F>(source: &Source<'_>, mut callback: F)
where
    F: FnMut(StyleToken) -> ControlFlow<()>,
{
    let _ = scan_tokens(source, &mut callback);
}

fn scan_tokens<F>(source: &Source<'_>, callback: &mut F) -> ControlFlow<()>
where
    F: FnMut(StyleToken) -> ControlFlow<()>,
{
    let bytes = source.as_str().as_bytes();
    let len = bytes.len();
    let mut stmt = Statement::default();
    let mut depth = 0usize;
    let mut pos = 0;

    let emit = |callback: &mut F, kind, start: usize, end: usize, delimiter: Option<usize>| {
        callback(StyleToken {
            kind,
            start: source.to_unit(start),
            end: source.to_unit(end),
            delimiter: delimiter.map(|d| source.to_unit(d)),
        })
    };

    while pos < len {
        let b = bytes[pos];

        if b == b'/' && bytes.get(pos + 1) == Some(&b'*') {
            pos = bytes[pos + 2..]
                .windows(2)
                .position(|w| w == b"*/")
                .map_or(len, |i| pos + 2 + i + 2);
            continue;
        }

        if b.is_ascii_whitespace() {
            pos += 1;
            continue;
        }

        if b == b'"' || b == b'\'' {
            let end = skip_string(bytes, pos);
            stmt.mark(pos, end);
            pos = end;
            continue;
        }

        match b {
            b'(' | b'[' => depth += 1,
            b')' | b']' => depth = depth.saturating_sub(1),
            _ => {}
        }

        if depth > 0 || matches!(b, b')' | b']') {
            stmt.mark(pos, pos + 1);
            pos += 1;
            continue;
        }

        match b {
            b'{' => {
                let start = stmt.start.unwrap_or(pos);
                let end = if stmt.start.is_some() { stmt.end } else { pos };
                emit(&mut *callback, TokenType::Selector, start, end, Some(pos))?;
                stmt = Statement::default();
            }
            b'}' => {
                flush(&mut stmt, None, |kind, start, end, delimiter| {
                    emit(&mut *callback, kind, start, end, delimiter)
                })?;
                emit(&mut *callback, TokenType::BlockEnd, pos, pos + 1, None)?;
            }
            b';' => {
                flush(&mut stmt, Some(pos), |kind, start, end, delimiter| {
                    emit(&mut *callback, kind, start, end, delimiter)
                })?;
            }
            b':' if stmt.start.is_some() && stmt.colon.is_none() => {
                stmt.name_end = stmt.end;
                stmt.colon = Some(pos);
                stmt.end = pos + 1;
            }
            _ => stmt.mark(pos, pos + 1),
        }
        pos += 1;
    }

    flush(&mut stmt, None, |kind, start, end, delimiter| {
        emit(&mut *callback, kind, start, end, delimiter)
    })
}

/// Emit the pending statement as a property and reset it.
fn flush<E>(stmt: &mut Statement, delimiter: Option<usize>, mut emit: E) -> ControlFlow<()>
where
    E: FnMut(TokenType, usize, usize, Option<usize>) -> ControlFlow<()>,
{
    let current = std::mem::take(stmt);
    let Some(start) = current.start else {
        return ControlFlow::Continue(());
    };

    match current.colon {
        Some(colon) => {
            emit(TokenType::PropertyName, start, current.name_end, None)?;
            let value_start = current.value_start.unwrap_or(colon + 1);
            let value_end = current.end.max(value_start);
            emit(TokenType::PropertyValue, value_start, value_end, delimiter)
        }
        None => emit(TokenType::PropertyName, start, current.end, delimiter),
    }
}

fn skip_string(bytes: &[u8], pos: usize) -> usize {
    let quote = bytes[pos];
    let mut i = pos + 1;
    while i < bytes.len() {
        match bytes[i] {
            b'\\' => i += 2,
            b if b == quote => return i + 1,
            _ => i += 1,
        }
    }
    bytes.len()
}

/// Split a property value into top-level whitespace-separated fragments,
/// keeping bracketed groups and strings whole. Ranges are shifted by `offset`.
pub fn split_value(value: &str, offset: usize) -> Vec<TextRange> {
    let mut ranges = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut escaped = false;
    let mut start: Option<usize> = None;
    let mut pos = 0;

    for ch in value.chars() {
        if let Some(q) = quote {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == q {
                quote = None;
            }
        } else if ch.is_whitespace() && depth == 0 {
            if let Some(s) = start.take() {
                ranges.push(TextRange::new(offset + s, offset + pos));
            }
            pos += ch.len_utf16();
            continue;
        } else {
            match ch {
                '"' | '\'' => quote = Some(ch),
                '(' | '[' | '{' => depth += 1,
                ')' | ']' | '}' => depth = depth.saturating_sub(1),
                _ => {}
            }
        }

        if start.is_none() {
            start = Some(pos);
        }
        pos += ch.len_utf16();
    }

    if let Some(s) = start {
        ranges.push(TextRange::new(offset + s, offset + pos));
    }
    ranges
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn collect(code: &str) -> Vec<(TokenType, usize, usize, Option<usize>)> {
        let source = Source::new(code);
        let mut tokens = Vec::new();
        scan(&source, |t| {
            tokens.push((t.kind, t.start, t.end, t.delimiter));
            ControlFlow::Continue(())
        });
        tokens
    }

    #[test]
    fn scans_rule_with_property() {
        use TokenType::*;
        let tokens = collect("a {\n\tborder-top: 2px solid transparent;\n}");
        assert_eq!(
            tokens,
            vec![
                (Selector, 0, 1, Some(2)),
                (PropertyName, 5, 15, None),
                (PropertyValue, 17, 38, Some(38)),
                (BlockEnd, 40, 41, None),
            ]
        );
    }

    #[test]
    fn colons_inside_selectors_and_values() {
        use TokenType::*;
        let tokens = collect("a:hover{background:url(a:b)}");
        assert_eq!(
            tokens,
            vec![
                (Selector, 0, 7, Some(7)),
                (PropertyName, 8, 18, None),
                (PropertyValue, 19, 27, None),
                (BlockEnd, 27, 28, None),
            ]
        );
    }

    #[test]
    fn bare_name_and_empty_value() {
        use TokenType::*;
        let tokens = collect("p { foo; color: ; }");
        assert_eq!(
            tokens,
            vec![
                (Selector, 0, 1, Some(2)),
                (PropertyName, 4, 7, Some(7)),
                (PropertyName, 9, 14, None),
                (PropertyValue, 15, 15, Some(16)),
                (BlockEnd, 18, 19, None),
            ]
        );
    }

    #[test]
    fn comments_and_strings_are_opaque() {
        use TokenType::*;
        let tokens = collect("/* a{} */ b { content: \"}\"; }");
        assert_eq!(tokens[0], (Selector, 10, 11, Some(12)));
        assert_eq!(tokens[2], (PropertyValue, 23, 26, Some(26)));
        assert_eq!(tokens.len(), 4);
    }

    #[test]
    fn unterminated_statement_is_flushed_at_end() {
        use TokenType::*;
        assert_eq!(
            collect("a { color: red"),
            vec![
                (Selector, 0, 1, Some(2)),
                (PropertyName, 4, 9, None),
                (PropertyValue, 11, 14, None),
            ]
        );
    }

    #[test]
    fn break_stops_scan() {
        let source = Source::new("a{} b{} c{}");
        let mut count = 0;
        scan(&source, |_| {
            count += 1;
            if count == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(count, 2);
    }

    #[rstest]
    #[case::words("2px solid transparent", 17, vec![(17, 20), (21, 26), (27, 38)])]
    #[case::function("calc(1px + 2px) red", 0, vec![(0, 15), (16, 19)])]
    #[case::quoted("\"a b\" c", 0, vec![(0, 5), (6, 7)])]
    #[case::empty("", 4, vec![])]
    fn split_value_fragments(
        #[case] value: &str,
        #[case] offset: usize,
        #[case] expected: Vec<(usize, usize)>,
    ) {
        let expected: Vec<TextRange> = expected.into_iter().map(TextRange::from).collect();
        assert_eq!(split_value(value, offset), expected);
    }
}
