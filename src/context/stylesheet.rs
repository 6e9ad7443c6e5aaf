use std::ops::ControlFlow;

use crate::scanner::stylesheet::{self, StyleToken, TokenType};
use crate::text::Source;

use super::{StylesheetContext, StylesheetItem};

/// Ancestor trace of stylesheet tokens around `pos`.
///
/// Selectors and property names open a frame; property values and block
/// ends close one. The frame kind is not checked on close.
///
/// The scanner reports a declaration without `:` as a lone property name.
/// Such a name is skipped when its `;` lies before `pos`, and otherwise
/// leaves the stack as soon as a token other than its value follows.
pub fn get_css_context(code: &str, pos: usize) -> StylesheetContext {
    let source = Source::new(code);
    let mut stack: Vec<StyleToken> = Vec::new();
    let mut current = None;
    // top frame is a property name still waiting for its value
    let mut pending_name = false;

    stylesheet::scan(&source, |token| {
        if token.start >= pos {
            return ControlFlow::Break(());
        }
        if pending_name && token.kind != TokenType::PropertyValue {
            stack.pop();
        }
        pending_name = false;

        // a caret right after a token still belongs to it
        if pos <= token.end {
            current = Some(token);
            return ControlFlow::Break(());
        }

        match token.kind {
            TokenType::PropertyName if token.delimiter.is_some_and(|d| d < pos) => {}
            TokenType::PropertyName => {
                stack.push(token);
                pending_name = true;
            }
            TokenType::Selector => stack.push(token),
            TokenType::PropertyValue | TokenType::BlockEnd => {
                stack.pop();
            }
        }
        ControlFlow::Continue(())
    });

    let item = |token: StyleToken| StylesheetItem {
        name: source.slice(token.range()).to_string(),
        kind: token.kind,
        range: token.range(),
    };

    log::trace!(
        target: "tagwise::context",
        "stylesheet context at {}: {} ancestors, current {:?}",
        pos,
        stack.len(),
        current.map(|t: StyleToken| t.kind)
    );

    StylesheetContext {
        ancestors: stack.into_iter().map(&item).collect(),
        current: current.map(item),
        inline: false,
        embedded: None,
    }
}
