use std::ops::ControlFlow;

use crate::scanner::stylesheet::{self, StyleToken, TokenType, split_value};
use crate::text::{SelectItemModel, Source, TextRange};

/// Next (or previous) selectable stylesheet unit relative to `pos`: a
/// selector, or a property with its value fragments.
pub fn select_item_css(code: &str, pos: usize, previous: bool) -> Option<SelectItemModel> {
    let source = Source::new(code);
    if previous {
        select_previous(&source, pos)
    } else {
        select_next(&source, pos)
    }
}

fn select_next(source: &Source<'_>, pos: usize) -> Option<SelectItemModel> {
    let mut pending: Option<StyleToken> = None;
    let mut result = None;

    stylesheet::scan(source, |token| {
        if token.start < pos {
            return ControlFlow::Continue(());
        }

        match token.kind {
            TokenType::PropertyName if pending.is_none() => {
                pending = Some(token);
                return ControlFlow::Continue(());
            }
            TokenType::PropertyValue => {
                result = Some(property_model(source, pending.take(), token));
            }
            TokenType::Selector if pending.is_none() => {
                result = Some(single_model(token));
            }
            _ => match pending.take() {
                Some(name) => result = Some(single_model(name)),
                None => return ControlFlow::Continue(()),
            },
        }
        ControlFlow::Break(())
    });

    result.or_else(|| pending.map(single_model))
}

fn select_previous(source: &Source<'_>, pos: usize) -> Option<SelectItemModel> {
    let mut name: Option<StyleToken> = None;
    let mut value: Option<StyleToken> = None;

    stylesheet::scan(source, |token| match token.kind {
        TokenType::Selector | TokenType::PropertyName => {
            if token.start >= pos {
                return ControlFlow::Break(());
            }
            name = Some(token);
            value = None;
            ControlFlow::Continue(())
        }
        TokenType::PropertyValue => {
            if token.start >= pos {
                // value of a property whose name precedes the position
                if matches!(name, Some(n) if n.kind == TokenType::PropertyName) && value.is_none() {
                    value = Some(token);
                }
                return ControlFlow::Break(());
            }
            value = Some(token);
            ControlFlow::Continue(())
        }
        TokenType::BlockEnd => {
            if token.start >= pos {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        }
    });

    match (name, value) {
        (Some(name), Some(value)) if name.kind == TokenType::PropertyName => {
            Some(property_model(source, Some(name), value))
        }
        (Some(name), _) => Some(single_model(name)),
        (None, Some(value)) => Some(property_model(source, None, value)),
        (None, None) => None,
    }
}

fn single_model(token: StyleToken) -> SelectItemModel {
    let mut model = SelectItemModel::new(token.start, token.end);
    model.push(token.range());
    model
}

fn property_model(source: &Source<'_>, name: Option<StyleToken>, value: StyleToken) -> SelectItemModel {
    let start = name.map_or(value.start, |n| n.start);
    let end = value.delimiter.map_or(value.end, |d| d + 1);

    let mut model = SelectItemModel::new(start, end);
    if name.is_some() {
        model.push(TextRange::new(start, end));
    }
    model.push(value.range());
    for fragment in split_value(source.slice(value.range()), value.start) {
        model.push(fragment);
    }
    model
}
