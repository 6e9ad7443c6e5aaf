use std::ops::ControlFlow;

use crate::scanner::markup::{self, MarkupToken, ScannerOptions};
use crate::text::{SelectItemModel, Source, TextRange, token_list, utf16_len};

use super::tag::{tag_attributes, unquoted_value_range};

/// Next (or previous) selectable markup unit relative to `pos`.
///
/// Next is the first open or self-closing tag ending after `pos`; previous
/// is the last one starting before it.
pub fn select_item_html(code: &str, pos: usize, previous: bool) -> Option<SelectItemModel> {
    let source = Source::new(code);
    let mut candidate: Option<MarkupToken<'_>> = None;

    markup::scan(&source, &ScannerOptions::default(), |token| {
        if !token.kind.is_opening() {
            return ControlFlow::Continue(());
        }
        if previous {
            if token.start >= pos {
                return ControlFlow::Break(());
            }
            candidate = Some(token);
            ControlFlow::Continue(())
        } else if token.end > pos {
            candidate = Some(token);
            ControlFlow::Break(())
        } else {
            ControlFlow::Continue(())
        }
    });

    candidate.map(|token| tag_model(&source, token))
}

fn tag_model(source: &Source<'_>, token: MarkupToken<'_>) -> SelectItemModel {
    let mut model = SelectItemModel::new(token.start, token.end);
    let name_start = token.start + 1;
    model.push(TextRange::new(name_start, name_start + utf16_len(token.name)));

    for attr in tag_attributes(source, token.range(), token.name) {
        let (Some(value), Some(value_range)) = (attr.value.as_deref(), attr.value_range) else {
            model.push(attr.name_range);
            continue;
        };

        model.push(TextRange::new(attr.name_range.start, value_range.end));
        let unquoted = unquoted_value_range(value, value_range);
        model.push(unquoted);

        if attr.name.eq_ignore_ascii_case("class") {
            for class in token_list(source.slice(unquoted), unquoted.start) {
                model.push(class);
            }
        }
    }

    model
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranges(model: &SelectItemModel) -> Vec<(usize, usize)> {
        model.ranges.iter().map(|r| (r.start, r.end)).collect()
    }

    #[test]
    fn next_item_selects_tag_name_attribute_value_and_classes() {
        let code = "<ul>\n    <li class=\"item item_1\">One</li></ul>";
        let model = select_item_html(code, 9, false).expect("model");
        assert_eq!((model.start, model.end), (9, 33));
        assert_eq!(
            ranges(&model),
            vec![(10, 12), (13, 32), (20, 31), (20, 24), (25, 31)]
        );
    }

    #[test]
    fn next_item_strips_expression_braces() {
        let code = "<li><a href=\"/sample\"  title={expr}>text</a></li>";
        let model = select_item_html(code, 4, false).expect("model");
        assert_eq!((model.start, model.end), (4, 36));
        assert_eq!(
            ranges(&model),
            vec![(5, 6), (7, 21), (13, 20), (23, 35), (30, 34)]
        );
    }

    #[test]
    fn previous_item_takes_last_tag_before_position() {
        let code = "<p><b hidden>x</b></p>";
        let model = select_item_html(code, 14, true).expect("model");
        assert_eq!((model.start, model.end), (3, 13));
        assert_eq!(ranges(&model), vec![(4, 5), (6, 12)]);

        assert!(select_item_html(code, 0, true).is_none());
    }

    #[test]
    fn empty_class_value_contributes_no_empty_ranges() {
        let model = select_item_html("<i class=\"\">", 0, false).expect("model");
        assert_eq!(ranges(&model), vec![(1, 2), (3, 11)]);
    }

    #[test]
    fn close_tags_are_skipped() {
        let model = select_item_html("<a></a><br/>", 2, false).expect("model");
        assert_eq!((model.start, model.end), (0, 3));
        let model = select_item_html("<a></a><br/>", 3, false).expect("model");
        assert_eq!((model.start, model.end), (7, 12));
    }
}
