use std::ops::ControlFlow;

use crate::markup::tag::{tag_attributes, unquoted_value_range};
use crate::scanner::markup::{self, ElementType, MarkupToken, ScannerOptions};
use crate::text::{Source, TextRange};

use super::stylesheet::get_css_context;
use super::{MarkupContext, MarkupContextOptions, MarkupCurrent, MarkupElement, StylesheetContext};

/// Open elements around `pos` and the tag straddling it, if any.
///
/// Unless `skip_css` is set, a position inside an inline `style` attribute
/// value or a `<style>` element body also resolves the embedded stylesheet
/// context, translated into document coordinates.
pub fn get_html_context(code: &str, pos: usize, options: &MarkupContextOptions) -> MarkupContext {
    let source = Source::new(code);
    let scanner = ScannerOptions {
        xml: options.xml,
        all_tokens: true,
        ..ScannerOptions::default()
    };

    let mut stack: Vec<MarkupToken<'_>> = Vec::new();
    let mut current: Option<MarkupToken<'_>> = None;

    markup::scan(&source, &scanner, |token| {
        if token.start >= pos {
            return ControlFlow::Break(());
        }
        if token.range().straddles(pos) {
            current = Some(token);
            return ControlFlow::Break(());
        }

        match token.kind {
            ElementType::Open if !scanner.is_self_close(token.name) => stack.push(token),
            ElementType::Close => {
                if stack
                    .last()
                    .is_some_and(|top| scanner.names_match(top.name, token.name))
                {
                    stack.pop();
                }
            }
            _ => {}
        }
        ControlFlow::Continue(())
    });

    let stylesheet = if options.skip_css {
        None
    } else {
        embedded_stylesheet(&source, &scanner, pos, current.as_ref(), stack.last())
    };

    MarkupContext {
        ancestors: stack
            .iter()
            .map(|t| MarkupElement {
                name: t.name.to_string(),
                range: t.range(),
            })
            .collect(),
        current: current.map(|t| MarkupCurrent {
            name: t.name.to_string(),
            kind: t.kind,
            range: t.range(),
        }),
        stylesheet,
    }
}

fn embedded_stylesheet(
    source: &Source<'_>,
    scanner: &ScannerOptions,
    pos: usize,
    current: Option<&MarkupToken<'_>>,
    parent: Option<&MarkupToken<'_>>,
) -> Option<StylesheetContext> {
    if let Some(tag) = current.filter(|t| t.kind.is_opening()) {
        let style = tag_attributes(source, tag.range(), tag.name)
            .into_iter()
            .find(|attr| attr.name.eq_ignore_ascii_case("style"))?;
        let (value, value_range) = style.value.as_deref().zip(style.value_range)?;
        let body = unquoted_value_range(value, value_range);
        if !body.contains(pos) {
            return None;
        }

        log::debug!(target: "tagwise::context", "inline stylesheet at {:?}", body);
        return Some(nested(source, body, pos, true));
    }

    let parent = parent.filter(|t| t.name.eq_ignore_ascii_case("style"))?;
    if current.is_some() {
        return None;
    }

    let body = TextRange::new(parent.end, style_close_start(source, scanner, parent));
    if !body.contains(pos) {
        return None;
    }

    log::debug!(target: "tagwise::context", "style block at {:?}", body);
    Some(nested(source, body, pos, false))
}

/// Start of the first `</style>` after the open tag, or the document end.
fn style_close_start(source: &Source<'_>, scanner: &ScannerOptions, open: &MarkupToken<'_>) -> usize {
    let mut close = source.len();
    markup::scan(source, scanner, |token| {
        if token.start >= open.end
            && token.kind == ElementType::Close
            && scanner.names_match(token.name, open.name)
        {
            close = token.start;
            return ControlFlow::Break(());
        }
        ControlFlow::Continue(())
    });
    close
}

fn nested(source: &Source<'_>, body: TextRange, pos: usize, inline: bool) -> StylesheetContext {
    let mut context = get_css_context(source.slice(body), pos - body.start);
    context.inline = inline;
    context.embedded = Some(TextRange::new(0, body.len()));
    context.translate(body.start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::TokenType;

    fn names(ctx: &MarkupContext) -> Vec<&str> {
        ctx.ancestors.iter().map(|a| a.name.as_str()).collect()
    }

    #[test]
    fn ancestors_skip_closed_and_void_elements() {
        let code = "<div><p>a</p><br><ul><li>x";
        let ctx = get_html_context(code, 25, &MarkupContextOptions::default());
        assert_eq!(names(&ctx), vec!["div", "ul", "li"]);
        assert!(ctx.current.is_none());
        assert!(ctx.stylesheet.is_none());
    }

    #[test]
    fn xml_dialect_keeps_void_names_open() {
        let code = "<root><br><item>";
        let options = MarkupContextOptions {
            xml: true,
            ..MarkupContextOptions::default()
        };
        let ctx = get_html_context(code, 16, &options);
        assert_eq!(names(&ctx), vec!["root", "br", "item"]);
    }

    #[test]
    fn mismatched_close_is_ignored() {
        let ctx = get_html_context("<div><span></div>x", 17, &MarkupContextOptions::default());
        assert_eq!(names(&ctx), vec!["div", "span"]);
    }

    #[test]
    fn straddled_tag_is_current() {
        let ctx = get_html_context("<div><a href=\"x\">", 8, &MarkupContextOptions::default());
        assert_eq!(names(&ctx), vec!["div"]);
        let current = ctx.current.expect("current");
        assert_eq!(current.name, "a");
        assert_eq!(current.range, TextRange::new(5, 17));
    }

    #[test]
    fn inline_style_attribute_resolves_stylesheet() {
        let code = "<span style=\"color: red; padding: 0\">x</span>";
        let ctx = get_html_context(code, 21, &MarkupContextOptions::default());
        let css = ctx.stylesheet.expect("inline stylesheet");

        assert!(css.inline);
        assert_eq!(css.embedded, Some(TextRange::new(13, 35)));
        assert_eq!(css.ancestors.len(), 1);
        assert_eq!(css.ancestors[0].name, "color");
        assert_eq!(css.ancestors[0].range, TextRange::new(13, 18));
        let current = css.current.expect("current value");
        assert_eq!(current.kind, TokenType::PropertyValue);
        assert_eq!(current.range, TextRange::new(20, 23));
    }

    #[test]
    fn other_attributes_do_not_resolve_stylesheet() {
        let code = "<span title=\"color: red\">";
        let ctx = get_html_context(code, 15, &MarkupContextOptions::default());
        assert!(ctx.current.is_some());
        assert!(ctx.stylesheet.is_none());
    }

    #[test]
    fn style_block_resolves_stylesheet() {
        let code = "<style>\na { color: red }\n</style><p>";
        let ctx = get_html_context(code, 13, &MarkupContextOptions::default());
        assert_eq!(names(&ctx), vec!["style"]);

        let css = ctx.stylesheet.expect("style block");
        assert!(!css.inline);
        assert_eq!(css.embedded, Some(TextRange::new(7, 25)));
        assert_eq!(css.ancestors[0].name, "a");
        assert_eq!(css.ancestors[0].range, TextRange::new(8, 9));
        assert_eq!(
            css.current.map(|c| (c.name, c.range)),
            Some(("color".to_string(), TextRange::new(12, 17)))
        );
    }

    #[test]
    fn skip_css_suppresses_detection() {
        let code = "<style>a{}</style>";
        let options = MarkupContextOptions {
            skip_css: true,
            ..MarkupContextOptions::default()
        };
        assert!(get_html_context(code, 8, &options).stylesheet.is_none());
    }

    #[test]
    fn resolving_twice_is_identical() {
        let code = "<div><style>a { b: c }</style><span style=\"x: y\"></div>";
        for pos in 0..code.len() {
            let options = MarkupContextOptions::default();
            assert_eq!(
                get_html_context(code, pos, &options),
                get_html_context(code, pos, &options)
            );
        }
    }
}
