//! Context resolution over documents mixing markup and embedded stylesheets.

use tagwise::context::StylesheetScope;
use tagwise::scanner::{ScannerOptions, TokenType};
use tagwise::tracker::MemoryEditor;
use tagwise::{
    MarkupContextOptions, TextRange, find_tag_match, get_activation_context, get_css_context,
    get_css_section, get_html_context,
};

const PAGE: &str = "<html><head><style>\nbody { margin: 0 }\n</style></head>\n<body><p style=\"color: red\">hi</p></body></html>";

fn offset_of(needle: &str) -> usize {
    PAGE.find(needle).expect("needle in page")
}

#[test]
fn style_block_is_resolved_in_document_coordinates() {
    let pos = offset_of("margin") + 2;
    let ctx = get_html_context(PAGE, pos, &MarkupContextOptions::default());

    let names: Vec<&str> = ctx.ancestors.iter().map(|a| a.name.as_str()).collect();
    assert_eq!(names, vec!["html", "head", "style"]);

    let css = ctx.stylesheet.expect("style block context");
    assert!(!css.inline);
    let body_start = offset_of("<style>") + "<style>".len();
    let body_end = offset_of("</style>");
    assert_eq!(css.embedded, Some(TextRange::new(body_start, body_end)));

    let current = css.current.expect("property name");
    assert_eq!(current.kind, TokenType::PropertyName);
    assert_eq!(current.name, "margin");
    assert_eq!(current.range.start, offset_of("margin"));
    assert_eq!(css.ancestors[0].name, "body");
}

#[test]
fn inline_style_is_resolved_in_document_coordinates() {
    let pos = offset_of("red") + 1;
    let ctx = get_html_context(PAGE, pos, &MarkupContextOptions::default());
    assert_eq!(ctx.current.as_ref().map(|c| c.name.as_str()), Some("p"));

    let css = ctx.stylesheet.expect("inline context");
    assert!(css.inline);
    let value_start = offset_of("color");
    assert_eq!(
        css.embedded,
        Some(TextRange::new(value_start, value_start + "color: red".len()))
    );
    let current = css.current.expect("property value");
    assert_eq!(current.kind, TokenType::PropertyValue);
    assert_eq!(current.range, TextRange::new(offset_of("red"), offset_of("red") + 3));
}

#[test]
fn nested_stylesheet_matches_direct_resolution() {
    let css = "body { margin: 0 }";
    let pos = offset_of("margin") + 2;
    let embedded = get_html_context(PAGE, pos, &MarkupContextOptions::default())
        .stylesheet
        .expect("style block");
    let offset = embedded.embedded.expect("bounds").start;

    let mut direct = get_css_context(&PAGE[offset..offset + css.len() + 2], pos - offset);
    direct.embedded = embedded.embedded.map(|r| TextRange::new(0, r.len()));
    direct.inline = false;
    assert_eq!(direct.translate(offset), embedded);
}

#[test]
fn tag_match_spans_open_and_close() {
    let pos = offset_of("hi");
    let found = find_tag_match(PAGE, pos, &ScannerOptions::default()).expect("match");
    assert_eq!(found.name, "p");
    let close = found.close.expect("closed");
    assert_eq!(close.start, offset_of("</p>"));
}

#[test]
fn section_with_properties() {
    let code = "a { color: red; margin: 0 }";
    let section = get_css_section(code, 5, true).expect("section");
    assert_eq!((section.start, section.end), (0, code.len()));
    let properties = section.properties.expect("properties");
    let names: Vec<&str> = properties
        .iter()
        .map(|p| &code[p.name.start..p.name.end])
        .collect();
    assert_eq!(names, vec!["color", "margin"]);
}

#[test]
fn activation_follows_embedded_stylesheet() {
    let pos = offset_of("red") + 1;
    let editor = MemoryEditor::new(1, "html", PAGE);
    let config = get_activation_context(&editor, pos).expect("activation");
    assert!(config.inline);
    assert_eq!(config.stylesheet_scope(), Some(&StylesheetScope::Global));
}
