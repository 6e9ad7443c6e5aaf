//! Select-item walks over whole documents through the public API.

use tagwise::text::Source;
use tagwise::{SelectItemModel, select_item_css, select_item_html};

/// Text of the first (coarsest) range of every model visited from the start
fn walk_forward(code: &str, select: fn(&str, usize, bool) -> Option<SelectItemModel>) -> Vec<String> {
    let source = Source::new(code);
    let mut items = Vec::new();
    let mut pos = 0;
    while let Some(model) = select(code, pos, false) {
        assert!(model.end > pos, "walk must make progress at {}", pos);
        items.push(source.slice(model.ranges[0]).to_string());
        pos = model.end;
    }
    items
}

#[test]
fn markup_walk_visits_every_opening_tag() {
    let code = "<ul><li class=\"a b\">x</li><li>y</li></ul>";
    assert_eq!(walk_forward(code, select_item_html), vec!["ul", "li", "li"]);
}

#[test]
fn markup_walk_backward_mirrors_forward() {
    let code = "<ul><li class=\"a b\">x</li><li>y</li></ul>";
    let mut starts = Vec::new();
    let mut pos = code.len();
    while let Some(model) = select_item_html(code, pos, true) {
        starts.push(model.start);
        pos = model.start;
    }
    assert_eq!(starts, vec![26, 4, 0]);
}

#[test]
fn class_tokens_follow_the_class_value() {
    let code = "<li class=\"a b\">";
    let model = select_item_html(code, 0, false).expect("model");
    let source = Source::new(code);
    let texts: Vec<&str> = model.ranges.iter().map(|r| source.slice(*r)).collect();
    assert_eq!(texts, vec!["li", "class=\"a b\"", "a b", "a", "b"]);
}

#[test]
fn stylesheet_walk_visits_selectors_and_properties() {
    let code = "a { color: red; }\nb { margin: 0 }";
    assert_eq!(
        walk_forward(code, select_item_css),
        vec!["a", "color: red;", "b", "margin: 0"]
    );
}

#[test]
fn multibyte_text_uses_utf16_offsets() {
    // "é" is one UTF-16 unit, the emoji two
    let code = "<p>é😀</p><b id=\"x\">";
    let model = select_item_html(code, 4, false).expect("model");
    assert_eq!((model.start, model.end), (10, 20));
    assert_eq!(model.ranges[0].start, 11);
}
