//! Dialect classification by syntax name.
//!
//! Editors report a syntax (language id); these helpers decide which
//! resolver and abbreviation kind apply to it.

use crate::context::AbbreviationKind;

const CSS_SYNTAXES: &[&str] = &["css", "scss", "less", "sass", "stylus", "sss", "postcss"];
const HTML_SYNTAXES: &[&str] = &[
    "html",
    "xhtml",
    "xml",
    "xsl",
    "svg",
    "vue",
    "svelte",
    "php",
    "erb",
    "htmldjango",
    "twig",
];
const XML_SYNTAXES: &[&str] = &["xml", "xsl", "xhtml", "svg"];
const JSX_SYNTAXES: &[&str] = &["jsx", "tsx", "javascriptreact", "typescriptreact"];

fn one_of(set: &[&str], syntax: &str) -> bool {
    set.iter().any(|s| s.eq_ignore_ascii_case(syntax))
}

/// Stylesheet dialect
pub fn is_css(syntax: &str) -> bool {
    one_of(CSS_SYNTAXES, syntax)
}

/// Markup dialect resolved with the markup context resolver
pub fn is_html(syntax: &str) -> bool {
    one_of(HTML_SYNTAXES, syntax)
}

/// Markup dialect without void elements or raw-text elements
pub fn is_xml(syntax: &str) -> bool {
    one_of(XML_SYNTAXES, syntax)
}

pub fn is_jsx(syntax: &str) -> bool {
    one_of(JSX_SYNTAXES, syntax)
}

/// Abbreviation kind expanded for `syntax`
pub fn syntax_kind(syntax: &str) -> AbbreviationKind {
    if is_css(syntax) {
        AbbreviationKind::Stylesheet
    } else {
        AbbreviationKind::Markup
    }
}
