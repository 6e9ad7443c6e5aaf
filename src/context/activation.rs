use serde::Serialize;

use crate::scanner::TokenType;
use crate::text::Source;
use crate::tracker::Editor;

use super::markup::get_html_context;
use super::stylesheet::get_css_context;
use super::{MarkupContextOptions, StylesheetContext};

/// Which grammar an abbreviation is parsed with
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AbbreviationKind {
    Markup,
    Stylesheet,
}

/// Where a stylesheet abbreviation is being typed
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StylesheetScope {
    /// Declarations inside a block, or an inline style
    Global,
    /// Top level, where a selector could start as well
    Section,
    /// Value of the named property
    Property(String),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum AbbreviationContext {
    Markup { parent: Option<String> },
    Stylesheet(StylesheetScope),
}

/// Resolved activation context for a position
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ActivationConfig {
    pub kind: AbbreviationKind,
    pub syntax: String,
    pub context: Option<AbbreviationContext>,
    pub inline: bool,
}

impl ActivationConfig {
    pub fn new(kind: AbbreviationKind, syntax: impl Into<String>) -> Self {
        Self {
            kind,
            syntax: syntax.into(),
            context: None,
            inline: false,
        }
    }

    pub fn stylesheet_scope(&self) -> Option<&StylesheetScope> {
        match &self.context {
            Some(AbbreviationContext::Stylesheet(scope)) => Some(scope),
            _ => None,
        }
    }
}

/// Decide whether an abbreviation may be tracked at `pos`, and how.
pub fn get_activation_context<E: Editor + ?Sized>(editor: &E, pos: usize) -> Option<ActivationConfig> {
    let syntax = editor.syntax();
    let text = editor.text();

    if editor.is_css(&syntax) {
        let context = get_css_context(&text, pos);
        return stylesheet_activation(&text, pos, &context, syntax);
    }

    if editor.is_html(&syntax) {
        let options = MarkupContextOptions {
            xml: editor.is_xml(&syntax),
            skip_css: false,
        };
        let context = get_html_context(&text, pos, &options);

        if let Some(stylesheet) = &context.stylesheet {
            return stylesheet_activation(&text, pos, stylesheet, "css".to_string());
        }
        // inside a tag's own markup
        if context.current.is_some() {
            return None;
        }

        let parent = context.ancestors.last().map(|a| a.name.clone());
        return Some(ActivationConfig {
            context: Some(AbbreviationContext::Markup { parent }),
            ..ActivationConfig::new(AbbreviationKind::Markup, syntax)
        });
    }

    let kind = editor.syntax_kind(&syntax);
    Some(ActivationConfig::new(kind, syntax))
}

fn stylesheet_activation(
    text: &str,
    pos: usize,
    context: &StylesheetContext,
    syntax: String,
) -> Option<ActivationConfig> {
    let allowed = match &context.current {
        None => true,
        Some(current) => match current.kind {
            TokenType::PropertyName | TokenType::PropertyValue => true,
            // typing on a blank line right before a rule
            TokenType::Selector => {
                current.range.start + 1 == pos && line_is_single_char(text, current.range.start)
            }
            TokenType::BlockEnd => false,
        },
    };
    if !allowed {
        return None;
    }

    let parent = context.ancestors.last();
    let current_kind = context.current.as_ref().map(|c| c.kind);
    let scope = match (current_kind, parent) {
        (Some(TokenType::PropertyValue), Some(parent)) => StylesheetScope::Property(parent.name.clone()),
        _ if context.inline => StylesheetScope::Global,
        (Some(TokenType::Selector | TokenType::PropertyName), None) | (None, None) => {
            StylesheetScope::Section
        }
        _ => StylesheetScope::Global,
    };

    Some(ActivationConfig {
        context: Some(AbbreviationContext::Stylesheet(scope)),
        inline: context.inline,
        ..ActivationConfig::new(AbbreviationKind::Stylesheet, syntax)
    })
}

/// Whether the line holding `pos` has exactly one non-blank character
fn line_is_single_char(text: &str, pos: usize) -> bool {
    let source = Source::new(text);
    let byte = source.to_byte(pos);
    let start = text[..byte].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let end = text[byte..].find(['\n', '\r']).map_or(text.len(), |i| byte + i);
    text[start..end].trim().chars().count() == 1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::MemoryEditor;

    fn activation(syntax: &str, text: &str, pos: usize) -> Option<ActivationConfig> {
        let editor = MemoryEditor::new(1, syntax, text);
        get_activation_context(&editor, pos)
    }

    #[test]
    fn markup_between_tags_has_parent() {
        let config = activation("html", "<ul>l</ul>", 5).expect("activation");
        assert_eq!(config.kind, AbbreviationKind::Markup);
        assert_eq!(
            config.context,
            Some(AbbreviationContext::Markup {
                parent: Some("ul".to_string())
            })
        );
    }

    #[test]
    fn svg_resolves_markup_context() {
        let config = activation("svg", "<svg><g>r</g></svg>", 9).expect("activation");
        assert_eq!(
            config.context,
            Some(AbbreviationContext::Markup {
                parent: Some("g".to_string())
            })
        );
        assert!(activation("svg", "<svg width=\"1\">", 8).is_none());
    }

    #[test]
    fn markup_inside_tag_is_rejected() {
        assert!(activation("html", "<div class=\"a\">", 9).is_none());
    }

    #[test]
    fn inline_style_is_global_stylesheet() {
        let config = activation("html", "<p style=\"p\">", 11).expect("activation");
        assert_eq!(config.kind, AbbreviationKind::Stylesheet);
        assert_eq!(config.syntax, "css");
        assert!(config.inline);
        assert_eq!(config.stylesheet_scope(), Some(&StylesheetScope::Global));
    }

    #[test]
    fn stylesheet_scopes() {
        // top level
        let config = activation("css", "p", 1).expect("activation");
        assert_eq!(config.stylesheet_scope(), Some(&StylesheetScope::Section));

        // inside a block
        let config = activation("css", "a { p }", 5).expect("activation");
        assert_eq!(config.stylesheet_scope(), Some(&StylesheetScope::Global));

        // property value
        let config = activation("css", "a { color: r }", 12).expect("activation");
        assert_eq!(
            config.stylesheet_scope(),
            Some(&StylesheetScope::Property("color".to_string()))
        );
    }

    #[test]
    fn top_level_after_rule_with_bare_declaration() {
        let code = "a { foo; }\nb";
        let config = activation("css", code, code.len()).expect("activation");
        assert_eq!(config.stylesheet_scope(), Some(&StylesheetScope::Section));
    }

    #[test]
    fn stylesheet_selector_only_on_blank_line() {
        assert!(activation("css", "a {}", 1).is_none());
        assert!(activation("css", "m\nb {}", 1).is_some());
        assert!(activation("css", "ab {}", 1).is_none());
    }

    #[test]
    fn other_dialects_use_syntax_kind() {
        let config = activation("javascriptreact", "<div>", 3).expect("activation");
        assert_eq!(config.kind, AbbreviationKind::Markup);
        assert!(config.context.is_none());
    }
}
