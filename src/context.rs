//! Context resolution: the chain of open elements or rule blocks around a
//! position, embedded stylesheet detection, and the activation context
//! consulted before abbreviation tracking starts.

pub mod activation;
pub mod markup;
pub mod stylesheet;

use serde::Serialize;

use crate::scanner::{ElementType, TokenType};
use crate::text::TextRange;

pub use activation::{
    AbbreviationContext, AbbreviationKind, ActivationConfig, StylesheetScope,
    get_activation_context,
};
pub use markup::get_html_context;
pub use stylesheet::get_css_context;

/// Open element enclosing a position
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarkupElement {
    pub name: String,
    pub range: TextRange,
}

/// Markup token straddling a position
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MarkupCurrent {
    pub name: String,
    pub kind: ElementType,
    pub range: TextRange,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct MarkupContext {
    /// Outermost first
    pub ancestors: Vec<MarkupElement>,
    pub current: Option<MarkupCurrent>,
    /// Embedded stylesheet context, in document coordinates
    pub stylesheet: Option<StylesheetContext>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct StylesheetItem {
    pub name: String,
    pub kind: TokenType,
    pub range: TextRange,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StylesheetContext {
    /// Outermost first
    pub ancestors: Vec<StylesheetItem>,
    pub current: Option<StylesheetItem>,
    /// Resolved inside a `style` attribute value
    pub inline: bool,
    /// Absolute bounds of the embedded stylesheet source
    pub embedded: Option<TextRange>,
}

impl StylesheetContext {
    /// Shift every range by `offset`, mapping substring coordinates back
    /// into the enclosing document.
    pub fn translate(mut self, offset: usize) -> Self {
        for item in self.ancestors.iter_mut().chain(self.current.as_mut()) {
            item.range = item.range.shift(offset);
        }
        self.embedded = self.embedded.map(|r| r.shift(offset));
        self
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MarkupContextOptions {
    /// XML dialect: no void elements
    pub xml: bool,
    /// Skip embedded stylesheet detection
    pub skip_css: bool,
}
