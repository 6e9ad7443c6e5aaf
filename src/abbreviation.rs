//! Abbreviation engine seam.
//!
//! The tracker only needs two things from an engine: a parse that either
//! succeeds or reports an error position, and an expansion used as preview.
//! [`BuiltinEngine`] covers the common markup and stylesheet shorthands.

pub mod markup;
pub mod stylesheet;

use serde::Serialize;

use crate::config::{OutputOptions, TrackerSettings};
use crate::context::{AbbreviationKind, ActivationConfig};
use crate::error::AbbreviationError;

pub use markup::{MarkupAbbreviation, MarkupAttribute, MarkupNode};
pub use stylesheet::{CssItem, CssValue, StylesheetAbbreviation};

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ParsedAbbreviation {
    Markup(MarkupAbbreviation),
    Stylesheet(StylesheetAbbreviation),
}

impl ParsedAbbreviation {
    /// A single childless element whose name is absent or starts with a
    /// letter (or nothing at all): typing plain words should not produce a
    /// noisy preview.
    pub fn is_simple(&self) -> bool {
        match self {
            Self::Markup(abbr) => match abbr.children.as_slice() {
                [] => true,
                [node] => {
                    !node.group
                        && node.children.is_empty()
                        && node
                            .name
                            .as_deref()
                            .is_none_or(|name| name.starts_with(|c: char| c.is_ascii_alphabetic()))
                }
                _ => false,
            },
            Self::Stylesheet(_) => false,
        }
    }
}

pub trait AbbreviationEngine: Send + Sync {
    fn parse(&self, text: &str, config: &ActivationConfig) -> Result<ParsedAbbreviation, AbbreviationError>;

    fn expand(&self, parsed: &ParsedAbbreviation, config: &ActivationConfig, options: &OutputOptions) -> String;
}

#[derive(Clone, Debug)]
pub struct BuiltinEngine {
    empty_elements: Vec<String>,
}

impl BuiltinEngine {
    pub fn new(empty_elements: Vec<String>) -> Self {
        Self { empty_elements }
    }

    pub fn from_settings(settings: &TrackerSettings) -> Self {
        Self::new(settings.empty_elements.clone())
    }
}

impl Default for BuiltinEngine {
    fn default() -> Self {
        Self::from_settings(&TrackerSettings::default())
    }
}

impl AbbreviationEngine for BuiltinEngine {
    fn parse(&self, text: &str, config: &ActivationConfig) -> Result<ParsedAbbreviation, AbbreviationError> {
        match config.kind {
            AbbreviationKind::Markup => markup::parse(text).map(ParsedAbbreviation::Markup),
            AbbreviationKind::Stylesheet => stylesheet::parse(text).map(ParsedAbbreviation::Stylesheet),
        }
    }

    fn expand(&self, parsed: &ParsedAbbreviation, config: &ActivationConfig, options: &OutputOptions) -> String {
        match parsed {
            ParsedAbbreviation::Markup(abbr) => markup::render(abbr, config, options, &self.empty_elements),
            ParsedAbbreviation::Stylesheet(abbr) => stylesheet::render(abbr, config, options),
        }
    }
}
