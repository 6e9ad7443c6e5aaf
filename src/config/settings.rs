use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::defaults;

/// How void elements are closed in expanded markup
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SelfClosingStyle {
    /// `<br>`
    #[default]
    Html,
    /// `<br />`
    Xhtml,
    /// `<br/>`
    Xml,
}

/// Formatting options for expanded output and previews
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default, rename_all = "camelCase")]
pub struct OutputOptions {
    pub indent: String,
    pub newline: String,
    pub self_closing: SelfClosingStyle,
    /// Between a stylesheet property name and its value
    pub property_separator: String,
    /// After a stylesheet property value
    pub property_terminator: String,
    /// Emit JSX attribute names (`className`)
    pub jsx: bool,
}

impl Default for OutputOptions {
    fn default() -> Self {
        Self {
            indent: "\t".to_string(),
            newline: "\n".to_string(),
            self_closing: SelfClosingStyle::Html,
            property_separator: ": ".to_string(),
            property_terminator: ";".to_string(),
            jsx: false,
        }
    }
}

/// Settings as read from a `tagwise.toml` file. Every field is optional so
/// that layers can be merged field by field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsFile {
    pub jsx_prefix: Option<String>,
    pub empty_elements: Option<Vec<String>>,
    pub pairs: Option<BTreeMap<String, String>>,
    pub output: Option<OutputOptions>,
}

/// Resolved settings used by the tracking controller and the built-in engine
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TrackerSettings {
    /// Marker typed before a JSX abbreviation
    pub jsx_prefix: String,
    /// Opening to closing pair characters
    pub pairs: BTreeMap<String, String>,
    pub empty_elements: Vec<String>,
    pub output: OutputOptions,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from(SettingsFile::default())
    }
}

impl From<SettingsFile> for TrackerSettings {
    fn from(file: SettingsFile) -> Self {
        Self {
            jsx_prefix: file
                .jsx_prefix
                .filter(|p| !p.is_empty())
                .unwrap_or_else(|| defaults::DEFAULT_JSX_PREFIX.to_string()),
            pairs: file.pairs.unwrap_or_else(defaults::default_pairs),
            empty_elements: file.empty_elements.unwrap_or_else(|| {
                defaults::DEFAULT_EMPTY_ELEMENTS
                    .iter()
                    .map(|s| s.to_string())
                    .collect()
            }),
            output: file.output.unwrap_or_default(),
        }
    }
}

impl TrackerSettings {
    /// Closing counterpart of an opening pair character
    pub fn closing_pair(&self, open: char) -> Option<char> {
        let mut buf = [0u8; 4];
        self.pairs
            .get(open.encode_utf8(&mut buf) as &str)
            .and_then(|close| close.chars().next())
    }

    pub fn is_closing_pair(&self, ch: char) -> bool {
        self.pairs.values().any(|close| close.starts_with(ch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_file_parses_camel_case_keys() {
        let file: SettingsFile = toml::from_str(
            r#"
            jsxPrefix = "<<"
            emptyElements = ["br"]

            [output]
            indent = "  "
            selfClosing = "xhtml"
            "#,
        )
        .expect("valid settings");

        assert_eq!(file.jsx_prefix.as_deref(), Some("<<"));
        let output = file.output.expect("output table");
        assert_eq!(output.indent, "  ");
        assert_eq!(output.self_closing, SelfClosingStyle::Xhtml);
        // unspecified output keys keep their defaults
        assert_eq!(output.property_separator, ": ");
    }

    #[test]
    fn tracker_settings_fill_defaults() {
        let settings = TrackerSettings::default();
        assert_eq!(settings.jsx_prefix, "<");
        assert_eq!(settings.closing_pair('['), Some(']'));
        assert_eq!(settings.closing_pair('a'), None);
        assert!(settings.is_closing_pair('}'));
        assert!(!settings.is_closing_pair('{'));
        assert!(settings.empty_elements.iter().any(|e| e == "img"));
    }

    #[test]
    fn empty_jsx_prefix_falls_back_to_default() {
        let settings = TrackerSettings::from(SettingsFile {
            jsx_prefix: Some(String::new()),
            ..SettingsFile::default()
        });
        assert_eq!(settings.jsx_prefix, "<");
    }
}
