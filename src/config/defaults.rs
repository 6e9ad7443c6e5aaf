//! Default configuration values for tagwise.

use std::collections::BTreeMap;

use super::settings::{OutputOptions, SettingsFile};

/// Marker typed before a JSX abbreviation
pub const DEFAULT_JSX_PREFIX: &str = "<";

/// Elements that never get a closing tag outside XML dialects
pub const DEFAULT_EMPTY_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "param",
    "source", "track", "wbr",
];

/// Elements whose content the markup scanner treats as raw text
pub const DEFAULT_SPECIAL_ELEMENTS: &[&str] = &["style", "script"];

/// Opening to closing pair characters auto-inserted by editors
pub fn default_pairs() -> BTreeMap<String, String> {
    [("{", "}"), ("[", "]"), ("(", ")")]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect()
}

/// Fully populated settings, the lowest-precedence layer.
pub fn default_settings() -> SettingsFile {
    SettingsFile {
        jsx_prefix: Some(DEFAULT_JSX_PREFIX.to_string()),
        pairs: Some(default_pairs()),
        empty_elements: Some(
            DEFAULT_EMPTY_ELEMENTS
                .iter()
                .map(|s| s.to_string())
                .collect(),
        ),
        output: Some(OutputOptions::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_settings_populates_every_field() {
        let settings = default_settings();
        assert!(settings.jsx_prefix.is_some());
        assert_eq!(settings.pairs.as_ref().map(BTreeMap::len), Some(3));
        assert!(settings.empty_elements.is_some());
        assert!(settings.output.is_some());
    }

    #[test]
    fn default_settings_serializes_to_valid_toml() {
        let toml_string =
            toml::to_string_pretty(&default_settings()).expect("should serialize to TOML");
        assert!(
            toml_string.contains("jsxPrefix = \"<\""),
            "TOML should contain jsxPrefix. Got:\n{}",
            toml_string
        );
        let parsed: SettingsFile = toml::from_str(&toml_string).expect("should parse back");
        assert_eq!(parsed, default_settings());
    }
}
