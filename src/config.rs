pub mod defaults;
pub mod settings;
pub mod user;

pub use settings::{OutputOptions, SelfClosingStyle, SettingsFile, TrackerSettings};
pub use user::user_config_path;

use crate::error::TagwiseResult;
use std::fs;
use std::path::Path;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SettingsEventKind {
    Info,
    Warning,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SettingsEvent {
    pub kind: SettingsEventKind,
    pub message: String,
}

impl SettingsEvent {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            kind: SettingsEventKind::Warning,
            message: message.into(),
        }
    }

    /// Forward the event to the `log` facade
    pub fn log(&self) {
        match self.kind {
            SettingsEventKind::Info => log::info!(target: "tagwise::config", "{}", self.message),
            SettingsEventKind::Warning => {
                log::warn!(target: "tagwise::config", "{}", self.message)
            }
        }
    }
}

#[derive(Debug)]
pub struct SettingsLoadOutcome {
    pub settings: TrackerSettings,
    pub events: Vec<SettingsEvent>,
}

/// Merge two settings files, preferring values from `primary` over `fallback`
pub fn merge_settings(
    fallback: Option<SettingsFile>,
    primary: Option<SettingsFile>,
) -> Option<SettingsFile> {
    match (fallback, primary) {
        (None, None) => None,
        (Some(settings), None) => Some(settings),
        (None, Some(settings)) => Some(settings),
        (Some(fallback), Some(primary)) => Some(SettingsFile {
            jsx_prefix: primary.jsx_prefix.or(fallback.jsx_prefix),
            // Pairs merge key by key: primary adds or overrides entries
            pairs: match (fallback.pairs, primary.pairs) {
                (Some(mut base), Some(overrides)) => {
                    base.extend(overrides);
                    Some(base)
                }
                (base, overrides) => overrides.or(base),
            },
            empty_elements: primary.empty_elements.or(fallback.empty_elements),
            output: primary.output.or(fallback.output),
        }),
    }
}

/// Merge settings layers in order; later layers have higher precedence.
pub fn merge_all(layers: &[Option<SettingsFile>]) -> Option<SettingsFile> {
    layers.iter().cloned().reduce(merge_settings).flatten()
}

/// Read and parse one settings file
pub fn read_settings(path: &Path) -> TagwiseResult<SettingsFile> {
    let contents = fs::read_to_string(path)?;
    Ok(toml::from_str(&contents)?)
}

/// Load settings: defaults < user config < `<root>/tagwise.toml`.
///
/// Failures never abort loading; they are reported as warning events and the
/// offending layer is skipped.
pub fn load_settings(root_path: Option<&Path>) -> SettingsLoadOutcome {
    let mut events = Vec::new();

    let defaults = Some(defaults::default_settings());
    let user = user_config_path().and_then(|path| load_layer(&path, "user config", &mut events));
    let project = root_path.and_then(|root| {
        load_layer(&root.join(user::CONFIG_FILE_NAME), "project config", &mut events)
    });

    let settings = merge_all(&[defaults, user, project])
        .map(TrackerSettings::from)
        .unwrap_or_default();

    SettingsLoadOutcome { settings, events }
}

fn load_layer(path: &Path, label: &str, events: &mut Vec<SettingsEvent>) -> Option<SettingsFile> {
    if !path.exists() {
        return None;
    }

    match read_settings(path) {
        Ok(settings) => {
            events.push(SettingsEvent::info(format!(
                "Loaded {} from {}",
                label,
                path.display()
            )));
            Some(settings)
        }
        Err(err) => {
            events.push(SettingsEvent::warning(format!(
                "Failed to load {} from {}: {}",
                label,
                path.display(),
                err
            )));
            None
        }
    }
}
