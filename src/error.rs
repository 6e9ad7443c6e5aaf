//! Error handling types for tagwise
//!
//! The core operations report absence through `Option`; these types cover
//! settings loading and malformed abbreviations.

use serde::Serialize;
use thiserror::Error;

/// Error type for settings loading and the command-line surface
#[derive(Debug, Error)]
pub enum TagwiseError {
    /// Configuration error
    #[error("Invalid configuration: {message}")]
    Config { message: String },

    /// Settings file could not be parsed
    #[error("Failed to parse settings: {0}")]
    Settings(#[from] toml::de::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for tagwise operations
pub type TagwiseResult<T> = Result<T, TagwiseError>;

impl TagwiseError {
    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        TagwiseError::Config {
            message: message.into(),
        }
    }
}

/// Malformed abbreviation, carried by error trackers.
///
/// `position` is a UTF-16 offset within the abbreviation text.
#[derive(Clone, Debug, Error, PartialEq, Eq, Serialize)]
#[error("{message} at {position}")]
pub struct AbbreviationError {
    pub message: String,
    pub position: usize,
}

impl AbbreviationError {
    pub fn new(message: impl Into<String>, position: usize) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Unexpected character `ch` at `position`
    pub fn unexpected(ch: char, position: usize) -> Self {
        Self::new(format!("Unexpected character \"{ch}\""), position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abbreviation_error_display_includes_position() {
        let err = AbbreviationError::unexpected('>', 3);
        assert_eq!(err.to_string(), "Unexpected character \">\" at 3");
    }

    #[test]
    fn config_helper_builds_config_variant() {
        let err = TagwiseError::config("jsxPrefix must not be empty");
        assert!(matches!(err, TagwiseError::Config { .. }));
        assert_eq!(
            err.to_string(),
            "Invalid configuration: jsxPrefix must not be empty"
        );
    }
}
