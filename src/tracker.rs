//! Abbreviation tracking: per-editor state machine that follows a shorthand
//! expression while it is typed and edited.

pub mod controller;
pub mod editor;
pub mod memory;

use serde::Serialize;

use crate::context::ActivationConfig;
use crate::error::AbbreviationError;
use crate::text::TextRange;

pub use controller::{StopOptions, TrackingController, TrackingParams};
pub use editor::{Editor, EditorId};
pub use memory::MemoryEditor;

/// One tracked abbreviation in one editor
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Tracker {
    /// Tracked range, including any prefix marker
    pub range: TextRange,
    /// Abbreviation text, without the prefix marker
    pub abbreviation: String,
    /// Keep tracking even when empty or invalid
    pub forced: bool,
    /// Length of the prefix marker at the start of `range`
    pub offset: usize,
    pub last_position: usize,
    /// Document length when the tracker was last reconciled
    pub last_length: usize,
    pub config: ActivationConfig,
    pub state: TrackerState,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum TrackerState {
    Valid {
        simple: bool,
        preview: String,
    },
    Error(AbbreviationError),
}

impl Tracker {
    pub fn is_valid(&self) -> bool {
        matches!(self.state, TrackerState::Valid { .. })
    }

    pub fn error(&self) -> Option<&AbbreviationError> {
        match &self.state {
            TrackerState::Error(error) => Some(error),
            TrackerState::Valid { .. } => None,
        }
    }

    pub fn preview(&self) -> Option<&str> {
        match &self.state {
            TrackerState::Valid { preview, .. } => Some(preview),
            TrackerState::Error(_) => None,
        }
    }

    /// Range of the abbreviation text itself
    pub fn abbreviation_range(&self) -> TextRange {
        TextRange::new(self.range.start + self.offset, self.range.end)
    }
}
