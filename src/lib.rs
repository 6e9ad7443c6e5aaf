pub mod abbreviation;
pub mod config;
pub mod context;
pub mod error;
pub mod language;
pub mod markup;
pub mod scanner;
pub mod stylesheet;
pub mod text;
pub mod tracker;

// Re-export the locators consumed by editor commands
pub use context::{
    ActivationConfig, MarkupContext, MarkupContextOptions, StylesheetContext,
    get_activation_context, get_css_context, get_html_context,
};
pub use markup::{find_tag_match, get_tag, get_tag_matches, select_item_html};
pub use stylesheet::{get_css_section, select_item_css};
pub use text::{SelectItemModel, TextRange};

// Re-export the tracking surface
pub use config::{TrackerSettings, load_settings};
pub use error::{AbbreviationError, TagwiseError, TagwiseResult};
pub use tracker::{Editor, EditorId, MemoryEditor, Tracker, TrackerState, TrackingController};
