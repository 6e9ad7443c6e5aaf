use std::borrow::Cow;

use crate::config::OutputOptions;
use crate::context::AbbreviationKind;
use crate::language;
use crate::text::{Source, TextRange, utf16_len};

use super::Tracker;

/// Opaque identity of an editor instance; all tracking state is keyed by it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EditorId(pub u64);

impl From<u64> for EditorId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

/// Capabilities the tracking controller needs from an editor.
///
/// Offsets are UTF-16 code units. Only buffer access, replacement, dialect
/// and caret are required; the rest have defaults suited to a plain buffer.
pub trait Editor {
    fn id(&self) -> EditorId;

    /// Whole document text
    fn text(&self) -> Cow<'_, str>;

    fn substr(&self, range: TextRange) -> String {
        let text = self.text();
        Source::new(&text).slice(range).to_string()
    }

    fn replace(&mut self, text: &str, range: TextRange);

    /// Dialect name, e.g. `html`, `css`, `javascriptreact`
    fn syntax(&self) -> String;

    fn caret(&self) -> usize;

    fn document_length(&self) -> usize {
        utf16_len(&self.text())
    }

    /// Per-position output options; `None` falls back to the settings
    fn output_options(&self, _pos: usize, _inline: bool) -> Option<OutputOptions> {
        None
    }

    /// Visually mark the tracked abbreviation
    fn mark(&mut self, _tracker: &Tracker) {}

    fn unmark(&mut self, _tracker: &Tracker) {}

    fn allow_tracking(&self, _pos: usize) -> bool {
        true
    }

    fn is_css(&self, syntax: &str) -> bool {
        language::is_css(syntax)
    }

    fn is_html(&self, syntax: &str) -> bool {
        language::is_html(syntax)
    }

    fn is_xml(&self, syntax: &str) -> bool {
        language::is_xml(syntax)
    }

    fn is_jsx(&self, syntax: &str) -> bool {
        language::is_jsx(syntax)
    }

    fn syntax_kind(&self, syntax: &str) -> AbbreviationKind {
        language::syntax_kind(syntax)
    }
}
