use std::borrow::Cow;

use crate::config::OutputOptions;
use crate::text::{Source, TextRange, utf16_len};

use super::{Editor, EditorId, Tracker};

/// Plain in-memory buffer implementing [`Editor`], with a caret and the
/// currently marked range.
#[derive(Clone, Debug)]
pub struct MemoryEditor {
    id: EditorId,
    syntax: String,
    text: String,
    caret: usize,
    allow_tracking: bool,
    marked: Option<TextRange>,
    output: Option<OutputOptions>,
}

impl MemoryEditor {
    /// New buffer with the caret at the end of `text`
    pub fn new(id: u64, syntax: impl Into<String>, text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            id: EditorId(id),
            syntax: syntax.into(),
            caret: utf16_len(&text),
            text,
            allow_tracking: true,
            marked: None,
            output: None,
        }
    }

    pub fn set_caret(&mut self, pos: usize) {
        self.caret = pos.min(utf16_len(&self.text));
    }

    pub fn set_syntax(&mut self, syntax: impl Into<String>) {
        self.syntax = syntax.into();
    }

    pub fn set_allow_tracking(&mut self, allow: bool) {
        self.allow_tracking = allow;
    }

    pub fn set_output_options(&mut self, options: Option<OutputOptions>) {
        self.output = options;
    }

    /// Insert `text` at the caret and move the caret past it
    pub fn type_text(&mut self, text: &str) {
        let at = self.caret;
        self.splice(TextRange::empty(at), text);
        self.caret = at + utf16_len(text);
    }

    /// Delete the character before the caret
    pub fn backspace(&mut self) {
        let Some(ch) = Source::new(&self.text).char_before(self.caret) else {
            return;
        };
        let start = self.caret - ch.len_utf16();
        self.splice(TextRange::new(start, self.caret), "");
        self.caret = start;
    }

    /// Range of the currently marked tracker
    pub fn marked(&self) -> Option<TextRange> {
        self.marked
    }

    fn splice(&mut self, range: TextRange, text: &str) {
        let bytes = Source::new(&self.text).byte_range(range);
        self.text.replace_range(bytes, text);
    }
}

impl Editor for MemoryEditor {
    fn id(&self) -> EditorId {
        self.id
    }

    fn text(&self) -> Cow<'_, str> {
        Cow::Borrowed(&self.text)
    }

    fn replace(&mut self, text: &str, range: TextRange) {
        self.splice(range, text);
        let inserted = utf16_len(text);
        if self.caret >= range.end {
            self.caret = self.caret - range.len() + inserted;
        } else if self.caret > range.start {
            self.caret = range.start + inserted;
        }
    }

    fn syntax(&self) -> String {
        self.syntax.clone()
    }

    fn caret(&self) -> usize {
        self.caret
    }

    fn output_options(&self, _pos: usize, _inline: bool) -> Option<OutputOptions> {
        self.output.clone()
    }

    fn mark(&mut self, tracker: &Tracker) {
        self.marked = Some(tracker.range);
    }

    fn unmark(&mut self, _tracker: &Tracker) {
        self.marked = None;
    }

    fn allow_tracking(&self, _pos: usize) -> bool {
        self.allow_tracking
    }
}
