//! Tracking controller: per-editor abbreviation state.
//!
//! # Lifecycle
//!
//! A tracker starts when typing looks like the beginning of an abbreviation
//! (or when [`TrackingController::start_tracking`] is called explicitly) and
//! is reconciled on every content change. When the caret leaves the tracked
//! range, or an edit makes the abbreviation unrecoverable, tracking stops and
//! the last tracker moves to a restore cache. Moving the caret back into the
//! unchanged range restores it.

use std::sync::LazyLock;

use dashmap::DashMap;
use regex::Regex;

use crate::abbreviation::{AbbreviationEngine, BuiltinEngine};
use crate::config::TrackerSettings;
use crate::context::{
    AbbreviationKind, ActivationConfig, StylesheetScope, get_activation_context,
};
use crate::text::{Source, TextRange, utf16_len};

use super::{Editor, EditorId, Tracker, TrackerState};

/// Word bound followed by an abbreviation start
static ABBREVIATION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\s>;"']?[a-zA-Z.#!@\[(]$"#).expect("valid regex"));

static JSX_ABBREVIATION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-zA-Z.#\[(]$").expect("valid regex"));

static STYLESHEET_ABBREVIATION_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#"^[\s;"']?[a-zA-Z!@]$"#).expect("valid regex"));

/// Options for creating a tracker over an explicit range
#[derive(Clone, Debug, Default)]
pub struct TrackingParams {
    /// Prefix length excluded from the abbreviation text
    pub offset: usize,
    pub forced: bool,
    /// Activation config; resolved at the range start when absent
    pub config: Option<ActivationConfig>,
}

#[derive(Clone, Copy, Debug, Default)]
pub struct StopOptions {
    /// Keep the text of a forced tracker in the document
    pub skip_remove: bool,
    /// Discard the tracker instead of caching it
    pub force: bool,
}

pub struct TrackingController<G: AbbreviationEngine = BuiltinEngine> {
    engine: G,
    settings: TrackerSettings,
    /// Active tracker per editor
    trackers: DashMap<EditorId, Tracker>,
    /// Last stopped tracker per editor, restorable on caret return
    cache: DashMap<EditorId, Tracker>,
    /// Last known caret per editor
    last_positions: DashMap<EditorId, usize>,
}

impl Default for TrackingController {
    fn default() -> Self {
        Self::new(TrackerSettings::default())
    }
}

impl TrackingController {
    pub fn new(settings: TrackerSettings) -> Self {
        let engine = BuiltinEngine::from_settings(&settings);
        Self::with_engine(engine, settings)
    }
}

impl<G: AbbreviationEngine> TrackingController<G> {
    pub fn with_engine(engine: G, settings: TrackerSettings) -> Self {
        Self {
            engine,
            settings,
            trackers: DashMap::new(),
            cache: DashMap::new(),
            last_positions: DashMap::new(),
        }
    }

    pub fn settings(&self) -> &TrackerSettings {
        &self.settings
    }

    /// Active tracker of an editor
    pub fn tracker(&self, id: EditorId) -> Option<Tracker> {
        self.trackers.get(&id).map(|entry| entry.clone())
    }

    pub fn cached_tracker(&self, id: EditorId) -> Option<Tracker> {
        self.cache.get(&id).map(|entry| entry.clone())
    }

    pub fn last_position(&self, id: EditorId) -> Option<usize> {
        self.last_positions.get(&id).map(|entry| *entry)
    }

    /// Check whether the character just typed before `pos` starts an
    /// abbreviation and, if so, start tracking it.
    pub fn typing_abbreviation<E: Editor + ?Sized>(&self, editor: &mut E, pos: usize) -> Option<Tracker> {
        let syntax = editor.syntax();
        let text = editor.text().into_owned();
        let source = Source::new(&text);

        let typed = source.char_before(pos)?;
        let typed_start = pos - typed.len_utf16();
        let mut offset = 0;
        let mut start = typed_start;
        let mut end = pos;

        // the two characters ending at the caret
        let prefix = source.slice(TextRange::new(pos.saturating_sub(2), pos));

        if editor.is_jsx(&syntax) {
            let marker = self.settings.jsx_prefix.as_str();
            let marker_len = utf16_len(marker);
            let marker_start = typed_start.checked_sub(marker_len)?;
            if source.slice(TextRange::new(marker_start, typed_start)) != marker
                || !JSX_ABBREVIATION_START.is_match(&typed.to_string())
            {
                return None;
            }
            offset = marker_len;
            start = marker_start;
        } else if !ABBREVIATION_START.is_match(prefix) {
            return None;
        }

        // a pair typed together stays balanced
        if let Some(close) = self.settings.closing_pair(typed) {
            if source.char_at(pos) == Some(close) {
                end += close.len_utf16();
            }
        }

        let config = get_activation_context(&*editor, pos)?;
        if config.kind == AbbreviationKind::Stylesheet && !STYLESHEET_ABBREVIATION_START.is_match(prefix) {
            return None;
        }

        let is_section = config.stylesheet_scope() == Some(&StylesheetScope::Section);
        let params = TrackingParams {
            offset,
            forced: false,
            config: Some(config),
        };
        let tracker = self.start_tracking(editor, TextRange::new(start, end), params)?;

        if is_section && looks_like_unresolved_property(&tracker) {
            log::debug!(
                target: "tagwise::tracker",
                "discarding section abbreviation {:?}",
                tracker.abbreviation
            );
            self.stop_tracking(
                editor,
                StopOptions {
                    skip_remove: true,
                    force: true,
                },
            );
            return None;
        }

        Some(tracker)
    }

    /// Start tracking `range`, replacing any active tracker of the editor.
    pub fn start_tracking<E: Editor + ?Sized>(
        &self,
        editor: &mut E,
        range: TextRange,
        params: TrackingParams,
    ) -> Option<Tracker> {
        if range.start > range.end || (range.start == range.end && !params.forced) {
            return None;
        }

        let tracker = self.create_tracker(&*editor, range, &params)?;
        let id = editor.id();
        if let Some((_, previous)) = self.trackers.remove(&id) {
            editor.unmark(&previous);
        }
        self.trackers.insert(id, tracker.clone());
        editor.mark(&tracker);

        log::debug!(
            target: "tagwise::tracker",
            "start tracking {:?} at {:?} in editor {}",
            tracker.abbreviation,
            tracker.range,
            id.0
        );
        Some(tracker)
    }

    /// Build a tracker for `range` without registering it.
    ///
    /// Returns `None` for empty text (unless forced) and for text spanning
    /// several lines.
    pub fn create_tracker<E: Editor + ?Sized>(
        &self,
        editor: &E,
        range: TextRange,
        params: &TrackingParams,
    ) -> Option<Tracker> {
        let text_start = range.start + params.offset;
        if text_start > range.end {
            return None;
        }

        let abbreviation = editor.substr(TextRange::new(text_start, range.end));
        if (abbreviation.is_empty() && !params.forced) || abbreviation.contains(['\n', '\r']) {
            return None;
        }

        let config = match &params.config {
            Some(config) => config.clone(),
            None => get_activation_context(editor, range.start).unwrap_or_else(|| {
                let syntax = editor.syntax();
                ActivationConfig::new(editor.syntax_kind(&syntax), syntax)
            }),
        };

        let state = match self.engine.parse(&abbreviation, &config) {
            Ok(parsed) => {
                let options = editor
                    .output_options(range.start, config.inline)
                    .unwrap_or_else(|| self.settings.output.clone());
                TrackerState::Valid {
                    simple: parsed.is_simple(),
                    preview: self.engine.expand(&parsed, &config, &options),
                }
            }
            Err(error) => TrackerState::Error(error),
        };

        Some(Tracker {
            range,
            abbreviation,
            forced: params.forced,
            offset: params.offset,
            last_position: range.end,
            last_length: editor.document_length(),
            config,
            state,
        })
    }

    /// Stop tracking in `editor`. Unless `force` is set the tracker is kept
    /// in the restore cache.
    pub fn stop_tracking<E: Editor + ?Sized>(&self, editor: &mut E, options: StopOptions) {
        let id = editor.id();
        let Some((_, tracker)) = self.trackers.remove(&id) else {
            return;
        };

        editor.unmark(&tracker);
        if tracker.forced && !options.skip_remove {
            editor.replace("", tracker.range);
        }

        log::debug!(
            target: "tagwise::tracker",
            "stop tracking {:?} in editor {} (force: {})",
            tracker.abbreviation,
            id.0,
            options.force
        );

        if options.force {
            self.cache.remove(&id);
        } else {
            self.cache.insert(id, tracker);
        }
    }

    /// Reconcile the active tracker with a content change, or detect the
    /// start of a new abbreviation.
    pub fn handle_change<E: Editor + ?Sized>(&self, editor: &mut E) -> Option<Tracker> {
        let id = editor.id();
        let pos = editor.caret();
        let previous_caret = self.last_positions.insert(id, pos);

        let Some(tracker) = self.tracker(id) else {
            if previous_caret.is_some_and(|prev| prev + 1 == pos) && editor.allow_tracking(pos) {
                return self.typing_abbreviation(editor, pos);
            }
            return None;
        };

        let last_pos = tracker.last_position;
        if !tracker.range.contains(last_pos) {
            self.stop_tracking(editor, StopOptions::default());
            return None;
        }

        let delta = editor.document_length() as isize - tracker.last_length as isize;
        let mut range = tracker.range;
        if delta < 0 {
            if last_pos == range.start {
                range.start = range.start.saturating_add_signed(delta);
                range.end = range.end.saturating_add_signed(delta);
            } else if range.start < last_pos && last_pos <= range.end {
                range.end = range.end.saturating_add_signed(delta).max(range.start);
            }
        } else if delta > 0 && range.contains(last_pos) {
            range.end += delta as usize;
        }

        if range.is_empty() && !tracker.forced {
            self.stop_tracking(editor, StopOptions::default());
            return None;
        }

        let params = TrackingParams {
            offset: tracker.offset,
            forced: tracker.forced,
            config: Some(tracker.config.clone()),
        };
        let Some(mut next) = self.create_tracker(&*editor, range, &params) else {
            self.stop_tracking(editor, StopOptions::default());
            return None;
        };

        if let TrackerState::Error(error) = &next.state {
            if !next.forced {
                let typed_invalid = next.range.start + next.offset + error.position + 1 == pos;
                if typed_invalid || self.meaningful_end(&*editor, next.range) == pos {
                    log::debug!(
                        target: "tagwise::tracker",
                        "abbreviation {:?} is not recoverable: {}",
                        next.abbreviation,
                        error
                    );
                    self.stop_tracking(editor, StopOptions::default());
                    return None;
                }
            }
        }

        if !next.range.contains(pos) {
            self.stop_tracking(editor, StopOptions::default());
            return None;
        }

        next.last_position = pos;
        editor.unmark(&tracker);
        self.trackers.insert(id, next.clone());
        editor.mark(&next);
        Some(next)
    }

    /// Follow a caret move: keep the active tracker while the caret stays
    /// inside it, otherwise try to restore the cached one.
    pub fn handle_selection_change<E: Editor + ?Sized>(&self, editor: &mut E) -> Option<Tracker> {
        let id = editor.id();
        let pos = editor.caret();
        self.last_positions.insert(id, pos);

        if let Some(mut tracker) = self.tracker(id) {
            if !tracker.range.contains(pos) {
                self.stop_tracking(editor, StopOptions::default());
                return None;
            }
            tracker.last_position = pos;
            self.trackers.insert(id, tracker.clone());
            return Some(tracker);
        }

        let (_, mut cached) = self.cache.remove(&id)?;
        if !cached.range.contains(pos) || editor.substr(cached.abbreviation_range()) != cached.abbreviation {
            return None;
        }

        cached.last_position = pos;
        cached.last_length = editor.document_length();
        self.trackers.insert(id, cached.clone());
        editor.mark(&cached);
        log::debug!(
            target: "tagwise::tracker",
            "restored {:?} in editor {}",
            cached.abbreviation,
            id.0
        );
        Some(cached)
    }

    /// Release all state held for an editor
    pub fn dispose_editor(&self, id: EditorId) {
        self.trackers.remove(&id);
        self.cache.remove(&id);
        self.last_positions.remove(&id);
    }

    /// End of `range` once trailing closing-pair characters are skipped
    fn meaningful_end<E: Editor + ?Sized>(&self, editor: &E, range: TextRange) -> usize {
        let text = editor.text();
        let source = Source::new(&text);
        let mut end = range.end;
        while end > range.start {
            match source.char_before(end) {
                Some(ch) if self.settings.is_closing_pair(ch) => end -= ch.len_utf16(),
                _ => break,
            }
        }
        end
    }
}

/// Preview of the form `abbr:` or `abbr: ;`, which the stylesheet engine
/// produces for names it does not know.
fn looks_like_unresolved_property(tracker: &Tracker) -> bool {
    let Some(preview) = tracker.preview() else {
        return false;
    };
    preview
        .strip_prefix(tracker.abbreviation.as_str())
        .and_then(|rest| rest.strip_prefix(':'))
        .map(str::trim_start)
        .is_some_and(|rest| rest.is_empty() || rest == ";")
}
