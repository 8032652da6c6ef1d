//! The note editing session.
//!
//! [`NoteEditor`] owns the live document, its snapshot history, the platform
//! collaborators and the observers. Commands live in `commands.rs`, the
//! recording and playback state machines in their own modules; this file
//! holds construction, history transitions and notification.

use std::collections::BTreeSet;

use crate::config::EditorConfig;
use crate::document::DocumentSnapshot;
use crate::observe::{EditorEvent, HistoryState, Observers, Subscription};
use crate::platform::PlatformServices;
use crate::recording::{RecordingPhase, RecordingSession};
use crate::rich_text::SpanStyle;
use crate::types::{BlockId, Selection};
use crate::undo::{SnapshotHistory, UndoManager};

/// What the current typing run is editing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TypingTarget {
    Title,
    Block(BlockId),
    Field(BlockId, crate::commands::BlockField),
}

/// A single-note editing session.
pub struct NoteEditor {
    pub(crate) live: DocumentSnapshot,
    pub(crate) history: SnapshotHistory,
    pub(crate) config: EditorConfig,
    pub(crate) services: PlatformServices,
    /// Styles armed for the next inserted text.
    pub(crate) pending_styles: BTreeSet<SpanStyle>,
    pub(crate) typing_run: Option<TypingTarget>,
    pub(crate) recording: Option<RecordingSession>,
    pub(crate) recording_phase: RecordingPhase,
    pub(crate) playing: Option<BlockId>,
    observers: Observers,
    revision: u64,
    disposed: bool,
}

impl NoteEditor {
    /// Start a session on the default note (empty title, one empty paragraph).
    pub fn new(config: EditorConfig, services: PlatformServices) -> Self {
        Self::with_document(DocumentSnapshot::default(), config, services)
    }

    /// Start a session on an existing note. Its state becomes the history floor.
    pub fn with_document(
        mut document: DocumentSnapshot,
        config: EditorConfig,
        services: PlatformServices,
    ) -> Self {
        document.repair_pointers();
        let history = SnapshotHistory::new(&document, config.history_depth);
        tracing::debug!(
            target: "folio::editor",
            blocks = document.blocks.len(),
            history_depth = history.capacity(),
            "editor initialized"
        );
        Self {
            live: document,
            history,
            config,
            services,
            pending_styles: BTreeSet::new(),
            typing_run: None,
            recording: None,
            recording_phase: RecordingPhase::Idle,
            playing: None,
            observers: Observers::default(),
            revision: 0,
            disposed: false,
        }
    }

    /// The live document. Read-only; mutate through commands.
    pub fn document(&self) -> &DocumentSnapshot {
        &self.live
    }

    /// Independent copy of the live document.
    pub fn snapshot(&self) -> DocumentSnapshot {
        self.live.duplicate()
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn history(&self) -> &SnapshotHistory {
        &self.history
    }

    pub fn history_state(&self) -> HistoryState {
        HistoryState {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_depth: self.history.undo_depth(),
            redo_depth: self.history.redo_depth(),
        }
    }

    pub fn pending_styles(&self) -> &BTreeSet<SpanStyle> {
        &self.pending_styles
    }

    /// Number of live-document changes so far.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Record the live state as a checkpoint if it differs from the last one.
    ///
    /// Ends any typing run. Called on focus loss, save and keyboard dismissal.
    pub fn commit(&mut self) -> bool {
        self.typing_run = None;
        let pushed = self.history.checkpoint_if_changed(&self.live);
        if pushed {
            self.emit_history();
        }
        pushed
    }

    /// Register an observer. It is called synchronously after each change.
    pub fn subscribe(&mut self, observer: impl FnMut(&EditorEvent) + 'static) -> Subscription {
        self.observers.add(Box::new(observer))
    }

    pub fn unsubscribe(&mut self, subscription: Subscription) -> bool {
        self.observers.remove(subscription)
    }

    pub fn observer_count(&self) -> usize {
        self.observers.len()
    }

    /// Release devices and observers. Idempotent; also run on drop.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cancel_recording();
        self.stop_playback();
        self.observers.clear();
        self.disposed = true;
        tracing::debug!(target: "folio::editor", revision = self.revision, "editor disposed");
    }

    // === Internal helpers ===

    /// Checkpoint the pre-mutation state and invalidate redo.
    ///
    /// Every discrete command calls this before touching `live`.
    pub(crate) fn begin_edit(&mut self) {
        self.typing_run = None;
        self.history.checkpoint_if_changed(&self.live);
        self.history.clear_redo();
    }

    /// Like `begin_edit`, but only once per run of edits to `target`.
    pub(crate) fn begin_typing(&mut self, target: TypingTarget) {
        if self.typing_run != Some(target) {
            self.begin_edit();
            self.typing_run = Some(target);
        }
    }

    /// End the current typing run with a commit if it is not `target`.
    pub(crate) fn end_other_typing(&mut self, target: Option<TypingTarget>) {
        if self.typing_run.is_some() && self.typing_run != target {
            self.commit();
        }
    }

    pub(crate) fn document_changed(&mut self) {
        self.revision += 1;
        let revision = self.revision;
        self.emit(EditorEvent::DocumentChanged { revision });
        self.emit_history();
    }

    pub(crate) fn emit_history(&mut self) {
        let state = self.history_state();
        self.emit(EditorEvent::HistoryChanged(state));
    }

    pub(crate) fn emit(&mut self, event: EditorEvent) {
        self.observers.emit(&event);
    }

    /// Reconcile session state after `live` was replaced wholesale.
    fn after_history_jump(&mut self, toolbar_visible: bool) {
        self.pending_styles.clear();
        self.live.chrome.toolbar_visible = toolbar_visible;
        self.live.chrome.dragging_block_id = None;
        self.live.chrome.drop_target = None;
        self.live.repair_pointers();
        let len = self
            .live
            .focused_block()
            .and_then(|b| b.rich_text())
            .map_or(0, |t| t.len_chars());
        self.live.chrome.selection = self.live.chrome.selection.clamped(len);
        if let Some(playing) = self.playing
            && self.live.block(playing).is_none()
        {
            self.stop_playback();
        }
        self.document_changed();
    }
}

impl UndoManager for NoteEditor {
    fn can_undo(&self) -> bool {
        self.history.can_undo(&self.live)
    }

    fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    fn undo(&mut self) -> bool {
        self.typing_run = None;
        let toolbar = self.live.chrome.toolbar_visible;
        if !self.history.undo(&mut self.live) {
            tracing::debug!(target: "folio::history", "{}", crate::EditorError::NothingToUndo);
            self.emit_history();
            return false;
        }
        tracing::debug!(
            target: "folio::history",
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "undo"
        );
        self.after_history_jump(toolbar);
        true
    }

    fn redo(&mut self) -> bool {
        self.typing_run = None;
        let toolbar = self.live.chrome.toolbar_visible;
        if !self.history.redo(&mut self.live) {
            tracing::debug!(target: "folio::history", "{}", crate::EditorError::NothingToRedo);
            return false;
        }
        tracing::debug!(
            target: "folio::history",
            undo_depth = self.history.undo_depth(),
            redo_depth = self.history.redo_depth(),
            "redo"
        );
        self.after_history_jump(toolbar);
        true
    }

    fn clear_history(&mut self) {
        self.typing_run = None;
        self.history.reset(&self.live);
        self.emit_history();
    }
}

impl Drop for NoteEditor {
    fn drop(&mut self) {
        self.dispose();
    }
}

impl std::fmt::Debug for NoteEditor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NoteEditor")
            .field("title", &self.live.title)
            .field("blocks", &self.live.blocks.len())
            .field("undo_depth", &self.history.undo_depth())
            .field("redo_depth", &self.history.redo_depth())
            .field("recording", &self.recording_phase)
            .field("playing", &self.playing)
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}

/// Place the caret at the end of the focused block's text.
pub(crate) fn caret_at_end(doc: &DocumentSnapshot) -> Selection {
    let len = doc
        .focused_block()
        .and_then(|b| b.rich_text())
        .map_or(0, |t| t.len_chars());
    Selection::collapsed(len)
}
