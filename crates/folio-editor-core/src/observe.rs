//! Change notification for rendering layers.

use crate::recording::RecordingPhase;
use crate::types::BlockId;

/// Undo/redo availability, recomputed for every event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryState {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
}

/// What changed in an editor session.
#[derive(Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorEvent {
    /// The live document changed. `revision` increases by one per change.
    DocumentChanged { revision: u64 },
    HistoryChanged(HistoryState),
    RecordingChanged(RecordingPhase),
    /// Elapsed time of the active recording after a timer tick.
    RecordingProgress { elapsed_ms: u64 },
    /// Block now playing, or None when playback stopped.
    PlaybackChanged(Option<BlockId>),
}

/// Handle returned by [`crate::NoteEditor::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription(pub(crate) u64);

pub(crate) type Observer = Box<dyn FnMut(&EditorEvent)>;

/// Registered observers in subscription order.
#[derive(Default)]
pub(crate) struct Observers {
    next_id: u64,
    entries: Vec<(Subscription, Observer)>,
}

impl Observers {
    pub(crate) fn add(&mut self, observer: Observer) -> Subscription {
        let id = Subscription(self.next_id);
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    pub(crate) fn remove(&mut self, id: Subscription) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(sub, _)| *sub != id);
        self.entries.len() != before
    }

    pub(crate) fn emit(&mut self, event: &EditorEvent) {
        for (_, observer) in &mut self.entries {
            observer(event);
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }
}

impl std::fmt::Debug for Observers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observers")
            .field("count", &self.entries.len())
            .finish()
    }
}
