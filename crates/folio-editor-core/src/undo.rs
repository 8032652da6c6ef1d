//! Undo/redo management for editor operations.
//!
//! Provides:
//! - `UndoManager` trait for abstracting undo implementations
//! - `SnapshotHistory` - bounded undo/redo stacks of whole-document snapshots

use std::collections::VecDeque;

use crate::document::DocumentSnapshot;

/// Default maximum depth of each history stack.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// Trait for managing undo/redo operations.
///
/// Implementations must actually perform the undo/redo, not just track state.
/// `NoteEditor` implements this over a `SnapshotHistory` and its live document.
pub trait UndoManager {
    /// Check if undo is available.
    fn can_undo(&self) -> bool;

    /// Check if redo is available.
    fn can_redo(&self) -> bool;

    /// Perform undo. Returns true if successful.
    fn undo(&mut self) -> bool;

    /// Perform redo. Returns true if successful.
    fn redo(&mut self) -> bool;

    /// Clear all undo/redo history.
    fn clear_history(&mut self);
}

/// Two bounded stacks of checkpoint snapshots.
///
/// The bottom of `undo` is the oldest state still reachable and is never
/// popped by [`SnapshotHistory::undo`]. Pushing past `capacity` evicts the
/// bottom entry. Stored snapshots are never mutated after being pushed.
#[derive(Debug, Clone)]
pub struct SnapshotHistory {
    undo: VecDeque<DocumentSnapshot>,
    redo: VecDeque<DocumentSnapshot>,
    capacity: usize,
}

impl SnapshotHistory {
    /// Start a history whose floor is `initial`.
    pub fn new(initial: &DocumentSnapshot, capacity: usize) -> Self {
        // One slot holds the floor, so a single step needs two.
        let capacity = capacity.max(2);
        let mut undo = VecDeque::with_capacity(capacity.min(DEFAULT_HISTORY_DEPTH));
        undo.push_back(initial.duplicate());
        Self {
            undo,
            redo: VecDeque::new(),
            capacity,
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    /// Most recent checkpoint.
    pub fn top(&self) -> Option<&DocumentSnapshot> {
        self.undo.back()
    }

    /// Push a duplicate of `live` unless it is content-equal to the top.
    ///
    /// Clears redo when it pushes. Returns whether a checkpoint was recorded.
    pub fn checkpoint_if_changed(&mut self, live: &DocumentSnapshot) -> bool {
        if self.top().is_some_and(|top| top.content_equals(live)) {
            return false;
        }
        push_bounded(&mut self.undo, live.duplicate(), self.capacity);
        self.redo.clear();
        tracing::trace!(
            target: "folio::history",
            undo_depth = self.undo.len(),
            "checkpoint"
        );
        true
    }

    /// Drop every redo entry.
    pub fn clear_redo(&mut self) {
        self.redo.clear();
    }

    /// Whether `live` differs from the top or there is more than the floor.
    pub fn can_undo(&self, live: &DocumentSnapshot) -> bool {
        self.undo.len() > 1 || self.top().is_some_and(|top| !top.content_equals(live))
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    /// Step back one checkpoint, replacing `live`.
    ///
    /// Commits `live` first so an in-flight edit is recorded and becomes
    /// redoable. Never pops the floor entry.
    pub fn undo(&mut self, live: &mut DocumentSnapshot) -> bool {
        self.checkpoint_if_changed(live);
        if self.undo.len() <= 1 {
            return false;
        }
        push_bounded(&mut self.redo, live.duplicate(), self.capacity);
        self.undo.pop_back();
        let Some(top) = self.undo.back() else {
            return false;
        };
        *live = top.duplicate();
        true
    }

    /// Step forward one checkpoint, replacing `live`.
    pub fn redo(&mut self, live: &mut DocumentSnapshot) -> bool {
        let Some(next) = self.redo.pop_back() else {
            return false;
        };
        if !self.top().is_some_and(|top| top.content_equals(live)) {
            push_bounded(&mut self.undo, live.duplicate(), self.capacity);
        }
        *live = next;
        true
    }

    /// Reset to a single floor entry equal to `live`.
    pub fn reset(&mut self, live: &DocumentSnapshot) {
        self.undo.clear();
        self.redo.clear();
        self.undo.push_back(live.duplicate());
    }
}

fn push_bounded(stack: &mut VecDeque<DocumentSnapshot>, snapshot: DocumentSnapshot, cap: usize) {
    stack.push_back(snapshot);
    while stack.len() > cap {
        stack.pop_front();
    }
}
