//! Audio playback.
//!
//! The player is a singleton: starting one block stops whatever was playing.
//! Which block plays is session state, not block content, so playback never
//! creates undo steps.

use crate::block::BlockKind;
use crate::editor::NoteEditor;
use crate::error::EditorError;
use crate::observe::EditorEvent;
use crate::types::BlockId;

impl NoteEditor {
    /// The audio block currently playing.
    pub fn playing_block(&self) -> Option<BlockId> {
        self.playing
    }

    /// Start playing `id`, or stop it if it is already playing.
    ///
    /// Returns whether `id` is playing afterwards.
    pub fn toggle_playback(&mut self, id: BlockId) -> bool {
        if self.playing == Some(id) {
            self.stop_playback();
            return false;
        }
        let resource = match self.live.block(id).map(|b| &b.kind) {
            Some(BlockKind::Audio(audio)) if !audio.recording => audio.resource.clone(),
            Some(_) => None,
            None => {
                tracing::debug!(target: "folio::playback", "{}", EditorError::NotFound(id));
                return false;
            }
        };
        let Some(resource) = resource else {
            tracing::debug!(target: "folio::playback", block = %id, "no playable resource");
            return false;
        };

        self.stop_playback();
        if let Err(e) = self.services.player.play(&resource) {
            tracing::warn!(
                target: "folio::playback",
                block = %id,
                error = %EditorError::Device(e),
                "playback failed"
            );
            return false;
        }
        self.playing = Some(id);
        tracing::debug!(target: "folio::playback", block = %id, "playback started");
        self.emit(EditorEvent::PlaybackChanged(Some(id)));
        true
    }

    /// Stop the current playback, if any.
    pub fn stop_playback(&mut self) -> bool {
        let Some(id) = self.playing.take() else {
            return false;
        };
        if let Err(e) = self.services.player.stop() {
            tracing::debug!(target: "folio::playback", block = %id, error = %e, "stop failed");
        }
        self.emit(EditorEvent::PlaybackChanged(None));
        true
    }

    /// Called by the player adapter when playback reached the end.
    pub fn on_playback_finished(&mut self) {
        if let Some(id) = self.playing.take() {
            tracing::debug!(target: "folio::playback", block = %id, "playback finished");
            self.emit(EditorEvent::PlaybackChanged(None));
        }
    }
}
