//! Tunables of an editing session.

use std::time::Duration;

use crate::undo::DEFAULT_HISTORY_DEPTH;

/// Settings fixed for the lifetime of a [`crate::NoteEditor`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    /// Maximum entries in each of the undo and redo stacks.
    pub history_depth: usize,
    /// Recordings shorter than this are discarded on save.
    pub min_recording: Duration,
    /// Amplitude samples kept for the live waveform.
    pub amplitude_window: usize,
    /// How often the embedder should call `tick_recording`.
    pub duration_tick: Duration,
    /// How often the embedder should call `sample_amplitude`.
    pub amplitude_tick: Duration,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            history_depth: DEFAULT_HISTORY_DEPTH,
            min_recording: Duration::from_secs(1),
            amplitude_window: 64,
            duration_tick: Duration::from_millis(1000),
            amplitude_tick: Duration::from_millis(50),
        }
    }
}
