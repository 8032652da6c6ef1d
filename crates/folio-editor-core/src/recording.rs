//! Audio recording lifecycle.
//!
//! `Idle -> Recording -> (Saving | Cancelling) -> Idle`. While recording, the
//! audio block is transient: it lives in the session, not in the document,
//! so timer updates never touch `blocks` or history. Saving inserts the
//! finished block through `insert_block_at_cursor`, which is the point it
//! becomes undoable.

use std::time::Duration;

use web_time::Instant;

use crate::block::{Audio, Block, BlockKind, format_duration};
use crate::editor::NoteEditor;
use crate::error::EditorError;
use crate::observe::EditorEvent;
use crate::types::{BlockId, MediaRef};

/// Where the recorder is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RecordingPhase {
    #[default]
    Idle,
    Recording,
    Saving,
    Cancelling,
}

/// The in-flight recording.
#[derive(Debug)]
pub(crate) struct RecordingSession {
    block: Block,
    target: MediaRef,
    started_at: Instant,
}

impl RecordingSession {
    fn audio_mut(&mut self) -> Option<&mut Audio> {
        match &mut self.block.kind {
            BlockKind::Audio(audio) => Some(audio),
            _ => None,
        }
    }
}

impl NoteEditor {
    pub fn recording_phase(&self) -> RecordingPhase {
        self.recording_phase
    }

    pub fn is_recording(&self) -> bool {
        self.recording.is_some()
    }

    /// The transient audio block of the active recording.
    pub fn recording_block(&self) -> Option<&Block> {
        self.recording.as_ref().map(|s| &s.block)
    }

    /// Time since the active recording started.
    pub fn recording_elapsed(&self) -> Option<Duration> {
        let session = self.recording.as_ref()?;
        Some(
            self.services
                .clock
                .now()
                .saturating_duration_since(session.started_at),
        )
    }

    /// Start recording into a freshly allocated media target.
    ///
    /// Rejected while another recording is active. A device that fails to
    /// start sends the session straight to cancellation.
    pub fn begin_recording(&mut self) -> bool {
        match self.try_begin_recording() {
            Ok(id) => {
                tracing::info!(target: "folio::recording", block = %id, "recording started");
                true
            }
            Err(e) => {
                tracing::warn!(target: "folio::recording", error = %e, "could not start recording");
                false
            }
        }
    }

    fn try_begin_recording(&mut self) -> Result<BlockId, EditorError> {
        if self.recording.is_some() {
            return Err(EditorError::AlreadyRecording);
        }
        let target = self
            .services
            .media
            .allocate_recording()
            .map_err(EditorError::ResourceUnavailable)?;
        let block = Block::new(BlockKind::Audio(Audio {
            resource: Some(target.clone()),
            recording: true,
            ..Default::default()
        }));
        let id = block.id();
        self.recording = Some(RecordingSession {
            block,
            target: target.clone(),
            started_at: self.services.clock.now(),
        });

        if let Err(e) = self.services.recorder.start(&target) {
            self.cancel_recording();
            return Err(EditorError::Device(e));
        }
        self.set_recording_phase(RecordingPhase::Recording);
        self.set_toolbar_visible(false);
        Ok(id)
    }

    /// Refresh elapsed time and the `MM:SS` label of the transient block.
    ///
    /// The embedder calls this every `duration_tick` while recording.
    pub fn tick_recording(&mut self) -> Option<Duration> {
        let elapsed = self.recording_elapsed()?;
        let millis = elapsed.as_millis() as u64;
        let audio = self.recording.as_mut()?.audio_mut()?;
        audio.elapsed_ms = millis;
        audio.duration = format_duration(millis);
        self.emit(EditorEvent::RecordingProgress { elapsed_ms: millis });
        Some(elapsed)
    }

    /// Pull one amplitude sample into the trailing waveform window.
    ///
    /// The embedder calls this every `amplitude_tick` while recording.
    pub fn sample_amplitude(&mut self) -> Option<u16> {
        self.recording.as_ref()?;
        let sample = match self.services.recorder.amplitude() {
            Ok(sample) => sample,
            Err(e) => {
                tracing::debug!(target: "folio::recording", error = %e, "amplitude unavailable");
                return None;
            }
        };
        let window = self.config.amplitude_window;
        self.recording.as_mut()?.audio_mut()?.push_amplitude(sample, window);
        Some(sample)
    }

    /// Finish the recording and insert it at the cursor.
    ///
    /// Recordings shorter than `min_recording` are discarded instead. Returns
    /// the id of the inserted block.
    pub fn commit_recording(&mut self) -> Option<BlockId> {
        let Some(elapsed) = self.recording_elapsed() else {
            tracing::debug!(target: "folio::recording", "{}", EditorError::NotRecording);
            return None;
        };
        if elapsed < self.config.min_recording {
            tracing::info!(
                target: "folio::recording",
                elapsed_ms = elapsed.as_millis() as u64,
                "recording too short, discarding"
            );
            self.cancel_recording();
            return None;
        }

        self.set_recording_phase(RecordingPhase::Saving);
        let mut session = self.recording.take()?;
        let device_duration = match self.services.recorder.stop() {
            Ok(duration) => duration,
            Err(e) => {
                tracing::warn!(
                    target: "folio::recording",
                    error = %EditorError::Device(e),
                    "recorder failed to stop, discarding"
                );
                self.discard_recording(session);
                return None;
            }
        };

        let duration = self.final_duration(&session.target, device_duration, elapsed);
        let millis = duration.as_millis() as u64;
        if let Some(audio) = session.audio_mut() {
            audio.recording = false;
            audio.elapsed_ms = millis;
            audio.duration = format_duration(millis);
        }
        let id = self.insert_block_at_cursor(session.block);
        self.set_recording_phase(RecordingPhase::Idle);
        tracing::info!(target: "folio::recording", duration_ms = millis, "recording saved");
        id
    }

    /// Abandon the active recording.
    ///
    /// Safe at any point while recording. Stop failures are tolerated; the
    /// partial file is always deleted. The document and history are untouched.
    pub fn cancel_recording(&mut self) -> bool {
        let Some(session) = self.recording.take() else {
            return false;
        };
        self.set_recording_phase(RecordingPhase::Cancelling);
        if let Err(e) = self.services.recorder.stop() {
            tracing::debug!(target: "folio::recording", error = %e, "stop during cancel failed");
        }
        self.discard_recording(session);
        tracing::info!(target: "folio::recording", "recording cancelled");
        true
    }

    fn discard_recording(&mut self, session: RecordingSession) {
        if self.recording_phase != RecordingPhase::Cancelling {
            self.set_recording_phase(RecordingPhase::Cancelling);
        }
        if let Err(e) = self.services.media.delete(&session.target) {
            tracing::warn!(
                target: "folio::recording",
                target_ref = %session.target,
                error = %e,
                "could not delete partial recording"
            );
        }
        self.set_recording_phase(RecordingPhase::Idle);
    }

    /// Device duration, else the probed file length, else wall-clock elapsed.
    fn final_duration(&self, target: &MediaRef, device: Duration, elapsed: Duration) -> Duration {
        if !device.is_zero() {
            return device;
        }
        match self.services.media.probe_duration(target) {
            Ok(probed) if !probed.is_zero() => probed,
            Ok(_) => elapsed,
            Err(e) => {
                tracing::debug!(
                    target: "folio::recording",
                    error = %EditorError::ResourceUnavailable(e),
                    "falling back to elapsed time"
                );
                elapsed
            }
        }
    }

    fn set_recording_phase(&mut self, phase: RecordingPhase) {
        if self.recording_phase == phase {
            return;
        }
        self.recording_phase = phase;
        self.emit(EditorEvent::RecordingChanged(phase));
    }
}
