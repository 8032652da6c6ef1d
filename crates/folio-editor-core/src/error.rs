//! Error types for editor operations.
//!
//! Commands on [`crate::NoteEditor`] never return these: they log and degrade
//! to a no-op. The fallible building blocks underneath (recording, media,
//! persistence) use them so the failure reason reaches the log.

use thiserror::Error;

use crate::platform::PlatformError;
use crate::types::BlockId;

/// Errors raised inside the editing session.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum EditorError {
    /// Command referenced a block that is no longer present.
    #[error("block {0} not found")]
    NotFound(BlockId),

    /// Move with out-of-range or identical indices.
    #[error("invalid move from {from} to {to} in a document of {len} blocks")]
    InvalidMove { from: usize, to: usize, len: usize },

    /// Undo at the history floor.
    #[error("nothing to undo")]
    NothingToUndo,

    /// Redo with an empty redo stack.
    #[error("nothing to redo")]
    NothingToRedo,

    /// A recording is already in progress.
    #[error("a recording is already in progress")]
    AlreadyRecording,

    /// No recording is in progress.
    #[error("no recording in progress")]
    NotRecording,

    /// Recorder or player failure.
    #[error("device failure: {0}")]
    Device(#[source] PlatformError),

    /// Backing media missing or unreadable.
    #[error("resource unavailable: {0}")]
    ResourceUnavailable(#[source] PlatformError),
}

/// Errors raised while encoding or decoding notes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum PersistError {
    /// Malformed JSON or unexpected shape.
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Envelope version this build does not understand.
    #[error("unsupported note format version {found} (expected {expected})")]
    UnsupportedFormat { found: u32, expected: u32 },

    /// Two blocks share an id.
    #[error("duplicate block id {0}")]
    DuplicateBlockId(BlockId),

    /// Reading or writing the backing file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
