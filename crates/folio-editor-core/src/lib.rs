//! folio-editor-core: block-based note editing without framework dependencies.
//!
//! This crate provides:
//! - `Block` / `BlockKind` - the content units of a note
//! - `RichText` - text with normalized character-level style spans
//! - `DocumentSnapshot` - the whole note, duplicated into history
//! - `SnapshotHistory` - bounded undo/redo stacks with content de-duplication
//! - `NoteEditor` - commands, typing runs, recording and playback
//! - `EditorAction` + `execute_action` - one dispatch point for UI callbacks
//! - Platform traits for recorder, player, media storage and clock
//! - JSON persistence with `NoteStore` implementations

pub mod actions;
pub mod block;
pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod execute;
pub mod observe;
pub mod persist;
pub mod platform;
pub mod playback;
pub mod recording;
pub mod rich_text;
pub mod types;
pub mod undo;

pub use actions::EditorAction;
pub use block::{
    Accordion, Audio, Block, BlockKind, BlockTemplate, Checkbox, Drawing, Image, Paragraph,
    RadioGroup, RadioOption, RasterImage, TextLine, ToggleSwitch, format_duration,
};
pub use commands::{BlockField, TextInput};
pub use config::EditorConfig;
pub use document::{DocumentSnapshot, UiChrome};
pub use editor::NoteEditor;
pub use error::{EditorError, PersistError};
pub use execute::execute_action;
pub use observe::{EditorEvent, HistoryState, Subscription};
pub use persist::{FileStore, MemoryStore, NoteStore};
pub use platform::{
    AudioPlayer, Clock, FsMediaStore, MediaStore, PlatformError, PlatformServices,
    RecordingDevice, SystemClock,
};
pub use recording::RecordingPhase;
pub use rich_text::{RichText, Rgba, SpanStyle, StyleKind, StyleSpan, TextEdit, reanchor_spans};
pub use smol_str::SmolStr;
pub use types::{BlockId, MediaRef, OptionId, Selection, TextAlign};
pub use undo::{SnapshotHistory, UndoManager};
