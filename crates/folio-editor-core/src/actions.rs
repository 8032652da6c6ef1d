//! Editor actions.
//!
//! Platform-agnostic definitions of every callback a rendering layer can fire.
//! `EditorAction` values are applied with [`crate::execute_action`], which keeps
//! UI code free of direct document mutation.

use crate::block::{BlockTemplate, RasterImage};
use crate::commands::{BlockField, TextInput};
use crate::rich_text::SpanStyle;
use crate::types::{BlockId, MediaRef, OptionId, Selection, TextAlign};

/// All possible editor actions.
///
/// These represent semantic operations on the note, decoupled from how
/// they're triggered (touch, keyboard, script).
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    // === Text ===
    /// Replace the note title.
    SetTitle(String),

    /// New content reported by a text block's input widget.
    ChangeText { block: BlockId, input: TextInput },

    /// Caret or selection moved inside a text block.
    Select { block: BlockId, selection: Selection },

    // === Formatting ===
    /// Toolbar toggle: applies to the selection, or arms for the next input.
    ToggleStyle(SpanStyle),

    /// Set a valued style (size, color) over the selection.
    ApplyStyle(SpanStyle),

    /// Paragraph alignment of the focused block.
    SetAlign(TextAlign),

    /// Toggle bullet-list rendering of the focused paragraph.
    ToggleListItem,

    // === Block fields ===
    SetChecked { block: BlockId, checked: bool },

    SetToggle { block: BlockId, on: bool },

    ToggleAccordion(BlockId),

    SelectRadio { group: BlockId, option: OptionId },

    ToggleImageSize(BlockId),

    SetField { block: BlockId, field: BlockField, value: String },

    // === Structure ===
    /// Insert an empty block of a type after the cursor.
    Insert(BlockTemplate),

    /// Insert an image the platform picked or captured.
    InsertImage(MediaRef),

    /// Insert a finished drawing.
    InsertDrawing(RasterImage),

    Delete(BlockId),

    /// Reorder by index.
    Move { from: usize, to: usize },

    // === Focus and chrome ===
    Focus(Option<BlockId>),

    SelectImage(BlockId),

    ToggleDrawingMode(BlockId),

    SetToolbarVisible(bool),

    SetDragState {
        dragging: Option<BlockId>,
        drop_target: Option<usize>,
    },

    DismissKeyboard,

    // === History ===
    /// Undo the last change.
    Undo,

    /// Redo the last undone change.
    Redo,

    /// Record the current state as a checkpoint.
    Commit,

    // === Audio ===
    BeginRecording,

    CommitRecording,

    CancelRecording,

    TogglePlayback(BlockId),

    StopPlayback,
}

impl EditorAction {
    /// Whether this action can change document content (not just chrome).
    pub fn is_content_edit(&self) -> bool {
        !matches!(
            self,
            Self::Select { .. }
                | Self::Focus(_)
                | Self::SelectImage(_)
                | Self::ToggleDrawingMode(_)
                | Self::SetToolbarVisible(_)
                | Self::SetDragState { .. }
                | Self::DismissKeyboard
                | Self::Commit
                | Self::BeginRecording
                | Self::CancelRecording
                | Self::TogglePlayback(_)
                | Self::StopPlayback
        )
    }
}
