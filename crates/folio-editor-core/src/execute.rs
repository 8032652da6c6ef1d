//! Action execution for editor sessions.
//!
//! This module provides the `execute_action` function that applies
//! `EditorAction` operations to a [`NoteEditor`].

use crate::actions::EditorAction;
use crate::editor::NoteEditor;
use crate::undo::UndoManager;

/// Execute an editor action.
///
/// This is the central dispatch point for all editor operations.
/// Returns true if the action was handled and changed something.
pub fn execute_action(editor: &mut NoteEditor, action: &EditorAction) -> bool {
    tracing::trace!(target: "folio::actions", ?action, "execute");
    match action {
        EditorAction::SetTitle(title) => editor.set_title(title),
        EditorAction::ChangeText { block, input } => editor.change_block_text(*block, input.clone()),
        EditorAction::Select { block, selection } => editor.set_selection(*block, *selection),
        EditorAction::ToggleStyle(style) => editor.toggle_style(*style),
        EditorAction::ApplyStyle(style) => editor.apply_style_to_selection(*style),
        EditorAction::SetAlign(align) => editor.set_text_align(*align),
        EditorAction::ToggleListItem => editor.toggle_list_item(),
        EditorAction::SetChecked { block, checked } => editor.set_checked(*block, *checked),
        EditorAction::SetToggle { block, on } => editor.set_toggle(*block, *on),
        EditorAction::ToggleAccordion(block) => editor.toggle_accordion(*block),
        EditorAction::SelectRadio { group, option } => editor.select_radio_option(*group, *option),
        EditorAction::ToggleImageSize(block) => editor.toggle_image_size(*block),
        EditorAction::SetField { block, field, value } => {
            editor.set_block_field(*block, *field, value)
        }
        EditorAction::Insert(template) => editor.insert_new(*template).is_some(),
        EditorAction::InsertImage(resource) => editor.insert_image(resource.clone()).is_some(),
        EditorAction::InsertDrawing(raster) => editor.insert_drawing(raster.clone()).is_some(),
        EditorAction::Delete(block) => editor.delete_block(*block),
        EditorAction::Move { from, to } => editor.move_block(*from, *to),
        EditorAction::Focus(target) => editor.set_focus(*target),
        EditorAction::SelectImage(block) => editor.select_image(*block),
        EditorAction::ToggleDrawingMode(block) => editor.toggle_drawing_mode(*block),
        EditorAction::SetToolbarVisible(visible) => editor.set_toolbar_visible(*visible),
        EditorAction::SetDragState {
            dragging,
            drop_target,
        } => editor.set_drag_state(*dragging, *drop_target),
        EditorAction::DismissKeyboard => editor.dismiss_keyboard(),
        EditorAction::Undo => editor.undo(),
        EditorAction::Redo => editor.redo(),
        EditorAction::Commit => editor.commit(),
        EditorAction::BeginRecording => editor.begin_recording(),
        EditorAction::CommitRecording => editor.commit_recording().is_some(),
        EditorAction::CancelRecording => editor.cancel_recording(),
        EditorAction::TogglePlayback(block) => editor.toggle_playback(*block),
        EditorAction::StopPlayback => editor.stop_playback(),
    }
}
