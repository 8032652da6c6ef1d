//! End-to-end editing scenarios.

mod common;

use std::time::Duration;

use folio_editor_core::{
    Block, BlockKind, DocumentSnapshot, EditorConfig, NoteEditor, RecordingPhase, Selection,
    SpanStyle, TextInput, UndoManager,
};

use common::{advance, kinds, rigged_editor, rigged_services};

#[test]
fn test_type_commit_undo_redo() {
    let (mut editor, _rig) = rigged_editor();
    let initial = DocumentSnapshot::default();
    let paragraph = editor.document().blocks[0].id();

    editor.set_focus(Some(paragraph));
    for prefix in ["H", "He", "Hel", "Hell", "Hello"] {
        editor.change_block_text(paragraph, TextInput::new(prefix));
    }
    editor.set_focus(None);

    assert!(editor.undo());
    assert_eq!(editor.document().title, initial.title);
    assert_eq!(editor.document().blocks.len(), 1);
    assert_eq!(
        editor.document().blocks[0].rich_text().map(|t| t.text()),
        Some("")
    );

    assert!(editor.redo());
    assert_eq!(
        editor.document().blocks[0].rich_text().map(|t| t.text()),
        Some("Hello")
    );
}

#[test]
fn test_insert_checkbox_after_initial_paragraph() {
    let (mut editor, _rig) = rigged_editor();
    let paragraph = editor.document().blocks[0].id();
    editor.set_focus(Some(paragraph));
    editor.insert_checkbox();
    assert_eq!(kinds(&editor), vec!["Paragraph", "Checkbox", "Paragraph"]);
}

#[test]
fn test_short_recording_is_discarded() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    assert_eq!(editor.recording_phase(), RecordingPhase::Recording);

    advance(&rig, Duration::from_millis(600));
    editor.tick_recording();
    assert_eq!(editor.commit_recording(), None);

    assert_eq!(editor.recording_phase(), RecordingPhase::Idle);
    assert_eq!(kinds(&editor), vec!["Paragraph"]);
    assert!(!editor.can_undo());
    let rig = rig.borrow();
    assert_eq!(rig.deleted, rig.allocated);
    assert!(!rig.recorder_running);
}

#[test]
fn test_long_recording_is_inserted() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    for _ in 0..3 {
        advance(&rig, Duration::from_millis(500));
        editor.tick_recording();
        editor.sample_amplitude();
    }

    let id = editor.commit_recording().expect("recording saved");
    assert_eq!(editor.recording_phase(), RecordingPhase::Idle);

    let audio_blocks: Vec<&Block> = editor
        .document()
        .blocks
        .iter()
        .filter(|b| matches!(b.kind, BlockKind::Audio(_)))
        .collect();
    assert_eq!(audio_blocks.len(), 1);
    assert_eq!(audio_blocks[0].id(), id);
    let BlockKind::Audio(audio) = &audio_blocks[0].kind else {
        unreachable!()
    };
    assert!(!audio.recording);
    assert_ne!(audio.duration, "00:00");
    assert_eq!(audio.duration, "00:01");
    assert_eq!(audio.amplitudes, vec![0, 1, 2]);
    assert_eq!(editor.document().focused_block_id, Some(id));
    assert!(rig.borrow().deleted.is_empty());
}

#[test]
fn test_toggle_bold_twice_is_identity() {
    let (mut editor, _rig) = rigged_editor();
    let paragraph = editor.document().blocks[0].id();
    editor.set_focus(Some(paragraph));
    editor.change_block_text(paragraph, TextInput::new("make this bold"));
    editor.set_selection(paragraph, Selection::new(5, 9));
    let before = editor.snapshot();

    editor.toggle_style_on_selection(SpanStyle::Bold);
    editor.toggle_style_on_selection(SpanStyle::Bold);

    let text = editor.document().blocks[0].rich_text().unwrap();
    assert!(text.spans().is_empty());
    assert!(editor.document().content_equals(&before));
}

#[test]
fn test_move_first_block_to_end() {
    let (services, _rig) = rigged_services();
    let [a, b, c] = ["A", "B", "C"].map(Block::paragraph);
    let ids = [a.id(), b.id(), c.id()];
    let doc = DocumentSnapshot::with_blocks("", vec![a, b, c]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);

    assert!(editor.move_block(0, 2));
    let order: Vec<_> = editor.document().blocks.iter().map(|b| b.id()).collect();
    assert_eq!(order, vec![ids[1], ids[2], ids[0]]);

    assert!(editor.undo());
    let order: Vec<_> = editor.document().blocks.iter().map(|b| b.id()).collect();
    assert_eq!(order, ids.to_vec());
}

#[test]
fn test_recording_block_joins_undo_timeline() {
    let (mut editor, rig) = rigged_editor();
    editor.begin_recording();
    advance(&rig, Duration::from_secs(2));
    let id = editor.commit_recording().unwrap();
    assert!(editor.undo());
    assert!(editor.document().block(id).is_none());
    assert!(editor.redo());
    assert!(editor.document().block(id).is_some());
}
