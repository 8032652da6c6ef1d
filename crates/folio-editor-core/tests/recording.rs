//! Recorder and player lifecycles against scripted devices.

mod common;

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use folio_editor_core::{
    Audio, Block, BlockKind, DocumentSnapshot, EditorConfig, EditorEvent, MediaRef, NoteEditor,
    RecordingPhase, UndoManager,
};

use common::{advance, kinds, rigged_editor, rigged_services};

fn audio_block(resource: &str) -> Block {
    Block::new(BlockKind::Audio(Audio {
        resource: Some(MediaRef::from(resource)),
        duration: "00:04".into(),
        elapsed_ms: 4_000,
        ..Default::default()
    }))
}

fn saved_duration(editor: &NoteEditor, id: folio_editor_core::BlockId) -> String {
    match editor.document().block(id).map(|b| &b.kind) {
        Some(BlockKind::Audio(audio)) => audio.duration.to_string(),
        other => panic!("expected audio block, got {other:?}"),
    }
}

// === Recording ===

#[test]
fn test_failed_start_returns_to_idle() {
    let (mut editor, rig) = rigged_editor();
    rig.borrow_mut().fail_start = true;
    let phases = Rc::new(RefCell::new(Vec::new()));
    let seen = phases.clone();
    editor.subscribe(move |event| {
        if let EditorEvent::RecordingChanged(phase) = event {
            seen.borrow_mut().push(*phase);
        }
    });

    assert!(!editor.begin_recording());
    assert_eq!(editor.recording_phase(), RecordingPhase::Idle);
    assert!(!editor.is_recording());
    assert_eq!(
        *phases.borrow(),
        vec![RecordingPhase::Cancelling, RecordingPhase::Idle]
    );
    let rig = rig.borrow();
    assert_eq!(rig.allocated.len(), 1);
    assert_eq!(rig.deleted, rig.allocated);
}

#[test]
fn test_second_begin_is_rejected() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    let first = editor.recording_block().map(|b| b.id());
    assert!(!editor.begin_recording());
    assert_eq!(editor.recording_block().map(|b| b.id()), first);
    assert_eq!(rig.borrow().starts, 1);
    assert_eq!(rig.borrow().allocated.len(), 1);
}

#[test]
fn test_recording_hides_toolbar_and_stays_out_of_history() {
    let (mut editor, rig) = rigged_editor();
    editor.set_toolbar_visible(true);
    let depth = editor.history().undo_depth();

    assert!(editor.begin_recording());
    for _ in 0..5 {
        advance(&rig, Duration::from_millis(250));
        editor.tick_recording();
        editor.sample_amplitude();
    }

    assert!(!editor.document().chrome.toolbar_visible);
    assert_eq!(kinds(&editor), vec!["Paragraph"]);
    assert_eq!(editor.history().undo_depth(), depth);
    let Some(BlockKind::Audio(audio)) = editor.recording_block().map(|b| &b.kind) else {
        panic!("no transient audio block");
    };
    assert!(audio.recording);
    assert_eq!(audio.elapsed_ms, 1_250);
    assert_eq!(audio.duration, "00:01");
    assert_eq!(audio.amplitudes.len(), 5);
}

#[test]
fn test_cancel_right_after_start_deletes_file() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    assert!(editor.cancel_recording());
    assert!(!editor.cancel_recording());

    assert_eq!(editor.recording_phase(), RecordingPhase::Idle);
    assert_eq!(kinds(&editor), vec!["Paragraph"]);
    assert!(!editor.can_undo());
    let rig = rig.borrow();
    assert!(!rig.recorder_running);
    assert_eq!(rig.deleted, rig.allocated);
}

#[test]
fn test_stop_failure_on_commit_discards() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    advance(&rig, Duration::from_secs(3));
    rig.borrow_mut().fail_stop = true;

    assert_eq!(editor.commit_recording(), None);
    assert_eq!(editor.recording_phase(), RecordingPhase::Idle);
    assert_eq!(kinds(&editor), vec!["Paragraph"]);
    let rig = rig.borrow();
    assert_eq!(rig.deleted, rig.allocated);
}

#[test]
fn test_commit_without_recording_is_noop() {
    let (mut editor, rig) = rigged_editor();
    assert_eq!(editor.commit_recording(), None);
    assert_eq!(rig.borrow().stops, 0);
}

#[test]
fn test_deleting_recording_block_cancels() {
    let (mut editor, rig) = rigged_editor();
    assert!(editor.begin_recording());
    let id = editor.recording_block().map(|b| b.id()).unwrap();

    assert!(editor.delete_block(id));
    assert!(!editor.is_recording());
    assert_eq!(rig.borrow().deleted.len(), 1);
    assert_eq!(kinds(&editor), vec!["Paragraph"]);
}

#[test]
fn test_amplitude_window_is_bounded() {
    let (services, rig) = rigged_services();
    let config = EditorConfig {
        amplitude_window: 8,
        ..Default::default()
    };
    let mut editor = NoteEditor::new(config, services);
    assert!(editor.begin_recording());
    for _ in 0..20 {
        editor.sample_amplitude();
    }
    advance(&rig, Duration::from_secs(2));
    let id = editor.commit_recording().unwrap();

    let Some(BlockKind::Audio(audio)) = editor.document().block(id).map(|b| &b.kind) else {
        panic!("expected audio block");
    };
    assert_eq!(audio.amplitudes, (12..20).collect::<Vec<u16>>());
}

#[test]
fn test_duration_prefers_device_then_probe() {
    let (mut editor, rig) = rigged_editor();
    rig.borrow_mut().device_duration = Duration::from_secs(125);
    editor.begin_recording();
    advance(&rig, Duration::from_secs(2));
    let id = editor.commit_recording().unwrap();
    assert_eq!(saved_duration(&editor, id), "02:05");

    {
        let mut rig = rig.borrow_mut();
        rig.device_duration = Duration::ZERO;
        rig.probed_duration = Some(Duration::from_secs(3));
    }
    editor.begin_recording();
    advance(&rig, Duration::from_secs(2));
    let id = editor.commit_recording().unwrap();
    assert_eq!(saved_duration(&editor, id), "00:03");
}

#[test]
fn test_recording_inserts_after_focused_block() {
    let (services, rig) = rigged_services();
    let [a, b] = ["first", "second"].map(Block::paragraph);
    let first = a.id();
    let doc = DocumentSnapshot::with_blocks("", vec![a, b]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);
    editor.set_focus(Some(first));

    editor.begin_recording();
    advance(&rig, Duration::from_millis(1_500));
    let id = editor.commit_recording().unwrap();
    assert_eq!(editor.document().index_of(id), Some(1));
    assert_eq!(kinds(&editor), vec!["Paragraph", "Audio", "Paragraph"]);
}

// === Playback ===

#[test]
fn test_playback_is_a_singleton() {
    let (services, rig) = rigged_services();
    let one = audio_block("mem://one.m4a");
    let two = audio_block("mem://two.m4a");
    let (a, b) = (one.id(), two.id());
    let doc = DocumentSnapshot::with_blocks("", vec![one, two]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);

    assert!(editor.toggle_playback(a));
    assert_eq!(editor.playing_block(), Some(a));
    assert!(editor.toggle_playback(b));
    assert_eq!(editor.playing_block(), Some(b));
    assert!(!editor.toggle_playback(b));
    assert_eq!(editor.playing_block(), None);

    let rig = rig.borrow();
    assert_eq!(
        rig.played,
        vec![MediaRef::from("mem://one.m4a"), MediaRef::from("mem://two.m4a")]
    );
    assert_eq!(rig.player_stops, 2);
}

#[test]
fn test_playback_does_not_touch_history() {
    let (services, _rig) = rigged_services();
    let audio = audio_block("mem://clip.m4a");
    let id = audio.id();
    let doc = DocumentSnapshot::with_blocks("", vec![audio]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);

    editor.toggle_playback(id);
    editor.on_playback_finished();
    editor.commit();
    assert!(!editor.can_undo());
    assert_eq!(editor.playing_block(), None);
}

#[test]
fn test_failed_playback_leaves_nothing_playing() {
    let (services, rig) = rigged_services();
    rig.borrow_mut().fail_play = true;
    let audio = audio_block("mem://broken.m4a");
    let id = audio.id();
    let doc = DocumentSnapshot::with_blocks("", vec![audio]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);

    assert!(!editor.toggle_playback(id));
    assert_eq!(editor.playing_block(), None);
}

#[test]
fn test_deleting_playing_block_stops_playback() {
    let (services, rig) = rigged_services();
    let audio = audio_block("mem://clip.m4a");
    let id = audio.id();
    let doc = DocumentSnapshot::with_blocks("", vec![audio, Block::empty_paragraph()]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);

    editor.toggle_playback(id);
    assert!(editor.delete_block(id));
    assert_eq!(editor.playing_block(), None);
    assert_eq!(rig.borrow().player_stops, 1);
    assert!(rig.borrow().deleted.is_empty());
}

#[test]
fn test_dispose_releases_devices() {
    let (services, rig) = rigged_services();
    let audio = audio_block("mem://clip.m4a");
    let id = audio.id();
    let doc = DocumentSnapshot::with_blocks("", vec![audio]);
    let mut editor = NoteEditor::with_document(doc, EditorConfig::default(), services);
    let events = Rc::new(RefCell::new(0usize));
    let counter = events.clone();
    editor.subscribe(move |_| *counter.borrow_mut() += 1);

    editor.toggle_playback(id);
    editor.begin_recording();
    editor.dispose();
    let seen = *events.borrow();

    assert!(editor.is_disposed());
    assert!(!editor.is_recording());
    assert_eq!(editor.playing_block(), None);
    assert_eq!(editor.observer_count(), 0);
    {
        let rig = rig.borrow();
        assert!(!rig.recorder_running);
        assert_eq!(rig.player_stops, 1);
        assert_eq!(rig.deleted, rig.allocated);
    }

    editor.dispose();
    assert_eq!(*events.borrow(), seen);
}
