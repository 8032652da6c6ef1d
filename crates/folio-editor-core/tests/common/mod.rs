//! Scriptable platform fakes shared by the integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;
use std::time::Duration;

use folio_editor_core::{
    AudioPlayer, Clock, EditorConfig, MediaRef, MediaStore, NoteEditor, PlatformError,
    PlatformServices, RecordingDevice,
};
use web_time::Instant;

/// Everything the fakes observed or were told to do.
#[derive(Debug)]
pub struct Rig {
    pub now: Instant,
    pub fail_start: bool,
    pub fail_stop: bool,
    pub fail_play: bool,
    /// Reported by the recorder on stop.
    pub device_duration: Duration,
    /// Reported by the media store probe.
    pub probed_duration: Option<Duration>,
    pub next_amplitude: u16,
    pub recorder_running: bool,
    pub starts: usize,
    pub stops: usize,
    pub allocated: Vec<MediaRef>,
    pub deleted: Vec<MediaRef>,
    pub played: Vec<MediaRef>,
    pub player_stops: usize,
}

impl Default for Rig {
    fn default() -> Self {
        Self {
            now: Instant::now(),
            fail_start: false,
            fail_stop: false,
            fail_play: false,
            device_duration: Duration::ZERO,
            probed_duration: None,
            next_amplitude: 0,
            recorder_running: false,
            starts: 0,
            stops: 0,
            allocated: Vec::new(),
            deleted: Vec::new(),
            played: Vec::new(),
            player_stops: 0,
        }
    }
}

pub type SharedRig = Rc<RefCell<Rig>>;

struct FakeRecorder(SharedRig);

impl RecordingDevice for FakeRecorder {
    fn start(&mut self, _target: &MediaRef) -> Result<(), PlatformError> {
        let mut rig = self.0.borrow_mut();
        if rig.fail_start {
            return Err("microphone busy".into());
        }
        rig.starts += 1;
        rig.recorder_running = true;
        Ok(())
    }

    fn stop(&mut self) -> Result<Duration, PlatformError> {
        let mut rig = self.0.borrow_mut();
        rig.stops += 1;
        rig.recorder_running = false;
        if rig.fail_stop {
            return Err("recorder stopped unexpectedly".into());
        }
        Ok(rig.device_duration)
    }

    fn amplitude(&mut self) -> Result<u16, PlatformError> {
        let mut rig = self.0.borrow_mut();
        let sample = rig.next_amplitude;
        rig.next_amplitude = rig.next_amplitude.wrapping_add(1);
        Ok(sample)
    }
}

struct FakePlayer(SharedRig);

impl AudioPlayer for FakePlayer {
    fn play(&mut self, resource: &MediaRef) -> Result<(), PlatformError> {
        let mut rig = self.0.borrow_mut();
        if rig.fail_play {
            return Err("decoder error".into());
        }
        rig.played.push(resource.clone());
        Ok(())
    }

    fn stop(&mut self) -> Result<(), PlatformError> {
        self.0.borrow_mut().player_stops += 1;
        Ok(())
    }
}

struct FakeMedia(SharedRig);

impl MediaStore for FakeMedia {
    fn allocate_recording(&mut self) -> Result<MediaRef, PlatformError> {
        let mut rig = self.0.borrow_mut();
        let target = MediaRef::new(format!("mem://recording/{}", rig.allocated.len()));
        rig.allocated.push(target.clone());
        Ok(target)
    }

    fn delete(&mut self, resource: &MediaRef) -> Result<(), PlatformError> {
        self.0.borrow_mut().deleted.push(resource.clone());
        Ok(())
    }

    fn probe_duration(&self, _resource: &MediaRef) -> Result<Duration, PlatformError> {
        self.0
            .borrow()
            .probed_duration
            .ok_or_else(|| PlatformError::from("no such file"))
    }
}

struct FakeClock(SharedRig);

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.0.borrow().now
    }
}

/// Advance the fake clock.
pub fn advance(rig: &SharedRig, by: Duration) {
    let mut rig = rig.borrow_mut();
    rig.now += by;
}

pub fn rigged_services() -> (PlatformServices, SharedRig) {
    let rig: SharedRig = Rc::new(RefCell::new(Rig::default()));
    let services = PlatformServices {
        recorder: Box::new(FakeRecorder(rig.clone())),
        player: Box::new(FakePlayer(rig.clone())),
        media: Box::new(FakeMedia(rig.clone())),
        clock: Box::new(FakeClock(rig.clone())),
    };
    (services, rig)
}

/// Editor on the default note wired to fresh fakes.
pub fn rigged_editor() -> (NoteEditor, SharedRig) {
    let (services, rig) = rigged_services();
    (NoteEditor::new(EditorConfig::default(), services), rig)
}

pub fn kinds(editor: &NoteEditor) -> Vec<&'static str> {
    editor
        .document()
        .blocks
        .iter()
        .map(|b| b.kind_name())
        .collect()
}
