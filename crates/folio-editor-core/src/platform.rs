//! Platform abstraction traits for device and media operations.
//!
//! These traits define the interface between the editor logic and the
//! platform-specific hardware and storage (audio recorder, player, file
//! system, clock). The editor owns every lifecycle decision; adapters own the
//! actual sessions.

use std::path::{Path, PathBuf};
use std::time::Duration;

use web_time::Instant;

use crate::types::MediaRef;

/// Error type for platform operations.
#[derive(Debug, Clone)]
pub struct PlatformError(pub String);

impl std::fmt::Display for PlatformError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::error::Error for PlatformError {}

impl From<&str> for PlatformError {
    fn from(s: &str) -> Self {
        PlatformError(s.to_string())
    }
}

impl From<String> for PlatformError {
    fn from(s: String) -> Self {
        PlatformError(s)
    }
}

impl From<std::io::Error> for PlatformError {
    fn from(e: std::io::Error) -> Self {
        PlatformError(e.to_string())
    }
}

/// Audio capture hardware session.
pub trait RecordingDevice {
    /// Begin capturing into `target`.
    fn start(&mut self, target: &MediaRef) -> Result<(), PlatformError>;

    /// Finish the session and report the captured length.
    ///
    /// A zero duration means the device could not measure it.
    fn stop(&mut self) -> Result<Duration, PlatformError>;

    /// Peak amplitude since the previous call.
    fn amplitude(&mut self) -> Result<u16, PlatformError>;
}

/// Audio playback hardware session.
pub trait AudioPlayer {
    fn play(&mut self, resource: &MediaRef) -> Result<(), PlatformError>;

    fn stop(&mut self) -> Result<(), PlatformError>;
}

/// Backing storage for recorded media.
pub trait MediaStore {
    /// Reserve a fresh target for a new recording.
    fn allocate_recording(&mut self) -> Result<MediaRef, PlatformError>;

    /// Release a resource. Missing resources are not an error.
    fn delete(&mut self, resource: &MediaRef) -> Result<(), PlatformError>;

    /// Measure the playable length of a finished resource.
    fn probe_duration(&self, resource: &MediaRef) -> Result<Duration, PlatformError>;
}

/// Monotonic time source used for recording timers.
pub trait Clock {
    fn now(&self) -> Instant;
}

/// Collaborators an editor session talks to.
pub struct PlatformServices {
    pub recorder: Box<dyn RecordingDevice>,
    pub player: Box<dyn AudioPlayer>,
    pub media: Box<dyn MediaStore>,
    pub clock: Box<dyn Clock>,
}

impl PlatformServices {
    /// Services for front-ends without audio hardware, storing media under `dir`.
    pub fn headless(dir: impl Into<PathBuf>) -> Self {
        Self {
            recorder: Box::new(headless::NoRecorder),
            player: Box::new(headless::NoPlayer),
            media: Box::new(FsMediaStore::new(dir)),
            clock: Box::new(SystemClock),
        }
    }
}

impl std::fmt::Debug for PlatformServices {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlatformServices").finish_non_exhaustive()
    }
}

/// Wall clock backed by `web_time::Instant`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Media store that allocates recording files inside a directory.
#[derive(Debug)]
pub struct FsMediaStore {
    dir: PathBuf,
    counter: u64,
}

impl FsMediaStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            counter: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl MediaStore for FsMediaStore {
    fn allocate_recording(&mut self) -> Result<MediaRef, PlatformError> {
        std::fs::create_dir_all(&self.dir)?;
        let n = self.counter;
        self.counter += 1;
        let name = format!("recording-{}-{n}.m4a", uuid::Uuid::now_v7().simple());
        let path = self.dir.join(name);
        Ok(MediaRef::new(path.to_string_lossy().as_ref()))
    }

    fn delete(&mut self, resource: &MediaRef) -> Result<(), PlatformError> {
        match std::fs::remove_file(resource.as_str()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn probe_duration(&self, resource: &MediaRef) -> Result<Duration, PlatformError> {
        // No decoder here; only report whether the file exists.
        std::fs::metadata(resource.as_str())?;
        Ok(Duration::ZERO)
    }
}

/// Stand-ins for sessions without audio hardware.
pub mod headless {
    use std::time::Duration;

    use super::{AudioPlayer, PlatformError, RecordingDevice};
    use crate::types::MediaRef;

    /// Recorder that always fails to start.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoRecorder;

    impl RecordingDevice for NoRecorder {
        fn start(&mut self, _target: &MediaRef) -> Result<(), PlatformError> {
            Err("no recording device available".into())
        }

        fn stop(&mut self) -> Result<Duration, PlatformError> {
            Err("no recording device available".into())
        }

        fn amplitude(&mut self) -> Result<u16, PlatformError> {
            Ok(0)
        }
    }

    /// Player that always fails to start.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct NoPlayer;

    impl AudioPlayer for NoPlayer {
        fn play(&mut self, _resource: &MediaRef) -> Result<(), PlatformError> {
            Err("no audio output available".into())
        }

        fn stop(&mut self) -> Result<(), PlatformError> {
            Ok(())
        }
    }
}
