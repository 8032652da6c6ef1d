//! KDL configuration for folio front-ends.
//!
//! ```kdl
//! history-depth 50
//! min-recording-ms 1000
//! amplitude-window 64
//! log-level "info"
//! ```
//!
//! Every node is optional. Unknown nodes are logged and ignored.

use std::path::{Path, PathBuf};
use std::time::Duration;

use folio_editor_core::EditorConfig;
use kdl::{KdlDocument, KdlNode};
use miette::{NamedSource, SourceSpan};
use tracing::Level;

use crate::error::FolioError;

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "FOLIO_CONFIG";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Editing session tunables.
    pub editor: EditorConfig,
    /// Console log level when `RUST_LOG` is unset.
    pub log_level: Level,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            editor: EditorConfig::default(),
            log_level: Level::INFO,
        }
    }
}

impl Config {
    /// Loads the configuration from the provided loader.
    pub fn load(loader: &impl Loader) -> Result<Self, FolioError> {
        loader.load()
    }

    /// Saves the configuration using the provided saver.
    pub fn save(&self, saver: &impl Saver) -> Result<(), FolioError> {
        saver.save(self)
    }

    /// Parse a KDL config. `name` labels diagnostics.
    pub fn from_kdl(name: &str, source: &str) -> Result<Self, FolioError> {
        let doc: KdlDocument = source.parse().map_err(|e: kdl::KdlError| {
            FolioError::ConfigSyntax {
                message: e.to_string(),
                src: NamedSource::new(name, source.to_owned()),
                span: SourceSpan::new(e.span.offset().into(), e.span.len()),
                advice: e.help.map(str::to_owned),
            }
        })?;

        let mut config = Self::default();
        for node in doc.nodes() {
            let value = NodeValue {
                node,
                name,
                source,
            };
            match node.name().value() {
                "history-depth" => config.editor.history_depth = value.integer(2)? as usize,
                "min-recording-ms" => {
                    config.editor.min_recording = Duration::from_millis(value.integer(0)?)
                }
                "amplitude-window" => config.editor.amplitude_window = value.integer(1)? as usize,
                "duration-tick-ms" => {
                    config.editor.duration_tick = Duration::from_millis(value.integer(1)?)
                }
                "amplitude-tick-ms" => {
                    config.editor.amplitude_tick = Duration::from_millis(value.integer(1)?)
                }
                "log-level" => config.log_level = value.level()?,
                other => {
                    tracing::warn!(target: "folio::config", node = other, "ignoring unknown config node")
                }
            }
        }
        Ok(config)
    }

    /// Render as KDL, one node per setting.
    pub fn to_kdl(&self) -> String {
        let editor = &self.editor;
        format!(
            "history-depth {}\nmin-recording-ms {}\namplitude-window {}\nduration-tick-ms {}\namplitude-tick-ms {}\nlog-level \"{}\"\n",
            editor.history_depth,
            editor.min_recording.as_millis(),
            editor.amplitude_window,
            editor.duration_tick.as_millis(),
            editor.amplitude_tick.as_millis(),
            self.log_level.as_str().to_lowercase(),
        )
    }
}

/// First argument of a config node, with enough context for diagnostics.
struct NodeValue<'a> {
    node: &'a KdlNode,
    name: &'a str,
    source: &'a str,
}

impl NodeValue<'_> {
    fn integer(&self, min: i64) -> Result<u64, FolioError> {
        let expected = match min {
            i64::MIN..=0 => "a non-negative integer",
            1 => "a positive integer",
            _ => "an integer of at least 2",
        };
        self.node
            .entries()
            .first()
            .and_then(|entry| entry.value().as_i64())
            .filter(|v| *v >= min)
            .map(|v| v as u64)
            .ok_or_else(|| self.invalid(expected))
    }

    fn level(&self) -> Result<Level, FolioError> {
        self.node
            .entries()
            .first()
            .and_then(|entry| entry.value().as_string())
            .and_then(|s| s.parse().ok())
            .ok_or_else(|| self.invalid("one of \"trace\", \"debug\", \"info\", \"warn\", \"error\""))
    }

    fn invalid(&self, expected: &'static str) -> FolioError {
        let span = match self.node.entries().first() {
            Some(entry) => entry.span(),
            None => self.node.span(),
        };
        FolioError::ConfigValue {
            node: self.node.name().value().to_owned(),
            expected,
            src: NamedSource::new(self.name, self.source.to_owned()),
            span: SourceSpan::new(span.offset().into(), span.len()),
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(&self) -> Result<Config, FolioError>;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(&self, config: &Config) -> Result<(), FolioError>;
}

/// An implementation of [`Loader`] and [`Saver`] backed by a KDL file.
///
/// A missing file loads as the default configuration.
#[derive(Debug, Clone)]
pub struct KdlFile {
    path: PathBuf,
}

impl KdlFile {
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Loader for KdlFile {
    fn load(&self) -> Result<Config, FolioError> {
        let source = match std::fs::read_to_string(&self.path) {
            Ok(source) => source,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(target: "folio::config", path = %self.path.display(), "no config file, using defaults");
                return Ok(Config::default());
            }
            Err(e) => return Err(FolioError::io(&self.path, e)),
        };
        Config::from_kdl(&self.path.display().to_string(), &source)
    }
}

impl Saver for KdlFile {
    fn save(&self, config: &Config) -> Result<(), FolioError> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| FolioError::io(parent, e))?;
        }
        std::fs::write(&self.path, config.to_kdl()).map_err(|e| FolioError::io(&self.path, e))
    }
}

/// Pick the config file: explicit path, then `FOLIO_CONFIG`, then the user
/// config directory.
pub fn config_path(explicit: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .or_else(|| std::env::var_os(CONFIG_ENV).map(PathBuf::from))
        .or_else(|| dirs::config_dir().map(|dir| dir.join("folio").join("config.kdl")))
}
