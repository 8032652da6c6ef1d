//! Services shared by folio front-ends: diagnostics, configuration and
//! tracing setup.

pub mod config;
pub mod error;
pub mod telemetry;

pub use crate::config::{Config, KdlFile, Loader, Saver, config_path};
pub use crate::error::{FolioError, line_span};
pub use crate::telemetry::TelemetryConfig;
