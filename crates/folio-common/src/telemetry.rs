//! Tracing setup for folio front-ends.
//!
//! # Usage
//!
//! ```ignore
//! use folio_common::telemetry::{self, TelemetryConfig};
//!
//! fn main() {
//!     telemetry::init(TelemetryConfig::from_env("folio"));
//!     tracing::info!("editor started");
//! }
//! ```

use tracing::Level;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

/// Telemetry configuration
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name for labeling (e.g., "folio")
    pub service_name: String,
    /// Console log level (default: INFO, DEBUG in debug builds)
    pub console_level: Level,
}

impl TelemetryConfig {
    /// Defaults for `service_name`. `RUST_LOG` still overrides the level.
    pub fn from_env(service_name: impl Into<String>) -> Self {
        let console_level = if cfg!(debug_assertions) {
            Level::DEBUG
        } else {
            Level::INFO
        };

        Self {
            service_name: service_name.into(),
            console_level,
        }
    }

    pub fn with_level(mut self, level: Level) -> Self {
        self.console_level = level;
        self
    }

    /// Filter directives used when `RUST_LOG` is unset.
    pub fn default_directives(&self) -> String {
        self.console_level.as_str().to_lowercase()
    }
}

/// Initialize tracing with a compact stderr layer.
///
/// Call once at application startup. Returns false if a global subscriber
/// was already installed.
pub fn init(config: TelemetryConfig) -> bool {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.default_directives()));

    // stdout carries command output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .with_filter(env_filter);

    let installed = tracing_subscriber::registry()
        .with(console_layer)
        .try_init()
        .is_ok();
    if installed {
        tracing::debug!(service = %config.service_name, "telemetry initialized");
    }
    installed
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directives_follow_level() {
        let config = TelemetryConfig::from_env("folio").with_level(Level::WARN);
        assert_eq!(config.service_name, "folio");
        assert_eq!(config.default_directives(), "warn");
    }
}
