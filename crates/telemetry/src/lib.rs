//! Structured logging for the Cookbook client
//!
//! Installs a global `tracing` subscriber with:
//! - `RUST_LOG`-style filtering (falls back to the configured level)
//! - Compact human output or JSON lines
//! - A per-process session id for correlating logs

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging with the default configuration
pub fn init() -> anyhow::Result<()> {
    init_with_config(TelemetryConfig::default())
}

/// Initialize with custom configuration
pub fn init_with_config(config: TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let registry = tracing_subscriber::registry().with(filter);

    let result = if config.json {
        registry
            .with(fmt::layer()
                .json()
                .with_target(config.show_target)
                .with_file(config.show_file)
                .with_line_number(config.show_line_number)
                .with_writer(std::io::stderr))
            .try_init()
    } else {
        registry
            .with(fmt::layer()
                .with_target(config.show_target)
                .with_file(config.show_file)
                .with_line_number(config.show_line_number)
                .with_writer(std::io::stderr)
                .compact())
            .try_init()
    };

    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Telemetry configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub json: bool,
    pub show_target: bool,
    pub show_file: bool,
    pub show_line_number: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            json: false,
            show_target: false,
            show_file: false,
            show_line_number: false,
        }
    }
}

impl TelemetryConfig {
    /// Verbose configuration that shows the pipeline's debug output
    pub fn verbose() -> Self {
        Self {
            log_level: "cookbook_api_client=debug,cookbook_cli=debug,info".to_string(),
            show_target: true,
            ..Self::default()
        }
    }

    /// Emit JSON lines instead of compact text
    #[must_use]
    pub fn with_json(mut self, json: bool) -> Self {
        self.json = json;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_id() {
        let id = session_id();
        assert!(!id.is_empty());
        // Should be a valid UUID
        assert!(Uuid::parse_str(id).is_ok());
        assert_eq!(id, session_id());
    }

    #[test]
    fn test_verbose_config() {
        let config = TelemetryConfig::verbose().with_json(true);
        assert!(config.log_level.contains("cookbook_api_client=debug"));
        assert!(config.json);
        assert!(config.show_target);
    }

    #[test]
    fn test_init_twice_reports_error() {
        // The first call may race with other tests; the second always fails.
        let _ = init();
        assert!(init().is_err());
    }
}
