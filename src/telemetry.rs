//! Logging setup.
//!
//! Summaries and workplan exports go to stdout; logs stay on stderr so the
//! two streams can be piped independently.

use crate::config::TelemetryConfig;
use crate::error::AppError;
use tracing_subscriber::EnvFilter;

pub fn init(config: &TelemetryConfig) -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(resolve_filter(&config.log_level)?)
        .with_target(false)
        .compact()
        .with_ansi(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(AppError::LogInit)
}

/// RUST_LOG wins when set; otherwise the configured level seeds the filter.
fn resolve_filter(log_level: &str) -> Result<EnvFilter, AppError> {
    if let Ok(filter) = EnvFilter::try_from_default_env() {
        return Ok(filter);
    }
    EnvFilter::try_new(log_level).map_err(|source| AppError::LogFilter {
        directive: log_level.to_string(),
        source,
    })
}
