use std::env;
use std::fmt;
use std::path::PathBuf;

/// Top-level configuration for the planning tool.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub strict: bool,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let data_dir = env::var("ROADPLAN_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data"));

        let strict = match env::var("ROADPLAN_STRICT") {
            Ok(value) => parse_bool(&value).ok_or(ConfigError::InvalidStrictFlag { value })?,
            Err(_) => false,
        };

        let log_level = env::var("ROADPLAN_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            data_dir,
            strict,
            telemetry: TelemetryConfig { log_level },
        })
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidStrictFlag { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidStrictFlag { value } => {
                write!(f, "ROADPLAN_STRICT must be a boolean, got '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}
