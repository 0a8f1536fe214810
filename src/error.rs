use crate::config::ConfigError;
use crate::loader::LoadError;
use crate::pipeline::PipelineError;
use std::fmt;
use tracing_subscriber::filter::ParseError;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    LogFilter {
        directive: String,
        source: ParseError,
    },
    LogInit(Box<dyn std::error::Error + Send + Sync>),
    Io(std::io::Error),
    Load(LoadError),
    Pipeline(PipelineError),
    Export(serde_json::Error),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::LogFilter { directive, .. } => {
                write!(f, "invalid log level/filter '{}'", directive)
            }
            AppError::LogInit(err) => write!(f, "logging could not be initialised: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Load(err) => write!(f, "dataset error: {}", err),
            AppError::Pipeline(err) => write!(f, "pipeline error: {}", err),
            AppError::Export(err) => write!(f, "export error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::LogFilter { source, .. } => Some(source),
            AppError::LogInit(err) => Some(&**err),
            AppError::Io(err) => Some(err),
            AppError::Load(err) => Some(err),
            AppError::Pipeline(err) => Some(err),
            AppError::Export(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<LoadError> for AppError {
    fn from(value: LoadError) -> Self {
        Self::Load(value)
    }
}

impl From<PipelineError> for AppError {
    fn from(value: PipelineError) -> Self {
        Self::Pipeline(value)
    }
}

impl From<serde_json::Error> for AppError {
    fn from(value: serde_json::Error) -> Self {
        Self::Export(value)
    }
}
