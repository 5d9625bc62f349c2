use thiserror::Error;

/// Top-level error type shared by anchorprobe components.
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid count {value:?}: must be an integer or a percentage")]
    InvalidCount { value: String },

    #[error("Invalid percentage {value:?}: cannot specify more than 100%")]
    PercentOutOfRange { value: String },

    #[error("Requested {requested} targets, but only {available} available")]
    NotEnoughTargets { requested: usize, available: usize },
}

impl From<config::ConfigError> for CoreError {
    fn from(e: config::ConfigError) -> Self {
        Self::Config(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;
