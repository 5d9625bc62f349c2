//! Error types for the anchorprobe-discover crate.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum DiscoverError {
    #[error("Directory request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid directory URL {url}: {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("Cache IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, DiscoverError>;
