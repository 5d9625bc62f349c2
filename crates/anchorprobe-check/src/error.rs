//! Error types for the anchorprobe-check crate.

use anchorprobe_core::CoreError;
use anchorprobe_discover::DiscoverError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CheckError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Anchor discovery failed: {0}")]
    Discover(#[from] DiscoverError),

    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, CheckError>;
