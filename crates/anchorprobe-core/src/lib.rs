//! anchorprobe-core: Shared types, configuration, and error handling for anchorprobe.
//!
//! This crate provides the foundational types used across all anchorprobe components:
//! - Endpoint and target types for discovered anchors
//! - The persisted cache snapshot
//! - Probe results and their summary
//! - Count / percentage arguments
//! - Configuration management
//! - Common error types

pub mod config;
pub mod error;
pub mod types;

pub use config::AnchorprobeConfig;
pub use error::CoreError;
pub use types::{
    AddressFilter, CacheSnapshot, CountSpec, Endpoint, ProbeResults, Summary, Target,
};
