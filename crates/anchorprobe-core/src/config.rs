//! Configuration management for anchorprobe.
//!
//! Configuration is loaded from (in priority order):
//! 1. Environment variables (`ANCHORPROBE__` prefix, `__` separator)
//! 2. Config file (`anchorprobe.toml` by default)
//! 3. Defaults

use std::path::PathBuf;

use serde::Deserialize;

use crate::error::{CoreError, Result};

/// Top-level configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AnchorprobeConfig {
    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub directory: DirectoryConfig,

    #[serde(default)]
    pub probe: ProbeConfig,
}

/// Local discovery cache settings.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Path of the persisted snapshot.
    #[serde(default = "default_cache_file")]
    pub file: PathBuf,

    /// Age in seconds after which the snapshot is refreshed.
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

/// Remote anchor directory settings.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryConfig {
    /// Scheme and host of the directory API; `next` links resolve against it.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path and query of the first page.
    #[serde(default = "default_query")]
    pub query: String,

    #[serde(default = "default_directory_timeout")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

/// Reachability probe settings.
#[derive(Debug, Clone, Deserialize)]
pub struct ProbeConfig {
    /// Maximum probes in flight.
    #[serde(default = "default_max_parallel")]
    pub max_parallel: usize,

    #[serde(default = "default_probe_timeout")]
    pub timeout_secs: u64,

    /// Sample size used when neither `--all` nor `--count` is given.
    #[serde(default = "default_sample_percent")]
    pub default_sample_percent: u8,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_cache_file() -> PathBuf {
    PathBuf::from("/tmp/anchorprobe-anchors-cache.json")
}

fn default_ttl() -> u64 {
    3600
}

fn default_base_url() -> String {
    "https://atlas.ripe.net".to_string()
}

fn default_query() -> String {
    "/api/v1/probe/?is_anchor=true&status=1".to_string()
}

fn default_directory_timeout() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("anchorprobe/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_parallel() -> usize {
    20
}

fn default_probe_timeout() -> u64 {
    15
}

fn default_sample_percent() -> u8 {
    5
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            file: default_cache_file(),
            ttl_secs: default_ttl(),
        }
    }
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            query: default_query(),
            timeout_secs: default_directory_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            max_parallel: default_max_parallel(),
            timeout_secs: default_probe_timeout(),
            default_sample_percent: default_sample_percent(),
            user_agent: default_user_agent(),
        }
    }
}

impl AnchorprobeConfig {
    /// Load from `<file_prefix>.toml` (optional) and `ANCHORPROBE__` variables.
    pub fn load(file_prefix: &str) -> Result<Self> {
        let cfg = config::Config::builder()
            .add_source(config::File::with_name(file_prefix).required(false))
            .add_source(
                config::Environment::with_prefix("ANCHORPROBE")
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let loaded: Self = cfg.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<()> {
        if self.probe.max_parallel == 0 {
            return Err(CoreError::Config(
                "probe.max_parallel must be at least 1".to_string(),
            ));
        }
        if self.probe.default_sample_percent > 100 {
            return Err(CoreError::Config(
                "probe.default_sample_percent cannot exceed 100".to_string(),
            ));
        }
        Ok(())
    }
}
