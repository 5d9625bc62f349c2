//! TTL discovery cache.
//!
//! Serves the anchor list from a local snapshot, refreshing it from the
//! directory once it is older than the TTL. Stale data is preferred over
//! no data: only a cold cache (no endpoints at all) surfaces a directory
//! failure to the caller.

use std::path::PathBuf;

use anchorprobe_core::types::unix_now;
use anchorprobe_core::{CacheSnapshot, Endpoint};

use crate::directory::DirectorySource;
use crate::error::Result;
use crate::persist;

/// Outcome of the one-time attempt to read the snapshot from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loaded,
    LoadFailed,
}

/// Local snapshot of the anchor directory with lazy load and TTL refresh.
pub struct DiscoveryCache<S> {
    source: S,
    path: PathBuf,
    ttl_secs: u64,
    state: LoadState,
    snapshot: CacheSnapshot,
}

impl<S: DirectorySource> DiscoveryCache<S> {
    pub fn new(source: S, path: impl Into<PathBuf>, ttl_secs: u64) -> Self {
        Self {
            source,
            path: path.into(),
            ttl_secs,
            state: LoadState::NotLoaded,
            snapshot: CacheSnapshot::empty(),
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.state
    }

    pub fn snapshot(&self) -> &CacheSnapshot {
        &self.snapshot
    }

    /// Return the current anchors, fetching or refreshing as needed.
    ///
    /// Fails only when there is nothing cached and the directory fetch fails.
    pub async fn get_endpoints(&mut self) -> Result<&[Endpoint]> {
        self.load_once();

        if self.snapshot.is_empty() {
            tracing::info!(path = %self.path.display(), "No cached anchors, fetching directory");
            self.refresh().await?;
            return Ok(&self.snapshot.endpoints);
        }

        let now = unix_now();
        if self.snapshot.is_stale(now, self.ttl_secs) {
            let age_secs = self.snapshot.age_secs(now) as u64;
            tracing::info!(age_secs, ttl_secs = self.ttl_secs, "Anchor cache expired, refreshing");

            if let Err(e) = self.refresh().await {
                tracing::warn!(
                    error = %e,
                    age_secs,
                    endpoints = self.snapshot.endpoints.len(),
                    "Directory refresh failed, serving stale anchors"
                );
            }
        }

        Ok(&self.snapshot.endpoints)
    }

    fn load_once(&mut self) {
        if self.state != LoadState::NotLoaded {
            return;
        }

        match persist::load_snapshot(&self.path) {
            Ok(mut snapshot) => {
                if snapshot.expire_if_future(unix_now(), self.ttl_secs) {
                    tracing::warn!(
                        path = %self.path.display(),
                        "Cache timestamp is in the future, treating snapshot as expired"
                    );
                }
                tracing::debug!(
                    path = %self.path.display(),
                    endpoints = snapshot.endpoints.len(),
                    "Loaded anchor cache"
                );
                self.snapshot = snapshot;
                self.state = LoadState::Loaded;
            }
            Err(e) => {
                tracing::debug!(
                    path = %self.path.display(),
                    error = %e,
                    "Anchor cache unavailable, starting empty"
                );
                self.state = LoadState::LoadFailed;
            }
        }
    }

    /// Fetch the directory, swap in the new snapshot, then persist it.
    ///
    /// The in-memory snapshot is only replaced when the fetch succeeds.
    /// A failed write is logged; the fresh data is still served.
    async fn refresh(&mut self) -> Result<()> {
        let captured_at = unix_now();
        let endpoints = self.source.fetch_all().await?;
        self.snapshot = CacheSnapshot::new(captured_at, endpoints);

        if let Err(e) = persist::write_snapshot(&self.path, &self.snapshot) {
            tracing::warn!(
                path = %self.path.display(),
                error = %e,
                "Failed to persist anchor cache"
            );
        }
        Ok(())
    }
}
