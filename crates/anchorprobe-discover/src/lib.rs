//! anchorprobe-discover: Anchor discovery with a local TTL cache.
//!
//! Fetches the anchor list from the paginated directory API, keeps it in
//! a crash-safe JSON snapshot on disk, and serves stale data when the
//! directory is unavailable.

pub mod cache;
pub mod directory;
pub mod error;
pub mod persist;

pub use cache::DiscoveryCache;
pub use directory::{AtlasDirectory, DirectorySource};
pub use error::DiscoverError;
