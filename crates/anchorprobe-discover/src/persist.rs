//! Snapshot persistence: read the cache file, write it crash-safely.
//!
//! Writes go to `<cache file>.new` in the same directory, are flushed and
//! synced, then renamed over the cache file. A reader never sees a
//! half-written snapshot.

use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

use anchorprobe_core::CacheSnapshot;

use crate::error::Result;

/// Read and parse a snapshot from `path`.
pub fn load_snapshot(path: &Path) -> Result<CacheSnapshot> {
    let json = fs::read_to_string(path)?;
    let snapshot: CacheSnapshot = serde_json::from_str(&json)?;
    Ok(snapshot)
}

/// Atomically replace the snapshot at `path`.
pub fn write_snapshot(path: &Path, snapshot: &CacheSnapshot) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }

    let mut json = serde_json::to_vec_pretty(snapshot)?;
    json.push(b'\n');

    let tmp = temp_path(path);
    if let Err(e) = write_synced(&tmp, &json) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }

    tracing::debug!(
        path = %path.display(),
        endpoints = snapshot.endpoints.len(),
        "Cache snapshot written"
    );
    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.flush()?;
    file.sync_all()
}

/// Sibling path used for the in-progress write.
pub fn temp_path(path: &Path) -> PathBuf {
    let mut name = path.as_os_str().to_owned();
    name.push(".new");
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anchorprobe_core::Endpoint;

    use crate::error::DiscoverError;

    fn sample_snapshot() -> CacheSnapshot {
        CacheSnapshot::new(
            1_700_000_123.25,
            vec![
                Endpoint::new(6001, Some("193.0.0.1"), Some("2001:db8::1")),
                Endpoint::new(6002, None, Some("2001:db8::2")),
            ],
        )
    }

    #[test]
    fn round_trip_preserves_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        let snapshot = sample_snapshot();

        write_snapshot(&path, &snapshot).unwrap();
        let loaded = load_snapshot(&path).unwrap();

        assert_eq!(loaded, snapshot);
        assert!(!temp_path(&path).exists());
    }

    #[test]
    fn creates_missing_parent_directory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("anchors.json");
        write_snapshot(&path, &sample_snapshot()).unwrap();
        assert!(path.exists());
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_snapshot(&dir.path().join("absent.json"));
        assert!(matches!(result, Err(DiscoverError::Io(_))));
    }

    #[test]
    fn corrupt_file_is_serialization_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        fs::write(&path, "{\"time\": 12, \"anchors\": [").unwrap();
        assert!(matches!(
            load_snapshot(&path),
            Err(DiscoverError::Serialization(_))
        ));

        fs::write(&path, "{\"when\": 12}").unwrap();
        assert!(matches!(
            load_snapshot(&path),
            Err(DiscoverError::Serialization(_))
        ));
    }

    #[test]
    fn reads_python_style_integer_time() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        fs::write(
            &path,
            r#"{"time": 1700000000, "anchors": [{"id": 1, "address_v4": "10.0.0.1", "address_v6": null}]}"#,
        )
        .unwrap();
        let loaded = load_snapshot(&path).unwrap();
        assert_eq!(loaded.captured_at, 1_700_000_000.0);
        assert_eq!(loaded.endpoints.len(), 1);
    }

    #[test]
    fn leftover_partial_write_does_not_affect_cache() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        write_snapshot(&path, &sample_snapshot()).unwrap();
        let original = fs::read(&path).unwrap();

        // A crash after writing part of the temp file, before the rename.
        fs::write(temp_path(&path), b"{\"time\": 99, \"anch").unwrap();

        assert_eq!(fs::read(&path).unwrap(), original);
        assert_eq!(load_snapshot(&path).unwrap(), sample_snapshot());
    }

    #[test]
    fn failed_write_leaves_original_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");
        write_snapshot(&path, &sample_snapshot()).unwrap();
        let original = fs::read(&path).unwrap();

        // A directory squatting on the temp path makes the write fail before rename.
        fs::create_dir(temp_path(&path)).unwrap();
        let replacement = CacheSnapshot::new(1.0, vec![Endpoint::new(9, Some("10.9.9.9"), None)]);
        assert!(write_snapshot(&path, &replacement).is_err());

        assert_eq!(fs::read(&path).unwrap(), original);
    }

    #[test]
    fn failed_rename_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("anchors.json");

        // A non-empty directory at the cache path cannot be renamed over.
        fs::create_dir(&path).unwrap();
        fs::write(path.join("keep"), b"x").unwrap();

        assert!(write_snapshot(&path, &sample_snapshot()).is_err());
        assert!(!temp_path(&path).exists());
        assert!(path.join("keep").exists());
    }
}
