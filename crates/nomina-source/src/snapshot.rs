//! Last-known-good snapshot cache
//!
//! Holds at most one successfully decoded body. The snapshot is replaced on
//! every successful fetch and read when a fetch fails or while it is younger
//! than the TTL. It can be persisted as JSON so separate runs share it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::SnapshotError;

/// Hex md5 digest of a body
pub fn digest(body: &str) -> String {
    format!("{:x}", md5::compute(body.as_bytes()))
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub body: String,
    pub digest: String,
    pub fetched_at: DateTime<Utc>,
    pub record_count: usize,
}

impl Snapshot {
    pub fn new(body: impl Into<String>, record_count: usize, fetched_at: DateTime<Utc>) -> Self {
        let body = body.into();
        Self {
            digest: digest(&body),
            body,
            fetched_at,
            record_count,
        }
    }
}

#[derive(Debug)]
pub struct SnapshotCache {
    snapshot: Option<Snapshot>,
    ttl: Duration,
    path: Option<PathBuf>,
}

impl SnapshotCache {
    /// Empty in-memory cache
    pub fn new(ttl: Duration) -> Self {
        Self {
            snapshot: None,
            ttl,
            path: None,
        }
    }

    /// Cache backed by a JSON file; a missing file starts empty
    pub fn load(path: impl Into<PathBuf>, ttl: Duration) -> Result<Self, SnapshotError> {
        let path = path.into();
        let snapshot = match std::fs::read_to_string(&path) {
            Ok(text) => {
                let snapshot: Snapshot =
                    serde_json::from_str(&text).map_err(|source| SnapshotError::Json {
                        path: path.clone(),
                        source,
                    })?;
                debug!(
                    path = %path.display(),
                    fetched_at = %snapshot.fetched_at,
                    "loaded snapshot"
                );
                Some(snapshot)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(source) => return Err(SnapshotError::Io { path, source }),
        };
        Ok(Self {
            snapshot,
            ttl,
            path: Some(path),
        })
    }

    /// Write the snapshot to the backing file, if any
    pub fn save(&self) -> Result<(), SnapshotError> {
        let (Some(path), Some(snapshot)) = (&self.path, &self.snapshot) else {
            return Ok(());
        };
        let io = |source| SnapshotError::Io {
            path: path.clone(),
            source,
        };
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            std::fs::create_dir_all(dir).map_err(io)?;
        }
        let json = serde_json::to_string(snapshot).map_err(|source| SnapshotError::Json {
            path: path.clone(),
            source,
        })?;
        std::fs::write(path, json).map_err(io)?;
        debug!(path = %path.display(), "saved snapshot");
        Ok(())
    }

    pub fn get(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// True when a snapshot exists and is younger than the TTL at `now`
    pub fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        self.snapshot.as_ref().is_some_and(|s| {
            now.signed_duration_since(s.fetched_at)
                .to_std()
                .is_ok_and(|age| age < self.ttl)
        })
    }

    /// Store a new snapshot; returns true when its digest differs from the
    /// previous one (or there was none)
    pub fn replace(&mut self, snapshot: Snapshot) -> bool {
        let changed = self
            .snapshot
            .as_ref()
            .map_or(true, |previous| previous.digest != snapshot.digest);
        self.snapshot = Some(snapshot);
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn at(secs: i64) -> DateTime<Utc> {
        Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
    }

    #[test]
    fn digest_is_md5_hex() {
        assert_eq!(digest(""), "d41d8cd98f00b204e9800998ecf8427e");
        assert_eq!(digest("abc"), "900150983cd24fb0d6963f7d28e17f72");
    }

    #[test]
    fn ttl_window() {
        let mut cache = SnapshotCache::new(Duration::from_secs(30));
        assert!(!cache.is_fresh(at(0)));

        cache.replace(Snapshot::new("a", 1, at(0)));
        assert!(cache.is_fresh(at(0)));
        assert!(cache.is_fresh(at(29)));
        assert!(!cache.is_fresh(at(30)));
        // clock went backwards
        assert!(!cache.is_fresh(at(-5)));
    }

    #[test]
    fn replace_reports_changes() {
        let mut cache = SnapshotCache::new(Duration::from_secs(30));
        assert!(cache.replace(Snapshot::new("a", 1, at(0))));
        assert!(!cache.replace(Snapshot::new("a", 1, at(10))));
        assert!(cache.replace(Snapshot::new("b", 1, at(20))));
        assert_eq!(cache.get().unwrap().fetched_at, at(20));
    }

    #[test]
    fn persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cache").join("snapshot.json");

        let mut cache = SnapshotCache::load(&path, Duration::from_secs(30)).unwrap();
        assert!(cache.get().is_none());
        cache.save().unwrap();
        assert!(!path.exists());

        cache.replace(Snapshot::new("Codigo\n", 0, at(0)));
        cache.save().unwrap();

        let reloaded = SnapshotCache::load(&path, Duration::from_secs(30)).unwrap();
        assert_eq!(reloaded.get(), cache.get());
    }

    #[test]
    fn corrupt_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snapshot.json");
        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(
            SnapshotCache::load(&path, Duration::from_secs(30)),
            Err(SnapshotError::Json { .. })
        ));
    }
}
