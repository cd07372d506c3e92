//! CSV artifact cache keyed by (instrument, year).
//!
//! Layout: `{storage_dir}/{instrument}-{year}-{source_tag}.csv`
//!
//! Writes are atomic (write to .tmp, rename into place), so a file that
//! exists at the final path is always a complete artifact and the record of
//! a prior successful fetch. Nothing else is persisted.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// File cache for fetched bar artifacts.
pub struct CsvCache {
    storage_dir: PathBuf,
    source_tag: String,
}

impl CsvCache {
    pub fn new(storage_dir: impl Into<PathBuf>, source_tag: impl Into<String>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            source_tag: source_tag.into(),
        }
    }

    /// Root directory of the cache.
    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Deterministic artifact path for a (instrument, year) pair.
    pub fn bar_path(&self, instrument: &str, year: i32) -> PathBuf {
        self.storage_dir
            .join(format!("{instrument}-{year}-{}.csv", self.source_tag))
    }

    /// Create the storage root if needed and return the pair's path.
    ///
    /// Idempotent: an already-existing root (including one created by a
    /// concurrent builder) is not an error. Never touches the network;
    /// callers check existence themselves.
    pub fn ensure_ready(&self, instrument: &str, year: i32) -> io::Result<PathBuf> {
        fs::create_dir_all(&self.storage_dir)?;
        Ok(self.bar_path(instrument, year))
    }

    /// Whether a pair's artifact is cached.
    pub fn contains(&self, instrument: &str, year: i32) -> bool {
        self.bar_path(instrument, year).exists()
    }

    /// Persist a fetched artifact body for a pair.
    ///
    /// The body lands at a temporary path first and is published by rename,
    /// so a half-written artifact is never observable at the final path. The
    /// temporary file is removed if the rename fails.
    pub fn store(&self, instrument: &str, year: i32, body: &str) -> io::Result<PathBuf> {
        let path = self.ensure_ready(instrument, year)?;
        let tmp_path = path.with_extension("csv.tmp");

        fs::write(&tmp_path, body)?;
        fs::rename(&tmp_path, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp_path);
            e
        })?;
        Ok(path)
    }

    /// Presence report for a range of pairs. Diagnostics only; reads nothing
    /// but file metadata.
    pub fn status(&self, instruments: &[&str], from_year: i32, to_year: i32) -> Vec<CacheStatus> {
        let mut statuses = Vec::new();
        for year in from_year..=to_year {
            for instrument in instruments {
                let path = self.bar_path(instrument, year);
                let size_bytes = fs::metadata(&path).ok().map(|m| m.len());
                statuses.push(CacheStatus {
                    instrument: instrument.to_string(),
                    year,
                    cached: size_bytes.is_some(),
                    size_bytes,
                });
            }
        }
        statuses
    }
}

/// Cache presence for a single (instrument, year) pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStatus {
    pub instrument: String,
    pub year: i32,
    pub cached: bool,
    pub size_bytes: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::atomic::{AtomicU64, Ordering};

    static TEST_COUNTER: AtomicU64 = AtomicU64::new(0);

    fn temp_storage_dir() -> PathBuf {
        let id = TEST_COUNTER.fetch_add(1, Ordering::Relaxed);
        let dir = env::temp_dir().join(format!("barfeed_cache_test_{}_{id}", std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn path_follows_naming_convention() {
        let cache = CsvCache::new("/data", "histdata");
        assert_eq!(
            cache.bar_path("orcl", 2000),
            PathBuf::from("/data/orcl-2000-histdata.csv")
        );
    }

    #[test]
    fn ensure_ready_creates_root_idempotently() {
        let dir = temp_storage_dir();
        let cache = CsvCache::new(&dir, "histdata");

        let first = cache.ensure_ready("orcl", 2000).unwrap();
        let second = cache.ensure_ready("orcl", 2000).unwrap();
        assert_eq!(first, second);
        assert!(dir.is_dir());
        // The path itself is not created, only the root.
        assert!(!first.exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn store_publishes_atomically() {
        let dir = temp_storage_dir();
        let cache = CsvCache::new(&dir, "histdata");

        let path = cache.store("orcl", 2000, "Date,Open\n2000-01-03,100\n").unwrap();
        assert!(cache.contains("orcl", 2000));
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "Date,Open\n2000-01-03,100\n"
        );
        // No temporary residue after publishing.
        assert!(!path.with_extension("csv.tmp").exists());

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn status_reports_presence_per_pair() {
        let dir = temp_storage_dir();
        let cache = CsvCache::new(&dir, "histdata");
        cache.store("orcl", 2000, "data").unwrap();

        let statuses = cache.status(&["orcl", "ibm"], 2000, 2001);
        assert_eq!(statuses.len(), 4);

        let cached: Vec<_> = statuses.iter().filter(|s| s.cached).collect();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].instrument, "orcl");
        assert_eq!(cached[0].year, 2000);
        assert_eq!(cached[0].size_bytes, Some(4));

        let _ = fs::remove_dir_all(&dir);
    }
}
