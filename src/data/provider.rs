//! Fetcher trait, fetch errors, and build progress reporting.
//!
//! The `BarFetcher` trait abstracts over remote bar sources (HTTP endpoints,
//! synthetic generators, test doubles) so the build loop can be exercised
//! without a network. The cache layer sits above this trait — fetchers don't
//! know about the cache.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from retrieving or persisting one (instrument, year) slice.
///
/// These are the only errors the skip-errors policy applies to; everything
/// else in a build is fatal.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error: {0}")]
    Network(String),

    #[error("HTTP status {0}")]
    Status(u16),

    #[error("unexpected content type '{0}', expected a CSV/spreadsheet type")]
    ContentType(String),

    #[error("empty response body")]
    EmptyBody,

    #[error("failed to store artifact at {}", .path.display())]
    Store {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Trait for bar data sources.
///
/// `fetch_daily` returns the raw artifact body for the date range, verbatim.
/// The builder persists it untouched, so the cache file mirrors exactly what
/// the source produced; interpretation is left to the row parser at load
/// time.
pub trait BarFetcher: Send + Sync {
    /// Short identifier embedded in cache file names.
    fn source_tag(&self) -> &str;

    /// Fetch daily bars for an instrument over a date range.
    ///
    /// Whether `end` is treated inclusively is the source's own semantic;
    /// both dates are passed through untouched.
    fn fetch_daily(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, FetchError>;
}

/// Progress callback for feed builds.
///
/// The builder has no logger of its own; every observable event, including
/// slices dropped under the skip-errors policy, goes through this trait.
pub trait BuildProgress: Send {
    /// Called when a pair's artifact is already cached.
    fn on_cache_hit(&self, instrument: &str, year: i32);

    /// Called before fetching an uncached pair.
    fn on_fetch_start(&self, instrument: &str, year: i32);

    /// Called after a fetched pair has been persisted.
    fn on_fetch_done(&self, instrument: &str, year: i32);

    /// Called when a pair is dropped under the skip-errors policy.
    fn on_skip(&self, instrument: &str, year: i32, error: &FetchError);

    /// Called once the build finishes.
    fn on_build_done(&self, loaded: usize, skipped: usize);
}

/// Progress reporter that prints to stdout (skips go to stderr).
pub struct StdoutProgress;

impl BuildProgress for StdoutProgress {
    fn on_cache_hit(&self, instrument: &str, year: i32) {
        println!("Using cached {instrument} {year}");
    }

    fn on_fetch_start(&self, instrument: &str, year: i32) {
        println!("Fetching {instrument} {year}...");
    }

    fn on_fetch_done(&self, instrument: &str, year: i32) {
        println!("  OK: {instrument} {year}");
    }

    fn on_skip(&self, instrument: &str, year: i32, error: &FetchError) {
        eprintln!("WARNING: skipping {instrument} {year}: {error}");
    }

    fn on_build_done(&self, loaded: usize, skipped: usize) {
        println!("\nFeed build complete: {loaded} slice(s) loaded, {skipped} skipped");
    }
}

/// Progress reporter that discards every event.
pub struct SilentProgress;

impl BuildProgress for SilentProgress {
    fn on_cache_hit(&self, _instrument: &str, _year: i32) {}
    fn on_fetch_start(&self, _instrument: &str, _year: i32) {}
    fn on_fetch_done(&self, _instrument: &str, _year: i32) {}
    fn on_skip(&self, _instrument: &str, _year: i32, _error: &FetchError) {}
    fn on_build_done(&self, _loaded: usize, _skipped: usize) {}
}
