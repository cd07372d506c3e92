//! Feed builder — the cache-or-fetch orchestration loop.
//!
//! For each (year, instrument) pair, outer years ascending and inner
//! instruments in caller order, the builder reuses the cached artifact when
//! present, otherwise fetches the full calendar-year window and persists it
//! atomically before loading it into the feed. Fetch failures are skippable
//! per configuration; data and storage failures never are.

use super::cache::CsvCache;
use super::csv;
use super::provider::{BarFetcher, BuildProgress, FetchError};
use crate::domain::Frequency;
use crate::feed::{DataError, Feed};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Options controlling a feed build.
#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// First year to load (inclusive).
    pub from_year: i32,
    /// Last year to load (inclusive).
    pub to_year: i32,
    /// Directory artifacts are loaded from, or downloaded to.
    pub storage: PathBuf,
    /// Bar frequency; only `Frequency::Day` is supported.
    pub frequency: Frequency,
    /// Advisory timezone recorded on the feed; dates are never shifted.
    pub timezone: Option<Tz>,
    /// Keep building when a fetch fails, dropping the failed pair.
    pub skip_errors: bool,
}

impl BuildOptions {
    /// Daily-bar options over an inclusive year range.
    pub fn daily(from_year: i32, to_year: i32, storage: impl Into<PathBuf>) -> Self {
        Self {
            from_year,
            to_year,
            storage: storage.into(),
            frequency: Frequency::Day,
            timezone: None,
            skip_errors: false,
        }
    }

    pub fn skip_errors(mut self, skip: bool) -> Self {
        self.skip_errors = skip;
        self
    }

    pub fn timezone(mut self, tz: Tz) -> Self {
        self.timezone = Some(tz);
        self
    }
}

/// Errors from a feed build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("unsupported bar frequency {0:?}: only daily bars are supported")]
    UnsupportedFrequency(Frequency),

    #[error("fetch failed for {instrument} {year}")]
    Fetch {
        instrument: String,
        year: i32,
        #[source]
        source: FetchError,
    },

    #[error("bad bar data for {instrument} {year}")]
    Data {
        instrument: String,
        year: i32,
        #[source]
        source: DataError,
    },

    #[error("storage root {} is unusable", .path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Build a feed from cached artifacts, fetching any missing
/// (instrument, year) slices first.
///
/// Iteration order is contractual: years ascending, instruments in the order
/// given (not sorted). Fetches, cache writes, and progress events follow that
/// order; the merged content of the resulting feed does not depend on it. A
/// pair whose cache file already exists is never fetched again.
///
/// With `skip_errors` set, a pair whose fetch fails is reported to `progress`
/// and omitted from the feed; without it, the first fetch failure aborts the
/// build before any later pair is touched. Unparseable artifacts and storage
/// failures abort the build regardless.
pub fn build_feed(
    instruments: &[&str],
    fetcher: &dyn BarFetcher,
    progress: &dyn BuildProgress,
    opts: &BuildOptions,
) -> Result<Feed, BuildError> {
    if opts.frequency != Frequency::Day {
        return Err(BuildError::UnsupportedFrequency(opts.frequency));
    }

    let cache = CsvCache::new(&opts.storage, fetcher.source_tag());
    let mut feed = Feed::new(opts.frequency, opts.timezone);
    let mut loaded = 0usize;
    let mut skipped = 0usize;

    for year in opts.from_year..=opts.to_year {
        for instrument in instruments {
            let path = cache
                .ensure_ready(instrument, year)
                .map_err(|e| BuildError::Storage {
                    path: opts.storage.clone(),
                    source: e,
                })?;

            if path.exists() {
                progress.on_cache_hit(instrument, year);
            } else {
                progress.on_fetch_start(instrument, year);
                match fetch_and_store(&cache, fetcher, instrument, year) {
                    Ok(()) => progress.on_fetch_done(instrument, year),
                    Err(err) if opts.skip_errors => {
                        progress.on_skip(instrument, year, &err);
                        skipped += 1;
                        continue;
                    }
                    Err(err) => {
                        return Err(BuildError::Fetch {
                            instrument: instrument.to_string(),
                            year,
                            source: err,
                        })
                    }
                }
            }

            let bars = csv::read_daily_file(instrument, &path)
                .map_err(|e| data_error(instrument, year, e))?;
            feed.load_bars(instrument, bars)
                .map_err(|e| data_error(instrument, year, e))?;
            loaded += 1;
        }
    }

    progress.on_build_done(loaded, skipped);
    Ok(feed)
}

/// Fetch the full calendar-year window for a pair and persist it atomically.
fn fetch_and_store(
    cache: &CsvCache,
    fetcher: &dyn BarFetcher,
    instrument: &str,
    year: i32,
) -> Result<(), FetchError> {
    let start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(year, 12, 31).unwrap();
    let body = fetcher.fetch_daily(instrument, start, end)?;

    match cache.store(instrument, year, &body) {
        Ok(_) => Ok(()),
        Err(e) => Err(FetchError::Store {
            path: cache.bar_path(instrument, year),
            source: e,
        }),
    }
}

fn data_error(instrument: &str, year: i32, source: DataError) -> BuildError {
    BuildError::Data {
        instrument: instrument.to_string(),
        year,
        source,
    }
}
