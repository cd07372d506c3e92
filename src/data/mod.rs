//! Bar acquisition and caching.

pub mod builder;
pub mod cache;
pub mod csv;
pub mod http;
pub mod provider;
pub mod synthetic;

pub use builder::{build_feed, BuildError, BuildOptions};
pub use cache::{CacheStatus, CsvCache};
pub use http::HttpFetcher;
pub use provider::{BarFetcher, BuildProgress, FetchError, SilentProgress, StdoutProgress};
pub use synthetic::{generate_daily_bars, SyntheticFetcher};
