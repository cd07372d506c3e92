//! barfeed — historical bar acquisition, idempotent CSV caching, and
//! deterministic multi-instrument replay.
//!
//! The pipeline, end to end:
//! - [`data::build_feed`] walks (year, instrument) pairs in a fixed order,
//!   reusing cached artifacts and fetching the rest through a
//!   [`data::BarFetcher`], with a configurable skip-or-abort policy on fetch
//!   failure
//! - [`feed::Feed`] merges the per-instrument sequences into one strictly
//!   ascending stream of date-grouped [`domain::BarSet`]s
//! - [`engine::BacktestRunner`] replays that stream into an
//!   [`engine::Strategy`], exactly once per distinct date, until the feed is
//!   exhausted or the strategy signals stop

pub mod config;
pub mod data;
pub mod domain;
pub mod engine;
pub mod feed;

#[cfg(test)]
mod tests {
    use super::*;

    /// Compile-time check: the types that cross thread boundaries stay
    /// Send + Sync.
    #[allow(dead_code)]
    fn assert_send_sync() {
        fn require_send<T: Send>() {}
        fn require_sync<T: Sync>() {}

        require_send::<domain::Bar>();
        require_sync::<domain::Bar>();
        require_send::<domain::BarSet>();
        require_sync::<domain::BarSet>();
        require_send::<feed::Feed>();
        require_sync::<feed::Feed>();
        require_send::<feed::DataError>();
        require_sync::<feed::DataError>();
        require_send::<data::FetchError>();
        require_sync::<data::FetchError>();
        require_send::<data::BuildError>();
        require_sync::<data::BuildError>();
        require_send::<data::BuildOptions>();
        require_sync::<data::BuildOptions>();
        require_send::<data::HttpFetcher>();
        require_sync::<data::HttpFetcher>();
        require_send::<data::SyntheticFetcher>();
        require_sync::<data::SyntheticFetcher>();
        require_send::<engine::RunError>();
        require_sync::<engine::RunError>();
        require_send::<config::FeedConfig>();
        require_sync::<config::FeedConfig>();
    }
}
