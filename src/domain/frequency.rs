//! Bar sampling frequency.

use serde::{Deserialize, Serialize};

/// Sampling frequency of a bar series.
///
/// Only `Day` is supported by the feed builder today. The other variants
/// exist so configuration files can name them and be rejected with a typed
/// error instead of silently producing a daily feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Frequency {
    #[default]
    Day,
    Week,
    Month,
}
