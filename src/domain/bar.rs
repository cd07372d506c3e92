//! Bar and BarSet — the fundamental market data units.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// OHLCV bar for a single instrument on a single day.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bar {
    pub symbol: String,
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adj_close: f64,
}

impl Bar {
    /// Basic OHLC sanity check: high is the top of the range, low the bottom.
    pub fn is_sane(&self) -> bool {
        self.high >= self.low
            && self.high >= self.open
            && self.high >= self.close
            && self.low <= self.open
            && self.low <= self.close
            && self.open > 0.0
            && self.close > 0.0
    }
}

/// Bars for every instrument that traded on one date.
///
/// Instruments without a bar on the date are simply absent — there is no
/// synthetic fill. Produced by the feed's merge iterator; one set per
/// distinct date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BarSet {
    date: NaiveDate,
    bars: BTreeMap<String, Bar>,
}

impl BarSet {
    pub(crate) fn new(date: NaiveDate, bars: BTreeMap<String, Bar>) -> Self {
        Self { date, bars }
    }

    /// The shared date of every bar in the set.
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// The bar for one instrument, if it traded on this date.
    pub fn bar(&self, instrument: &str) -> Option<&Bar> {
        self.bars.get(instrument)
    }

    /// Instruments present in this set, in sorted order.
    pub fn instruments(&self) -> impl Iterator<Item = &str> {
        self.bars.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Bar)> {
        self.bars.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.bars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }
}

impl std::ops::Index<&str> for BarSet {
    type Output = Bar;

    fn index(&self, instrument: &str) -> &Bar {
        self.bars
            .get(instrument)
            .unwrap_or_else(|| panic!("no bar for instrument '{instrument}' on {}", self.date))
    }
}
