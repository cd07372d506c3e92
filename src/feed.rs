//! The merged, replayable multi-instrument bar stream.
//!
//! A feed owns one ascending-by-date bar sequence per instrument. Iteration
//! performs a k-way merge: each step groups every bar sharing the lowest
//! unconsumed date into one [`BarSet`], so the stream is strictly ascending
//! with no duplicate dates. Feeds are append-only while loading and immutable
//! once replay starts.

use crate::domain::{Bar, BarSet, Frequency};
use chrono::NaiveDate;
use chrono_tz::Tz;
use std::collections::BTreeMap;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from loading bar content into a feed.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("malformed bar data: {0}")]
    Malformed(String),

    #[error("unreadable artifact {}", .path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("duplicate bar for {instrument} on {date}")]
    DuplicateTimestamp {
        instrument: String,
        date: NaiveDate,
    },
}

/// A replayable multi-instrument daily bar stream.
#[derive(Debug, Clone)]
pub struct Feed {
    frequency: Frequency,
    timezone: Option<Tz>,
    sequences: BTreeMap<String, Vec<Bar>>,
}

impl Feed {
    /// Create an empty feed.
    pub fn new(frequency: Frequency, timezone: Option<Tz>) -> Self {
        Self {
            frequency,
            timezone,
            sequences: BTreeMap::new(),
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    /// Advisory timezone for downstream localization; dates are never
    /// shifted by the feed itself.
    pub fn timezone(&self) -> Option<Tz> {
        self.timezone
    }

    /// Append a batch of bars to an instrument's sequence.
    ///
    /// The combined sequence is normalized with a stable sort, so
    /// out-of-order input is accepted; a duplicate date within one instrument
    /// is an error, and a failed load leaves the feed unchanged.
    pub fn load_bars(&mut self, instrument: &str, bars: Vec<Bar>) -> Result<(), DataError> {
        let seq = self.sequences.entry(instrument.to_string()).or_default();

        let mut merged = seq.clone();
        merged.extend(bars);
        merged.sort_by_key(|b| b.date);

        for pair in merged.windows(2) {
            if pair[0].date == pair[1].date {
                return Err(DataError::DuplicateTimestamp {
                    instrument: instrument.to_string(),
                    date: pair[0].date,
                });
            }
        }

        *seq = merged;
        Ok(())
    }

    /// Instruments with a loaded sequence, in sorted order.
    pub fn instruments(&self) -> Vec<&str> {
        self.sequences.keys().map(String::as_str).collect()
    }

    /// The ascending bar sequence for one instrument.
    pub fn bars(&self, instrument: &str) -> Option<&[Bar]> {
        self.sequences.get(instrument).map(Vec::as_slice)
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.values().all(Vec::is_empty)
    }

    /// Merged iteration over all instruments.
    ///
    /// Restartable: the feed is immutable while borrowed, so every pass
    /// yields the same stream.
    pub fn iter(&self) -> BarSets<'_> {
        BarSets {
            sequences: self
                .sequences
                .iter()
                .map(|(instrument, bars)| (instrument.as_str(), bars.as_slice()))
                .collect(),
            cursors: vec![0; self.sequences.len()],
        }
    }

    /// Deterministic content hash over every bar, in sorted instrument order.
    ///
    /// Two feeds with identical bar content have identical fingerprints
    /// regardless of load order.
    pub fn fingerprint(&self) -> String {
        let mut hasher = blake3::Hasher::new();
        for (instrument, bars) in &self.sequences {
            hasher.update(instrument.as_bytes());
            for bar in bars {
                hasher.update(bar.date.to_string().as_bytes());
                hasher.update(&bar.open.to_le_bytes());
                hasher.update(&bar.high.to_le_bytes());
                hasher.update(&bar.low.to_le_bytes());
                hasher.update(&bar.close.to_le_bytes());
                hasher.update(&bar.volume.to_le_bytes());
                hasher.update(&bar.adj_close.to_le_bytes());
            }
        }
        hasher.finalize().to_hex().to_string()
    }
}

/// Lazy k-way merge over a feed's instrument sequences.
pub struct BarSets<'a> {
    sequences: Vec<(&'a str, &'a [Bar])>,
    cursors: Vec<usize>,
}

impl Iterator for BarSets<'_> {
    type Item = BarSet;

    fn next(&mut self) -> Option<BarSet> {
        let mut next_date: Option<NaiveDate> = None;
        for ((_, bars), &cursor) in self.sequences.iter().zip(&self.cursors) {
            if let Some(bar) = bars.get(cursor) {
                next_date = Some(match next_date {
                    Some(date) => date.min(bar.date),
                    None => bar.date,
                });
            }
        }
        let date = next_date?;

        let mut set = BTreeMap::new();
        for ((instrument, bars), cursor) in self.sequences.iter().zip(self.cursors.iter_mut()) {
            if let Some(bar) = bars.get(*cursor) {
                if bar.date == date {
                    set.insert((*instrument).to_string(), bar.clone());
                    *cursor += 1;
                }
            }
        }
        Some(BarSet::new(date, set))
    }
}

impl<'a> IntoIterator for &'a Feed {
    type Item = BarSet;
    type IntoIter = BarSets<'a>;

    fn into_iter(self) -> BarSets<'a> {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bar(symbol: &str, date: &str, close: f64) -> Bar {
        Bar {
            symbol: symbol.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            open: close - 1.0,
            high: close + 1.0,
            low: close - 2.0,
            close,
            volume: 1000,
            adj_close: close,
        }
    }

    fn feed() -> Feed {
        Feed::new(Frequency::Day, None)
    }

    #[test]
    fn merge_groups_shared_dates() {
        let mut feed = feed();
        feed.load_bars(
            "a",
            vec![bar("a", "2000-01-03", 10.0), bar("a", "2000-01-04", 11.0)],
        )
        .unwrap();
        feed.load_bars(
            "b",
            vec![bar("b", "2000-01-03", 20.0), bar("b", "2000-01-05", 21.0)],
        )
        .unwrap();

        let sets: Vec<BarSet> = feed.iter().collect();
        assert_eq!(sets.len(), 3);

        assert_eq!(sets[0].date().to_string(), "2000-01-03");
        assert_eq!(sets[0].len(), 2);
        assert_eq!(sets[1].date().to_string(), "2000-01-04");
        assert_eq!(sets[1].instruments().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(sets[2].date().to_string(), "2000-01-05");
        assert_eq!(sets[2].instruments().collect::<Vec<_>>(), vec!["b"]);
    }

    #[test]
    fn iteration_is_restartable() {
        let mut feed = feed();
        feed.load_bars(
            "a",
            vec![bar("a", "2000-01-03", 10.0), bar("a", "2000-01-04", 11.0)],
        )
        .unwrap();

        let first: Vec<BarSet> = feed.iter().collect();
        let second: Vec<BarSet> = feed.iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn out_of_order_input_is_normalized() {
        let mut feed = feed();
        feed.load_bars(
            "a",
            vec![bar("a", "2000-01-04", 11.0), bar("a", "2000-01-03", 10.0)],
        )
        .unwrap();

        let dates: Vec<String> = feed
            .bars("a")
            .unwrap()
            .iter()
            .map(|b| b.date.to_string())
            .collect();
        assert_eq!(dates, vec!["2000-01-03", "2000-01-04"]);
    }

    #[test]
    fn duplicate_date_is_rejected_and_feed_unchanged() {
        let mut feed = feed();
        feed.load_bars("a", vec![bar("a", "2000-01-03", 10.0)]).unwrap();

        let err = feed
            .load_bars("a", vec![bar("a", "2000-01-03", 99.0)])
            .unwrap_err();
        match err {
            DataError::DuplicateTimestamp { instrument, date } => {
                assert_eq!(instrument, "a");
                assert_eq!(date.to_string(), "2000-01-03");
            }
            other => panic!("expected DuplicateTimestamp, got: {other:?}"),
        }

        // The failed load did not touch the existing sequence.
        assert_eq!(feed.bars("a").unwrap().len(), 1);
        assert_eq!(feed.bars("a").unwrap()[0].close, 10.0);
    }

    #[test]
    fn loads_accumulate_across_years() {
        let mut feed = feed();
        feed.load_bars("a", vec![bar("a", "2000-12-29", 10.0)]).unwrap();
        feed.load_bars("a", vec![bar("a", "2001-01-02", 11.0)]).unwrap();

        assert_eq!(feed.bars("a").unwrap().len(), 2);
        let sets: Vec<BarSet> = feed.iter().collect();
        assert_eq!(sets.len(), 2);
    }

    #[test]
    fn empty_feed_yields_nothing() {
        assert_eq!(feed().iter().count(), 0);
        assert!(feed().is_empty());
    }

    #[test]
    fn fingerprint_ignores_load_order() {
        let mut one = feed();
        one.load_bars("a", vec![bar("a", "2000-01-03", 10.0)]).unwrap();
        one.load_bars("b", vec![bar("b", "2000-01-03", 20.0)]).unwrap();

        let mut two = feed();
        two.load_bars("b", vec![bar("b", "2000-01-03", 20.0)]).unwrap();
        two.load_bars("a", vec![bar("a", "2000-01-03", 10.0)]).unwrap();

        assert_eq!(one.fingerprint(), two.fingerprint());
    }

    #[test]
    fn fingerprint_tracks_content() {
        let mut one = feed();
        one.load_bars("a", vec![bar("a", "2000-01-03", 10.0)]).unwrap();

        let mut two = feed();
        two.load_bars("a", vec![bar("a", "2000-01-03", 10.5)]).unwrap();

        assert_ne!(one.fingerprint(), two.fingerprint());
    }
}
