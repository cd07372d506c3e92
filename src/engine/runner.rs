//! Single-pass replay of a feed into a strategy.

use super::strategy::{Signal, Strategy, StrategyError};
use crate::feed::Feed;
use chrono::NaiveDate;
use thiserror::Error;

/// Errors from a backtest run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("strategy failed on {date}")]
    Strategy {
        date: NaiveDate,
        #[source]
        source: StrategyError,
    },
}

/// What a finished run processed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Bar sets delivered to the strategy.
    pub bar_sets: usize,
    /// True when the strategy signalled stop before the feed was exhausted.
    pub stopped_early: bool,
    /// Date of the last delivered bar set.
    pub last_date: Option<NaiveDate>,
}

/// Drives a feed through a strategy, one bar set per distinct date.
pub struct BacktestRunner<'a> {
    feed: &'a Feed,
}

impl<'a> BacktestRunner<'a> {
    pub fn new(feed: &'a Feed) -> Self {
        Self { feed }
    }

    /// Replay the whole feed.
    ///
    /// Blocks until the feed is exhausted, the strategy returns
    /// [`Signal::Stop`], or the callback fails. A failure aborts the run with
    /// the strategy's own cause preserved; there is no retry.
    pub fn run<S: Strategy + ?Sized>(&self, strategy: &mut S) -> Result<RunSummary, RunError> {
        let mut summary = RunSummary {
            bar_sets: 0,
            stopped_early: false,
            last_date: None,
        };

        for bar_set in self.feed.iter() {
            let date = bar_set.date();
            let signal = strategy
                .on_bars(&bar_set)
                .map_err(|source| RunError::Strategy { date, source })?;

            summary.bar_sets += 1;
            summary.last_date = Some(date);

            if signal == Signal::Stop {
                summary.stopped_early = true;
                break;
            }
        }

        Ok(summary)
    }
}
