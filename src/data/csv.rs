//! CSV row parsing for daily bar artifacts.
//!
//! Artifact layout: `Date,Open,High,Low,Close,Volume[,Adj Close]` with ISO
//! dates. Reading is header-driven, so column order is free and the adjusted
//! close is optional (falls back to the raw close). Rendering produces the
//! same layout, so generated artifacts are byte-compatible with fetched ones.

use crate::domain::Bar;
use crate::feed::DataError;
use chrono::NaiveDate;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Date")]
    date: NaiveDate,
    #[serde(rename = "Open")]
    open: f64,
    #[serde(rename = "High")]
    high: f64,
    #[serde(rename = "Low")]
    low: f64,
    #[serde(rename = "Close")]
    close: f64,
    #[serde(rename = "Volume")]
    volume: u64,
    #[serde(rename = "Adj Close", default)]
    adj_close: Option<f64>,
}

/// Parse a daily-bar CSV body into bars for one instrument.
pub fn parse_daily(instrument: &str, body: &str) -> Result<Vec<Bar>, DataError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let mut bars = Vec::new();
    for result in reader.deserialize::<CsvRow>() {
        let row = result.map_err(|e| DataError::Malformed(e.to_string()))?;
        bars.push(Bar {
            symbol: instrument.to_string(),
            date: row.date,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
            adj_close: row.adj_close.unwrap_or(row.close),
        });
    }
    Ok(bars)
}

/// Read and parse a cached artifact file.
pub fn read_daily_file(instrument: &str, path: &Path) -> Result<Vec<Bar>, DataError> {
    let body = std::fs::read_to_string(path).map_err(|e| DataError::Unreadable {
        path: path.to_path_buf(),
        source: e,
    })?;
    parse_daily(instrument, &body)
}

/// Render bars to the same CSV layout the cache stores.
pub fn render_daily(bars: &[Bar]) -> String {
    let mut out = String::from("Date,Open,High,Low,Close,Volume,Adj Close\n");
    for bar in bars {
        out.push_str(&format!(
            "{},{},{},{},{},{},{}\n",
            bar.date, bar.open, bar.high, bar.low, bar.close, bar.volume, bar.adj_close
        ));
    }
    out
}
