//! HTTP CSV fetcher.
//!
//! Fetches daily bars from a historical-data endpoint speaking the
//! `q`/`startdate`/`enddate`/`output=csv` query protocol and answering with a
//! spreadsheet MIME type. The response body is returned verbatim; transient
//! transport failures and retryable statuses are retried with exponential
//! backoff.

use super::provider::{BarFetcher, FetchError};
use chrono::NaiveDate;
use std::time::Duration;

/// Blocking HTTP implementation of the fetch contract.
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    endpoint: String,
    source_tag: String,
    max_retries: u32,
    base_delay: Duration,
}

impl HttpFetcher {
    /// Create a fetcher against `endpoint`, tagging cache files with
    /// `source_tag`.
    pub fn new(endpoint: impl Into<String>, source_tag: impl Into<String>) -> Self {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent(concat!("barfeed/", env!("CARGO_PKG_VERSION")))
            .build()
            .expect("failed to build HTTP client");

        Self {
            client,
            endpoint: endpoint.into(),
            source_tag: source_tag.into(),
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        }
    }

    /// Override the retry schedule (0 retries disables backoff entirely).
    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn request_once(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, FetchError> {
        let start_date = start.to_string();
        let end_date = end.to_string();
        let resp = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("q", instrument),
                ("startdate", start_date.as_str()),
                ("enddate", end_date.as_str()),
                ("output", "csv"),
            ])
            .send()
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let content_type = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_owned();
        if !is_tabular(&content_type) {
            return Err(FetchError::ContentType(content_type));
        }

        let body = resp.text().map_err(|e| FetchError::Network(e.to_string()))?;
        if body.trim().is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(body)
    }
}

/// Whether an HTTP content type denotes CSV/spreadsheet data.
fn is_tabular(content_type: &str) -> bool {
    let mime = content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase();
    matches!(
        mime.as_str(),
        "text/csv" | "application/csv" | "application/vnd.ms-excel" | "application/excel"
    )
}

impl BarFetcher for HttpFetcher {
    fn source_tag(&self) -> &str {
        &self.source_tag
    }

    fn fetch_daily(
        &self,
        instrument: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<String, FetchError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                std::thread::sleep(delay);
            }

            match self.request_once(instrument, start, end) {
                Ok(body) => return Ok(body),
                // Transient: connection trouble or a retryable status.
                Err(e @ FetchError::Network(_)) => last_error = Some(e),
                Err(e @ FetchError::Status(status)) if status == 429 || status >= 500 => {
                    last_error = Some(e)
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::Network("max retries exceeded".into())))
    }
}
