//! TOML-deserializable feed configuration.
//!
//! Mirrors [`BuildOptions`](crate::data::BuildOptions) so a build can be
//! described declaratively:
//!
//! ```toml
//! instruments = ["orcl", "ibm"]
//! from_year = 2000
//! to_year = 2001
//! storage = "data"
//! frequency = "DAY"
//! timezone = "US/Eastern"
//! skip_errors = false
//! ```

use crate::data::BuildOptions;
use crate::domain::Frequency;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Declarative description of a feed build.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    pub instruments: Vec<String>,
    pub from_year: i32,
    pub to_year: i32,
    pub storage: PathBuf,
    #[serde(default)]
    pub frequency: Frequency,
    #[serde(default)]
    pub timezone: Option<Tz>,
    #[serde(default)]
    pub skip_errors: bool,
}

impl FeedConfig {
    /// Load a config from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_toml(&content)
    }

    /// Parse a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Builder options described by this config.
    pub fn build_options(&self) -> BuildOptions {
        BuildOptions {
            from_year: self.from_year,
            to_year: self.to_year,
            storage: self.storage.clone(),
            frequency: self.frequency,
            timezone: self.timezone,
            skip_errors: self.skip_errors,
        }
    }

    /// Instrument list as string slices, in configured order.
    pub fn instrument_refs(&self) -> Vec<&str> {
        self.instruments.iter().map(String::as_str).collect()
    }
}
