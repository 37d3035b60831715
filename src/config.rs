use std::path::PathBuf;

use crate::engine::{EngineError, local_today};
use crate::model::{CalendarDate, parse_date};

/// Runtime settings, read from `STAYCAL_*` environment variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `STAYCAL_DATA_DIR`, default `./data`.
    pub data_dir: PathBuf,
    /// `STAYCAL_METRICS_PORT`; no exporter when unset.
    pub metrics_port: Option<u16>,
    /// `STAYCAL_TODAY` (`YYYY-MM-DD`) pins the clock, e.g. for demos.
    pub today: Option<CalendarDate>,
}

impl Config {
    pub fn from_env() -> Result<Self, EngineError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, EngineError> {
        let data_dir = lookup("STAYCAL_DATA_DIR").unwrap_or_else(|| "./data".into());
        let metrics_port = lookup("STAYCAL_METRICS_PORT").and_then(|s| s.parse().ok());
        let today = match lookup("STAYCAL_TODAY") {
            Some(s) => Some(parse_date(&s).map_err(|_| EngineError::InvalidDate(s))?),
            None => None,
        };
        Ok(Self {
            data_dir: PathBuf::from(data_dir),
            metrics_port,
            today,
        })
    }

    pub fn today(&self) -> CalendarDate {
        self.today.unwrap_or_else(local_today)
    }
}
