use std::time::Duration;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Values substituted for filter fields a caller leaves unset.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DefaultsConfig {
    /// First day of the default date range.
    #[serde(default = "default_start_date")]
    pub start_date: NaiveDate,

    /// Last day of the default date range.
    #[serde(default = "default_end_date")]
    pub end_date: NaiveDate,

    /// Rows per page in the event table.
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Rows returned by leaderboard endpoints.
    #[serde(default = "default_limit")]
    pub limit: u32,

    /// Delay before a search keystroke triggers a fetch.
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            start_date: default_start_date(),
            end_date: default_end_date(),
            page_size: default_page_size(),
            limit: default_limit(),
            search_debounce_ms: default_search_debounce_ms(),
        }
    }
}

impl DefaultsConfig {
    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.start_date > self.end_date {
            return Err(ConfigError::Validation(format!(
                "defaults.start_date ({}) is after defaults.end_date ({})",
                self.start_date, self.end_date
            )));
        }
        if self.page_size == 0 {
            return Err(ConfigError::Validation(
                "defaults.page_size must be at least 1".into(),
            ));
        }
        if self.limit == 0 {
            return Err(ConfigError::Validation(
                "defaults.limit must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

fn default_start_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, 1).unwrap_or_default()
}

fn default_end_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 7, 22).unwrap_or_default()
}

fn default_page_size() -> u32 {
    10
}

fn default_limit() -> u32 {
    10
}

fn default_search_debounce_ms() -> u64 {
    300
}
