use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ConfigError;

/// Query cache configuration.
///
/// A cached result is served without a network call while it is younger
/// than `stale_time_secs`. After that it is still served, but a background
/// refresh is started. Entries are dropped entirely after `gc_time_secs`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct QueryCacheConfig {
    /// Freshness window in seconds.
    #[serde(default = "default_stale_time_secs")]
    pub stale_time_secs: u64,

    /// Lifetime of an entry in seconds.
    #[serde(default = "default_gc_time_secs")]
    pub gc_time_secs: u64,

    /// Maximum number of cached query results.
    #[serde(default = "default_max_entries")]
    pub max_entries: usize,

    /// Number of entries evicted at once when the cache is full.
    #[serde(default = "default_eviction_batch_size")]
    pub eviction_batch_size: usize,
}

impl Default for QueryCacheConfig {
    fn default() -> Self {
        Self {
            stale_time_secs: default_stale_time_secs(),
            gc_time_secs: default_gc_time_secs(),
            max_entries: default_max_entries(),
            eviction_batch_size: default_eviction_batch_size(),
        }
    }
}

impl QueryCacheConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_secs(self.stale_time_secs)
    }

    pub fn gc_time(&self) -> Duration {
        Duration::from_secs(self.gc_time_secs)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_entries == 0 {
            return Err(ConfigError::Validation(
                "cache.max_entries must be at least 1".into(),
            ));
        }
        if self.gc_time_secs < self.stale_time_secs {
            return Err(ConfigError::Validation(format!(
                "cache.gc_time_secs ({}) must not be shorter than cache.stale_time_secs ({})",
                self.gc_time_secs, self.stale_time_secs
            )));
        }
        Ok(())
    }
}

fn default_stale_time_secs() -> u64 {
    5 * 60
}

fn default_gc_time_secs() -> u64 {
    10 * 60
}

fn default_max_entries() -> usize {
    1_000
}

fn default_eviction_batch_size() -> usize {
    100
}
