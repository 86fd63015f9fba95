//! Configuration for the analytics client.
//!
//! Configuration is read from a TOML file, with support for environment
//! variable interpolation using `${VAR_NAME}` syntax.
//!
//! # Example
//!
//! ```toml
//! [api]
//! base_url = "https://analytics.example.com"
//! timeout_secs = 10
//!
//! [cache]
//! stale_time_secs = 300
//!
//! [defaults]
//! start_date = "2025-06-01"
//! end_date = "2025-07-22"
//! ```

mod api;
mod cache;
mod defaults;
mod observability;

use std::{path::Path, sync::LazyLock};

pub use api::*;
pub use cache::*;
pub use defaults::*;
pub use observability::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Root configuration.
///
/// All sections are optional; an empty file yields a client pointed at a
/// local backend with the stock defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalyticsConfig {
    /// Backend connection and retry policy.
    #[serde(default)]
    pub api: ApiConfig,

    /// Query cache freshness and capacity.
    #[serde(default)]
    pub cache: QueryCacheConfig,

    /// Filter defaults applied when a query leaves a field unset.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Logging configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AnalyticsConfig {
    /// Load configuration from a TOML file.
    ///
    /// Environment variables in the format `${VAR_NAME}` are expanded.
    /// Missing variables cause an error.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref())
            .map_err(|e| ConfigError::Io(e, path.as_ref().to_path_buf()))?;

        Self::from_str(&contents)
    }

    /// Parse configuration from a TOML string.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(contents: &str) -> Result<Self, ConfigError> {
        let expanded = expand_env_vars(contents)?;
        let config: AnalyticsConfig = toml::from_str(&expanded)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.api.validate()?;
        self.cache.validate()?;
        self.defaults.validate()?;
        Ok(())
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {1}: {0}")]
    Io(std::io::Error, std::path::PathBuf),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

static ENV_VAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\$\{([^}]+)\}").expect("env var pattern is valid"));

/// Expand environment variables in the format `${VAR_NAME}`.
/// Variables that appear after a `#` on the same line are left alone.
fn expand_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut result = String::with_capacity(input.len());

    for line in input.lines() {
        let comment_pos = line.find('#');
        let mut last_end = 0;

        for cap in ENV_VAR.captures_iter(line) {
            let Some(whole) = cap.get(0) else { continue };

            if let Some(pos) = comment_pos
                && whole.start() >= pos
            {
                continue;
            }

            result.push_str(&line[last_end..whole.start()]);

            let var_name = &cap[1];
            let value = std::env::var(var_name)
                .map_err(|_| ConfigError::EnvVarNotFound(var_name.to_string()))?;
            result.push_str(&value);

            last_end = whole.end();
        }

        result.push_str(&line[last_end..]);
        result.push('\n');
    }

    if !input.ends_with('\n') && result.ends_with('\n') {
        result.pop();
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = AnalyticsConfig::from_str("").unwrap();
        assert_eq!(config.api.base_url, "http://localhost:8080");
        assert_eq!(config.api.timeout_secs, 10);
        assert_eq!(config.api.retry.max_retries, 2);
        assert_eq!(config.cache.stale_time_secs, 300);
        assert_eq!(config.cache.gc_time_secs, 600);
        assert_eq!(config.defaults.page_size, 10);
        assert_eq!(
            config.defaults.start_date,
            NaiveDate::from_ymd_opt(2025, 6, 1).unwrap()
        );
        assert_eq!(
            config.defaults.end_date,
            NaiveDate::from_ymd_opt(2025, 7, 22).unwrap()
        );
    }

    #[test]
    fn test_full_config() {
        let config = AnalyticsConfig::from_str(
            r#"
            [api]
            base_url = "https://analytics.example.com"
            timeout_secs = 5

            [api.retry]
            max_retries = 4

            [cache]
            stale_time_secs = 60
            gc_time_secs = 120
            max_entries = 50

            [defaults]
            start_date = "2025-01-01"
            end_date = "2025-01-31"
            page_size = 25
            search_debounce_ms = 500

            [observability.logging]
            level = "debug"
            format = "json"
        "#,
        )
        .unwrap();

        assert_eq!(config.api.base_url, "https://analytics.example.com");
        assert_eq!(config.api.timeout_secs, 5);
        assert_eq!(config.api.retry.max_retries, 4);
        assert_eq!(config.cache.max_entries, 50);
        assert_eq!(config.defaults.page_size, 25);
        assert_eq!(config.defaults.search_debounce_ms, 500);
        assert_eq!(config.observability.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_unknown_section_rejected() {
        let result = AnalyticsConfig::from_str("[server]\nport = 1\n");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_invalid_date_range_rejected() {
        let result = AnalyticsConfig::from_str(
            r#"
            [defaults]
            start_date = "2025-08-01"
            end_date = "2025-07-01"
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_gc_shorter_than_stale_rejected() {
        let result = AnalyticsConfig::from_str(
            r#"
            [cache]
            stale_time_secs = 600
            gc_time_secs = 60
        "#,
        );
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_env_var_expansion() {
        temp_env::with_var("TEST_ANALYTICS_URL", Some("https://api.internal"), || {
            let result = expand_env_vars("base_url = \"${TEST_ANALYTICS_URL}\"").unwrap();
            assert_eq!(result, "base_url = \"https://api.internal\"");
        });
    }

    #[test]
    fn test_env_var_in_comment_ignored() {
        let result = expand_env_vars("# base_url = \"${NONEXISTENT_VAR}\"").unwrap();
        assert_eq!(result, "# base_url = \"${NONEXISTENT_VAR}\"");
    }

    #[test]
    fn test_env_var_after_comment_ignored() {
        let result = expand_env_vars("key = \"value\" # ${NONEXISTENT_VAR}").unwrap();
        assert_eq!(result, "key = \"value\" # ${NONEXISTENT_VAR}");
    }

    #[test]
    fn test_missing_env_var_errors() {
        temp_env::with_var_unset("TEST_ANALYTICS_MISSING", || {
            let result = expand_env_vars("key = \"${TEST_ANALYTICS_MISSING}\"");
            assert!(
                matches!(result, Err(ConfigError::EnvVarNotFound(name)) if name == "TEST_ANALYTICS_MISSING")
            );
        });
    }

    #[test]
    fn test_env_var_expansion_preserves_trailing_newline() {
        temp_env::with_var("TEST_MULTI", Some("value1"), || {
            let input = "a = \"${TEST_MULTI}\"\nb = 2\n";
            let result = expand_env_vars(input).unwrap();
            assert_eq!(result, "a = \"value1\"\nb = 2\n");
        });
    }

    #[test]
    fn test_from_file_missing_path() {
        let result = AnalyticsConfig::from_file("/nonexistent/analytics.toml");
        assert!(matches!(result, Err(ConfigError::Io(_, _))));
    }
}
