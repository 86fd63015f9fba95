//! Global tracing subscriber for the command-line front end.

use tracing_subscriber::{
    EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt,
};

use crate::config::{LogFormat, LoggingConfig, ObservabilityConfig};

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Install the global subscriber: one formatting layer on stderr plus an
/// [`EnvFilter`]. `RUST_LOG` overrides the configured level and filter.
///
/// Stdout is left to command output.
pub fn init_tracing(config: &ObservabilityConfig) -> Result<(), TracingError> {
    let logging = &config.logging;

    tracing_subscriber::registry()
        .with(format_layer(logging))
        .with(build_env_filter(logging))
        .try_init()
        .map_err(|e| TracingError::Init(e.to_string()))
}

fn format_layer(logging: &LoggingConfig) -> BoxedLayer {
    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_file(logging.file_line)
        .with_line_number(logging.file_line);

    match (&logging.format, logging.timestamps) {
        (LogFormat::Pretty, true) => base.pretty().boxed(),
        (LogFormat::Pretty, false) => base.pretty().without_time().boxed(),
        (LogFormat::Compact, true) => base.compact().boxed(),
        (LogFormat::Compact, false) => base.compact().without_time().boxed(),
        (LogFormat::Json, true) => base
            .json()
            .with_current_span(logging.include_spans)
            .boxed(),
        (LogFormat::Json, false) => base
            .json()
            .with_current_span(logging.include_spans)
            .without_time()
            .boxed(),
    }
}

fn build_env_filter(config: &LoggingConfig) -> EnvFilter {
    let base_level = config.level.as_str();

    if let Ok(env_filter) = std::env::var("RUST_LOG") {
        EnvFilter::try_new(env_filter).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else if let Some(filter) = &config.filter {
        let combined = format!("{},{}", base_level, filter);
        EnvFilter::try_new(combined).unwrap_or_else(|_| EnvFilter::new(base_level))
    } else {
        EnvFilter::new(format!(
            "{},hyper=warn,hyper_util=warn,h2=warn,rustls=warn,reqwest=warn",
            base_level
        ))
    }
}

/// Tracing initialization errors.
#[derive(Debug, thiserror::Error)]
pub enum TracingError {
    #[error("Failed to initialize tracing: {0}")]
    Init(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::LogLevel;

    #[test]
    fn test_env_filter_prefers_rust_log() {
        temp_env::with_var("RUST_LOG", Some("trace"), || {
            let filter = build_env_filter(&LoggingConfig::default());
            assert_eq!(filter.to_string(), "trace");
        });
    }

    #[test]
    fn test_env_filter_combines_config_filter() {
        temp_env::with_var_unset("RUST_LOG", || {
            let config = LoggingConfig {
                level: LogLevel::Warn,
                filter: Some("usage_analytics=debug".into()),
                ..Default::default()
            };
            let rendered = build_env_filter(&config).to_string();
            assert!(rendered.contains("warn"));
            assert!(rendered.contains("usage_analytics=debug"));
        });
    }

    #[test]
    fn test_env_filter_default_quiets_http_stack() {
        temp_env::with_var_unset("RUST_LOG", || {
            let rendered = build_env_filter(&LoggingConfig::default()).to_string();
            assert!(rendered.contains("reqwest=warn"));
            assert!(rendered.contains("hyper=warn"));
        });
    }
}
