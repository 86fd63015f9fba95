//! Retry with exponential backoff for transient fetch failures.

use std::future::Future;

use tracing::{debug, warn};

use super::FetchError;
use crate::config::RetryConfig;

/// Run `make_request` until it succeeds, fails terminally, or the retry
/// budget is spent.
///
/// Only [`FetchError::is_transient`] errors are retried. Returns the last
/// error when all attempts fail.
pub async fn with_retry<F, Fut, T>(
    config: &RetryConfig,
    operation: &str,
    make_request: F,
) -> Result<T, FetchError>
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<T, FetchError>>,
{
    if !config.enabled {
        return make_request().await;
    }

    let max_attempts = config.max_retries + 1; // +1 for initial attempt
    let mut attempt = 0;

    loop {
        match make_request().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(
                        operation = operation,
                        attempt = attempt + 1,
                        "Request succeeded after retry"
                    );
                }
                return Ok(value);
            }
            Err(error) if error.is_transient() && attempt + 1 < max_attempts => {
                let delay = config.delay_for_attempt(attempt);
                warn!(
                    operation = operation,
                    error = %error,
                    attempt = attempt + 1,
                    max_attempts = max_attempts,
                    delay_ms = delay.as_millis(),
                    "Retryable error, will retry after delay"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(error) => {
                if attempt > 0 {
                    warn!(
                        operation = operation,
                        error = %error,
                        attempts = attempt + 1,
                        "Request failed after all retry attempts"
                    );
                }
                return Err(error);
            }
        }
    }
}
