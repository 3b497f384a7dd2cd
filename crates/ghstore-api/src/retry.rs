// Retry with exponential backoff for flaky network calls
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, warn};

/// Retry configuration
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_retries: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay_ms: 500,
            max_delay_ms: 15000,
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    /// Delay before retry number `attempt` (1-based), capped at the maximum.
    fn delay_for(&self, attempt: u32) -> Duration {
        let factor = self
            .backoff_multiplier
            .powi(attempt.saturating_sub(1) as i32);
        let ms = (self.initial_delay_ms as f64 * factor) as u64;
        Duration::from_millis(ms.min(self.max_delay_ms))
    }
}

/// Run an operation, waiting progressively longer between failed attempts.
///
/// `should_retry` decides which errors are worth another attempt; anything
/// it rejects (bad credentials, missing resources, parse failures) surfaces
/// immediately instead of burning the whole backoff budget.
pub async fn with_retry<F, Fut, T, E>(
    config: &RetryConfig,
    should_retry: impl Fn(&E) -> bool,
    mut operation: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, E>>,
    E: std::fmt::Display,
{
    let mut attempt = 0;

    loop {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!("request succeeded after {} retries", attempt);
                }
                return Ok(result);
            }
            Err(err) => {
                if !should_retry(&err) {
                    debug!("not retrying: {}", err);
                    return Err(err);
                }

                attempt += 1;
                if attempt > config.max_retries {
                    warn!(
                        "request failed after {} attempts: {}",
                        config.max_retries, err
                    );
                    return Err(err);
                }

                let delay = config.delay_for(attempt);
                warn!(
                    "request failed (attempt {}/{}): {}. retrying in {:?}",
                    attempt, config.max_retries, err, delay
                );
                sleep(delay).await;
            }
        }
    }
}

/// Whether an HTTP status is worth retrying (server errors, rate limiting,
/// request timeouts). Client errors like 404 are not.
pub fn is_retryable_status(status: reqwest::StatusCode) -> bool {
    status.is_server_error()
        || status == reqwest::StatusCode::TOO_MANY_REQUESTS
        || status == reqwest::StatusCode::REQUEST_TIMEOUT
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_config(max_retries: u32) -> RetryConfig {
        RetryConfig {
            max_retries,
            initial_delay_ms: 5,
            max_delay_ms: 20,
            backoff_multiplier: 2.0,
        }
    }

    fn retry_everything(_: &&str) -> bool {
        true
    }

    #[tokio::test]
    async fn first_success_needs_no_retry() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast_config(3), retry_everything, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok::<_, &str>("done")
        })
        .await;

        assert_eq!(result, Ok("done"));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast_config(3), retry_everything, || async {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            if n < 3 {
                Err("connection reset")
            } else {
                Ok(n)
            }
        })
        .await;

        assert_eq!(result, Ok(3));
    }

    #[tokio::test]
    async fn gives_up_after_budget_exhausted() {
        let calls = AtomicU32::new(0);

        let result = with_retry(&fast_config(2), retry_everything, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Err::<u32, _>("still broken")
        })
        .await;

        assert_eq!(result, Err("still broken"));
        // Initial attempt plus two retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn non_retryable_error_fails_fast() {
        let calls = AtomicU32::new(0);

        let result = with_retry(
            &fast_config(3),
            |err: &&str| *err != "unauthorized",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Err::<u32, _>("unauthorized")
            },
        )
        .await;

        assert_eq!(result, Err("unauthorized"));
        assert_eq!(
            calls.load(Ordering::SeqCst),
            1,
            "a rejected error must not consume the backoff budget"
        );
    }

    #[test]
    fn delays_double_up_to_the_cap() {
        let config = RetryConfig {
            max_retries: 5,
            initial_delay_ms: 100,
            max_delay_ms: 350,
            backoff_multiplier: 2.0,
        };

        assert_eq!(config.delay_for(1), Duration::from_millis(100));
        assert_eq!(config.delay_for(2), Duration::from_millis(200));
        assert_eq!(config.delay_for(3), Duration::from_millis(350));
        assert_eq!(config.delay_for(4), Duration::from_millis(350));
    }

    #[test]
    fn retryable_statuses() {
        assert!(is_retryable_status(
            reqwest::StatusCode::INTERNAL_SERVER_ERROR
        ));
        assert!(is_retryable_status(reqwest::StatusCode::BAD_GATEWAY));
        assert!(is_retryable_status(reqwest::StatusCode::TOO_MANY_REQUESTS));
        assert!(is_retryable_status(reqwest::StatusCode::REQUEST_TIMEOUT));

        assert!(!is_retryable_status(reqwest::StatusCode::NOT_FOUND));
        assert!(!is_retryable_status(reqwest::StatusCode::UNAUTHORIZED));
        assert!(!is_retryable_status(reqwest::StatusCode::OK));
    }
}
