//! Fixed-delay retry for completion calls.
//!
//! Every attempt is optionally bounded by a timeout. Failed attempts are
//! retried after a constant delay, with no delay after the last one. The
//! delay is a `tokio` sleep, so only the task running the retry loop is
//! suspended.

use std::future::Future;
use std::time::Duration;
use tokio::time::{sleep, timeout};

use crate::completion::CompletionError;

/// Configuration for retry behavior
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum number of attempts, including the first one
    pub max_attempts: u32,
    /// Delay between attempts
    pub delay: Duration,
    /// Upper bound on a single attempt; `None` lets an attempt run forever
    pub attempt_timeout: Option<Duration>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            delay: Duration::from_millis(2000),
            attempt_timeout: Some(Duration::from_secs(60)),
        }
    }
}

impl RetryConfig {
    /// Set the number of attempts (at least one is always made)
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts.max(1);
        self
    }

    /// Set the delay between attempts
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Set or clear the per-attempt timeout
    pub fn attempt_timeout(mut self, limit: Option<Duration>) -> Self {
        self.attempt_timeout = limit;
        self
    }
}

/// Result of a retry operation
#[derive(Debug)]
pub enum RetryResult<T> {
    /// Operation succeeded
    Success(T),
    /// Every attempt failed
    Exhausted {
        last: CompletionError,
        attempts: u32,
    },
}

impl<T> RetryResult<T> {
    pub fn is_success(&self) -> bool {
        matches!(self, RetryResult::Success(_))
    }
}

/// Execute an async operation with retry logic
///
/// `operation` receives the 1-based attempt number. Any error, including an
/// attempt timeout, triggers another attempt after `config.delay` until
/// `config.max_attempts` is reached; the last error is returned in
/// [`RetryResult::Exhausted`].
pub async fn with_retry<T, F, Fut>(config: RetryConfig, mut operation: F) -> RetryResult<T>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, CompletionError>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;

        let outcome = match config.attempt_timeout {
            Some(limit) => match timeout(limit, operation(attempt)).await {
                Ok(outcome) => outcome,
                Err(_) => Err(CompletionError::Timeout(limit)),
            },
            None => operation(attempt).await,
        };

        match outcome {
            Ok(value) => {
                if attempt > 1 {
                    tracing::info!(
                        attempt,
                        "Completion succeeded after {} failed attempts",
                        attempt - 1
                    );
                }
                return RetryResult::Success(value);
            }
            Err(error) => {
                tracing::warn!(
                    attempt,
                    max_attempts,
                    error = %error,
                    "Completion attempt failed"
                );

                if attempt >= max_attempts {
                    return RetryResult::Exhausted {
                        last: error,
                        attempts: attempt,
                    };
                }

                sleep(config.delay).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;
    use tokio::time::Instant;

    // Two fixed delays between three attempts, none after the last
    fn assert_fixed_delays(elapsed: Duration, delays: u32) {
        let expected = RetryConfig::default().delay * delays;
        assert!(elapsed >= expected, "elapsed {elapsed:?} < {expected:?}");
        assert!(elapsed < expected + Duration::from_millis(100));
    }

    fn fast_config() -> RetryConfig {
        RetryConfig::default()
            .delay(Duration::from_millis(10))
            .attempt_timeout(None)
    }

    #[tokio::test]
    async fn test_retry_success_first_try() {
        let calls = Arc::new(AtomicU32::new(0));

        let result = with_retry(fast_config(), |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok("success")
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Success("success")));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_success_on_last_attempt() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result = with_retry(RetryConfig::default(), |attempt| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                if attempt < 3 {
                    Err(CompletionError::Network("connection reset".to_string()))
                } else {
                    Ok(attempt)
                }
            }
        })
        .await;

        assert!(matches!(result, RetryResult::Success(3)));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_fixed_delays(started.elapsed(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_retry_exhausts_without_trailing_delay() {
        let calls = Arc::new(AtomicU32::new(0));
        let started = Instant::now();

        let result: RetryResult<()> = with_retry(RetryConfig::default(), |_| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(CompletionError::EmptyCompletion)
            }
        })
        .await;

        match result {
            RetryResult::Exhausted { last, attempts } => {
                assert_eq!(attempts, 3);
                assert!(matches!(last, CompletionError::EmptyCompletion));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_fixed_delays(started.elapsed(), 2);
    }

    #[tokio::test]
    async fn test_every_error_kind_is_retried() {
        let calls = Arc::new(AtomicU32::new(0));

        let result: RetryResult<()> = with_retry(fast_config(), |attempt| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(match attempt {
                    1 => CompletionError::Api {
                        status: 403,
                        message: "API key not valid".to_string(),
                    },
                    2 => CompletionError::RateLimit,
                    _ => CompletionError::Parse("truncated envelope".to_string()),
                })
            }
        })
        .await;

        assert!(matches!(
            result,
            RetryResult::Exhausted {
                last: CompletionError::Parse(_),
                attempts: 3
            }
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_attempt_times_out() {
        let config = RetryConfig::default()
            .max_attempts(2)
            .attempt_timeout(Some(Duration::from_secs(5)));

        let result: RetryResult<()> = with_retry(config, |_| async {
            std::future::pending::<Result<(), CompletionError>>().await
        })
        .await;

        match result {
            RetryResult::Exhausted { last, attempts } => {
                assert_eq!(attempts, 2);
                assert!(matches!(last, CompletionError::Timeout(_)));
            }
            other => panic!("expected exhaustion, got {other:?}"),
        }
    }

    #[test]
    fn test_builder_keeps_at_least_one_attempt() {
        assert_eq!(RetryConfig::default().max_attempts(0).max_attempts, 1);
    }
}
