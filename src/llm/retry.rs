//! Resilient Call Wrapper
//!
//! Bounded retry with exponential backoff for LLM calls.
//!
//! ## Strategy
//!
//! 1. Invoke the operation
//! 2. On failure, ask the retryability predicate whether another attempt
//!    is worthwhile (configuration and extraction errors never are)
//! 3. Sleep `min(initial_delay * 2^attempt, max_delay)` and re-invoke
//! 4. Give up after `max_retries` retries and return the last error
//!    unmodified
//!
//! Backoff is deterministic. Total invocations are bounded by
//! `max_retries + 1`.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;
use tracing::{debug, error, warn};

use crate::constants::retry as retry_constants;
use crate::types::{CoachError, Result};

/// Retry budget and backoff shape for one call site
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Maximum retries after the first attempt
    pub max_retries: u32,
    /// Delay before the first retry
    pub initial_delay: Duration,
    /// Upper bound on any single delay
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: retry_constants::DEFAULT_MAX_RETRIES,
            initial_delay: Duration::from_millis(retry_constants::INITIAL_DELAY_MS),
            max_delay: Duration::from_millis(retry_constants::MAX_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_retries: u32, initial_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_retries,
            initial_delay,
            max_delay,
        }
    }

    /// Policy that never retries
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay before the retry following `attempt` (attempts count from 0)
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let factor = 2u32.saturating_pow(attempt);
        std::cmp::min(self.initial_delay.saturating_mul(factor), self.max_delay)
    }
}

/// Default retryability predicate: transient transport and server errors
pub fn is_transient(err: &CoachError) -> bool {
    err.is_retryable()
}

/// Run `op` under `policy`, retrying failures the predicate accepts.
///
/// The last error is returned as-is once the budget is exhausted or the
/// predicate rejects it. Each retry logs the operation label, attempt
/// index, and computed delay.
pub async fn retry_with_backoff<T, F, Fut, P>(
    policy: &RetryPolicy,
    operation: &str,
    is_retryable: P,
    mut op: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
    P: Fn(&CoachError) -> bool,
{
    let mut attempt: u32 = 0;

    loop {
        match op().await {
            Ok(value) => {
                if attempt > 0 {
                    debug!(operation, attempt, "Succeeded after retry");
                }
                return Ok(value);
            }
            Err(err) => {
                if !is_retryable(&err) {
                    debug!(
                        operation,
                        category = %err.category(),
                        "Error not retryable, failing fast"
                    );
                    return Err(err);
                }

                if attempt >= policy.max_retries {
                    error!(
                        operation,
                        attempts = attempt + 1,
                        error = %err,
                        "Retry budget exhausted"
                    );
                    return Err(err);
                }

                let delay = policy.delay_for(attempt);
                warn!(
                    operation,
                    attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "Transient failure, retrying after backoff"
                );
                sleep(delay).await;
                attempt += 1;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_retries: u32) -> RetryPolicy {
        RetryPolicy::new(
            max_retries,
            Duration::from_millis(1),
            Duration::from_millis(4),
        )
    }

    #[test]
    fn test_delay_doubles_until_cap() {
        let policy = RetryPolicy::new(
            5,
            Duration::from_millis(250),
            Duration::from_millis(4_000),
        );

        assert_eq!(policy.delay_for(0), Duration::from_millis(250));
        assert_eq!(policy.delay_for(1), Duration::from_millis(500));
        assert_eq!(policy.delay_for(2), Duration::from_millis(1_000));
        assert_eq!(policy.delay_for(3), Duration::from_millis(2_000));
        assert_eq!(policy.delay_for(4), Duration::from_millis(4_000));
        // Capped from here on
        assert_eq!(policy.delay_for(5), Duration::from_millis(4_000));
        assert_eq!(policy.delay_for(40), Duration::from_millis(4_000));
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(&fast_policy(2), "test", is_transient, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok::<_, CoachError>(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_exhaustion_invokes_exactly_max_retries_plus_one() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&fast_policy(2), "test", is_transient, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoachError::provider("mock", "connection reset by peer")) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_non_retryable_invokes_exactly_once() {
        let calls = AtomicU32::new(0);

        let result: Result<()> = retry_with_backoff(&fast_policy(2), "test", is_transient, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Err(CoachError::config("missing API key")) }
        })
        .await;

        assert!(matches!(result, Err(CoachError::Config(_))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = AtomicU32::new(0);

        let result = retry_with_backoff(&fast_policy(2), "test", is_transient, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(CoachError::provider_status("mock", 503, "overloaded"))
                } else {
                    Ok("recovered")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "recovered");
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_last_error_returned_unmodified() {
        let result: Result<()> = retry_with_backoff(&fast_policy(1), "test", is_transient, || {
            async { Err(CoachError::provider_status("mock", 503, "still down")) }
        })
        .await;

        match result {
            Err(CoachError::Provider {
                provider,
                status,
                message,
            }) => {
                assert_eq!(provider, "mock");
                assert_eq!(status, Some(503));
                assert_eq!(message, "still down");
            }
            other => panic!("expected provider error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_zero_retries_policy() {
        let calls = AtomicU32::new(0);

        let result: Result<()> =
            retry_with_backoff(&RetryPolicy::none(), "test", is_transient, || {
                calls.fetch_add(1, Ordering::SeqCst);
                async { Err(CoachError::provider("mock", "timeout")) }
            })
            .await;

        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
