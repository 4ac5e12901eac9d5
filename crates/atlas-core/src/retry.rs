//! Bounded retry with exponential backoff.
//!
//! Only errors flagged retryable are retried; a non-retryable error
//! returns immediately regardless of remaining attempts.

use std::future::Future;
use std::time::Duration;

use metrics::counter;
use tracing::warn;

use crate::errors::EngineError;

/// Retry policy for transient backend failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryConfig {
    /// Maximum retry attempts after the initial call.
    pub max_retries: u32,
    /// Delay before the first retry, in milliseconds.
    pub backoff_base_ms: u64,
    /// Cap applied to the computed delay, in milliseconds.
    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryConfig {
    /// A config that never retries.
    #[must_use]
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay before retry number `attempt` (0-based): `base * 2^attempt`,
    /// capped at `max_backoff_ms`.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = self
            .backoff_base_ms
            .saturating_mul(1u64 << attempt.min(32));
        Duration::from_millis(exp.min(self.max_backoff_ms))
    }
}

/// Errors that carry a retryability flag.
pub trait Retryable {
    /// Whether a bounded retry may succeed.
    fn is_retryable(&self) -> bool;
}

impl Retryable for EngineError {
    fn is_retryable(&self) -> bool {
        EngineError::is_retryable(self)
    }
}

/// Run `op`, retrying retryable failures up to `config.max_retries` times
/// with exponential backoff.
///
/// `operation` names the call site in logs and metrics.
pub async fn retry_with_backoff<T, E, F, Fut>(
    config: &RetryConfig,
    operation: &str,
    mut op: F,
) -> Result<T, E>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, E>>,
    E: Retryable + std::fmt::Display,
{
    let mut attempt = 0u32;
    loop {
        match op().await {
            Ok(value) => return Ok(value),
            Err(err) if err.is_retryable() && attempt < config.max_retries => {
                let delay = config.delay_for(attempt);
                attempt += 1;
                warn!(
                    operation,
                    attempt,
                    max_retries = config.max_retries,
                    delay_ms = delay.as_millis() as u64,
                    error = %err,
                    "retrying after transient failure"
                );
                counter!("backend_retries_total", "operation" => operation.to_owned())
                    .increment(1);
                tokio::time::sleep(delay).await;
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn transient() -> EngineError {
        EngineError::transient("connection reset")
    }

    #[test]
    fn delay_doubles_per_attempt() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(0), Duration::from_millis(500));
        assert_eq!(config.delay_for(1), Duration::from_millis(1_000));
        assert_eq!(config.delay_for(2), Duration::from_millis(2_000));
    }

    #[test]
    fn delay_is_capped() {
        let config = RetryConfig::default();
        assert_eq!(config.delay_for(10), Duration::from_millis(8_000));
        // Large attempt values must not overflow the shift.
        assert_eq!(config.delay_for(u32::MAX), Duration::from_millis(8_000));
    }

    #[tokio::test(start_paused = true)]
    async fn succeeds_first_try() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, EngineError> =
            retry_with_backoff(&RetryConfig::default(), "test", || {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Ok(7) }
            })
            .await;
        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_then_succeeds() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, EngineError> =
            retry_with_backoff(&RetryConfig::default(), "test", || {
                let n = calls.fetch_add(1, Ordering::SeqCst);
                async move {
                    if n < 2 { Err(transient()) } else { Ok(n) }
                }
            })
            .await;
        assert_eq!(result.unwrap(), 2);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn non_retryable_fails_immediately() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, EngineError> =
            retry_with_backoff(&RetryConfig::default(), "test", || {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Err(EngineError::fatal("bad request")) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausts_retries_and_returns_last_error() {
        let calls = AtomicU32::new(0);
        let config = RetryConfig {
            max_retries: 2,
            ..RetryConfig::default()
        };
        let result: Result<u32, EngineError> = retry_with_backoff(&config, "test", || {
            let _ = calls.fetch_add(1, Ordering::SeqCst);
            async { Err(transient()) }
        })
        .await;
        assert!(result.unwrap_err().is_retryable());
        // Initial call + 2 retries.
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn zero_retries_config() {
        let calls = AtomicU32::new(0);
        let result: Result<u32, EngineError> =
            retry_with_backoff(&RetryConfig::none(), "test", || {
                let _ = calls.fetch_add(1, Ordering::SeqCst);
                async { Err(transient()) }
            })
            .await;
        assert!(result.is_err());
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
