//! Bounded retry for remote calls
//!
//! Two policies share one loop:
//! - `run` (writes): exhaustion returns the last error to the caller.
//! - `read_or` (reads): exhaustion logs and returns a fallback value.
//!
//! The delay between attempts is fixed. There is no backoff or jitter.

use crate::config::RetrySettings;
use crate::Result;
use std::future::Future;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Attempt bound and inter-attempt delay for remote operations
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    max_attempts: u32,
    delay: Duration,
    cancel: CancellationToken,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts,
            delay,
            cancel: CancellationToken::new(),
        }
    }

    pub fn from_settings(settings: &RetrySettings) -> Self {
        Self::new(
            settings.max_attempts,
            Duration::from_millis(settings.delay_ms),
        )
    }

    /// Abort pending delays when `cancel` fires
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Invoke `op` until it succeeds or the attempt bound is reached
    pub async fn run<T, F, Fut>(&self, operation: &str, mut op: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let attempts = self.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let err = match op().await {
                Ok(value) => return Ok(value),
                Err(e) => e,
            };

            if attempt >= attempts {
                tracing::warn!(
                    operation,
                    attempts,
                    error = %err,
                    "Giving up after repeated failures"
                );
                return Err(err);
            }

            tracing::warn!(
                operation,
                attempt,
                error = %err,
                "Remote call failed, retrying"
            );

            tokio::select! {
                _ = self.cancel.cancelled() => {
                    tracing::debug!(operation, "Retry cancelled");
                    return Err(err);
                }
                _ = tokio::time::sleep(self.delay) => {}
            }

            attempt += 1;
        }
    }

    /// Like `run`, but degrades to `fallback` once retries are exhausted
    pub async fn read_or<T, F, Fut>(&self, operation: &str, fallback: T, op: F) -> T
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        match self.run(operation, op).await {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!(operation, "Using fallback value");
                fallback
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use std::sync::atomic::{AtomicU32, Ordering};
    use tokio::time::Instant;

    fn flaky(calls: &AtomicU32, failures: u32) -> impl Future<Output = Result<u64>> + '_ {
        let call = calls.fetch_add(1, Ordering::SeqCst);
        async move {
            if call < failures {
                Err(Error::Rpc(format!("timeout #{}", call)))
            } else {
                Ok(99)
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_succeeds_after_transient_failures() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let value = policy.run("nonce", || flaky(&calls, 3)).await.unwrap();

        assert_eq!(value, 99);
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(started.elapsed(), Duration::from_secs(15));
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_attempt_success_does_not_sleep() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        tokio_test::assert_ok!(policy.run("balance", || flaky(&calls, 0)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_write_policy_returns_last_error() {
        let policy = RetryPolicy::new(5, Duration::from_secs(5));
        let calls = AtomicU32::new(0);
        let started = Instant::now();

        let err = policy
            .run("broadcast", || flaky(&calls, u32::MAX))
            .await
            .unwrap_err();

        assert_eq!(calls.load(Ordering::SeqCst), 5);
        assert!(err.to_string().contains("timeout #4"));
        // Delays only between attempts
        assert_eq!(started.elapsed(), Duration::from_secs(20));
    }

    #[tokio::test(start_paused = true)]
    async fn test_read_policy_falls_back() {
        let policy = RetryPolicy::new(3, Duration::from_millis(10));
        let calls = AtomicU32::new(0);

        let value = policy
            .read_or("balance", 0, || flaky(&calls, u32::MAX))
            .await;

        assert_eq!(value, 0);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempts_still_calls_once() {
        let policy = RetryPolicy::new(0, Duration::from_secs(1));
        let calls = AtomicU32::new(0);

        tokio_test::assert_err!(policy.run("nonce", || flaky(&calls, u32::MAX)).await);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancellation_interrupts_delay() {
        let cancel = CancellationToken::new();
        let policy =
            RetryPolicy::new(10, Duration::from_secs(60)).with_cancellation(cancel.clone());
        let calls = AtomicU32::new(0);
        cancel.cancel();

        let started = Instant::now();
        tokio_test::assert_err!(policy.run("broadcast", || flaky(&calls, u32::MAX)).await);

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }
}
