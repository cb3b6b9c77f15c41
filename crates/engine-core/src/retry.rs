use connectors::error::ConnectorError;
use std::future::Future;
use std::time::Duration;
use tokio::time::sleep;
use tracing::warn;

/// Whether a failed attempt is worth repeating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetryDisposition {
    Retry,
    Stop,
}

#[derive(Debug)]
pub enum RetryError<E> {
    /// Classified as non-transient; surfaced after the first attempt.
    Fatal(E),
    /// Transient, but every attempt failed. Carries the last error.
    AttemptsExceeded { attempts: usize, last: E },
}

/// Exponential backoff: `base_delay * 2^attempt`, capped at `max_delay`.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: usize,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(200),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay: max_delay.max(base_delay),
        }
    }

    /// `retries` additional attempts after the first connection attempt.
    pub fn for_connect(retries: u32) -> Self {
        Self::new(
            retries as usize + 1,
            Duration::from_millis(250),
            Duration::from_secs(5),
        )
    }

    /// Connection failures are retried only when the driver reports them as
    /// transient (refused, reset, timed out); auth and URL errors stop.
    pub fn classify_connect(err: &ConnectorError) -> RetryDisposition {
        if err.is_transient() {
            RetryDisposition::Retry
        } else {
            RetryDisposition::Stop
        }
    }

    pub async fn run<F, Fut, T, E, Classifier>(
        &self,
        mut op: F,
        classify: Classifier,
    ) -> Result<T, RetryError<E>>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        Classifier: Fn(&E) -> RetryDisposition,
        E: std::fmt::Display,
    {
        let mut attempt = 0;

        loop {
            let err = match op().await {
                Ok(result) => return Ok(result),
                Err(err) => err,
            };

            if classify(&err) == RetryDisposition::Stop {
                return Err(RetryError::Fatal(err));
            }

            attempt += 1;
            if attempt >= self.max_attempts {
                return Err(RetryError::AttemptsExceeded {
                    attempts: attempt,
                    last: err,
                });
            }

            let delay = self.backoff_delay(attempt - 1);
            warn!(attempt, max_attempts = self.max_attempts, ?delay, error = %err, "Retrying after transient failure");
            sleep(delay).await;
        }
    }

    pub fn backoff_delay(&self, attempt: usize) -> Duration {
        if self.base_delay.is_zero() {
            return Duration::ZERO;
        }

        let factor = 1u32 << attempt.min(10);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |delay| delay.min(self.max_delay))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };

    #[test]
    fn backoff_doubles_until_capped() {
        let policy = RetryPolicy::new(5, Duration::from_millis(100), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(0), Duration::from_millis(100));
        assert_eq!(policy.backoff_delay(1), Duration::from_millis(200));
        assert_eq!(policy.backoff_delay(2), Duration::from_millis(400));
        assert_eq!(policy.backoff_delay(3), Duration::from_millis(500));
        assert_eq!(policy.backoff_delay(40), Duration::from_millis(500));
    }

    #[tokio::test(start_paused = true)]
    async fn retries_transient_errors_until_success() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::for_connect(3);

        let result = policy
            .run(
                || {
                    let calls = calls.clone();
                    async move {
                        if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err("connection refused")
                        } else {
                            Ok(42)
                        }
                    }
                },
                |_| RetryDisposition::Retry,
            )
            .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn gives_up_after_max_attempts() {
        let calls = Arc::new(AtomicUsize::new(0));
        let policy = RetryPolicy::new(2, Duration::from_millis(10), Duration::from_millis(10));

        let result: Result<(), _> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err("timeout") }
                },
                |_| RetryDisposition::Retry,
            )
            .await;

        assert!(matches!(
            result,
            Err(RetryError::AttemptsExceeded { attempts: 2, last: "timeout" })
        ));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn fatal_errors_stop_immediately() {
        let calls = AtomicUsize::new(0);
        let policy = RetryPolicy::for_connect(5);

        let result: Result<(), _> = policy
            .run(
                || {
                    calls.fetch_add(1, Ordering::SeqCst);
                    async { Err(ConnectorError::InvalidUrl("nope".into())) }
                },
                RetryPolicy::classify_connect,
            )
            .await;

        assert!(matches!(result, Err(RetryError::Fatal(ConnectorError::InvalidUrl(_)))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
