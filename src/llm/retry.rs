//! Linear backoff retry logic for completion requests.

use std::future::Future;
use std::time::Duration;

use backoff::backoff::Backoff;
use tracing::warn;

/// Base delay between attempts; the wait after attempt `k` is `(k + 1) * base`.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

/// Backoff that grows by a fixed step after every failure, without jitter.
#[derive(Debug, Clone)]
pub struct LinearBackoff {
    base: Duration,
    failures: u32,
}

impl LinearBackoff {
    pub fn new(base: Duration) -> Self {
        Self { base, failures: 0 }
    }
}

impl Default for LinearBackoff {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_DELAY)
    }
}

impl Backoff for LinearBackoff {
    fn next_backoff(&mut self) -> Option<Duration> {
        self.failures = self.failures.saturating_add(1);
        self.base.checked_mul(self.failures)
    }

    fn reset(&mut self) {
        self.failures = 0;
    }
}

/// Retry an async operation up to `max_attempts` times.
///
/// Errors for which `is_retryable` returns false are returned immediately.
/// Retryable errors sleep for the next backoff interval before another
/// attempt; there is no sleep after the final attempt.
///
/// `wrap_exhausted` receives the number of attempts made and the last error
/// once every attempt has failed.
pub async fn retry_with_backoff<T, E, Fut, F, R, W>(
    max_attempts: u32,
    mut backoff: impl Backoff,
    mut attempt: F,
    is_retryable: R,
    wrap_exhausted: W,
) -> Result<T, E>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    R: Fn(&E) -> bool,
    W: FnOnce(u32, E) -> E,
    E: std::fmt::Display,
{
    let max_attempts = max_attempts.max(1);
    let mut attempts = 0;

    loop {
        let current = attempts;
        attempts += 1;

        match attempt(current).await {
            Ok(value) => return Ok(value),
            Err(e) if !is_retryable(&e) => return Err(e),
            Err(e) => {
                if attempts >= max_attempts {
                    return Err(wrap_exhausted(attempts, e));
                }

                warn!("Attempt {}/{} failed: {}", attempts, max_attempts, e);
                if let Some(wait_duration) = backoff.next_backoff() {
                    tokio::time::sleep(wait_duration).await;
                }
            }
        }
    }
}
