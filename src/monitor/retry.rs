//! Bounded exponential backoff for orchestration API calls

use std::time::{Duration, Instant};

use crate::api::ApiError;
use crate::cancel::CancelToken;
use crate::logging::{Level, LogRecord, LogSink};

/// How hard to retry a single API call before giving up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts per call, including the first one
    pub max_attempts: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(20),
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Delay to wait after the `attempt`-th failure
    pub fn delay_after(&self, attempt: u32) -> Duration {
        calculate_backoff(attempt, self.base_delay, self.max_delay)
    }
}

/// Exponential backoff: `base * 2^(attempt-1)`, capped at `max`.
///
/// With base=500ms, max=20s:
/// - Attempt 1: 500ms
/// - Attempt 2: 1s
/// - Attempt 3: 2s
/// - Attempt 7+: 20s (capped)
pub fn calculate_backoff(attempt: u32, base: Duration, max: Duration) -> Duration {
    if attempt == 0 {
        return Duration::ZERO;
    }

    let multiplier = 2u32.saturating_pow(attempt - 1);
    base.saturating_mul(multiplier).min(max)
}

/// Why a retried call did not produce a value.
#[derive(Debug)]
pub(crate) enum RetryError {
    Failed { attempts: u32, source: ApiError },
    Cancelled,
    /// The deadline passed while waiting to retry
    TimedOut,
}

/// Run `op` until it succeeds, fails permanently, or the policy is exhausted.
///
/// Returns the value together with the number of attempts it took. Backoff
/// waits go through `cancel`, so a shutdown request interrupts them, and never
/// extend past `deadline`.
pub(crate) fn with_retry<T>(
    policy: &RetryPolicy,
    cancel: &CancelToken,
    deadline: Option<Instant>,
    sink: &dyn LogSink,
    operation: &str,
    stack_name: &str,
    mut op: impl FnMut() -> Result<T, ApiError>,
) -> Result<(T, u32), RetryError> {
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        if cancel.is_cancelled() {
            return Err(RetryError::Cancelled);
        }
        attempt += 1;

        match op() {
            Ok(value) => return Ok((value, attempt)),
            Err(e) if e.is_retryable() && attempt < max_attempts => {
                let mut delay = policy.delay_after(attempt);
                if let Some(deadline) = deadline {
                    delay = delay.min(deadline.saturating_duration_since(Instant::now()));
                }
                sink.record(
                    LogRecord::new(Level::Warn, format!("{operation} failed, retrying: {e}"))
                        .field("stack", stack_name)
                        .field("attempt", attempt)
                        .field("max_attempts", max_attempts)
                        .field("delay_ms", delay.as_millis()),
                );
                if cancel.wait(delay) {
                    return Err(RetryError::Cancelled);
                }
                if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                    return Err(RetryError::TimedOut);
                }
            }
            Err(source) => {
                return Err(RetryError::Failed {
                    attempts: attempt,
                    source,
                })
            }
        }
    }
}
