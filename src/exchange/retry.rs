use std::future::Future;
use std::time::Duration;

use rand::Rng;

/// Classifies an error as worth another attempt or terminal.
pub trait Retryable {
    fn is_transient(&self) -> bool;
}

/// Bounded exponential backoff with jitter. Passed explicitly to call sites
/// so the schedule is visible and testable instead of hidden in a wrapper.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub initial_delay: Duration,
    pub backoff_factor: f64,
}

/// Permissive schedule for balance and equity fetches.
pub const FETCH_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 3,
    initial_delay: Duration::from_secs(5),
    backoff_factor: 2.0,
};

/// Tight schedule for sheet writes. Writes target the same cell with the
/// same value, so retrying them is always safe.
pub const WRITE_RETRY: RetryPolicy = RetryPolicy {
    max_retries: 2,
    initial_delay: Duration::from_secs(3),
    backoff_factor: 2.0,
};

#[derive(Debug, thiserror::Error)]
pub enum RetryError<E>
where
    E: std::fmt::Display + std::fmt::Debug,
{
    /// A transient error survived every attempt; `last` is the final one.
    #[error("gave up after {attempts} attempts: {last}")]
    Exhausted { attempts: u32, last: E },

    /// A terminal error, returned on first occurrence without retrying.
    #[error("{0}")]
    Fatal(E),
}

impl RetryPolicy {
    /// Runs `op` until it succeeds, fails terminally, or the schedule is
    /// spent. Delay grows as `initial * factor^(attempt-1)`, scaled by a
    /// uniform 0.8..1.2 jitter.
    pub async fn execute<T, E, F, Fut>(&self, op_name: &str, mut op: F) -> Result<T, RetryError<E>>
    where
        E: Retryable + std::fmt::Display + std::fmt::Debug,
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
    {
        let mut delay = self.initial_delay;
        let mut attempt = 1u32;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_transient() => return Err(RetryError::Fatal(err)),
                Err(err) => {
                    if attempt > self.max_retries {
                        log::error!("{}: giving up after {} attempts: {}", op_name, attempt, err);
                        return Err(RetryError::Exhausted {
                            attempts: attempt,
                            last: err,
                        });
                    }
                    let jitter = rand::thread_rng().gen_range(0.8..1.2);
                    let sleep_for = delay.mul_f64(jitter);
                    log::warn!(
                        "{}: retrying in {:.1}s after error: {}",
                        op_name,
                        sleep_for.as_secs_f64(),
                        err
                    );
                    tokio::time::sleep(sleep_for).await;
                    delay = delay.mul_f64(self.backoff_factor);
                    attempt += 1;
                }
            }
        }
    }
}
