use thiserror::Error;

use crate::exchange::retry::{Retryable, RetryError};

/// Errors from exchange-facing calls (signed account endpoints and public
/// tickers).
#[derive(Debug, Error)]
pub enum FetchError {
    /// The exchange rejected the credentials or the signature. Retrying
    /// cannot help, so this is terminal for the row.
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Rate-limit pushback from the exchange. The only API-level error class
    /// that is safe to retry.
    #[error("rate limited: {0}")]
    RateLimited(String),

    /// Non-rate-limit application error reported by the exchange.
    #[error("exchange API error (code {code}): {message}")]
    Api { code: i64, message: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("malformed response: {0}")]
    Parse(String),

    /// A transient error survived the whole backoff schedule.
    #[error("gave up after {attempts} attempts: {source}")]
    Exhausted {
        attempts: u32,
        source: Box<FetchError>,
    },
}

impl FetchError {
    /// Flattens a retry wrapper back into the fetch taxonomy.
    pub fn from_retry(err: RetryError<FetchError>) -> Self {
        match err {
            RetryError::Fatal(err) => err,
            RetryError::Exhausted { attempts, last } => FetchError::Exhausted {
                attempts,
                source: Box::new(last),
            },
        }
    }
}

impl Retryable for FetchError {
    fn is_transient(&self) -> bool {
        matches!(self, FetchError::Network(_) | FetchError::RateLimited(_))
    }
}
