use thiserror::Error;

use crate::exchange::retry::Retryable;

/// One credential row as read from the sheet, still encrypted.
#[derive(Debug, Clone)]
pub struct CredentialRow {
    pub row: u32,
    pub api_key_enc: String,
    pub api_secret_enc: String,
    pub member_id: Option<String>,
}

#[derive(Debug, Error)]
pub enum BalanceStoreError {
    #[error("Failed to read credential rows from the store")]
    FetchRows,
    #[error("Failed to read the tracked coin list from the store")]
    FetchCoins,
    #[error("Failed to write a row result to the store")]
    Write,
}

// Writes hit quota errors under load and are idempotent (same cell, same
// value), so the write policy may retry them. Read failures end the run.
impl Retryable for error_stack::Report<BalanceStoreError> {
    fn is_transient(&self) -> bool {
        matches!(self.current_context(), BalanceStoreError::Write)
    }
}

/// Row-oriented store the pipeline reads credentials from and writes
/// results into. In production this is the spreadsheet; tests use an
/// in-memory implementation.
#[async_trait::async_trait]
pub trait BalanceStore: Send + Sync {
    async fn credential_rows(&self) -> error_stack::Result<Vec<CredentialRow>, BalanceStoreError>;

    /// Coin symbols tracked by the Bybit funding query, from the
    /// configuration cell.
    async fn tracked_coins(&self) -> error_stack::Result<Vec<String>, BalanceStoreError>;

    async fn write_total(
        &self,
        row: u32,
        formatted_total: &str,
    ) -> error_stack::Result<(), BalanceStoreError>;

    async fn write_reference_amount(
        &self,
        row: u32,
        amount: f64,
    ) -> error_stack::Result<(), BalanceStoreError>;
}
