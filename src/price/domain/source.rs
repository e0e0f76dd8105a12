use crate::error::FetchError;

/// Resolves one asset symbol to its price in the quote currency.
#[async_trait::async_trait]
pub trait PriceSource: Send + Sync {
    async fn quote(&self, symbol: &str) -> Result<f64, FetchError>;
}
