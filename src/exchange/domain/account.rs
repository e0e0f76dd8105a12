use std::collections::HashMap;

use crate::error::FetchError;

/// Decrypted API credentials for one sheet row. Never persisted; dropped
/// when the row finishes.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub api_key: String,
    pub api_secret: String,
    /// Sub-account/member identifier, signed into Bybit requests when set.
    pub member_id: Option<String>,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, serde::Deserialize, strum::EnumString, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ExchangeKind {
    Binance,
    Bybit,
}

/// What the row pipeline needs from an exchange, regardless of which one.
#[async_trait::async_trait]
pub trait ExchangeAccount: Send + Sync {
    fn exchange_name(&self) -> &'static str;

    /// Free balances per asset symbol.
    async fn fetch_balances(&self) -> Result<HashMap<String, f64>, FetchError>;

    /// Equity of the derivatives / unified side of the account.
    async fn fetch_equity(&self) -> Result<f64, FetchError>;
}

/// Builds one account client per credential row.
pub trait AccountFactory: Send + Sync {
    fn create(&self, credentials: Credentials) -> Box<dyn ExchangeAccount>;
}
