pub mod binance;
pub mod bybit;

use std::time::Duration;

use crate::config::http_config::HttpConfig;
use crate::error::FetchError;
use crate::exchange::domain::account::{AccountFactory, ExchangeKind};

use self::binance::factory::BinanceAccountFactory;
use self::bybit::factory::BybitFactory;

pub(crate) fn build_http_client(config: &HttpConfig) -> Result<reqwest::Client, FetchError> {
    let mut builder = reqwest::Client::builder().timeout(Duration::from_secs(config.timeout_secs));
    if let Some(proxy) = config.proxy_http.as_deref() {
        builder = builder.proxy(reqwest::Proxy::http(proxy)?);
    }
    if let Some(proxy) = config.proxy_https.as_deref() {
        builder = builder.proxy(reqwest::Proxy::https(proxy)?);
    }
    Ok(builder.build()?)
}

pub fn account_factory(
    kind: ExchangeKind,
    http: &HttpConfig,
    coins: Vec<String>,
) -> Result<Box<dyn AccountFactory>, FetchError> {
    Ok(match kind {
        ExchangeKind::Binance => Box::new(BinanceAccountFactory::new(http)?),
        ExchangeKind::Bybit => Box::new(BybitFactory::new(http, coins)?),
    })
}
