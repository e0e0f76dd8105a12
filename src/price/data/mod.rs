pub mod binance_ticker;
pub mod bybit_tickers;

use crate::config::http_config::HttpConfig;
use crate::error::FetchError;
use crate::exchange::data::build_http_client;
use crate::exchange::domain::account::ExchangeKind;
use crate::price::domain::source::PriceSource;

use self::binance_ticker::BinanceTicker;
use self::bybit_tickers::BybitTickers;

/// Ticker source matching the exchange the balances come from.
pub fn price_source(
    kind: ExchangeKind,
    http: &HttpConfig,
) -> Result<Box<dyn PriceSource>, FetchError> {
    Ok(match kind {
        ExchangeKind::Binance => Box::new(BinanceTicker::new(build_http_client(http)?)),
        ExchangeKind::Bybit => Box::new(BybitTickers::new(build_http_client(http)?)),
    })
}
