use serde::Deserialize;

use crate::error::FetchError;
use crate::exchange::data::binance::client::SPOT_BASE_URL;
use crate::exchange::ratelimit::{RateLimiter, EXCHANGE_CALL_SPACING};
use crate::price::domain::source::PriceSource;

/// Public (unsigned) Binance spot ticker.
pub struct BinanceTicker {
    http: reqwest::Client,
    limiter: RateLimiter,
    base: String,
}

#[derive(Debug, Deserialize)]
struct TickerResponse {
    price: String,
}

impl BinanceTicker {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            limiter: RateLimiter::new(EXCHANGE_CALL_SPACING),
            base: SPOT_BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base: &str) -> Self {
        self.base = base.to_owned();
        self
    }
}

#[async_trait::async_trait]
impl PriceSource for BinanceTicker {
    async fn quote(&self, symbol: &str) -> Result<f64, FetchError> {
        self.limiter.throttle().await;

        let url = format!("{}/api/v3/ticker/price?symbol={}USDT", self.base, symbol);
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api {
                code: i64::from(status.as_u16()),
                message: format!("no ticker for {}USDT", symbol),
            });
        }

        let ticker: TickerResponse =
            serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))?;
        ticker
            .price
            .parse::<f64>()
            .map_err(|err| FetchError::Parse(format!("bad price for {}: {}", symbol, err)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn quotes_against_the_usdt_pair() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .and(query_param("symbol", "BTCUSDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "symbol": "BTCUSDT",
                "price": "60000.00000000"
            })))
            .mount(&server)
            .await;

        let source = BinanceTicker::new(reqwest::Client::new()).with_base_url(&server.uri());

        assert_eq!(source.quote("BTC").await.unwrap(), 60000.0);
    }

    #[tokio::test]
    async fn unknown_symbol_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/ticker/price"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "code": -1121,
                "msg": "Invalid symbol."
            })))
            .mount(&server)
            .await;

        let source = BinanceTicker::new(reqwest::Client::new()).with_base_url(&server.uri());

        assert!(source.quote("NOPE").await.is_err());
    }
}
