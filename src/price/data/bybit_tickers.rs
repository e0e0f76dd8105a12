use serde::Deserialize;

use crate::error::FetchError;
use crate::exchange::data::bybit::client::BASE_URL;
use crate::exchange::ratelimit::{RateLimiter, EXCHANGE_CALL_SPACING};
use crate::price::domain::source::PriceSource;

/// Public (unsigned) Bybit spot ticker.
pub struct BybitTickers {
    http: reqwest::Client,
    limiter: RateLimiter,
    base: String,
}

#[derive(Debug, Deserialize)]
struct TickersEnvelope {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    #[serde(default)]
    result: TickersResult,
}

#[derive(Debug, Deserialize, Default)]
struct TickersResult {
    #[serde(default)]
    list: Vec<TickerEntry>,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    #[serde(rename = "lastPrice")]
    last_price: String,
}

impl BybitTickers {
    pub fn new(http: reqwest::Client) -> Self {
        Self {
            http,
            limiter: RateLimiter::new(EXCHANGE_CALL_SPACING),
            base: BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base: &str) -> Self {
        self.base = base.to_owned();
        self
    }
}

#[async_trait::async_trait]
impl PriceSource for BybitTickers {
    async fn quote(&self, symbol: &str) -> Result<f64, FetchError> {
        self.limiter.throttle().await;

        let url = format!(
            "{}/v5/market/tickers?category=spot&symbol={}USDT",
            self.base, symbol
        );
        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(FetchError::Api {
                code: i64::from(status.as_u16()),
                message: format!("no ticker for {}USDT", symbol),
            });
        }

        let envelope: TickersEnvelope =
            serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))?;
        if envelope.ret_code != 0 {
            return Err(FetchError::Api {
                code: envelope.ret_code,
                message: envelope.ret_msg,
            });
        }

        let entry = envelope.result.list.first().ok_or_else(|| FetchError::Api {
            code: 0,
            message: format!("no spot ticker for {}USDT", symbol),
        })?;
        entry
            .last_price
            .parse::<f64>()
            .map_err(|err| FetchError::Parse(format!("bad price for {}: {}", symbol, err)))
    }
}
