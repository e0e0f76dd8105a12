use std::collections::HashMap;

use serde::Deserialize;

use crate::error::FetchError;
use crate::exchange::domain::account::{Credentials, ExchangeAccount};
use crate::exchange::ratelimit::{RateLimiter, EXCHANGE_CALL_SPACING};
use crate::exchange::retry::{RetryPolicy, FETCH_RETRY};
use crate::exchange::signer;

pub const SPOT_BASE_URL: &str = "https://api.binance.com";
pub const FUTURES_BASE_URL: &str = "https://fapi.binance.com";

pub struct BinanceClient {
    credentials: Credentials,
    http: reqwest::Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
    spot_base: String,
    futures_base: String,
}

#[derive(Debug, Deserialize)]
struct SpotBalance {
    asset: String,
    free: String,
}

#[derive(Debug, Deserialize)]
struct SpotAccountResponse {
    balances: Vec<SpotBalance>,
}

#[derive(Debug, Deserialize)]
struct FuturesAccountResponse {
    #[serde(rename = "totalWalletBalance")]
    total_wallet_balance: String,
    #[serde(rename = "totalCrossUnPnl")]
    total_cross_un_pnl: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    code: i64,
    msg: String,
}

impl BinanceClient {
    pub fn new(credentials: Credentials, http: reqwest::Client) -> Self {
        Self {
            credentials,
            http,
            limiter: RateLimiter::new(EXCHANGE_CALL_SPACING),
            retry: FETCH_RETRY,
            spot_base: SPOT_BASE_URL.to_owned(),
            futures_base: FUTURES_BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    fn with_base_urls(mut self, spot: &str, futures: &str) -> Self {
        self.spot_base = spot.to_owned();
        self.futures_base = futures.to_owned();
        self
    }

    #[cfg(test)]
    fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Signed read. Binance signs the canonical query string and expects the
    /// signature as a trailing `signature` parameter, with the API key in a
    /// header.
    async fn signed_get(&self, base: &str, path: &str) -> Result<serde_json::Value, FetchError> {
        self.limiter.throttle().await;

        let timestamp = chrono::Utc::now().timestamp_millis().to_string();
        let params = [("timestamp", timestamp)];
        let query = signer::canonical_query(&params);
        let signature = signer::sign(&self.credentials.api_secret, &query);
        let url = format!("{}{}?{}&signature={}", base, path, query, signature);

        let response = self
            .http
            .get(&url)
            .header("X-MBX-APIKEY", &self.credentials.api_key)
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(classify_error(status, &body));
        }
        serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))
    }
}

fn classify_error(status: reqwest::StatusCode, body: &str) -> FetchError {
    let parsed: Option<ApiErrorBody> = serde_json::from_str(body).ok();
    let (code, message) = match parsed {
        Some(err) => (err.code, err.msg),
        None => (i64::from(status.as_u16()), body.trim().to_owned()),
    };

    // -1003 and the 418/429 statuses are rate-limit pushback; -1022, -2014
    // and -2015 are credential/signature rejections.
    if status.as_u16() == 429 || status.as_u16() == 418 || code == -1003 {
        FetchError::RateLimited(message)
    } else if status.as_u16() == 401 || status.as_u16() == 403 || matches!(code, -1022 | -2014 | -2015)
    {
        FetchError::Auth(message)
    } else {
        FetchError::Api { code, message }
    }
}

#[async_trait::async_trait]
impl ExchangeAccount for BinanceClient {
    fn exchange_name(&self) -> &'static str {
        "Binance"
    }

    async fn fetch_balances(&self) -> Result<HashMap<String, f64>, FetchError> {
        let value = self
            .retry
            .execute("binance spot account", || {
                self.signed_get(&self.spot_base, "/api/v3/account")
            })
            .await
            .map_err(FetchError::from_retry)?;

        let account: SpotAccountResponse =
            serde_json::from_value(value).map_err(|err| FetchError::Parse(err.to_string()))?;

        let mut balances = HashMap::new();
        for entry in account.balances {
            let free = entry.free.parse::<f64>().map_err(|err| {
                FetchError::Parse(format!("bad free amount for {}: {}", entry.asset, err))
            })?;
            if free > 0.0 {
                balances.insert(entry.asset, free);
            }
        }
        Ok(balances)
    }

    async fn fetch_equity(&self) -> Result<f64, FetchError> {
        let value = self
            .retry
            .execute("binance futures account", || {
                self.signed_get(&self.futures_base, "/fapi/v2/account")
            })
            .await
            .map_err(FetchError::from_retry)?;

        let account: FuturesAccountResponse =
            serde_json::from_value(value).map_err(|err| FetchError::Parse(err.to_string()))?;
        let wallet = account
            .total_wallet_balance
            .parse::<f64>()
            .map_err(|err| FetchError::Parse(format!("bad wallet balance: {}", err)))?;
        let unrealized = account
            .total_cross_un_pnl
            .parse::<f64>()
            .map_err(|err| FetchError::Parse(format!("bad unrealized PnL: {}", err)))?;

        // Equity includes unrealized PnL: that is the liquidation-relevant
        // account value, not just the wallet balance.
        Ok(wallet + unrealized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server_uri: &str) -> BinanceClient {
        BinanceClient::new(
            Credentials {
                api_key: "key".to_owned(),
                api_secret: "secret".to_owned(),
                member_id: None,
            },
            reqwest::Client::new(),
        )
        .with_base_urls(server_uri, server_uri)
        .with_retry(RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
        })
    }

    #[tokio::test]
    async fn spot_balances_keep_only_positive_free_amounts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/account"))
            .and(header("X-MBX-APIKEY", "key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "balances": [
                    { "asset": "BTC", "free": "0.5", "locked": "0.0" },
                    { "asset": "ETH", "free": "0.00000000", "locked": "0.0" },
                    { "asset": "USDT", "free": "100.0", "locked": "0.0" }
                ]
            })))
            .mount(&server)
            .await;

        let balances = test_client(&server.uri()).fetch_balances().await.unwrap();

        assert_eq!(balances.len(), 2);
        assert_eq!(balances["BTC"], 0.5);
        assert_eq!(balances["USDT"], 100.0);
    }

    #[tokio::test]
    async fn futures_equity_includes_unrealized_pnl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v2/account"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "totalWalletBalance": "100.5",
                "totalCrossUnPnl": "-0.5"
            })))
            .mount(&server)
            .await;

        let equity = test_client(&server.uri()).fetch_equity().await.unwrap();

        assert_eq!(equity, 100.0);
    }

    #[tokio::test]
    async fn auth_rejection_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/v3/account"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "code": -2014,
                "msg": "API-key format invalid."
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).fetch_balances().await;

        assert!(matches!(result, Err(FetchError::Auth(_))));
    }

    #[tokio::test]
    async fn rate_limit_is_retried_until_exhaustion() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/fapi/v2/account"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "code": -1003,
                "msg": "Too many requests."
            })))
            .expect(3)
            .mount(&server)
            .await;

        let result = test_client(&server.uri()).fetch_equity().await;

        assert!(matches!(
            result,
            Err(FetchError::Exhausted { attempts: 3, .. })
        ));
    }
}
