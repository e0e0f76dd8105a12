use std::collections::HashMap;

use serde::Deserialize;

use crate::error::FetchError;
use crate::exchange::domain::account::{Credentials, ExchangeAccount};
use crate::exchange::ratelimit::{RateLimiter, EXCHANGE_CALL_SPACING};
use crate::exchange::retry::{RetryPolicy, FETCH_RETRY};
use crate::exchange::signer;

pub const BASE_URL: &str = "https://api.bybit.com";

const RECV_WINDOW: &str = "5000";

pub struct BybitClient {
    credentials: Credentials,
    coins: Vec<String>,
    http: reqwest::Client,
    limiter: RateLimiter,
    retry: RetryPolicy,
    base: String,
}

#[derive(Debug, Deserialize)]
struct BybitResponse {
    #[serde(rename = "retCode")]
    ret_code: i64,
    #[serde(rename = "retMsg")]
    ret_msg: String,
    #[serde(default)]
    result: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct CoinBalance {
    coin: String,
    #[serde(rename = "walletBalance")]
    wallet_balance: String,
}

#[derive(Debug, Deserialize)]
struct CoinsBalanceResult {
    balance: Vec<CoinBalance>,
}

#[derive(Debug, Deserialize)]
struct WalletBalanceAccount {
    #[serde(rename = "totalEquity")]
    total_equity: String,
}

#[derive(Debug, Deserialize)]
struct WalletBalanceResult {
    list: Vec<WalletBalanceAccount>,
}

impl BybitClient {
    pub fn new(credentials: Credentials, coins: Vec<String>, http: reqwest::Client) -> Self {
        Self {
            credentials,
            coins,
            http,
            limiter: RateLimiter::new(EXCHANGE_CALL_SPACING),
            retry: FETCH_RETRY,
            base: BASE_URL.to_owned(),
        }
    }

    #[cfg(test)]
    fn with_base_url(mut self, base: &str) -> Self {
        self.base = base.to_owned();
        self
    }

    #[cfg(test)]
    fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Signed read in Bybit's legacy query-parameter style: `api_key`,
    /// `timestamp`, `recv_window` and the optional `memberId` are part of
    /// the sorted, signed parameter set, and the digest goes out as `sign`.
    async fn signed_get(
        &self,
        path: &str,
        query_params: Vec<(&'static str, String)>,
    ) -> Result<serde_json::Value, FetchError> {
        self.limiter.throttle().await;

        let mut params = query_params;
        params.push(("api_key", self.credentials.api_key.clone()));
        params.push((
            "timestamp",
            chrono::Utc::now().timestamp_millis().to_string(),
        ));
        params.push(("recv_window", RECV_WINDOW.to_owned()));
        if let Some(member_id) = self.credentials.member_id.as_deref() {
            params.push(("memberId", member_id.to_owned()));
        }

        let canonical = signer::canonical_query(&params);
        let sign = signer::sign(&self.credentials.api_secret, &canonical);
        let url = format!("{}{}?{}&sign={}", self.base, path, canonical, sign);

        let response = self.http.get(&url).send().await?;
        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(if status.as_u16() == 429 {
                FetchError::RateLimited(body.trim().to_owned())
            } else {
                FetchError::Api {
                    code: i64::from(status.as_u16()),
                    message: body.trim().to_owned(),
                }
            });
        }

        let envelope: BybitResponse =
            serde_json::from_str(&body).map_err(|err| FetchError::Parse(err.to_string()))?;
        if envelope.ret_code != 0 {
            return Err(classify_ret_code(envelope.ret_code, envelope.ret_msg));
        }
        Ok(envelope.result)
    }
}

fn classify_ret_code(code: i64, message: String) -> FetchError {
    match code {
        // Request-frequency pushback.
        10006 | 10018 => FetchError::RateLimited(message),
        // Invalid key, expired key, bad signature, permission denied.
        10003 | 10004 | 10005 | 33004 => FetchError::Auth(message),
        _ => FetchError::Api { code, message },
    }
}

#[async_trait::async_trait]
impl ExchangeAccount for BybitClient {
    fn exchange_name(&self) -> &'static str {
        "Bybit"
    }

    async fn fetch_balances(&self) -> Result<HashMap<String, f64>, FetchError> {
        let coin_param = self.coins.join(",");
        let result = self
            .retry
            .execute("bybit funding balances", || {
                self.signed_get(
                    "/v5/asset/transfer/query-account-coins-balance",
                    vec![
                        ("accountType", "UNIFIED".to_owned()),
                        ("coin", coin_param.clone()),
                    ],
                )
            })
            .await
            .map_err(FetchError::from_retry)?;

        let result: CoinsBalanceResult =
            serde_json::from_value(result).map_err(|err| FetchError::Parse(err.to_string()))?;

        let mut balances = HashMap::new();
        for entry in result.balance {
            let amount = entry.wallet_balance.parse::<f64>().map_err(|err| {
                FetchError::Parse(format!("bad wallet balance for {}: {}", entry.coin, err))
            })?;
            balances.insert(entry.coin, amount);
        }
        Ok(balances)
    }

    async fn fetch_equity(&self) -> Result<f64, FetchError> {
        let result = self
            .retry
            .execute("bybit wallet balance", || {
                self.signed_get(
                    "/v5/account/wallet-balance",
                    vec![("accountType", "UNIFIED".to_owned())],
                )
            })
            .await
            .map_err(FetchError::from_retry)?;

        let result: WalletBalanceResult =
            serde_json::from_value(result).map_err(|err| FetchError::Parse(err.to_string()))?;

        // The unified endpoint reports equity with PnL already netted; no
        // separate addition here.
        match result.list.first() {
            Some(account) if !account.total_equity.is_empty() => account
                .total_equity
                .parse::<f64>()
                .map_err(|err| FetchError::Parse(format!("bad total equity: {}", err))),
            _ => Ok(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(server_uri: &str, member_id: Option<&str>) -> BybitClient {
        BybitClient::new(
            Credentials {
                api_key: "key".to_owned(),
                api_secret: "secret".to_owned(),
                member_id: member_id.map(str::to_owned),
            },
            vec!["BTC".to_owned(), "USDT".to_owned()],
            reqwest::Client::new(),
        )
        .with_base_url(server_uri)
        .with_retry(RetryPolicy {
            max_retries: 2,
            initial_delay: Duration::from_millis(1),
            backoff_factor: 2.0,
        })
    }

    #[tokio::test]
    async fn funding_balances_map_per_coin() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/asset/transfer/query-account-coins-balance"))
            .and(query_param("accountType", "UNIFIED"))
            .and(query_param("coin", "BTC,USDT"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retCode": 0,
                "retMsg": "OK",
                "result": {
                    "balance": [
                        { "coin": "BTC", "walletBalance": "0.5", "transferBalance": "0.5" },
                        { "coin": "USDT", "walletBalance": "100.0", "transferBalance": "100.0" }
                    ]
                }
            })))
            .mount(&server)
            .await;

        let balances = test_client(&server.uri(), None)
            .fetch_balances()
            .await
            .unwrap();

        assert_eq!(balances["BTC"], 0.5);
        assert_eq!(balances["USDT"], 100.0);
    }

    #[tokio::test]
    async fn member_id_is_sent_for_subaccounts() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/asset/transfer/query-account-coins-balance"))
            .and(query_param("memberId", "42"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retCode": 0,
                "retMsg": "OK",
                "result": { "balance": [] }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let balances = test_client(&server.uri(), Some("42"))
            .fetch_balances()
            .await
            .unwrap();

        assert!(balances.is_empty());
    }

    #[tokio::test]
    async fn unified_equity_is_read_directly() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/account/wallet-balance"))
            .and(query_param("accountType", "UNIFIED"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retCode": 0,
                "retMsg": "OK",
                "result": {
                    "list": [ { "totalEquity": "250.0" } ]
                }
            })))
            .mount(&server)
            .await;

        let equity = test_client(&server.uri(), None).fetch_equity().await.unwrap();

        assert_eq!(equity, 250.0);
    }

    #[tokio::test]
    async fn auth_ret_code_is_terminal() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/account/wallet-balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retCode": 10003,
                "retMsg": "API key is invalid.",
                "result": {}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let result = test_client(&server.uri(), None).fetch_equity().await;

        assert!(matches!(result, Err(FetchError::Auth(_))));
    }

    #[tokio::test]
    async fn rate_limit_ret_code_is_retried() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/v5/account/wallet-balance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "retCode": 10006,
                "retMsg": "Too many visits.",
                "result": {}
            })))
            .expect(3)
            .mount(&server)
            .await;

        let result = test_client(&server.uri(), None).fetch_equity().await;

        assert!(matches!(
            result,
            Err(FetchError::Exhausted { attempts: 3, .. })
        ));
    }
}
