use crate::config::http_config::HttpConfig;
use crate::error::FetchError;
use crate::exchange::data::build_http_client;
use crate::exchange::domain::account::{AccountFactory, Credentials, ExchangeAccount};

use super::client::BybitClient;

pub struct BybitFactory {
    http: reqwest::Client,
    coins: Vec<String>,
}

impl BybitFactory {
    pub fn new(config: &HttpConfig, coins: Vec<String>) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_http_client(config)?,
            coins,
        })
    }
}

impl AccountFactory for BybitFactory {
    fn create(&self, credentials: Credentials) -> Box<dyn ExchangeAccount> {
        Box::new(BybitClient::new(
            credentials,
            self.coins.clone(),
            self.http.clone(),
        ))
    }
}
