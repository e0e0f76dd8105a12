use crate::config::http_config::HttpConfig;
use crate::error::FetchError;
use crate::exchange::data::build_http_client;
use crate::exchange::domain::account::{AccountFactory, Credentials, ExchangeAccount};

use super::client::BinanceClient;

pub struct BinanceAccountFactory {
    http: reqwest::Client,
}

impl BinanceAccountFactory {
    pub fn new(config: &HttpConfig) -> Result<Self, FetchError> {
        Ok(Self {
            http: build_http_client(config)?,
        })
    }
}

impl AccountFactory for BinanceAccountFactory {
    fn create(&self, credentials: Credentials) -> Box<dyn ExchangeAccount> {
        Box::new(BinanceClient::new(credentials, self.http.clone()))
    }
}
