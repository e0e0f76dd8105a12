use config::Config;

use super::exchange_config::ExchangeConfig;
use super::http_config::HttpConfig;
use super::run_config::RunConfig;
use super::sheets_config::SheetsConfig;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct AppConfig {
    pub sheets: SheetsConfig,
    pub exchange: ExchangeConfig,
    #[serde(default)]
    pub http: HttpConfig,
    #[serde(default)]
    pub run: RunConfig,
    /// Fernet key the sheet's credential columns were encrypted with.
    pub encryption_key: Box<str>,
}

impl AppConfig {
    /// Built once at startup and passed by reference from there on. A missing
    /// required value fails here, before any row is touched.
    pub fn load() -> Result<Self, config::ConfigError> {
        Config::builder()
            .add_source(config::File::with_name("Config").required(false))
            .add_source(config::Environment::with_prefix("NAV").separator("__"))
            .build()?
            .try_deserialize()
    }
}
