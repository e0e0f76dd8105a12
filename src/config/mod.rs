pub mod app_config;
pub mod exchange_config;
pub mod http_config;
pub mod run_config;
pub mod sheets_config;
