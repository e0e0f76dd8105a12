mod aggregate;
mod cli;
mod config;
mod crypto;
mod error;
mod exchange;
mod format;
mod price;
mod routines;
mod sheets;

use std::sync::Arc;

use anyhow::Context;

use crate::config::app_config::AppConfig;
use crate::routines::routine::Routine;
use crate::routines::sync_balances_routine::SyncBalancesRoutine;
use crate::sheets::data::spreadsheet_store::SpreadsheetBalanceStore;
use crate::sheets::spreadsheet_manager::SpreadsheetManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Configuration problems must surface before any row is touched.
    let config = AppConfig::load().context("loading configuration")?;

    let manager = SpreadsheetManager::new(config.sheets.clone())
        .await
        .map_err(|report| anyhow::anyhow!("connecting to the spreadsheet: {report:?}"))?;
    let store = SpreadsheetBalanceStore::new(
        Arc::new(manager),
        config.sheets.sheet_name.as_ref(),
        config.exchange.coin_list_cell.as_ref(),
    );

    let routine = SyncBalancesRoutine::new(&config, &store);
    if let Err(failure) = routine.run().await {
        log::error!("❌ {}: {}", routine.name(), failure);
        std::process::exit(1);
    }

    log::info!("✅ {}: done", routine.name());
    Ok(())
}
