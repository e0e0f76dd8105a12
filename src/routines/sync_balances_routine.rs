use std::time::Duration;

use indicatif::ProgressBar;

use crate::cli::progress::{finish_progress, new_progress, ProgressBarExt};
use crate::config::app_config::AppConfig;
use crate::exchange::data;
use crate::price::cache::PriceCache;
use crate::routines::routine::{Routine, RoutineFailureInfo, RoutineResult};
use crate::routines::row_processor::{RowProcessor, RowStatus};
use crate::sheets::data::store::BalanceStore;

/// Walks every credential row of the sheet and refreshes its account value.
pub struct SyncBalancesRoutine<'a> {
    config: &'a AppConfig,
    store: &'a dyn BalanceStore,
}

impl<'a> SyncBalancesRoutine<'a> {
    pub fn new(config: &'a AppConfig, store: &'a dyn BalanceStore) -> Self {
        Self { config, store }
    }
}

#[async_trait::async_trait]
impl Routine for SyncBalancesRoutine<'_> {
    fn name(&self) -> &str {
        "Exchange NAV"
    }

    async fn run(&self) -> RoutineResult {
        let kind = self.config.exchange.kind;
        log::info!("{}: syncing {} account values", self.name(), kind);

        let progress = new_progress(ProgressBar::new_spinner());

        progress.trace(format!("{}: 📋 Reading tracked coins", self.name()));
        let coins = self.store.tracked_coins().await.map_err(|report| {
            RoutineFailureInfo::new(format!("reading tracked coins: {:?}", report))
        })?;

        let factory = data::account_factory(kind, &self.config.http, coins)
            .map_err(|err| RoutineFailureInfo::new(format!("building {} client: {}", kind, err)))?;
        let source = crate::price::data::price_source(kind, &self.config.http).map_err(|err| {
            RoutineFailureInfo::new(format!("building {} price source: {}", kind, err))
        })?;
        let prices = PriceCache::new(source);

        progress.trace(format!("{}: 📋 Reading credential rows", self.name()));
        let rows = self.store.credential_rows().await.map_err(|report| {
            RoutineFailureInfo::new(format!("reading credential rows: {:?}", report))
        })?;

        let processor = RowProcessor::new(
            self.config.encryption_key.as_ref(),
            factory.as_ref(),
            &prices,
            self.store,
            self.config.exchange.reference_asset.as_deref(),
        );

        let row_delay = Duration::from_millis(self.config.run.row_delay_ms);
        let (mut ok, mut partial, mut skipped, mut failed) = (0usize, 0usize, 0usize, 0usize);

        for record in &rows {
            progress.trace(format!("{}: ☁️  Row {}", self.name(), record.row));
            let outcome = processor.process(record).await;
            match outcome.status {
                RowStatus::Success => ok += 1,
                RowStatus::Partial => partial += 1,
                RowStatus::Skipped => skipped += 1,
                RowStatus::Failed => failed += 1,
            }
            // Courtesy pacing between rows, successful or not.
            tokio::time::sleep(row_delay).await;
        }

        progress.info(format!(
            "{}: ✅ {} rows ({} ok, {} partial, {} skipped, {} failed)",
            self.name(),
            rows.len(),
            ok,
            partial,
            skipped,
            failed
        ));
        finish_progress(&progress);

        Ok(())
    }
}
