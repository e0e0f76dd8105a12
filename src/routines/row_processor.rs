use std::collections::HashMap;

use crate::aggregate;
use crate::crypto;
use crate::exchange::domain::account::{AccountFactory, Credentials};
use crate::exchange::retry::{RetryError, RetryPolicy, WRITE_RETRY};
use crate::format::format_usd;
use crate::price::cache::PriceCache;
use crate::sheets::data::store::{BalanceStore, BalanceStoreError, CredentialRow};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStatus {
    Success,
    /// At least one fetch degraded to zero, but a total was still written.
    Partial,
    /// Row had no encrypted credentials; nothing was attempted.
    Skipped,
    Failed,
}

#[derive(Debug)]
pub struct RowOutcome {
    pub row: u32,
    pub total: f64,
    pub status: RowStatus,
    pub error: Option<String>,
}

impl RowOutcome {
    fn failed(row: u32, total: f64, error: String) -> Self {
        Self {
            row,
            total,
            status: RowStatus::Failed,
            error: Some(error),
        }
    }
}

/// Runs the per-row pipeline: decrypt -> build client -> fetch both sides
/// independently -> aggregate -> write. Every failure is contained to the
/// row; the caller always gets an outcome, never an error.
pub struct RowProcessor<'a> {
    decryption_key: &'a str,
    accounts: &'a dyn AccountFactory,
    prices: &'a PriceCache,
    store: &'a dyn BalanceStore,
    reference_asset: Option<&'a str>,
    write_retry: RetryPolicy,
}

impl<'a> RowProcessor<'a> {
    pub fn new(
        decryption_key: &'a str,
        accounts: &'a dyn AccountFactory,
        prices: &'a PriceCache,
        store: &'a dyn BalanceStore,
        reference_asset: Option<&'a str>,
    ) -> Self {
        Self {
            decryption_key,
            accounts,
            prices,
            store,
            reference_asset,
            write_retry: WRITE_RETRY,
        }
    }

    pub async fn process(&self, record: &CredentialRow) -> RowOutcome {
        if record.api_key_enc.is_empty() || record.api_secret_enc.is_empty() {
            log::info!("⚠️ Row {}: skipped (missing API credentials)", record.row);
            return RowOutcome {
                row: record.row,
                total: 0.0,
                status: RowStatus::Skipped,
                error: None,
            };
        }

        let credentials = match self.decrypt_credentials(record) {
            Ok(credentials) => credentials,
            Err(err) => {
                log::error!("❌ Row {}: failed to decrypt credentials: {}", record.row, err);
                return RowOutcome::failed(record.row, 0.0, err.to_string());
            }
        };

        let account = self.accounts.create(credentials);

        let (balances, balances_failure) = match account.fetch_balances().await {
            Ok(balances) => (balances, None),
            Err(err) => {
                log::warn!(
                    "Row {}: {} balance fetch failed: {}",
                    record.row,
                    account.exchange_name(),
                    err
                );
                (HashMap::new(), Some(err.to_string()))
            }
        };

        let (equity, equity_failure) = match account.fetch_equity().await {
            Ok(equity) => (sanitize_equity(record.row, equity), None),
            Err(err) => {
                log::warn!(
                    "Row {}: {} equity fetch failed: {}",
                    record.row,
                    account.exchange_name(),
                    err
                );
                (0.0, Some(err.to_string()))
            }
        };

        let prices = self.resolve_prices(&balances).await;
        let spot_total = aggregate::total_value(&balances, &prices);
        let total = aggregate::combine(spot_total, equity);

        if let Err(err) = self.write_row(record.row, total, &balances).await {
            log::error!("❌ Row {}: failed to write result: {}", record.row, err);
            return RowOutcome::failed(record.row, total, err.to_string());
        }

        let fetch_failure = match (balances_failure, equity_failure) {
            (None, None) => None,
            (balances_err, equity_err) => Some(
                [balances_err, equity_err]
                    .into_iter()
                    .flatten()
                    .collect::<Vec<_>>()
                    .join("; "),
            ),
        };
        let status = if fetch_failure.is_some() {
            RowStatus::Partial
        } else {
            RowStatus::Success
        };

        log::info!(
            "✅ Row {}: {} (spot: {}, equity: {})",
            record.row,
            format_usd(total),
            format_usd(spot_total),
            format_usd(equity)
        );

        RowOutcome {
            row: record.row,
            total,
            status,
            error: fetch_failure,
        }
    }

    fn decrypt_credentials(
        &self,
        record: &CredentialRow,
    ) -> Result<Credentials, crypto::DecryptError> {
        Ok(Credentials {
            api_key: crypto::decrypt(&record.api_key_enc, self.decryption_key)?,
            api_secret: crypto::decrypt(&record.api_secret_enc, self.decryption_key)?,
            member_id: record.member_id.clone(),
        })
    }

    async fn resolve_prices(&self, balances: &HashMap<String, f64>) -> HashMap<String, f64> {
        let mut prices = HashMap::with_capacity(balances.len());
        for symbol in balances.keys() {
            prices.insert(symbol.clone(), self.prices.price_of(symbol).await);
        }
        prices
    }

    async fn write_row(
        &self,
        row: u32,
        total: f64,
        balances: &HashMap<String, f64>,
    ) -> Result<(), RetryError<error_stack::Report<BalanceStoreError>>> {
        let formatted = format_usd(total);
        self.write_retry
            .execute("sheet total write", || self.store.write_total(row, &formatted))
            .await?;

        if let Some(asset) = self.reference_asset {
            let amount = aggregate::reference_amount(balances, asset);
            self.write_retry
                .execute("sheet reference amount write", || {
                    self.store.write_reference_amount(row, amount)
                })
                .await?;
        }
        Ok(())
    }
}

fn sanitize_equity(row: u32, equity: f64) -> f64 {
    if !equity.is_finite() {
        log::warn!("Row {}: non-finite equity {} treated as 0", row, equity);
        0.0
    } else if equity < 0.0 {
        log::warn!("Row {}: negative equity {} clamped to 0", row, equity);
        0.0
    } else {
        equity
    }
}
