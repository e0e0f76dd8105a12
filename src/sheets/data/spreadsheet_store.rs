use std::sync::Arc;

use error_stack::ResultExt;
use google_sheets4::api::ValueRange;
use serde_json::Value;

use crate::sheets::domain::column::cell_a1;
use crate::sheets::ranges;
use crate::sheets::spreadsheet_manager::SpreadsheetManager;
use crate::sheets::value_range_factory::ValueRangeFactory;

use super::store::{BalanceStore, BalanceStoreError, CredentialRow};

pub struct SpreadsheetBalanceStore {
    manager: Arc<SpreadsheetManager>,
    sheet_name: String,
    coin_list_cell: String,
}

impl SpreadsheetBalanceStore {
    pub fn new(manager: Arc<SpreadsheetManager>, sheet_name: &str, coin_list_cell: &str) -> Self {
        Self {
            manager,
            sheet_name: sheet_name.to_owned(),
            coin_list_cell: coin_list_cell.to_owned(),
        }
    }
}

fn cell_text(row: &[Value], col: u32) -> Option<String> {
    row.get((col - 1) as usize)
        .and_then(|value| value.as_str())
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_owned)
}

#[async_trait::async_trait]
impl BalanceStore for SpreadsheetBalanceStore {
    async fn credential_rows(&self) -> error_stack::Result<Vec<CredentialRow>, BalanceStoreError> {
        let range = format!(
            "'{}'!A{}:E",
            self.sheet_name,
            ranges::credentials::FIRST_DATA_ROW
        );
        let values = self
            .manager
            .read_range(&range)
            .await
            .change_context(BalanceStoreError::FetchRows)?
            .values
            .unwrap_or_default();

        let rows = values
            .iter()
            .enumerate()
            .map(|(offset, row)| CredentialRow {
                row: ranges::credentials::FIRST_DATA_ROW + offset as u32,
                api_key_enc: cell_text(row, ranges::credentials::COL_API_KEY).unwrap_or_default(),
                api_secret_enc: cell_text(row, ranges::credentials::COL_API_SECRET)
                    .unwrap_or_default(),
                member_id: cell_text(row, ranges::credentials::COL_MEMBER_ID),
            })
            .collect();
        Ok(rows)
    }

    async fn tracked_coins(&self) -> error_stack::Result<Vec<String>, BalanceStoreError> {
        let range = format!("'{}'!{}", self.sheet_name, self.coin_list_cell);
        let value_range = self
            .manager
            .read_range(&range)
            .await
            .change_context(BalanceStoreError::FetchCoins)?;

        let cell = value_range
            .values
            .and_then(|rows| rows.into_iter().next())
            .and_then(|row| row.into_iter().next());
        let Some(Value::String(text)) = cell else {
            return Ok(Vec::new());
        };

        // The cell holds a JSON array of coin symbols.
        serde_json::from_str(&text).change_context(BalanceStoreError::FetchCoins)
    }

    async fn write_total(
        &self,
        row: u32,
        formatted_total: &str,
    ) -> error_stack::Result<(), BalanceStoreError> {
        self.manager
            .write_range(
                &cell_a1(&self.sheet_name, ranges::output::COL_TOTAL, row),
                ValueRange::from_str(formatted_total),
            )
            .await
            .change_context(BalanceStoreError::Write)
    }

    async fn write_reference_amount(
        &self,
        row: u32,
        amount: f64,
    ) -> error_stack::Result<(), BalanceStoreError> {
        self.manager
            .write_range(
                &cell_a1(&self.sheet_name, ranges::output::COL_REFERENCE_AMOUNT, row),
                ValueRange::from_number(amount),
            )
            .await
            .change_context(BalanceStoreError::Write)
    }
}
