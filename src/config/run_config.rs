#[derive(serde::Deserialize, Debug, Clone)]
pub struct RunConfig {
    /// Pause after each row, a courtesy limit on the exchange and sheet APIs.
    #[serde(default = "default_row_delay_ms")]
    pub row_delay_ms: u64,
}

fn default_row_delay_ms() -> u64 {
    1000
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            row_delay_ms: default_row_delay_ms(),
        }
    }
}
