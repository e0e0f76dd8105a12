use crate::exchange::domain::account::ExchangeKind;

#[derive(serde::Deserialize, Debug, Clone)]
pub struct ExchangeConfig {
    pub kind: ExchangeKind,
    /// Sheet cell holding the JSON list of coins tracked by the Bybit
    /// funding query.
    #[serde(default = "default_coin_list_cell")]
    pub coin_list_cell: Box<str>,
    /// Asset whose raw amount is written next to the total (column E).
    #[serde(default)]
    pub reference_asset: Option<Box<str>>,
}

fn default_coin_list_cell() -> Box<str> {
    "H1".into()
}
