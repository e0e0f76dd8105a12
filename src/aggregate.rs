use std::collections::HashMap;

/// Σ(amount × price) over held assets. An asset with no known price
/// contributes nothing rather than poisoning the total.
pub fn total_value(balances: &HashMap<String, f64>, prices: &HashMap<String, f64>) -> f64 {
    balances
        .iter()
        .map(|(asset, amount)| amount * prices.get(asset).copied().unwrap_or(0.0))
        .sum()
}

/// Spot value and derivatives equity roll up by plain addition; this sum is
/// the number written to the sheet.
pub fn combine(primary: f64, secondary: f64) -> f64 {
    primary + secondary
}

/// Raw quantity of one asset, surfaced next to the monetary total.
pub fn reference_amount(balances: &HashMap<String, f64>, asset: &str) -> f64 {
    balances.get(asset).copied().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn balances(entries: &[(&str, f64)]) -> HashMap<String, f64> {
        entries
            .iter()
            .map(|(asset, amount)| (asset.to_string(), *amount))
            .collect()
    }

    #[test]
    fn values_holdings_against_prices() {
        let held = balances(&[("BTC", 0.5), ("USDT", 100.0)]);
        let prices = balances(&[("BTC", 60000.0), ("USDT", 1.0)]);

        assert_eq!(total_value(&held, &prices), 30100.0);
    }

    #[test]
    fn unpriced_assets_contribute_zero() {
        let held = balances(&[("BTC", 0.5), ("OBSCURE", 1000.0)]);
        let prices = balances(&[("BTC", 60000.0)]);

        assert_eq!(total_value(&held, &prices), 30000.0);
    }

    #[test]
    fn combine_with_zero_is_identity() {
        assert_eq!(combine(123.45, 0.0), 123.45);
        assert_eq!(combine(0.0, 123.45), 123.45);
        assert_eq!(combine(0.0, 0.0), 0.0);
    }

    #[test]
    fn reference_amount_defaults_to_zero() {
        let held = balances(&[("BTC", 0.5)]);

        assert_eq!(reference_amount(&held, "BTC"), 0.5);
        assert_eq!(reference_amount(&held, "ETH"), 0.0);
    }

    #[test]
    fn spot_plus_equity_scenario() {
        let held = balances(&[("BTC", 0.5), ("USDT", 100.0)]);
        let prices = balances(&[("BTC", 60000.0), ("USDT", 1.0)]);

        let total = combine(total_value(&held, &prices), 250.0);
        assert_eq!(total, 30350.0);
    }
}
