use std::collections::HashMap;
use std::sync::Mutex;

use crate::price::domain::source::PriceSource;

/// Symbols that are themselves the quote currency.
const QUOTE_ASSETS: [&str; 2] = ["USDT", "USDC"];

/// Per-run memoized price lookup. Scoped to one run on purpose: dropping the
/// cache at run end is the invalidation boundary.
pub struct PriceCache {
    source: Box<dyn PriceSource>,
    cache: Mutex<HashMap<String, f64>>,
}

impl PriceCache {
    pub fn new(source: Box<dyn PriceSource>) -> Self {
        Self {
            source,
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Memoized lookup. A failed lookup degrades to 0.0 and is cached too,
    /// so a broken symbol is not re-queried all run long; it only zeroes
    /// that asset's contribution.
    pub async fn price_of(&self, symbol: &str) -> f64 {
        if QUOTE_ASSETS.contains(&symbol) {
            return 1.0;
        }
        if let Some(price) = self.cache.lock().unwrap().get(symbol).copied() {
            return price;
        }

        let price = match self.source.quote(symbol).await {
            Ok(price) => price,
            Err(err) => {
                log::warn!("price lookup failed for {}, using 0: {}", symbol, err);
                0.0
            }
        };
        self.cache.lock().unwrap().insert(symbol.to_owned(), price);
        price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FetchError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct CountingSource {
        calls: Arc<AtomicUsize>,
        fail: bool,
    }

    fn counting_cache(fail: bool) -> (PriceCache, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let cache = PriceCache::new(Box::new(CountingSource {
            calls: Arc::clone(&calls),
            fail,
        }));
        (cache, calls)
    }

    #[async_trait::async_trait]
    impl PriceSource for CountingSource {
        async fn quote(&self, symbol: &str) -> Result<f64, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(FetchError::Api {
                    code: 0,
                    message: format!("no ticker for {}", symbol),
                })
            } else {
                Ok(60000.0)
            }
        }
    }

    #[tokio::test]
    async fn quote_assets_cost_no_network_call() {
        let (cache, calls) = counting_cache(false);

        assert_eq!(cache.price_of("USDT").await, 1.0);
        assert_eq!(cache.price_of("USDC").await, 1.0);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn repeated_lookups_hit_the_source_once() {
        let (cache, calls) = counting_cache(false);

        assert_eq!(cache.price_of("BTC").await, 60000.0);
        assert_eq!(cache.price_of("BTC").await, 60000.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn failures_degrade_to_zero_and_are_cached() {
        let (cache, calls) = counting_cache(true);

        assert_eq!(cache.price_of("BROKEN").await, 0.0);
        assert_eq!(cache.price_of("BROKEN").await, 0.0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
