// Price feed seam and price back-filling for balance records.

use async_trait::async_trait;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use std::collections::{HashMap, HashSet};

use crate::{error::Result, models::BalanceRecord};

/// USD prices keyed by price-feed id (CoinGecko id).
#[async_trait]
pub trait PriceFeed: Send + Sync {
    async fn price(&self, coin_gecko_id: &str) -> Result<Option<Decimal>>;

    /// Batch lookup; ids without a price are left out of the map.
    async fn prices(&self, ids: &[String]) -> HashMap<String, Decimal> {
        let mut prices = HashMap::with_capacity(ids.len());
        for id in ids {
            match self.price(id).await {
                Ok(Some(price)) => {
                    prices.insert(id.clone(), price);
                }
                Ok(None) => {}
                Err(err) => tracing::debug!("price lookup for {} failed: {}", id, err),
            }
        }
        prices
    }
}

/// Fixed price table, used when no remote feed is configured and in tests.
#[derive(Debug, Clone, Default)]
pub struct StaticPriceFeed {
    prices: HashMap<String, Decimal>,
}

impl StaticPriceFeed {
    pub fn from_pairs(pairs: &[(&str, Decimal)]) -> Self {
        Self {
            prices: pairs
                .iter()
                .map(|(id, price)| (id.to_string(), *price))
                .collect(),
        }
    }
}

#[async_trait]
impl PriceFeed for StaticPriceFeed {
    async fn price(&self, coin_gecko_id: &str) -> Result<Option<Decimal>> {
        Ok(self
            .prices
            .get(coin_gecko_id)
            .copied()
            .or_else(|| fallback_price_for(coin_gecko_id)))
    }
}

// Internal helper that provides deterministic fallback prices for USD-pegged assets.
pub fn fallback_price_for(coin_gecko_id: &str) -> Option<Decimal> {
    match coin_gecko_id.trim().to_ascii_lowercase().as_str() {
        "usd-coin" | "tether" | "dai" => Some(Decimal::ONE),
        _ => None,
    }
}

// Internal helper that validates a raw USD price coming off the wire.
pub fn sanitize_price_usd(value: f64) -> Option<Decimal> {
    if !value.is_finite() || value <= 0.0 {
        return None;
    }
    Decimal::from_f64(value)
}

/// Fills `price_usd` on records that have none, using each record's
/// coinGeckoId. Records that already carry a price are left untouched.
pub async fn fill_missing_prices(records: &mut [BalanceRecord], feed: &dyn PriceFeed) {
    let mut seen = HashSet::new();
    let ids: Vec<String> = records
        .iter()
        .filter(|record| record.price_usd.is_none())
        .filter_map(|record| record.coin_gecko_id.clone())
        .filter(|id| seen.insert(id.clone()))
        .collect();
    if ids.is_empty() {
        return;
    }

    let prices = feed.prices(&ids).await;
    for record in records.iter_mut().filter(|r| r.price_usd.is_none()) {
        if let Some(price) = record
            .coin_gecko_id
            .as_ref()
            .and_then(|id| prices.get(id))
        {
            record.price_usd = Some(*price);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Network, WalletAddress};

    fn record(symbol: &str, coin_gecko_id: Option<&str>, price: Option<Decimal>) -> BalanceRecord {
        BalanceRecord {
            wallet_address: WalletAddress::new("osmo1wallet"),
            network: Network::Osmosis,
            symbol: symbol.to_string(),
            name: symbol.to_string(),
            logo_uri: None,
            coin_gecko_id: coin_gecko_id.map(str::to_string),
            amount: Decimal::ONE,
            delegated_amount: Decimal::ZERO,
            price_usd: price,
            asset_address: None,
            asset_type: None,
        }
    }

    #[tokio::test]
    async fn fills_only_missing_prices() {
        let feed = StaticPriceFeed::from_pairs(&[
            ("osmosis", Decimal::new(5, 1)),
            ("cosmos", Decimal::new(10, 0)),
        ]);
        let mut records = vec![
            record("OSMO", Some("osmosis"), None),
            record("ATOM", Some("cosmos"), Some(Decimal::new(9, 0))),
            record("USDC", Some("usd-coin"), None),
            record("XYZ", None, None),
        ];

        fill_missing_prices(&mut records, &feed).await;

        assert_eq!(records[0].price_usd, Some(Decimal::new(5, 1)));
        // Existing price wins over the feed
        assert_eq!(records[1].price_usd, Some(Decimal::new(9, 0)));
        assert_eq!(records[2].price_usd, Some(Decimal::ONE));
        assert_eq!(records[3].price_usd, None);
    }

    #[test]
    fn sanitize_price_rejects_non_positive() {
        assert_eq!(sanitize_price_usd(0.0), None);
        assert_eq!(sanitize_price_usd(f64::NAN), None);
        assert_eq!(sanitize_price_usd(-1.0), None);
        assert_eq!(sanitize_price_usd(2.5), Some(Decimal::new(25, 1)));
    }

    #[tokio::test]
    async fn static_feed_falls_back_for_stablecoins() {
        let feed = StaticPriceFeed::default();
        assert_eq!(feed.price("tether").await.unwrap(), Some(Decimal::ONE));
        assert_eq!(feed.price("ethereum").await.unwrap(), None);
    }
}
