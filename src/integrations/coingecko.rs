use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

use crate::{
    config::Config,
    constants::{ADAPTER_HTTP_TIMEOUT_SECS, PRICE_CACHE_MAX_ENTRIES},
    error::{AppError, Result},
    services::pricing::{fallback_price_for, sanitize_price_usd, PriceFeed},
};

#[derive(Clone, Copy)]
struct CachedPrice {
    fetched_at: Instant,
    value: Decimal,
}

/// CoinGecko `/simple/price` client with a short-lived in-process cache.
pub struct CoinGeckoClient {
    base_url: String,
    api_key: Option<String>,
    client: Client,
    ttl: Duration,
    cache: RwLock<HashMap<String, CachedPrice>>,
}

impl CoinGeckoClient {
    pub fn new(base_url: String, api_key: Option<String>, ttl: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(ADAPTER_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            client,
            ttl,
            cache: RwLock::new(HashMap::new()),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        Self::new(
            config.coingecko_api_url.clone(),
            config.coingecko_api_key.clone(),
            Duration::from_secs(config.price_cache_ttl_secs),
        )
    }

    pub fn is_configured(&self) -> bool {
        !self.base_url.trim().is_empty()
    }

    async fn cached(&self, ids: &[String]) -> HashMap<String, Decimal> {
        let guard = self.cache.read().await;
        ids.iter()
            .filter_map(|id| {
                let entry = guard.get(id)?;
                (entry.fetched_at.elapsed() <= self.ttl).then(|| (id.clone(), entry.value))
            })
            .collect()
    }

    async fn store(&self, prices: &HashMap<String, Decimal>) {
        let mut guard = self.cache.write().await;
        let now = Instant::now();
        for (id, value) in prices {
            guard.insert(
                id.clone(),
                CachedPrice {
                    fetched_at: now,
                    value: *value,
                },
            );
        }
        if guard.len() > PRICE_CACHE_MAX_ENTRIES {
            let ttl = self.ttl;
            guard.retain(|_, entry| entry.fetched_at.elapsed() <= ttl);
        }
    }

    async fn fetch_simple_prices(&self, ids: &[String]) -> Result<HashMap<String, Decimal>> {
        let url = format!(
            "{}/simple/price?ids={}&vs_currencies=usd",
            self.base_url,
            ids.join(",")
        );
        let mut req = self.client.get(url);
        if let Some(key) = self.api_key.as_deref().filter(|key| !key.trim().is_empty()) {
            req = req.header("x-cg-demo-api-key", key);
        }

        let response = req
            .send()
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AppError::NetworkUnavailable(format!(
                "CoinGecko returned {}",
                response.status()
            )));
        }
        let payload: serde_json::Value = response
            .json()
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))?;
        Ok(parse_simple_price(&payload))
    }
}

// Internal helper that parses `{ "<id>": { "usd": <price> } }` payloads.
fn parse_simple_price(payload: &serde_json::Value) -> HashMap<String, Decimal> {
    let Some(entries) = payload.as_object() else {
        return HashMap::new();
    };
    entries
        .iter()
        .filter_map(|(id, quote)| {
            let usd = quote.get("usd").and_then(|v| v.as_f64())?;
            sanitize_price_usd(usd).map(|price| (id.clone(), price))
        })
        .collect()
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn price(&self, coin_gecko_id: &str) -> Result<Option<Decimal>> {
        let ids = [coin_gecko_id.to_string()];
        Ok(self.prices(&ids).await.remove(coin_gecko_id))
    }

    async fn prices(&self, ids: &[String]) -> HashMap<String, Decimal> {
        let mut prices = self.cached(ids).await;
        let missing: Vec<String> = ids
            .iter()
            .filter(|id| !prices.contains_key(*id))
            .cloned()
            .collect();
        if missing.is_empty() {
            return prices;
        }

        if self.is_configured() {
            match self.fetch_simple_prices(&missing).await {
                Ok(fetched) => {
                    self.store(&fetched).await;
                    prices.extend(fetched);
                }
                Err(err) => tracing::warn!("CoinGecko price fetch failed: {}", err),
            }
        }

        for id in &missing {
            if !prices.contains_key(id) {
                if let Some(fallback) = fallback_price_for(id) {
                    prices.insert(id.clone(), fallback);
                }
            }
        }
        prices
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[test]
    fn parse_simple_price_skips_invalid_quotes() {
        let payload = serde_json::json!({
            "cosmos": { "usd": 10.25 },
            "osmosis": { "usd": 0 },
            "ion": { "eur": 3.0 }
        });
        let prices = parse_simple_price(&payload);
        assert_eq!(prices.len(), 1);
        assert_eq!(prices.get("cosmos"), Some(&Decimal::new(1025, 2)));
    }

    #[tokio::test]
    async fn unconfigured_client_uses_fallbacks_only() {
        let client = CoinGeckoClient::new(String::new(), None, Duration::from_secs(60)).unwrap();
        assert!(!client.is_configured());
        let prices = client
            .prices(&["usd-coin".to_string(), "cosmos".to_string()])
            .await;
        assert_eq!(prices.get("usd-coin"), Some(&Decimal::ONE));
        assert!(!prices.contains_key("cosmos"));
    }

    #[tokio::test]
    async fn cached_prices_are_served_within_ttl() {
        let client = CoinGeckoClient::new(String::new(), None, Duration::from_secs(60)).unwrap();
        let mut fresh = HashMap::new();
        fresh.insert("cosmos".to_string(), Decimal::new(8, 0));
        client.store(&fresh).await;

        assert_eq!(client.price("cosmos").await.unwrap(), Some(Decimal::new(8, 0)));
    }

    #[tokio::test]
    async fn prices_are_fetched_once_then_served_from_cache() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .and(query_param("ids", "cosmos,osmosis"))
            .and(query_param("vs_currencies", "usd"))
            .and(header("x-cg-demo-api-key", "demo-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "cosmos": { "usd": 9.5 },
                "osmosis": { "usd": 0.75 }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new(
            server.uri(),
            Some("demo-key".to_string()),
            Duration::from_secs(60),
        )
        .unwrap();
        let ids = ["cosmos".to_string(), "osmosis".to_string()];

        let first = client.prices(&ids).await;
        assert_eq!(first.get("cosmos"), Some(&Decimal::new(95, 1)));
        assert_eq!(first.get("osmosis"), Some(&Decimal::new(75, 2)));

        let second = client.prices(&ids).await;
        assert_eq!(second, first);
    }

    #[tokio::test]
    async fn failing_upstream_falls_back_to_stablecoin_prices() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/simple/price"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let client = CoinGeckoClient::new(server.uri(), None, Duration::from_secs(60)).unwrap();
        let prices = client
            .prices(&["tether".to_string(), "cosmos".to_string()])
            .await;

        assert_eq!(prices.get("tether"), Some(&Decimal::ONE));
        assert!(!prices.contains_key("cosmos"));
        assert_eq!(client.price("cosmos").await.unwrap(), None);
    }
}
