use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::constants::{
    DEFAULT_FETCH_DEADLINE_SECS, DEFAULT_MAX_INFLIGHT_RPC, DEFAULT_PRICE_CACHE_TTL_SECS,
    MINIMAL_NET_WORTH,
};

#[derive(Debug, Clone)]
pub struct Config {
    // Server
    pub host: String,
    pub port: u16,
    pub environment: String,

    // Wallet store
    pub database_url: Option<String>,
    pub database_max_connections: u32,

    // Chains (an empty URL leaves the network without an adapter)
    pub ethereum_rpc_url: String,
    pub klaytn_rpc_url: String,
    pub cosmos_hub_lcd_url: String,
    pub osmosis_lcd_url: String,

    // Price feed
    pub coingecko_api_url: String,
    pub coingecko_api_key: Option<String>,
    pub price_cache_ttl_secs: u64,

    // Fetch orchestration
    pub max_inflight_rpc: usize,
    pub fetch_deadline_secs: u64,

    // Aggregation
    pub minimal_net_worth: Decimal,

    // CORS
    pub cors_allowed_origins: String,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenv::dotenv().ok();

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "3000".to_string())
                .parse()?,
            environment: env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),

            database_url: env::var("DATABASE_URL")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,

            ethereum_rpc_url: env::var("ETHEREUM_RPC_URL")
                .unwrap_or_else(|_| "https://cloudflare-eth.com".to_string()),
            klaytn_rpc_url: env::var("KLAYTN_RPC_URL")
                .unwrap_or_else(|_| "https://public-en-cypress.klaytn.net".to_string()),
            cosmos_hub_lcd_url: env::var("COSMOS_HUB_LCD_URL")
                .unwrap_or_else(|_| "https://lcd-cosmoshub.keplr.app".to_string()),
            osmosis_lcd_url: env::var("OSMOSIS_LCD_URL")
                .unwrap_or_else(|_| "https://lcd-osmosis.keplr.app".to_string()),

            coingecko_api_url: env::var("COINGECKO_API_URL")
                .unwrap_or_else(|_| "https://api.coingecko.com/api/v3".to_string()),
            coingecko_api_key: env::var("COINGECKO_API_KEY")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            price_cache_ttl_secs: env::var("PRICE_CACHE_TTL_SECS")
                .unwrap_or_else(|_| DEFAULT_PRICE_CACHE_TTL_SECS.to_string())
                .parse()?,

            max_inflight_rpc: env::var("MAX_INFLIGHT_RPC")
                .unwrap_or_else(|_| DEFAULT_MAX_INFLIGHT_RPC.to_string())
                .parse()?,
            fetch_deadline_secs: env::var("FETCH_DEADLINE_SECS")
                .unwrap_or_else(|_| DEFAULT_FETCH_DEADLINE_SECS.to_string())
                .parse()?,

            minimal_net_worth: match env::var("MINIMAL_NET_WORTH") {
                Ok(raw) => Decimal::from_str(raw.trim())?,
                Err(_) => MINIMAL_NET_WORTH,
            },

            cors_allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|_| "*".to_string()),
        })
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.max_inflight_rpc == 0 {
            anyhow::bail!("MAX_INFLIGHT_RPC must be > 0");
        }
        if self.fetch_deadline_secs == 0 {
            anyhow::bail!("FETCH_DEADLINE_SECS must be > 0");
        }
        if self.minimal_net_worth.is_sign_negative() {
            anyhow::bail!("MINIMAL_NET_WORTH must not be negative");
        }

        if self.database_url.is_none() {
            tracing::warn!("DATABASE_URL not set; using in-memory wallet store");
        }
        for (name, url) in [
            ("ETHEREUM_RPC_URL", &self.ethereum_rpc_url),
            ("KLAYTN_RPC_URL", &self.klaytn_rpc_url),
            ("COSMOS_HUB_LCD_URL", &self.cosmos_hub_lcd_url),
            ("OSMOSIS_LCD_URL", &self.osmosis_lcd_url),
        ] {
            if url.trim().is_empty() {
                tracing::warn!("{} is empty; network will be reported as unsupported", name);
            }
        }
        if self.coingecko_api_url.trim().is_empty() {
            tracing::warn!("COINGECKO_API_URL is empty; only fallback prices will be used");
        }
        if self.max_inflight_rpc > 256 {
            tracing::warn!(
                "MAX_INFLIGHT_RPC={} is high; public RPC providers may rate limit",
                self.max_inflight_rpc
            );
        }
        if self.is_production() && self.cors_allowed_origins.trim() == "*" {
            tracing::warn!("CORS_ALLOWED_ORIGINS is permissive in production");
        }
        if self.cors_allowed_origins.trim().is_empty() {
            tracing::warn!("CORS_ALLOWED_ORIGINS is empty; requests may be blocked");
        }

        Ok(())
    }

    pub fn is_production(&self) -> bool {
        self.environment.eq_ignore_ascii_case("production")
    }
}

#[cfg(test)]
pub(crate) fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 3000,
        environment: "development".to_string(),
        database_url: None,
        database_max_connections: 1,
        ethereum_rpc_url: "http://localhost:8545".to_string(),
        klaytn_rpc_url: String::new(),
        cosmos_hub_lcd_url: "http://localhost:1317".to_string(),
        osmosis_lcd_url: "http://localhost:1318".to_string(),
        coingecko_api_url: String::new(),
        coingecko_api_key: None,
        price_cache_ttl_secs: 60,
        max_inflight_rpc: 4,
        fetch_deadline_secs: 5,
        minimal_net_worth: MINIMAL_NET_WORTH,
        cors_allowed_origins: "*".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_zero_concurrency() {
        // Ensures a zero semaphore size is refused at startup
        let mut config = test_config();
        config.max_inflight_rpc = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_accepts_defaults() {
        let config = test_config();
        assert!(config.validate().is_ok());
        assert!(!config.is_production());
    }
}
