//! Per-network balance adapters.
//!
//! Every adapter implements [`ChainAdapter`] (native balance plus static
//! currency metadata). Optional capabilities are exposed through accessors that
//! return `Some(&dyn Capability)` only when the network supports them, so no
//! adapter carries a method that always fails.

pub mod catalog;
pub mod cosmos;
pub mod evm;

use async_trait::async_trait;
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::sync::Arc;

use crate::{
    config::Config,
    error::{AppError, Result},
    models::{BalanceRecord, CurrencyMeta, Network, NetworkFamily, WalletAddress},
    services::pricing::PriceFeed,
};

pub use cosmos::CosmosSdkChain;
pub use evm::EvmChain;

#[async_trait]
pub trait ChainAdapter: Send + Sync {
    fn network(&self) -> Network;

    fn currency(&self) -> &CurrencyMeta;

    /// Bech32 prefix used to re-encode wallet addresses for this network.
    fn bech32_prefix(&self) -> Option<&str> {
        None
    }

    /// Native-currency balance.
    async fn get_balance(&self, address: &WalletAddress) -> Result<Decimal>;

    fn delegations(&self) -> Option<&dyn DelegationSource> {
        None
    }

    fn token_balances(&self) -> Option<&dyn TokenBalanceSource> {
        None
    }

    fn currency_price(&self) -> Option<&dyn CurrencyPriceSource> {
        None
    }
}

/// Staked/delegated native currency.
#[async_trait]
pub trait DelegationSource: Send + Sync {
    async fn get_delegations(&self, address: &WalletAddress) -> Result<Decimal>;
}

/// Non-native fungible tokens held by an address.
#[async_trait]
pub trait TokenBalanceSource: Send + Sync {
    async fn get_token_balances(&self, address: &WalletAddress) -> Result<Vec<BalanceRecord>>;
}

/// USD price of the native currency.
#[async_trait]
pub trait CurrencyPriceSource: Send + Sync {
    async fn get_currency_price(&self) -> Result<Decimal>;
}

// ==================== REGISTRY ====================

/// Adapters keyed by network; built once at startup and shared read-only.
#[derive(Clone, Default)]
pub struct ChainRegistry {
    adapters: HashMap<Network, Arc<dyn ChainAdapter>>,
}

impl ChainRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &Config, prices: Arc<dyn PriceFeed>) -> Result<Self> {
        let mut registry = Self::new();

        for network in Network::ALL {
            let url = match network {
                Network::Ethereum => &config.ethereum_rpc_url,
                Network::Klaytn => &config.klaytn_rpc_url,
                Network::CosmosHub => &config.cosmos_hub_lcd_url,
                Network::Osmosis => &config.osmosis_lcd_url,
            };
            let url = url.trim();
            if url.is_empty() {
                tracing::warn!("No endpoint configured for {}; skipping adapter", network);
                continue;
            }

            let adapter: Arc<dyn ChainAdapter> = match network.family() {
                NetworkFamily::Evm => Arc::new(EvmChain::new(network, url, prices.clone())?),
                NetworkFamily::CosmosSdk => {
                    Arc::new(CosmosSdkChain::new(network, url, prices.clone())?)
                }
            };
            registry.insert(adapter);
        }

        Ok(registry)
    }

    pub fn insert(&mut self, adapter: Arc<dyn ChainAdapter>) {
        self.adapters.insert(adapter.network(), adapter);
    }

    pub fn get(&self, network: Network) -> Option<Arc<dyn ChainAdapter>> {
        self.adapters.get(&network).cloned()
    }

    pub fn networks(&self) -> Vec<Network> {
        let mut networks: Vec<Network> = self.adapters.keys().copied().collect();
        networks.sort_by_key(|network| network.id());
        networks
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

// ==================== AMOUNT HELPERS ====================

// Internal helper that parses or transforms values for `scale_raw_amount`.
pub(crate) fn scale_raw_amount(raw: u128, decimals: u32) -> Result<Decimal> {
    let raw = i128::try_from(raw)
        .map_err(|_| AppError::NetworkUnavailable(format!("amount {} out of range", raw)))?;
    Decimal::try_from_i128_with_scale(raw, decimals)
        .map_err(|e| AppError::NetworkUnavailable(format!("amount {} not representable: {}", raw, e)))
}

// Internal helper that parses or transforms values for `parse_raw_amount`.
pub(crate) fn parse_raw_amount(raw: &str, decimals: u32) -> Result<Decimal> {
    let value = raw
        .trim()
        .parse::<u128>()
        .map_err(|e| AppError::NetworkUnavailable(format!("invalid amount {:?}: {}", raw, e)))?;
    scale_raw_amount(value, decimals)
}
