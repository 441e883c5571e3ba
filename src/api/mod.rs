// src/api/mod.rs

pub mod balances;
pub mod health;
pub mod portfolio;

use std::sync::Arc;

use crate::{
    config::Config,
    db::{Database, WalletStore},
    integrations::chains::ChainRegistry,
    services::{balance_fetcher::BalanceFetcher, pricing::PriceFeed},
};

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ChainRegistry>,
    pub fetcher: BalanceFetcher,
    pub wallets: Arc<dyn WalletStore>,
    pub prices: Arc<dyn PriceFeed>,
    /// Present only when a database is configured.
    pub db: Option<Database>,
    pub config: Config,
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;
    use crate::{
        db::InMemoryWalletStore,
        error::{AppError, Result},
        integrations::chains::{ChainAdapter, CurrencyPriceSource},
        models::{CurrencyMeta, Network, WalletAddress},
        services::pricing::StaticPriceFeed,
    };
    use async_trait::async_trait;
    use rust_decimal::Decimal;
    use std::time::Duration;

    /// Adapter returning a fixed balance and price; `0xdead...` addresses fail.
    pub struct FixedChain {
        pub network: Network,
        pub currency: CurrencyMeta,
        pub balance: Decimal,
        pub price: Option<Decimal>,
    }

    #[async_trait]
    impl ChainAdapter for FixedChain {
        fn network(&self) -> Network {
            self.network
        }

        fn currency(&self) -> &CurrencyMeta {
            &self.currency
        }

        fn bech32_prefix(&self) -> Option<&str> {
            self.network.bech32_prefix()
        }

        async fn get_balance(&self, address: &WalletAddress) -> Result<Decimal> {
            if address.as_str().starts_with("0xdead") {
                return Err(AppError::NetworkUnavailable("rpc down".to_string()));
            }
            Ok(self.balance)
        }

        fn currency_price(&self) -> Option<&dyn CurrencyPriceSource> {
            self.price.map(|_| self as &dyn CurrencyPriceSource)
        }
    }

    #[async_trait]
    impl CurrencyPriceSource for FixedChain {
        async fn get_currency_price(&self) -> Result<Decimal> {
            self.price
                .ok_or_else(|| AppError::NotFound("no price".to_string()))
        }
    }

    pub fn state(adapters: Vec<FixedChain>, wallets: InMemoryWalletStore) -> AppState {
        let config = crate::config::test_config();
        let mut registry = ChainRegistry::new();
        for adapter in adapters {
            registry.insert(Arc::new(adapter));
        }
        let registry = Arc::new(registry);

        AppState {
            fetcher: BalanceFetcher::new(registry.clone(), 4, Duration::from_secs(5)),
            registry,
            wallets: Arc::new(wallets),
            prices: Arc::new(StaticPriceFeed::default()),
            db: None,
            config,
        }
    }
}
