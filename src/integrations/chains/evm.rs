use async_trait::async_trait;
use ethers::{
    providers::{Http, Middleware, Provider},
    types::{Address, U256},
};
use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::Arc;

use super::{
    catalog::{currency_for, tokens_for, TokenInfo},
    scale_raw_amount, ChainAdapter, CurrencyPriceSource, TokenBalanceSource,
};
use crate::{
    constants::ASSET_TYPE_ERC20,
    error::{AppError, Result},
    models::{BalanceRecord, CurrencyMeta, Network, WalletAddress},
    services::pricing::PriceFeed,
};

ethers::contract::abigen!(
    Erc20,
    r#"[
        function balanceOf(address) view returns (uint256)
    ]"#
);

/// Account-based EVM chain read over JSON-RPC.
pub struct EvmChain {
    network: Network,
    currency: &'static CurrencyMeta,
    tokens: &'static [TokenInfo],
    provider: Arc<Provider<Http>>,
    prices: Arc<dyn PriceFeed>,
}

impl EvmChain {
    pub fn new(network: Network, rpc_url: &str, prices: Arc<dyn PriceFeed>) -> Result<Self> {
        let provider = Provider::<Http>::try_from(rpc_url)
            .map_err(|e| AppError::Internal(format!("Invalid {} RPC URL: {}", network, e)))?;

        Ok(Self {
            network,
            currency: currency_for(network),
            tokens: tokens_for(network),
            provider: Arc::new(provider),
            prices,
        })
    }

    async fn fetch_token_balance(
        &self,
        owner: Address,
        wallet: &WalletAddress,
        token: &TokenInfo,
    ) -> Result<Option<BalanceRecord>> {
        let token_addr = Address::from_str(token.address)
            .map_err(|_| AppError::Internal(format!("Invalid ERC20 address {}", token.address)))?;
        let erc20 = Erc20::new(token_addr, self.provider.clone());
        let raw = erc20
            .balance_of(owner)
            .call()
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))?;
        if raw.is_zero() {
            return Ok(None);
        }

        Ok(Some(BalanceRecord {
            wallet_address: wallet.clone(),
            network: self.network,
            symbol: token.symbol.to_string(),
            name: token.name.to_string(),
            logo_uri: token.logo.map(str::to_string),
            coin_gecko_id: token.coin_gecko_id.map(str::to_string),
            amount: scale_u256(raw, token.decimals)?,
            delegated_amount: Decimal::ZERO,
            price_usd: None,
            asset_address: Some(token.address.to_string()),
            asset_type: Some(ASSET_TYPE_ERC20.to_string()),
        }))
    }
}

#[async_trait]
impl ChainAdapter for EvmChain {
    fn network(&self) -> Network {
        self.network
    }

    fn currency(&self) -> &CurrencyMeta {
        self.currency
    }

    async fn get_balance(&self, address: &WalletAddress) -> Result<Decimal> {
        let addr = parse_evm_address(address)?;
        let balance = self
            .provider
            .get_balance(addr, None)
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))?;
        scale_u256(balance, self.currency.decimals)
    }

    fn token_balances(&self) -> Option<&dyn TokenBalanceSource> {
        if self.tokens.is_empty() {
            None
        } else {
            Some(self)
        }
    }

    fn currency_price(&self) -> Option<&dyn CurrencyPriceSource> {
        self.currency.coin_gecko_id.map(|_| self as &dyn CurrencyPriceSource)
    }
}

#[async_trait]
impl TokenBalanceSource for EvmChain {
    async fn get_token_balances(&self, address: &WalletAddress) -> Result<Vec<BalanceRecord>> {
        let owner = parse_evm_address(address)?;
        let results = join_all(
            self.tokens
                .iter()
                .map(|token| self.fetch_token_balance(owner, address, token)),
        )
        .await;

        let mut records = Vec::new();
        for (token, result) in self.tokens.iter().zip(results) {
            match result {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(err) => {
                    tracing::debug!(
                        "{} {} balanceOf failed for {}: {}",
                        self.network,
                        token.symbol,
                        address,
                        err
                    );
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl CurrencyPriceSource for EvmChain {
    async fn get_currency_price(&self) -> Result<Decimal> {
        let id = self.currency.coin_gecko_id.ok_or_else(|| {
            AppError::NotFound(format!("{} has no price feed id", self.currency.symbol))
        })?;
        self.prices
            .price(id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("No price for {}", id)))
    }
}

// Internal helper that parses or transforms values for `parse_evm_address`.
fn parse_evm_address(address: &WalletAddress) -> Result<Address> {
    Address::from_str(address.as_str())
        .map_err(|_| AppError::InvalidAddress(format!("Invalid EVM address {}", address)))
}

// Internal helper that parses or transforms values for `scale_u256`.
fn scale_u256(value: U256, decimals: u32) -> Result<Decimal> {
    let raw = u128::try_from(value)
        .map_err(|_| AppError::NetworkUnavailable(format!("amount {} out of range", value)))?;
    scale_raw_amount(raw, decimals)
}
