use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use serde::{de::DeserializeOwned, Deserialize};
use std::sync::Arc;
use std::time::Duration;

use super::{
    catalog::{currency_for, native_denom_for, tokens_for, TokenInfo},
    parse_raw_amount, ChainAdapter, CurrencyPriceSource, DelegationSource, TokenBalanceSource,
};
use crate::{
    constants::{ADAPTER_HTTP_TIMEOUT_SECS, ASSET_TYPE_COSMOS_DENOM, LCD_MAX_BALANCE_PAGES},
    error::{AppError, Result},
    models::{BalanceRecord, CurrencyMeta, Network, WalletAddress},
    services::pricing::PriceFeed,
};

#[derive(Debug, Deserialize)]
struct Coin {
    denom: String,
    amount: String,
}

#[derive(Debug, Deserialize)]
struct BalanceByDenomResponse {
    balance: Option<Coin>,
}

#[derive(Debug, Deserialize)]
struct AllBalancesResponse {
    #[serde(default)]
    balances: Vec<Coin>,
    #[serde(default)]
    pagination: Option<PageResponse>,
}

#[derive(Debug, Deserialize)]
struct PageResponse {
    next_key: Option<String>,
}

#[derive(Debug, Deserialize)]
struct DelegationsResponse {
    #[serde(default)]
    delegation_responses: Vec<DelegationResponse>,
}

#[derive(Debug, Deserialize)]
struct DelegationResponse {
    balance: Coin,
}

/// Cosmos-SDK chain read through its LCD (REST) endpoint.
pub struct CosmosSdkChain {
    network: Network,
    currency: &'static CurrencyMeta,
    denom: &'static str,
    prefix: &'static str,
    tokens: &'static [TokenInfo],
    lcd_url: String,
    client: Client,
    prices: Arc<dyn PriceFeed>,
}

impl CosmosSdkChain {
    pub fn new(network: Network, lcd_url: &str, prices: Arc<dyn PriceFeed>) -> Result<Self> {
        let denom = native_denom_for(network)
            .ok_or_else(|| AppError::Internal(format!("{} is not a Cosmos-SDK network", network)))?;
        let prefix = network
            .bech32_prefix()
            .ok_or_else(|| AppError::Internal(format!("{} has no bech32 prefix", network)))?;
        let client = Client::builder()
            .timeout(Duration::from_secs(ADAPTER_HTTP_TIMEOUT_SECS))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            network,
            currency: currency_for(network),
            denom,
            prefix,
            tokens: tokens_for(network),
            lcd_url: lcd_url.trim_end_matches('/').to_string(),
            client,
            prices,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let url = format!("{}{}", self.lcd_url, path);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))?;
        if !response.status().is_success() {
            return Err(AppError::NetworkUnavailable(format!(
                "{} {} returned {}",
                self.network,
                path,
                response.status()
            )));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| AppError::NetworkUnavailable(e.to_string()))
    }

    // Follows `pagination.next_key` until the LCD reports the last page.
    async fn all_balances(&self, address: &WalletAddress) -> Result<Vec<Coin>> {
        let base = format!("/cosmos/bank/v1beta1/balances/{}", address);
        let mut coins = Vec::new();
        let mut next_key: Option<String> = None;

        for _ in 0..LCD_MAX_BALANCE_PAGES {
            let path = match &next_key {
                Some(key) => format!(
                    "{}?pagination.key={}",
                    base,
                    url::form_urlencoded::byte_serialize(key.as_bytes()).collect::<String>()
                ),
                None => base.clone(),
            };
            let page: AllBalancesResponse = self.get_json(&path).await?;
            coins.extend(page.balances);

            next_key = page
                .pagination
                .and_then(|p| p.next_key)
                .filter(|key| !key.is_empty());
            if next_key.is_none() {
                return Ok(coins);
            }
        }

        tracing::warn!(
            "{} balances for {} truncated after {} pages",
            self.network,
            address,
            LCD_MAX_BALANCE_PAGES
        );
        Ok(coins)
    }

    fn token_record(
        &self,
        address: &WalletAddress,
        token: &TokenInfo,
        amount: Decimal,
    ) -> BalanceRecord {
        BalanceRecord {
            wallet_address: address.clone(),
            network: self.network,
            symbol: token.symbol.to_string(),
            name: token.name.to_string(),
            logo_uri: token.logo.map(str::to_string),
            coin_gecko_id: token.coin_gecko_id.map(str::to_string),
            amount,
            delegated_amount: Decimal::ZERO,
            price_usd: None,
            asset_address: Some(token.address.to_string()),
            asset_type: Some(ASSET_TYPE_COSMOS_DENOM.to_string()),
        }
    }
}

#[async_trait]
impl ChainAdapter for CosmosSdkChain {
    fn network(&self) -> Network {
        self.network
    }

    fn currency(&self) -> &CurrencyMeta {
        self.currency
    }

    fn bech32_prefix(&self) -> Option<&str> {
        Some(self.prefix)
    }

    async fn get_balance(&self, address: &WalletAddress) -> Result<Decimal> {
        let path = format!(
            "/cosmos/bank/v1beta1/balances/{}/by_denom?denom={}",
            address, self.denom
        );
        let payload: BalanceByDenomResponse = self.get_json(&path).await?;
        match payload.balance {
            Some(coin) => parse_raw_amount(&coin.amount, self.currency.decimals),
            None => Ok(Decimal::ZERO),
        }
    }

    fn delegations(&self) -> Option<&dyn DelegationSource> {
        Some(self)
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
impl DelegationSource for CosmosSdkChain {
    async fn get_delegations(&self, address: &WalletAddress) -> Result<Decimal> {
        let path = format!("/cosmos/staking/v1beta1/delegations/{}", address);
        let payload: DelegationsResponse = self.get_json(&path).await?;
        sum_delegations(&payload, self.denom, self.currency.decimals)
    }
}

#[async_trait]
impl TokenBalanceSource for CosmosSdkChain {
    async fn get_token_balances(&self, address: &WalletAddress) -> Result<Vec<BalanceRecord>> {
        let coins = self.all_balances(address).await?;

        let mut records = Vec::new();
        for coin in &coins {
            if coin.denom == self.denom {
                continue;
            }
            // Denoms outside the catalog have no symbol/decimals to report.
            let Some(token) = self.tokens.iter().find(|t| t.address == coin.denom) else {
                continue;
            };
            match parse_raw_amount(&coin.amount, token.decimals) {
                Ok(amount) if amount > Decimal::ZERO => {
                    records.push(self.token_record(address, token, amount));
                }
                Ok(_) => {}
                Err(err) => {
                    tracing::debug!("{} skipping denom {}: {}", self.network, coin.denom, err);
                }
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl CurrencyPriceSource for CosmosSdkChain {
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

// Internal helper that sums delegated amounts of the staking denom.
fn sum_delegations(payload: &DelegationsResponse, denom: &str, decimals: u32) -> Result<Decimal> {
    let mut total = Decimal::ZERO;
    for delegation in &payload.delegation_responses {
        if delegation.balance.denom != denom {
            continue;
        }
        total += parse_raw_amount(&delegation.balance.amount, decimals)?;
    }
    Ok(total)
}
