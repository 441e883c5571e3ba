use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::network::Network;

// ==================== WALLETS ====================

/// Wallet address text, lower-cased on construction so it can be used as a
/// map key or compared directly.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WalletAddress(String);

impl WalletAddress {
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().to_lowercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for WalletAddress {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

/// A wallet together with every network it should be queried on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletTarget {
    pub address: WalletAddress,
    pub networks: Vec<Network>,
}

impl WalletTarget {
    pub fn new(address: impl AsRef<str>, networks: Vec<Network>) -> Self {
        Self {
            address: WalletAddress::new(address),
            networks,
        }
    }
}

/// A wallet that could not be dispatched, e.g. because its address does not decode.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletFailure {
    pub wallet_address: WalletAddress,
    pub network: Network,
    pub code: String,
    pub message: String,
}

// ==================== CURRENCY ====================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrencyMeta {
    pub symbol: &'static str,
    pub name: &'static str,
    pub logo: Option<&'static str>,
    pub coin_gecko_id: Option<&'static str>,
    pub decimals: u32,
}

// ==================== BALANCE RECORD ====================

/// One adapter result for one wallet on one network.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRecord {
    pub wallet_address: WalletAddress,
    #[serde(rename = "platform")]
    pub network: Network,
    pub symbol: String,
    pub name: String,
    #[serde(rename = "logo", skip_serializing_if = "Option::is_none")]
    pub logo_uri: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_gecko_id: Option<String>,
    #[serde(rename = "balance")]
    pub amount: Decimal,
    #[serde(rename = "delegations")]
    pub delegated_amount: Decimal,
    #[serde(rename = "price", skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<Decimal>,
    #[serde(rename = "address", skip_serializing_if = "Option::is_none")]
    pub asset_address: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
}

impl BalanceRecord {
    /// Native-currency record; negative amounts are clamped to zero.
    pub fn native(
        wallet_address: WalletAddress,
        network: Network,
        currency: &CurrencyMeta,
        amount: Decimal,
        delegated_amount: Decimal,
        price_usd: Option<Decimal>,
    ) -> Self {
        Self {
            wallet_address,
            network,
            symbol: currency.symbol.to_string(),
            name: currency.name.to_string(),
            logo_uri: currency.logo.map(str::to_string),
            coin_gecko_id: currency.coin_gecko_id.map(str::to_string),
            amount: amount.max(Decimal::ZERO),
            delegated_amount: delegated_amount.max(Decimal::ZERO),
            price_usd,
            asset_address: None,
            asset_type: Some(crate::constants::ASSET_TYPE_NATIVE.to_string()),
        }
    }

    /// Amount held including staked/delegated units.
    pub fn held_amount(&self) -> Decimal {
        self.amount + self.delegated_amount
    }

    /// Asset identity used for grouping.
    pub fn identity_key(&self) -> (&str, &str) {
        (self.symbol.as_str(), self.name.as_str())
    }
}

// ==================== AGGREGATED ASSET ====================
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AggregatedAsset {
    pub symbol: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coin_gecko_id: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub asset_type: Option<String>,
    #[serde(rename = "address", skip_serializing_if = "Option::is_none")]
    pub asset_address: Option<String>,
    pub total_amount: Decimal,
    #[serde(rename = "priceUSD", skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<Decimal>,
    #[serde(rename = "netWorthUSD")]
    pub net_worth_usd: Decimal,
    pub source_records: Vec<BalanceRecord>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortfolioView {
    #[serde(rename = "netWorthUSD")]
    pub net_worth_usd: Decimal,
    pub assets: Vec<AggregatedAsset>,
    pub failures: Vec<WalletFailure>,
}

// ==================== API RESPONSE ====================
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
