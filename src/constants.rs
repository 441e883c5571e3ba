/// Application constants
use rust_decimal::Decimal;

// Aggregation: assets worth this much or less are hidden (0.0001 USD)
pub const MINIMAL_NET_WORTH: Decimal = Decimal::from_parts(1, 0, 0, false, 4);

// Fetch orchestration
pub const DEFAULT_MAX_INFLIGHT_RPC: usize = 16;
pub const DEFAULT_FETCH_DEADLINE_SECS: u64 = 10;
pub const ADAPTER_HTTP_TIMEOUT_SECS: u64 = 6;
pub const LCD_MAX_BALANCE_PAGES: usize = 20;

// Price feed
pub const DEFAULT_PRICE_CACHE_TTL_SECS: u64 = 60;
pub const PRICE_CACHE_MAX_ENTRIES: usize = 10_000;

// Network ids
pub const NETWORK_ETHEREUM: &str = "ethereum";
pub const NETWORK_KLAYTN: &str = "klaytn";
pub const NETWORK_COSMOS_HUB: &str = "cosmos-hub";
pub const NETWORK_OSMOSIS: &str = "osmosis";

// Bech32 prefixes
pub const BECH32_PREFIX_COSMOS_HUB: &str = "cosmos";
pub const BECH32_PREFIX_OSMOSIS: &str = "osmo";

// Asset types reported on balance records
pub const ASSET_TYPE_NATIVE: &str = "native";
pub const ASSET_TYPE_ERC20: &str = "erc20";
pub const ASSET_TYPE_COSMOS_DENOM: &str = "denom";

// API version
pub const API_VERSION: &str = "v1";

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn minimal_net_worth_is_one_ten_thousandth() {
        assert_eq!(MINIMAL_NET_WORTH, Decimal::from_str("0.0001").unwrap());
    }
}
