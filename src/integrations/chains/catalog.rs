// Static currency and token metadata per network.

use crate::models::{CurrencyMeta, Network};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenInfo {
    pub symbol: &'static str,
    pub name: &'static str,
    /// Contract address (EVM) or bank denom (Cosmos-SDK).
    pub address: &'static str,
    pub decimals: u32,
    pub logo: Option<&'static str>,
    pub coin_gecko_id: Option<&'static str>,
}

pub const ETHEREUM_CURRENCY: CurrencyMeta = CurrencyMeta {
    symbol: "ETH",
    name: "Ethereum",
    logo: Some("https://assets.coingecko.com/coins/images/279/large/ethereum.png"),
    coin_gecko_id: Some("ethereum"),
    decimals: 18,
};

pub const KLAYTN_CURRENCY: CurrencyMeta = CurrencyMeta {
    symbol: "KLAY",
    name: "Klaytn",
    logo: Some("https://assets.coingecko.com/coins/images/9672/large/klaytn.png"),
    coin_gecko_id: Some("klay-token"),
    decimals: 18,
};

pub const COSMOS_HUB_CURRENCY: CurrencyMeta = CurrencyMeta {
    symbol: "ATOM",
    name: "Cosmos Hub",
    logo: Some("https://assets.coingecko.com/coins/images/1481/large/cosmos_hub.png"),
    coin_gecko_id: Some("cosmos"),
    decimals: 6,
};

pub const OSMOSIS_CURRENCY: CurrencyMeta = CurrencyMeta {
    symbol: "OSMO",
    name: "Osmosis",
    logo: Some("https://assets.coingecko.com/coins/images/16724/large/osmo.png"),
    coin_gecko_id: Some("osmosis"),
    decimals: 6,
};

pub const ETHEREUM_TOKENS: &[TokenInfo] = &[
    TokenInfo {
        symbol: "USDC",
        name: "USD Coin",
        address: "0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48",
        decimals: 6,
        logo: Some("https://assets.coingecko.com/coins/images/6319/large/usdc.png"),
        coin_gecko_id: Some("usd-coin"),
    },
    TokenInfo {
        symbol: "USDT",
        name: "Tether",
        address: "0xdac17f958d2ee523a2206206994597c13d831ec7",
        decimals: 6,
        logo: Some("https://assets.coingecko.com/coins/images/325/large/tether.png"),
        coin_gecko_id: Some("tether"),
    },
    TokenInfo {
        symbol: "WBTC",
        name: "Wrapped Bitcoin",
        address: "0x2260fac5e5542a773aa44fbcfedf7c193bc2c599",
        decimals: 8,
        logo: Some("https://assets.coingecko.com/coins/images/7598/large/wrapped_bitcoin_wbtc.png"),
        coin_gecko_id: Some("wrapped-bitcoin"),
    },
    TokenInfo {
        symbol: "DAI",
        name: "Dai",
        address: "0x6b175474e89094c44da98b954eedeac495271d0f",
        decimals: 18,
        logo: Some("https://assets.coingecko.com/coins/images/9956/large/dai.png"),
        coin_gecko_id: Some("dai"),
    },
];

// ATOM bridged over IBC shares the Cosmos Hub identity so it aggregates with native ATOM.
pub const OSMOSIS_TOKENS: &[TokenInfo] = &[
    TokenInfo {
        symbol: "ATOM",
        name: "Cosmos Hub",
        address: "ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2",
        decimals: 6,
        logo: Some("https://assets.coingecko.com/coins/images/1481/large/cosmos_hub.png"),
        coin_gecko_id: Some("cosmos"),
    },
    TokenInfo {
        symbol: "USDC",
        name: "USD Coin",
        address: "ibc/D189335C6E4A68B513C10AB227BF1C1D38C746766278BA3EEB4FB14124F1D858",
        decimals: 6,
        logo: Some("https://assets.coingecko.com/coins/images/6319/large/usdc.png"),
        coin_gecko_id: Some("usd-coin"),
    },
    TokenInfo {
        symbol: "ION",
        name: "Ion",
        address: "uion",
        decimals: 6,
        logo: None,
        coin_gecko_id: Some("ion"),
    },
];

pub fn currency_for(network: Network) -> &'static CurrencyMeta {
    match network {
        Network::Ethereum => &ETHEREUM_CURRENCY,
        Network::Klaytn => &KLAYTN_CURRENCY,
        Network::CosmosHub => &COSMOS_HUB_CURRENCY,
        Network::Osmosis => &OSMOSIS_CURRENCY,
    }
}

pub fn tokens_for(network: Network) -> &'static [TokenInfo] {
    match network {
        Network::Ethereum => ETHEREUM_TOKENS,
        Network::Osmosis => OSMOSIS_TOKENS,
        Network::Klaytn | Network::CosmosHub => &[],
    }
}

/// Bank denom of a Cosmos-SDK network's staking currency.
pub fn native_denom_for(network: Network) -> Option<&'static str> {
    match network {
        Network::CosmosHub => Some("uatom"),
        Network::Osmosis => Some("uosmo"),
        Network::Ethereum | Network::Klaytn => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ethereum_token_addresses_are_lowercase_hex() {
        for token in ETHEREUM_TOKENS {
            assert!(crate::crypto::address::is_valid_evm_address(token.address));
            assert_eq!(token.address, token.address.to_lowercase());
        }
    }

    #[test]
    fn only_cosmos_networks_have_denoms() {
        assert_eq!(native_denom_for(Network::Osmosis), Some("uosmo"));
        assert_eq!(native_denom_for(Network::Ethereum), None);
        assert!(tokens_for(Network::Klaytn).is_empty());
    }
}
