use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::{
    BECH32_PREFIX_COSMOS_HUB, BECH32_PREFIX_OSMOSIS, NETWORK_COSMOS_HUB, NETWORK_ETHEREUM,
    NETWORK_KLAYTN, NETWORK_OSMOSIS,
};
use crate::error::AppError;

// ==================== NETWORK ====================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Network {
    Ethereum,
    Klaytn,
    CosmosHub,
    Osmosis,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkFamily {
    Evm,
    CosmosSdk,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Ethereum,
        Network::Klaytn,
        Network::CosmosHub,
        Network::Osmosis,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            Network::Ethereum => NETWORK_ETHEREUM,
            Network::Klaytn => NETWORK_KLAYTN,
            Network::CosmosHub => NETWORK_COSMOS_HUB,
            Network::Osmosis => NETWORK_OSMOSIS,
        }
    }

    pub fn family(&self) -> NetworkFamily {
        match self {
            Network::Ethereum | Network::Klaytn => NetworkFamily::Evm,
            Network::CosmosHub | Network::Osmosis => NetworkFamily::CosmosSdk,
        }
    }

    /// Bech32 prefix for prefix-addressed networks.
    pub fn bech32_prefix(&self) -> Option<&'static str> {
        match self {
            Network::CosmosHub => Some(BECH32_PREFIX_COSMOS_HUB),
            Network::Osmosis => Some(BECH32_PREFIX_OSMOSIS),
            Network::Ethereum | Network::Klaytn => None,
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Network {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Network::ALL
            .iter()
            .copied()
            .find(|network| network.id() == normalized)
            .ok_or(AppError::UnsupportedNetwork(normalized))
    }
}

/// Which networks a fetch should cover.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkScope {
    Only(Network),
    All,
}

impl NetworkScope {
    pub fn includes(&self, network: Network) -> bool {
        match self {
            NetworkScope::Only(only) => *only == network,
            NetworkScope::All => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn network_parses_case_insensitively() {
        assert_eq!("Cosmos-Hub".parse::<Network>().unwrap(), Network::CosmosHub);
        assert_eq!("ETHEREUM".parse::<Network>().unwrap(), Network::Ethereum);
    }

    #[test]
    fn unknown_network_is_unsupported() {
        let err = "solana".parse::<Network>().unwrap_err();
        assert!(matches!(err, AppError::UnsupportedNetwork(ref id) if id == "solana"));
    }

    #[test]
    fn only_cosmos_networks_carry_prefix() {
        assert_eq!(Network::Osmosis.bech32_prefix(), Some("osmo"));
        assert_eq!(Network::Klaytn.bech32_prefix(), None);
        assert_eq!(Network::Klaytn.family(), NetworkFamily::Evm);
    }

    #[test]
    fn scope_all_includes_every_network() {
        assert!(Network::ALL.iter().all(|n| NetworkScope::All.includes(*n)));
        assert!(!NetworkScope::Only(Network::Osmosis).includes(Network::CosmosHub));
    }
}
