// Address normalization across network encodings.

use bech32::{Bech32, Hrp};

use crate::{
    error::{AppError, Result},
    models::WalletAddress,
};

/// Re-encodes a bech32 address under `target_prefix`.
///
/// Only the human-readable prefix changes: the data part (the account's
/// public-key hash) is decoded independent of the source prefix and encoded
/// again unchanged, so one wallet can be queried on every Cosmos-SDK chain.
pub fn to_network_format(address: &WalletAddress, target_prefix: &str) -> Result<WalletAddress> {
    let (_, data) = bech32::decode(address.as_str())
        .map_err(|e| AppError::MalformedAddress(format!("{}: {}", address, e)))?;
    let hrp = Hrp::parse(target_prefix).map_err(|e| {
        AppError::MalformedAddress(format!("invalid prefix {}: {}", target_prefix, e))
    })?;
    let encoded = bech32::encode::<Bech32>(hrp, &data)
        .map_err(|e| AppError::MalformedAddress(format!("{}: {}", address, e)))?;
    Ok(WalletAddress::new(encoded))
}

/// Human-readable prefix of a bech32 address, if it decodes.
pub fn bech32_prefix_of(address: &WalletAddress) -> Option<String> {
    bech32::decode(address.as_str())
        .ok()
        .map(|(hrp, _)| hrp.to_string().to_lowercase())
}

// Internal helper that checks conditions for `is_valid_evm_address`.
pub fn is_valid_evm_address(value: &str) -> bool {
    value.starts_with("0x")
        && value.len() == 42
        && value[2..].chars().all(|c| c.is_ascii_hexdigit())
}

/// Rejects EVM addresses that are not `0x` + 40 hex characters.
pub fn validate_evm_address(address: &WalletAddress) -> Result<()> {
    if is_valid_evm_address(address.as_str()) {
        return Ok(());
    }
    Err(AppError::InvalidAddress(format!(
        "{} (expected 0x + 40 hex chars)",
        address
    )))
}
