use axum::{
    extract::{Path, State},
    Json,
};
use std::str::FromStr;

use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{BalanceRecord, Network, NetworkScope, WalletFailure},
    services::balance_fetcher::targets_for_batch,
};

/// GET /balances/{network}/{wallet_address}
///
/// `wallet_address` may be a comma-joined batch. Unknown or unconfigured
/// networks answer with an empty list.
pub async fn get_balances(
    State(state): State<AppState>,
    Path((network, wallet_address)): Path<(String, String)>,
) -> Result<Json<Vec<BalanceRecord>>> {
    if wallet_address.trim().is_empty() {
        return Err(AppError::BadRequest("walletAddress is required".to_string()));
    }

    let network = match Network::from_str(&network) {
        Ok(network) => network,
        Err(err) => {
            tracing::debug!("{}", err);
            return Ok(Json(Vec::new()));
        }
    };
    if state.registry.get(network).is_none() {
        tracing::debug!("No adapter registered for {}", network);
        return Ok(Json(Vec::new()));
    }

    let targets = targets_for_batch(&wallet_address, network);
    let outcome = state
        .fetcher
        .fetch(&targets, NetworkScope::Only(network))
        .await;

    // A batch where every wallet failed to parse has nothing to report.
    if outcome.records.is_empty() && outcome.failures.len() == targets.len() {
        if let Some(failure) = outcome.failures.into_iter().next() {
            return Err(failure_to_error(failure));
        }
    }

    Ok(Json(outcome.records))
}

// Internal helper that turns a wallet failure back into a request error.
fn failure_to_error(failure: WalletFailure) -> AppError {
    match failure.code.as_str() {
        "INVALID_ADDRESS" => AppError::InvalidAddress(failure.message),
        _ => AppError::MalformedAddress(failure.message),
    }
}
