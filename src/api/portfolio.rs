use axum::{
    extract::{Path, State},
    Json,
};

use super::AppState;
use crate::{
    error::{AppError, Result},
    models::{ApiResponse, NetworkScope, PortfolioView},
    services::{
        aggregation::{aggregate, total_net_worth},
        pricing::fill_missing_prices,
    },
};

/// GET /api/v1/portfolio/{user_id}
pub async fn get_portfolio(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> Result<Json<ApiResponse<PortfolioView>>> {
    let user_id = user_id.trim();
    if user_id.is_empty() {
        return Err(AppError::BadRequest("userId is required".to_string()));
    }

    let wallets = state.wallets.get_wallets_for_user(user_id).await?;
    if wallets.is_empty() {
        tracing::debug!("No wallets registered for user {}", user_id);
        return Ok(Json(ApiResponse::success(PortfolioView {
            net_worth_usd: Default::default(),
            assets: Vec::new(),
            failures: Vec::new(),
        })));
    }

    let mut outcome = state.fetcher.fetch(&wallets, NetworkScope::All).await;
    fill_missing_prices(&mut outcome.records, state.prices.as_ref()).await;

    let assets = aggregate(&outcome.records, state.config.minimal_net_worth);
    let view = PortfolioView {
        net_worth_usd: total_net_worth(&assets),
        assets,
        failures: outcome.failures,
    };

    tracing::info!(
        "Portfolio for {}: {} wallets, {} assets, net worth {}",
        user_id,
        wallets.len(),
        view.assets.len(),
        view.net_worth_usd
    );

    Ok(Json(ApiResponse::success(view)))
}
