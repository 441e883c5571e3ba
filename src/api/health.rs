use axum::{extract::State, Json};
use serde::Serialize;

use super::AppState;
use crate::models::Network;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: String,
    pub networks: Vec<Network>,
}

pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let database = match &state.db {
        Some(db) => {
            if db.pool().acquire().await.is_ok() {
                "connected".to_string()
            } else {
                "disconnected".to_string()
            }
        }
        None => state.wallets.backend().to_string(),
    };

    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database,
        networks: state.registry.networks(),
    })
}
