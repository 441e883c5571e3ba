use axum::http::HeaderValue;
use axum::{routing::get, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod constants;
mod crypto;
mod db;
mod error;
mod integrations;
mod models;
mod services;

use config::Config;
use constants::API_VERSION;
use db::{Database, InMemoryWalletStore, WalletStore};
use integrations::{ChainRegistry, CoinGeckoClient};
use services::{BalanceFetcher, PriceFeed, StaticPriceFeed};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "bento_backend=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = Config::from_env()?;
    config.validate()?;

    tracing::info!("Starting Bento portfolio backend");
    tracing::info!("Environment: {}", config.environment);
    tracing::info!("API Version: {}", API_VERSION);

    // Price feed shared by adapters and the portfolio endpoint
    let prices: Arc<dyn PriceFeed> = if config.coingecko_api_url.trim().is_empty() {
        Arc::new(StaticPriceFeed::default())
    } else {
        Arc::new(CoinGeckoClient::from_config(&config)?)
    };

    // Chain adapters, built once and shared read-only
    let registry = Arc::new(ChainRegistry::from_config(&config, prices.clone())?);
    if registry.is_empty() {
        tracing::warn!("No chain adapters configured; every balance query will be empty");
    } else {
        tracing::info!("Chain adapters: {:?}", registry.networks());
    }
    let fetcher = BalanceFetcher::from_config(registry.clone(), &config);

    // Wallet store: Postgres when configured, in-memory otherwise
    let (db, wallets): (Option<Database>, Arc<dyn WalletStore>) = match &config.database_url {
        Some(_) => {
            let db = Database::new(&config).await?;
            tracing::info!("Running database migrations...");
            db.run_migrations().await?;
            (Some(db.clone()), Arc::new(db))
        }
        None => (None, Arc::new(InMemoryWalletStore::new())),
    };

    let app_state = api::AppState {
        registry,
        fetcher,
        wallets,
        prices,
        db,
        config: config.clone(),
    };

    // Build router
    let app = build_router(app_state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: api::AppState) -> Router {
    // CORS configuration
    let cors = cors_from_config(&state.config);

    Router::new()
        // Health check
        .route("/health", get(api::health::health_check))
        // Balances
        .route(
            "/balances/{network}/{wallet_address}",
            get(api::balances::get_balances),
        )
        // Portfolio
        .route(
            "/api/v1/portfolio/{user_id}",
            get(api::portfolio::get_portfolio),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

fn cors_from_config(config: &Config) -> CorsLayer {
    let raw = config.cors_allowed_origins.trim();
    if raw.is_empty() || raw == "*" {
        return CorsLayer::very_permissive();
    }

    let allowed: Vec<HeaderValue> = raw
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .filter_map(|s| s.parse::<HeaderValue>().ok())
        .collect();

    if allowed.is_empty() {
        tracing::warn!("No valid CORS origins parsed; falling back to permissive");
        return CorsLayer::very_permissive();
    }

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(allowed))
        .allow_methods(Any)
        .allow_headers(Any)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use tower::ServiceExt;

    async fn health_origin_header(cors_origins: &str, origin: &str) -> Option<String> {
        let mut state = api::test_support::state(Vec::new(), InMemoryWalletStore::new());
        state.config.cors_allowed_origins = cors_origins.to_string();
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .header(header::ORIGIN, origin)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        response
            .headers()
            .get(header::ACCESS_CONTROL_ALLOW_ORIGIN)
            .map(|value| value.to_str().unwrap().to_string())
    }

    #[tokio::test]
    async fn cors_allows_listed_origins_only() {
        let origins = "https://bento.finance, https://app.bento.finance";
        assert_eq!(
            health_origin_header(origins, "https://app.bento.finance").await,
            Some("https://app.bento.finance".to_string())
        );
        assert_eq!(health_origin_header(origins, "https://evil.example").await, None);
    }

    #[tokio::test]
    async fn wildcard_cors_mirrors_any_origin() {
        assert_eq!(
            health_origin_header("*", "https://evil.example").await,
            Some("https://evil.example".to_string())
        );
        assert_eq!(
            health_origin_header("", "https://bento.finance").await,
            Some("https://bento.finance".to_string())
        );
    }

    #[tokio::test]
    async fn router_serves_balances_for_unknown_network() {
        let state = api::test_support::state(Vec::new(), InMemoryWalletStore::new());
        let response = build_router(state)
            .oneshot(
                Request::builder()
                    .uri("/balances/solana/0xabc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }
}
