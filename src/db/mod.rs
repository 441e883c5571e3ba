use async_trait::async_trait;
use sqlx::{postgres::PgPoolOptions, PgPool, Row};
use std::collections::HashMap;
use std::str::FromStr;
use tokio::sync::RwLock;

use crate::{
    config::Config,
    error::Result,
    models::{Network, WalletTarget},
};

/// Lookup of the wallets registered for a user.
#[async_trait]
pub trait WalletStore: Send + Sync {
    async fn get_wallets_for_user(&self, user_id: &str) -> Result<Vec<WalletTarget>>;

    fn backend(&self) -> &'static str;
}

#[derive(Clone)]
pub struct Database {
    pool: PgPool,
}

impl Database {
    pub async fn new(config: &Config) -> anyhow::Result<Self> {
        let url = config
            .database_url
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("DATABASE_URL is not set"))?;
        let pool = PgPoolOptions::new()
            .max_connections(config.database_max_connections)
            .connect(url)
            .await?;

        Ok(Self { pool })
    }

    pub async fn run_migrations(&self) -> anyhow::Result<()> {
        // migrations live at the crate root: ./migrations
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

// ==================== WALLET QUERIES ====================
#[async_trait]
impl WalletStore for Database {
    async fn get_wallets_for_user(&self, user_id: &str) -> Result<Vec<WalletTarget>> {
        let rows = sqlx::query(
            "SELECT address, networks FROM wallets
             WHERE user_id = $1
             ORDER BY created_at ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let mut wallets = Vec::with_capacity(rows.len());
        for row in rows {
            let address: String = row.get("address");
            let networks: Vec<String> = row.get("networks");
            wallets.push(WalletTarget::new(&address, parse_networks(&address, &networks)));
        }
        Ok(wallets)
    }

    fn backend(&self) -> &'static str {
        "postgres"
    }
}

// Internal helper that drops network ids this build has no variant for.
fn parse_networks(address: &str, ids: &[String]) -> Vec<Network> {
    ids.iter()
        .filter_map(|id| match Network::from_str(id) {
            Ok(network) => Some(network),
            Err(err) => {
                tracing::debug!("Ignoring network for wallet {}: {}", address, err);
                None
            }
        })
        .collect()
}

/// Wallet store used when no database is configured.
#[derive(Default)]
pub struct InMemoryWalletStore {
    wallets: RwLock<HashMap<String, Vec<WalletTarget>>>,
}

impl InMemoryWalletStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_wallet(&self, user_id: &str, wallet: WalletTarget) {
        let mut guard = self.wallets.write().await;
        let entries = guard.entry(user_id.to_string()).or_default();
        match entries.iter_mut().find(|w| w.address == wallet.address) {
            Some(existing) => {
                for network in wallet.networks {
                    if !existing.networks.contains(&network) {
                        existing.networks.push(network);
                    }
                }
            }
            None => entries.push(wallet),
        }
    }
}

#[async_trait]
impl WalletStore for InMemoryWalletStore {
    async fn get_wallets_for_user(&self, user_id: &str) -> Result<Vec<WalletTarget>> {
        Ok(self
            .wallets
            .read()
            .await
            .get(user_id)
            .cloned()
            .unwrap_or_default())
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}
