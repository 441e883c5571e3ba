use futures_util::future::join_all;
use rust_decimal::Decimal;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::{timeout_at, Instant};

use crate::{
    config::Config,
    crypto::{address::bech32_prefix_of, to_network_format, validate_evm_address},
    error::{AppError, Result},
    integrations::chains::{ChainAdapter, ChainRegistry},
    models::{
        BalanceRecord, Network, NetworkFamily, NetworkScope, WalletAddress, WalletFailure,
        WalletTarget,
    },
};

/// Flat result of one fetch: every record that settled plus the wallets
/// that could not be dispatched at all.
#[derive(Debug, Default)]
pub struct FetchOutcome {
    pub records: Vec<BalanceRecord>,
    pub failures: Vec<WalletFailure>,
}

/// Fans out adapter calls per (wallet, network) pair and collects the results.
///
/// Every adapter call holds a permit from a shared semaphore, and all calls of
/// one fetch share a single total deadline. A call still running when the
/// deadline passes degrades like any other failure, so each dispatched pair
/// always yields its native record.
#[derive(Clone)]
pub struct BalanceFetcher {
    registry: Arc<ChainRegistry>,
    permits: Arc<Semaphore>,
    deadline: Duration,
}

impl BalanceFetcher {
    pub fn new(registry: Arc<ChainRegistry>, max_inflight: usize, deadline: Duration) -> Self {
        Self {
            registry,
            permits: Arc::new(Semaphore::new(max_inflight.max(1))),
            deadline,
        }
    }

    pub fn from_config(registry: Arc<ChainRegistry>, config: &Config) -> Self {
        Self::new(
            registry,
            config.max_inflight_rpc,
            Duration::from_secs(config.fetch_deadline_secs),
        )
    }

    pub async fn fetch(&self, targets: &[WalletTarget], scope: NetworkScope) -> FetchOutcome {
        let deadline = Instant::now() + self.deadline;
        let mut outcome = FetchOutcome::default();
        let mut jobs = Vec::new();

        for target in targets {
            let mut networks: Vec<Network> = Vec::with_capacity(target.networks.len());
            for network in &target.networks {
                if scope.includes(*network) && !networks.contains(network) {
                    networks.push(*network);
                }
            }

            for network in networks {
                let Some(adapter) = self.registry.get(network) else {
                    tracing::debug!("No adapter for {}; skipping {}", network, target.address);
                    continue;
                };

                let address = match prepare_address(adapter.as_ref(), &target.address) {
                    Ok(address) => address,
                    Err(err) => {
                        tracing::warn!(
                            "Skipping wallet {} on {}: {}",
                            target.address,
                            network,
                            err
                        );
                        outcome.failures.push(WalletFailure {
                            wallet_address: target.address.clone(),
                            network,
                            code: err.code().to_string(),
                            message: err.to_string(),
                        });
                        continue;
                    }
                };

                let fetcher = self;
                jobs.push(async move {
                    fetcher
                        .fetch_pair(adapter.as_ref(), &address, deadline)
                        .await
                });
            }
        }

        let pairs = jobs.len();
        for records in join_all(jobs).await {
            outcome.records.extend(records);
        }

        tracing::info!(
            "Fetched {} records from {} wallet/network pairs ({} wallet failures)",
            outcome.records.len(),
            pairs,
            outcome.failures.len()
        );
        outcome
    }

    async fn fetch_pair(
        &self,
        adapter: &dyn ChainAdapter,
        address: &WalletAddress,
        deadline: Instant,
    ) -> Vec<BalanceRecord> {
        let network = adapter.network();

        let balance_fut = self.call(deadline, adapter.get_balance(address));
        let delegations_fut = async {
            match adapter.delegations() {
                Some(source) => self.call(deadline, source.get_delegations(address)).await,
                None => Ok(Decimal::ZERO),
            }
        };
        let tokens_fut = async {
            match adapter.token_balances() {
                Some(source) => {
                    self.call(deadline, source.get_token_balances(address))
                        .await
                }
                None => Ok(Vec::new()),
            }
        };
        let price_fut = async {
            match adapter.currency_price() {
                Some(source) => self
                    .call(deadline, source.get_currency_price())
                    .await
                    .map(Some),
                None => Ok(None),
            }
        };

        let (balance, delegated, tokens, price) =
            tokio::join!(balance_fut, delegations_fut, tokens_fut, price_fut);

        let balance = balance.unwrap_or_else(|err| {
            tracing::warn!("{} balance for {} degraded to 0: {}", network, address, err);
            Decimal::ZERO
        });
        let delegated = delegated.unwrap_or_else(|err| {
            tracing::warn!("{} delegations for {} degraded to 0: {}", network, address, err);
            Decimal::ZERO
        });
        let tokens = tokens.unwrap_or_else(|err| {
            tracing::warn!("{} token balances for {} unavailable: {}", network, address, err);
            Vec::new()
        });
        let price = price.unwrap_or_else(|err| {
            tracing::debug!("{} currency price unavailable: {}", network, err);
            None
        });

        let mut records = Vec::with_capacity(1 + tokens.len());
        records.push(BalanceRecord::native(
            address.clone(),
            network,
            adapter.currency(),
            balance,
            delegated,
            price,
        ));
        records.extend(tokens);
        records
    }

    // Waiting for a permit counts against the deadline too.
    async fn call<T>(
        &self,
        deadline: Instant,
        fut: impl Future<Output = Result<T>>,
    ) -> Result<T> {
        let guarded = async {
            let _permit = self
                .permits
                .acquire()
                .await
                .map_err(|_| AppError::Internal("fetch semaphore closed".to_string()))?;
            fut.await
        };
        timeout_at(deadline, guarded)
            .await
            .map_err(|_| AppError::NetworkUnavailable("fetch deadline passed".to_string()))?
    }
}

/// Splits a comma-joined wallet batch. Splitting is exact: no trimming, and
/// each element is lower-cased.
pub fn parse_wallet_batch(raw: &str) -> Vec<WalletAddress> {
    raw.split(',').map(WalletAddress::new).collect()
}

/// Targets for a batch where every wallet is queried on the same network.
pub fn targets_for_batch(raw: &str, network: Network) -> Vec<WalletTarget> {
    parse_wallet_batch(raw)
        .into_iter()
        .map(|address| WalletTarget {
            address,
            networks: vec![network],
        })
        .collect()
}

// Internal helper that re-encodes or validates a wallet for the adapter's network.
fn prepare_address(adapter: &dyn ChainAdapter, address: &WalletAddress) -> Result<WalletAddress> {
    if let Some(prefix) = adapter.bech32_prefix() {
        let converted = to_network_format(address, prefix)?;
        if bech32_prefix_of(address).as_deref() != Some(prefix) {
            tracing::debug!("Re-encoded {} as {}", address, converted);
        }
        return Ok(converted);
    }
    if adapter.network().family() == NetworkFamily::Evm {
        validate_evm_address(address)?;
    }
    Ok(address.clone())
}
