// src/models/mod.rs
pub mod network;
pub mod portfolio;

pub use network::{Network, NetworkFamily, NetworkScope};
pub use portfolio::{
    AggregatedAsset, ApiResponse, BalanceRecord, CurrencyMeta, PortfolioView, WalletAddress,
    WalletFailure, WalletTarget,
};
