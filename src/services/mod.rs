// All service modules
pub mod aggregation;
pub mod balance_fetcher;
pub mod pricing;

// Re-export for convenience
pub use balance_fetcher::BalanceFetcher;
pub use pricing::{PriceFeed, StaticPriceFeed};
