// External data sources: chain RPC/LCD endpoints and the price API.
pub mod chains;
pub mod coingecko;

pub use chains::ChainRegistry;
pub use coingecko::CoinGeckoClient;
