pub mod address;

pub use address::{to_network_format, validate_evm_address};
