pub mod ids;
pub mod orderbook;
pub mod types;
