pub mod orderbook;
