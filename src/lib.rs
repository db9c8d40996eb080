// Expose the modules
pub mod config;
pub mod domain;
pub mod inbounds;
pub mod logging;

// Re-export key types for easier usage
pub use domain::models::ids::{
    ClockIdGenerator, OrderFactory, OrderIdGenerator, SequentialIdGenerator,
};
pub use domain::models::orderbook::{MarketOrderOutcome, TopOfBook};
pub use domain::models::types::{Match, Order, OrderId, OrderStatus, Side};
pub use domain::services::orderbook::book_side::BookSide;
pub use domain::services::orderbook::depth::{DepthSnapshot, PriceLevel};
pub use domain::services::orderbook::limit::Limit;
pub use domain::services::orderbook::orderbook::OrderBook;
pub use domain::services::orderbook::orderbook_worker::{OrderBookClient, OrderBookWorker};
pub use domain::services::orderbook::shared::SharedOrderBook;
pub use domain::services::orderbook::{
    MAX_SIDE_VOLUME, MAX_SIZE_SCALE, OrderbookError, OrderbookResult,
};
