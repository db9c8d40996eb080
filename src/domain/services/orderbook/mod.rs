use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use thiserror::Error;

use crate::domain::models::types::OrderId;

pub mod book_side;
pub mod depth;
pub mod limit;
pub mod orderbook;
pub mod orderbook_worker;
pub mod shared;

/// Most decimal places an order size may carry.
pub const MAX_SIZE_SCALE: u32 = 8;

/// Ceiling on the resting volume of one book side (10^20).
///
/// Together with [`MAX_SIZE_SCALE`] this keeps every level and side total within
/// 28 significant digits, so volume arithmetic is exact and cannot overflow.
pub const MAX_SIDE_VOLUME: Decimal = dec!(100000000000000000000);

/// Errors that can occur within the order book.
///
/// Every variant is recoverable. Book operations detect these before touching
/// any state, so a returned error means the book is unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderbookError {
    /// Non-positive size or price, a size finer than `MAX_SIZE_SCALE`, a side total
    /// that would pass `MAX_SIDE_VOLUME`, or an id that is already resting.
    #[error("Invalid order: {0}")]
    InvalidOrder(String),

    /// A market order asked for more than the opposite side holds.
    #[error("Insufficient liquidity: requested {requested}, available {available}")]
    InsufficientLiquidity {
        requested: Decimal,
        available: Decimal,
    },

    /// Cancel referenced an order that is not resting.
    #[error("Order {0} is not resting in the book")]
    UnknownOrder(OrderId),

    /// The worker thread owning the book is gone.
    #[error("Order book worker unavailable: {0}")]
    WorkerUnavailable(String),
}

/// Type alias for Result with OrderbookError
pub type OrderbookResult<T> = Result<T, OrderbookError>;
