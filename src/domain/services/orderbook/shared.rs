//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Lock-based alternative to the worker thread: a cloneable handle to one OrderBook
// behind a parking_lot RwLock. Mutating operations take the write lock for their whole
// duration, so each one appears atomic to every other handle.
//--------------------------------------------------------------------------------------------------

use std::sync::Arc;

use parking_lot::RwLock;
use rust_decimal::Decimal;

use super::depth::DepthSnapshot;
use super::orderbook::OrderBook;
use super::OrderbookResult;
use crate::domain::models::orderbook::{MarketOrderOutcome, TopOfBook};
use crate::domain::models::types::{Order, OrderId};

/// Implements a thread-safe shared order book that can be used across threads
#[derive(Debug, Clone, Default)]
pub struct SharedOrderBook(Arc<RwLock<OrderBook>>);

impl SharedOrderBook {
    pub fn new() -> Self {
        Self::from_book(OrderBook::new())
    }

    pub fn from_book(book: OrderBook) -> Self {
        Self(Arc::new(RwLock::new(book)))
    }

    /// Rests a limit order (acquires write lock)
    pub fn place_limit_order(&self, price: Decimal, order: Order) -> OrderbookResult<()> {
        self.0.write().place_limit_order(price, order)
    }

    /// Executes a market order (acquires write lock)
    pub fn place_market_order(&self, mut order: Order) -> OrderbookResult<MarketOrderOutcome> {
        let matches = self.0.write().place_market_order(&mut order)?;
        Ok(MarketOrderOutcome { order, matches })
    }

    /// Cancels a resting order (acquires write lock)
    pub fn cancel_order(&self, order_id: OrderId) -> OrderbookResult<Order> {
        self.0.write().cancel_order(order_id)
    }

    /// Acquires read lock
    pub fn top_of_book(&self) -> TopOfBook {
        self.0.read().top_of_book()
    }

    /// Acquires read lock
    pub fn depth(&self, levels: usize) -> DepthSnapshot {
        self.0.read().depth(levels)
    }

    /// Runs `f` with shared access to the book.
    pub fn read<R>(&self, f: impl FnOnce(&OrderBook) -> R) -> R {
        f(&self.0.read())
    }

    /// Runs `f` with exclusive access to the book, so several operations can be
    /// applied without another handle interleaving.
    pub fn write<R>(&self, f: impl FnOnce(&mut OrderBook) -> R) -> R {
        f(&mut self.0.write())
    }
}
