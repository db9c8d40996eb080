//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module implements a limit order book for a single trading instrument.
// It maintains bid and ask orders in price-time priority (FIFO) order and
// matches market orders against them.
//
// | Component     | Description                                                               |
// |--------------|---------------------------------------------------------------------------|
// | OrderBook    | Both book sides plus the order id index                                    |
// | BookSide     | Price-ordered Limits for one side                                          |
// | Limit        | FIFO queue of orders at one price                                          |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                  | Description                               | Return Type                  |
// |-----------------------|-------------------------------------------|------------------------------|
// | new                   | Creates an empty OrderBook                | OrderBook                    |
// | place_limit_order     | Rests an order at a price, never matches  | OrderbookResult<()>          |
// | place_market_order    | Takes liquidity best price first          | OrderbookResult<Vec<Match>>  |
// | cancel_order          | Removes a resting order                   | OrderbookResult<Order>       |
// | bid_total_volume      | Resting bid volume                        | Decimal                      |
// | ask_total_volume      | Resting ask volume                        | Decimal                      |
// | best_bid / best_ask   | Top of each side                          | Option<Decimal>              |
// | depth                 | Aggregated levels per side                | DepthSnapshot                |
//
//--------------------------------------------------------------------------------------------------
// TESTS
//--------------------------------------------------------------------------------------------------
// | Name                                | Description                                        |
// |-------------------------------------|----------------------------------------------------|
// | test_empty_orderbook                | Verifies initial empty state                       |
// | test_place_limit_order              | Levels, volumes and cancel on the ask side         |
// | test_place_market_order             | Single match against one resting ask               |
// | test_place_market_order_multi_fill  | Sweeps several bid levels, prunes emptied ones     |
// | test_cancel_order                   | Cancel prunes its level; market hits the next one  |
// | test_insufficient_liquidity         | Rejected market order leaves the book untouched    |
// | test_invalid_orders                 | Size, price and duplicate id validation            |
// | test_side_volume_ceiling            | Oversized orders rejected, no panic, book intact   |
// | test_size_scale_limit               | Sizes finer than MAX_SIZE_SCALE rejected           |
// | test_limit_orders_do_not_cross      | Crossing limit orders rest without matching        |
//--------------------------------------------------------------------------------------------------

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use super::book_side::BookSide;
use super::depth::DepthSnapshot;
use super::limit::Limit;
use super::{MAX_SIDE_VOLUME, MAX_SIZE_SCALE, OrderbookError, OrderbookResult};
use crate::domain::models::orderbook::TopOfBook;
use crate::domain::models::types::{Match, Order, OrderId, Side};

/// The main order book structure that maintains bid and ask orders in price-time priority.
///
/// The book is a single-writer structure: every operation takes `&mut self` and
/// runs to completion. Front it with
/// [`OrderBookWorker`](super::orderbook_worker::OrderBookWorker) or
/// [`SharedOrderBook`](super::shared::SharedOrderBook) when several tasks submit
/// commands.
#[derive(Debug, Clone)]
pub struct OrderBook {
    /// Bid side, best (highest) price first
    bids: BookSide,
    /// Ask side, best (lowest) price first
    asks: BookSide,
    /// O(1) lookup of a resting order's location
    order_index: HashMap<OrderId, (Side, Decimal)>,
}

impl Default for OrderBook {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderBook {
    pub fn new() -> Self {
        Self {
            bids: BookSide::new(Side::Bid),
            asks: BookSide::new(Side::Ask),
            order_index: HashMap::new(),
        }
    }

    /// Rests an order at `price` on its own side. No matching takes place, even
    /// if the price crosses the opposite side.
    ///
    /// # Errors
    /// * `InvalidOrder` - if the price or size is not positive, the size has more
    ///   than `MAX_SIZE_SCALE` decimal places, the side would pass `MAX_SIDE_VOLUME`,
    ///   the order is in a terminal state, or its id is already resting
    pub fn place_limit_order(&mut self, price: Decimal, order: Order) -> OrderbookResult<()> {
        if price <= Decimal::ZERO {
            return Err(OrderbookError::InvalidOrder(format!(
                "price must be positive, got {price}"
            )));
        }
        self.validate_new_order(&order)?;

        let order_id = order.id();
        let side = order.side();
        let size = order.remaining_size();

        let resting = self.side(side).total_volume();
        match resting.checked_add(size) {
            Some(total) if total <= MAX_SIDE_VOLUME => {}
            _ => {
                return Err(OrderbookError::InvalidOrder(format!(
                    "size {size} would take {side} volume past {MAX_SIDE_VOLUME} (resting {resting})"
                )));
            }
        }

        self.side_mut(side).add_order(price, order);
        self.order_index.insert(order_id, (side, price));

        debug!(order_id = %order_id, %side, %price, %size, "limit order rested");
        Ok(())
    }

    /// Executes `order` immediately against the opposite side, best price first.
    ///
    /// The order never rests. On success it is completely filled and the matches
    /// are returned in execution order.
    ///
    /// # Errors
    /// * `InvalidOrder` - if the size is not positive, has more than `MAX_SIZE_SCALE`
    ///   decimal places, or the id is already resting
    /// * `InsufficientLiquidity` - if the opposite side holds less than the order's
    ///   size; the book is left untouched
    pub fn place_market_order(&mut self, order: &mut Order) -> OrderbookResult<Vec<Match>> {
        self.validate_new_order(order)?;

        let opposite = order.side().opposite();
        let available = self.side(opposite).total_volume();
        if order.remaining_size() > available {
            debug!(
                order_id = %order.id(),
                requested = %order.remaining_size(),
                %available,
                "market order rejected"
            );
            return Err(OrderbookError::InsufficientLiquidity {
                requested: order.remaining_size(),
                available,
            });
        }

        let matches = self.side_mut(opposite).sweep(order);

        for m in matches.iter().filter(|m| m.maker_filled()) {
            self.order_index.remove(&m.maker_order_id);
        }

        debug!(
            order_id = %order.id(),
            side = %order.side(),
            fills = matches.len(),
            remaining = %order.remaining_size(),
            "market order executed"
        );
        Ok(matches)
    }

    /// Removes a resting order from the book.
    ///
    /// The order's Limit is pruned if this was its last member.
    ///
    /// # Returns
    /// * `Ok(Order)` - The removed order, marked cancelled
    /// * `Err(OrderbookError::UnknownOrder)` - If the id is not resting
    pub fn cancel_order(&mut self, order_id: OrderId) -> OrderbookResult<Order> {
        let (side, price) = *self
            .order_index
            .get(&order_id)
            .ok_or(OrderbookError::UnknownOrder(order_id))?;

        let mut order = self
            .side_mut(side)
            .remove_order(price, order_id)
            .ok_or(OrderbookError::UnknownOrder(order_id))?;
        self.order_index.remove(&order_id);

        order.mark_cancelled();
        debug!(order_id = %order_id, %side, %price, "order cancelled");
        Ok(order)
    }

    fn validate_new_order(&self, order: &Order) -> OrderbookResult<()> {
        if order.remaining_size() <= Decimal::ZERO {
            return Err(OrderbookError::InvalidOrder(format!(
                "size must be positive, got {}",
                order.remaining_size()
            )));
        }
        if order.remaining_size().normalize().scale() > MAX_SIZE_SCALE {
            return Err(OrderbookError::InvalidOrder(format!(
                "size {} has more than {MAX_SIZE_SCALE} decimal places",
                order.remaining_size()
            )));
        }
        if order.status().is_terminal() {
            return Err(OrderbookError::InvalidOrder(format!(
                "order {} is already {:?}",
                order.id(),
                order.status()
            )));
        }
        if self.order_index.contains_key(&order.id()) {
            return Err(OrderbookError::InvalidOrder(format!(
                "order {} is already resting",
                order.id()
            )));
        }
        Ok(())
    }

    #[inline]
    pub fn side(&self, side: Side) -> &BookSide {
        match side {
            Side::Bid => &self.bids,
            Side::Ask => &self.asks,
        }
    }

    #[inline]
    fn side_mut(&mut self, side: Side) -> &mut BookSide {
        match side {
            Side::Bid => &mut self.bids,
            Side::Ask => &mut self.asks,
        }
    }

    pub fn bid_total_volume(&self) -> Decimal {
        self.bids.total_volume()
    }

    pub fn ask_total_volume(&self) -> Decimal {
        self.asks.total_volume()
    }

    /// Highest bid price, if any.
    #[inline]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.best_price()
    }

    /// Lowest ask price, if any.
    #[inline]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.best_price()
    }

    /// Best ask minus best bid, when both sides are populated.
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn top_of_book(&self) -> TopOfBook {
        TopOfBook {
            best_bid: self.best_bid(),
            best_ask: self.best_ask(),
            bid_volume: self.bid_total_volume(),
            ask_volume: self.ask_total_volume(),
        }
    }

    /// Ask Limits, lowest price first.
    pub fn asks(&self) -> impl Iterator<Item = &Limit> {
        self.asks.levels()
    }

    /// Bid Limits, highest price first.
    pub fn bids(&self) -> impl Iterator<Item = &Limit> {
        self.bids.levels()
    }

    pub fn limit(&self, side: Side, price: Decimal) -> Option<&Limit> {
        self.side(side).get(price)
    }

    pub fn volume_at_price(&self, side: Side, price: Decimal) -> Option<Decimal> {
        self.limit(side, price).map(Limit::total_volume)
    }

    pub fn order_count_at_price(&self, side: Side, price: Decimal) -> usize {
        self.limit(side, price).map_or(0, Limit::order_count)
    }

    /// Looks up a resting order by id.
    pub fn order(&self, order_id: OrderId) -> Option<&Order> {
        let (side, price) = self.order_index.get(&order_id)?;
        self.limit(*side, *price)?.get_order(order_id)
    }

    pub fn contains_order(&self, order_id: OrderId) -> bool {
        self.order_index.contains_key(&order_id)
    }

    /// Number of resting orders across both sides.
    pub fn order_count(&self) -> usize {
        self.order_index.len()
    }

    /// Aggregated view of up to `levels` Limits per side.
    pub fn depth(&self, levels: usize) -> DepthSnapshot {
        DepthSnapshot::from_book(self, levels)
    }
}
