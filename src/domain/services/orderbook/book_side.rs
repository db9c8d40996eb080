//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// One side of the book: price -> Limit, kept in a BTreeMap so the price order is
// maintained on insert/remove instead of being re-sorted on every traversal.
// Asks are best-first ascending, bids best-first descending.
//--------------------------------------------------------------------------------------------------

use std::collections::BTreeMap;

use rust_decimal::Decimal;

use super::limit::Limit;
use crate::domain::models::types::{Match, Order, OrderId, Side};

/// Price-indexed Limits for one side of the book.
///
/// `total_volume` is kept in step with every add, remove and fill, so reading it
/// never re-sums the levels.
#[derive(Debug, Clone)]
pub struct BookSide {
    side: Side,
    limits: BTreeMap<Decimal, Limit>,
    total_volume: Decimal,
}

impl BookSide {
    pub fn new(side: Side) -> Self {
        Self {
            side,
            limits: BTreeMap::new(),
            total_volume: Decimal::ZERO,
        }
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    pub fn get(&self, price: Decimal) -> Option<&Limit> {
        self.limits.get(&price)
    }

    /// Appends `order` to the Limit at `price`, creating the Limit if absent.
    ///
    /// The caller has already checked that the new side total stays within
    /// [`MAX_SIDE_VOLUME`](super::MAX_SIDE_VOLUME).
    pub fn add_order(&mut self, price: Decimal, order: Order) {
        self.total_volume += order.remaining_size();
        self.limits
            .entry(price)
            .or_insert_with(|| Limit::new(price))
            .add_order(order);
    }

    /// Removes an order from the Limit at `price`, pruning the Limit if it empties.
    pub fn remove_order(&mut self, price: Decimal, order_id: OrderId) -> Option<Order> {
        let limit = self.limits.get_mut(&price)?;
        let order = limit.remove_order(order_id)?;
        if limit.is_empty() {
            self.limits.remove(&price);
        }
        self.total_volume -= order.remaining_size();
        Some(order)
    }

    /// Best price on this side: lowest ask or highest bid.
    pub fn best_price(&self) -> Option<Decimal> {
        match self.side {
            Side::Ask => self.limits.keys().next().copied(),
            Side::Bid => self.limits.keys().next_back().copied(),
        }
    }

    /// Limits in best-first order.
    pub fn levels(&self) -> Box<dyn Iterator<Item = &Limit> + '_> {
        match self.side {
            Side::Ask => Box::new(self.limits.values()),
            Side::Bid => Box::new(self.limits.values().rev()),
        }
    }

    fn levels_mut(&mut self) -> Box<dyn Iterator<Item = &mut Limit> + '_> {
        match self.side {
            Side::Ask => Box::new(self.limits.values_mut()),
            Side::Bid => Box::new(self.limits.values_mut().rev()),
        }
    }

    #[inline]
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    pub fn level_count(&self) -> usize {
        self.limits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.limits.is_empty()
    }

    /// Fills `taker` against this side's Limits, best price first.
    ///
    /// Stops once the taker is filled or the side is exhausted. Limits left
    /// empty are pruned after every fill of the sweep has been applied.
    pub fn sweep(&mut self, taker: &mut Order) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut emptied = Vec::new();
        let mut filled = Decimal::ZERO;

        for limit in self.levels_mut() {
            let before = limit.total_volume();
            matches.extend(limit.fill(taker));
            filled += before - limit.total_volume();
            if limit.is_empty() {
                emptied.push(limit.price());
            }
            if taker.is_filled() {
                break;
            }
        }

        for price in emptied {
            self.limits.remove(&price);
        }
        self.total_volume -= filled;

        matches
    }
}
