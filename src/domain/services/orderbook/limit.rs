//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// A single price level on one side of the book: a FIFO queue of resting orders
// plus their aggregate remaining volume, and the per-level matching loop.
//
// | Name          | Description                                        | Key Methods             |
// |---------------|----------------------------------------------------|-------------------------|
// | Limit         | Orders resting at one price, in arrival order      | add_order               |
// |               |                                                    | remove_order            |
// |               |                                                    | fill                    |
//--------------------------------------------------------------------------------------------------

use std::collections::VecDeque;
use std::fmt;

use rust_decimal::Decimal;
use tracing::trace;

use crate::domain::models::types::{Match, Order, OrderId};

/// Orders resting at one price, matched first-in-first-out.
///
/// `total_volume` always equals the sum of the members' remaining sizes.
#[derive(Debug, Clone)]
pub struct Limit {
    /// The price for this level
    price: Decimal,
    /// FIFO queue of orders at this price level
    orders: VecDeque<Order>,
    /// Total remaining size of all orders at this price level
    total_volume: Decimal,
}

impl Limit {
    /// Creates an empty level at `price`.
    pub fn new(price: Decimal) -> Self {
        Self {
            price,
            orders: VecDeque::with_capacity(4),
            total_volume: Decimal::ZERO,
        }
    }

    #[inline]
    pub fn price(&self) -> Decimal {
        self.price
    }

    #[inline]
    pub fn total_volume(&self) -> Decimal {
        self.total_volume
    }

    /// Resting orders in time priority.
    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter()
    }

    pub fn get_order(&self, order_id: OrderId) -> Option<&Order> {
        self.orders.iter().find(|order| order.id() == order_id)
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Appends an order to the back of the queue.
    ///
    /// The caller guarantees the order does not rest anywhere else.
    pub fn add_order(&mut self, order: Order) {
        self.total_volume += order.remaining_size();
        self.orders.push_back(order);
    }

    /// Removes an order by id, keeping the relative order of the survivors.
    ///
    /// # Returns
    /// * `Some(Order)` - The removed order
    /// * `None` - If the order is not a member of this level
    pub fn remove_order(&mut self, order_id: OrderId) -> Option<Order> {
        let idx = self.orders.iter().position(|o| o.id() == order_id)?;
        let order = self.orders.remove(idx)?;
        self.total_volume -= order.remaining_size();
        Some(order)
    }

    /// Matches `taker` against the resting orders of this level.
    ///
    /// Makers are consumed in arrival order until the taker is filled or the
    /// level runs out. Every fill trades at this level's price. Makers that are
    /// completely filled are dropped from the queue after the loop ends.
    ///
    /// # Returns
    /// The matches produced, in the order they occurred
    pub fn fill(&mut self, taker: &mut Order) -> Vec<Match> {
        let mut matches = Vec::new();
        let mut filled_makers = 0usize;

        for maker in self.orders.iter_mut() {
            if taker.is_filled() {
                break;
            }

            let size = taker.remaining_size().min(maker.remaining_size());
            maker.apply_fill(size);
            taker.apply_fill(size);
            self.total_volume -= size;

            trace!(
                price = %self.price,
                maker = %maker.id(),
                taker = %taker.id(),
                %size,
                "level fill"
            );

            matches.push(Match {
                maker_order_id: maker.id(),
                taker_order_id: taker.id(),
                taker_side: taker.side(),
                size_filled: size,
                price: self.price,
                maker_remaining: maker.remaining_size(),
                taker_remaining: taker.remaining_size(),
            });

            if maker.is_filled() {
                filled_makers += 1;
            }
        }

        if filled_makers > 0 {
            self.orders.retain(|order| !order.is_filled());
        }

        matches
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "price: {:.2} | volume: {:.2}", self.price, self.total_volume)
    }
}

#[cfg(test)]
mod tests {
    //--------------------------------------------------------------------------------------------------
    // TEST MODULE OVERVIEW
    //--------------------------------------------------------------------------------------------------
    // 1. Queue maintenance: add/remove, volume tracking, FIFO preservation
    // 2. Fill: single maker, multiple makers, partial maker, deferred removal
    //--------------------------------------------------------------------------------------------------

    use super::*;
    use crate::domain::models::ids::{OrderFactory, SequentialIdGenerator};
    use crate::domain::models::types::{OrderStatus, Side};
    use rust_decimal_macros::dec;

    fn factory() -> OrderFactory<SequentialIdGenerator> {
        OrderFactory::new(SequentialIdGenerator::new())
    }

    fn ids(limit: &Limit) -> Vec<OrderId> {
        limit.orders().map(|o| o.id()).collect()
    }

    #[test]
    fn test_add_and_remove_tracks_volume() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(10000));
        let a = f.bid(dec!(1));
        let b = f.bid(dec!(2));
        let c = f.bid(dec!(3));
        let c_id = c.id();

        limit.add_order(a);
        limit.add_order(b);
        limit.add_order(c);
        assert_eq!(limit.total_volume(), dec!(6));

        let removed = limit.remove_order(c_id).unwrap();
        assert_eq!(removed.id(), c_id);
        assert_eq!(limit.order_count(), 2);
        assert_eq!(limit.total_volume(), dec!(3));
    }

    #[test]
    fn test_remove_preserves_fifo() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(50));
        let orders: Vec<Order> = (0..5).map(|_| f.ask(dec!(1))).collect();
        let order_ids: Vec<OrderId> = orders.iter().map(|o| o.id()).collect();
        for order in orders {
            limit.add_order(order);
        }

        limit.remove_order(order_ids[1]);
        limit.remove_order(order_ids[3]);

        assert_eq!(ids(&limit), vec![order_ids[0], order_ids[2], order_ids[4]]);
    }

    #[test]
    fn test_remove_non_member_is_noop() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(50));
        limit.add_order(f.ask(dec!(4)));
        let stranger = f.ask(dec!(9));

        assert!(limit.remove_order(stranger.id()).is_none());
        assert_eq!(limit.total_volume(), dec!(4));
        assert_eq!(limit.order_count(), 1);
    }

    #[test]
    fn test_fill_single_maker_partial() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(10000));
        let maker = f.ask(dec!(20));
        let maker_id = maker.id();
        limit.add_order(maker);

        let mut taker = f.bid(dec!(10));
        let matches = limit.fill(&mut taker);

        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].size_filled, dec!(10));
        assert_eq!(matches[0].price, dec!(10000));
        assert_eq!(matches[0].maker_order_id, maker_id);
        assert_eq!(matches[0].ask_order_id(), maker_id);
        assert!(taker.is_filled());
        assert_eq!(limit.total_volume(), dec!(10));
        let maker = limit.get_order(maker_id).unwrap();
        assert_eq!(maker.status(), OrderStatus::PartiallyFilled);
    }

    #[test]
    fn test_fill_walks_queue_in_arrival_order() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(100));
        let first = f.bid(dec!(3));
        let second = f.bid(dec!(4));
        let third = f.bid(dec!(5));
        let (first_id, second_id, third_id) = (first.id(), second.id(), third.id());
        limit.add_order(first);
        limit.add_order(second);
        limit.add_order(third);

        let mut taker = f.ask(dec!(9));
        let matches = limit.fill(&mut taker);

        let makers: Vec<OrderId> = matches.iter().map(|m| m.maker_order_id).collect();
        assert_eq!(makers, vec![first_id, second_id, third_id]);
        assert_eq!(matches[2].size_filled, dec!(2));
        assert!(taker.is_filled());

        // filled makers dropped after the loop; the partial one keeps its place
        assert_eq!(ids(&limit), vec![third_id]);
        assert_eq!(limit.total_volume(), dec!(3));
    }

    #[test]
    fn test_fill_exhausts_level() {
        let mut f = factory();
        let mut limit = Limit::new(dec!(7));
        limit.add_order(f.ask(dec!(2)));
        limit.add_order(f.ask(dec!(2)));

        let mut taker = f.bid(dec!(10));
        let matches = limit.fill(&mut taker);

        assert_eq!(matches.len(), 2);
        assert!(limit.is_empty());
        assert_eq!(limit.total_volume(), Decimal::ZERO);
        assert_eq!(taker.remaining_size(), dec!(6));
        assert_eq!(taker.status(), OrderStatus::PartiallyFilled);
        assert_eq!(taker.side(), Side::Bid);
    }

    #[test]
    fn test_display() {
        let limit = Limit::new(dec!(9000));
        assert_eq!(limit.to_string(), "price: 9000.00 | volume: 0.00");
    }
}
