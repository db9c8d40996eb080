//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Aggregated, point-in-time views of order book depth.
//
// | Component                | Description                                                |
// |--------------------------|------------------------------------------------------------|
// | PriceLevel               | Aggregated volume information at a specific price          |
// | DepthSnapshot            | Immutable point-in-time view of order book depth           |
//
//--------------------------------------------------------------------------------------------------
// FUNCTIONS
//--------------------------------------------------------------------------------------------------
// | Name                    | Description                                       | Return Type      |
// |-------------------------|---------------------------------------------------|------------------|
// | from_limit              | Aggregates one Limit                              | PriceLevel       |
// | from_book               | Takes up to N levels per side from a book         | DepthSnapshot    |
// | best_bid / best_ask     | First level of each side                          | Option<Decimal>  |
// | spread                  | Best ask minus best bid                           | Option<Decimal>  |
//--------------------------------------------------------------------------------------------------

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::limit::Limit;
use super::orderbook::OrderBook;

/// Represents an aggregated price level in the depth view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceLevel {
    /// The price for this level
    pub price: Decimal,
    /// Total remaining volume at this price level
    pub volume: Decimal,
    /// Number of orders at this price level
    pub order_count: usize,
}

impl PriceLevel {
    /// Creates a new price level
    #[inline]
    pub fn new(price: Decimal, volume: Decimal, order_count: usize) -> Self {
        Self {
            price,
            volume,
            order_count,
        }
    }

    #[inline]
    pub fn from_limit(limit: &Limit) -> Self {
        Self::new(limit.price(), limit.total_volume(), limit.order_count())
    }
}

/// An immutable snapshot of order book depth at a specific point in time
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DepthSnapshot {
    /// Bid price levels ordered by price descending (best bids first)
    pub bids: Vec<PriceLevel>,
    /// Ask price levels ordered by price ascending (best asks first)
    pub asks: Vec<PriceLevel>,
    /// Timestamp when this snapshot was taken
    pub timestamp: DateTime<Utc>,
}

impl DepthSnapshot {
    /// Creates a new depth snapshot stamped with the current time
    #[inline]
    pub fn new(bids: Vec<PriceLevel>, asks: Vec<PriceLevel>) -> Self {
        Self {
            bids,
            asks,
            timestamp: Utc::now(),
        }
    }

    /// Builds a snapshot of at most `levels` Limits per side, best first.
    pub fn from_book(book: &OrderBook, levels: usize) -> Self {
        let bids = book.bids().take(levels).map(PriceLevel::from_limit).collect();
        let asks = book.asks().take(levels).map(PriceLevel::from_limit).collect();
        Self::new(bids, asks)
    }

    /// Returns the best bid price if available
    #[inline]
    pub fn best_bid(&self) -> Option<Decimal> {
        self.bids.first().map(|level| level.price)
    }

    /// Returns the best ask price if available
    #[inline]
    pub fn best_ask(&self) -> Option<Decimal> {
        self.asks.first().map(|level| level.price)
    }

    /// Returns the current spread (best ask - best bid)
    #[inline]
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_ask(), self.best_bid()) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }

    pub fn total_bid_volume(&self) -> Decimal {
        self.bids.iter().map(|level| level.volume).sum()
    }

    pub fn total_ask_volume(&self) -> Decimal {
        self.asks.iter().map(|level| level.volume).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ids::{OrderFactory, SequentialIdGenerator};
    use rust_decimal_macros::dec;

    #[test]
    fn test_empty_snapshot() {
        let book = OrderBook::new();
        let snapshot = DepthSnapshot::from_book(&book, 10);

        assert!(snapshot.bids.is_empty());
        assert!(snapshot.asks.is_empty());
        assert_eq!(snapshot.best_bid(), None);
        assert_eq!(snapshot.spread(), None);
    }

    #[test]
    fn test_levels_are_aggregated_and_ordered() {
        let mut f = OrderFactory::new(SequentialIdGenerator::new());
        let mut book = OrderBook::new();
        book.place_limit_order(dec!(100), f.bid(dec!(1))).unwrap();
        book.place_limit_order(dec!(100), f.bid(dec!(2))).unwrap();
        book.place_limit_order(dec!(99), f.bid(dec!(4))).unwrap();
        book.place_limit_order(dec!(101), f.bid(dec!(5))).unwrap();
        book.place_limit_order(dec!(102), f.ask(dec!(3))).unwrap();

        let snapshot = book.depth(10);

        assert_eq!(
            snapshot.bids,
            vec![
                PriceLevel::new(dec!(101), dec!(5), 1),
                PriceLevel::new(dec!(100), dec!(3), 2),
                PriceLevel::new(dec!(99), dec!(4), 1),
            ]
        );
        assert_eq!(snapshot.best_ask(), Some(dec!(102)));
        assert_eq!(snapshot.spread(), Some(dec!(1)));
        assert_eq!(snapshot.total_bid_volume(), book.bid_total_volume());
    }

    #[test]
    fn test_snapshot_with_limit() {
        let mut f = OrderFactory::new(SequentialIdGenerator::new());
        let mut book = OrderBook::new();
        for i in 1..=5 {
            let price = Decimal::from(100 + i);
            book.place_limit_order(price, f.ask(dec!(1))).unwrap();
        }

        let snapshot = book.depth(3);

        let prices: Vec<Decimal> = snapshot.asks.iter().map(|l| l.price).collect();
        assert_eq!(prices, vec![dec!(101), dec!(102), dec!(103)]);
    }

    #[test]
    fn test_snapshot_serializes_decimals_as_strings() {
        let snapshot = DepthSnapshot::new(vec![PriceLevel::new(dec!(10.5), dec!(2), 1)], vec![]);
        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["bids"][0]["price"], "10.5");
        assert_eq!(json["bids"][0]["order_count"], 1);
    }
}
