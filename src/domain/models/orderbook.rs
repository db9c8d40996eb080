use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::types::{Match, Order};

/// Result of executing a market order: the taker after matching plus every fill
/// in the order it happened.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketOrderOutcome {
    pub order: Order,
    pub matches: Vec<Match>,
}

impl MarketOrderOutcome {
    /// Sum of `size_filled` over all matches.
    pub fn filled_size(&self) -> Decimal {
        self.matches.iter().map(|m| m.size_filled).sum()
    }
}

/// Best prices and total resting volume on each side.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TopOfBook {
    pub best_bid: Option<Decimal>,
    pub best_ask: Option<Decimal>,
    pub bid_volume: Decimal,
    pub ask_volume: Decimal,
}

impl TopOfBook {
    pub fn spread(&self) -> Option<Decimal> {
        match (self.best_ask, self.best_bid) {
            (Some(ask), Some(bid)) => Some(ask - bid),
            _ => None,
        }
    }
}
