//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// This module defines the core data types used throughout the order book,
// including orders, matches, and the side/status enums.
//
// | Section            | Description                                                      |
// |--------------------|------------------------------------------------------------------|
// | ENUMS              | Discrete sets of values (Side, OrderStatus).                     |
// | STRUCTS            | OrderId, Order and the Match output record.                      |
// | TESTS              | Unit tests for the defined types.                                |
//--------------------------------------------------------------------------------------------------

//--------------------------------------------------------------------------------------------------
//  ENUMS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                 |
// |---------------|---------------------------------------------|
// | Side          | Side of an order (Bid/Ask).                 |
// | OrderStatus   | Lifecycle status of an order.               |
//--------------------------------------------------------------------------------------------------
use std::fmt;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Represents the side of an order (Bid or Ask).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    /// A buy order.
    Bid,
    /// A sell order.
    Ask,
}

impl Side {
    pub fn opposite(&self) -> Self {
        match self {
            Self::Bid => Self::Ask,
            Self::Ask => Self::Bid,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Bid => write!(f, "bid"),
            Side::Ask => write!(f, "ask"),
        }
    }
}

/// Lifecycle status of an order.
///
/// `Unfilled` and `PartiallyFilled` orders are resting (or, for a taker, still
/// being processed). `Filled` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    /// Accepted, nothing matched yet.
    Unfilled,
    /// Some size matched, some remains.
    PartiallyFilled,
    /// Remaining size reached zero.
    Filled,
    /// Removed from the book by an explicit cancel.
    Cancelled,
}

impl OrderStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Filled | Self::Cancelled)
    }
}

//--------------------------------------------------------------------------------------------------
//  STRUCTS
//--------------------------------------------------------------------------------------------------
// | Name          | Description                                       |
// |---------------|---------------------------------------------------|
// | OrderId       | Opaque order identifier.                          |
// | Order         | An order: identity plus remaining size.           |
// | Match         | A fill between a resting maker and a taker.       |
//--------------------------------------------------------------------------------------------------

/// Opaque unique identifier for an order.
///
/// Identifiers are assigned outside the book (see
/// [`OrderIdGenerator`](crate::domain::models::ids::OrderIdGenerator)).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderId(Uuid);

impl OrderId {
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl From<Uuid> for OrderId {
    fn from(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A limit or market order.
///
/// Identity (`id`, `side`, `arrival_sequence`) is fixed at construction. Only the
/// book mutates `remaining_size` (through matching) and `status` (through
/// matching or cancellation).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    /// Unique identifier for the order.
    id: OrderId,
    /// Side of the order (Bid or Ask).
    side: Side,
    /// Size at submission. Informational only.
    original_size: Decimal,
    /// Size still available to match.
    remaining_size: Decimal,
    /// Arrival counter used for time priority within a price level.
    arrival_sequence: u64,
    /// Current status of the order.
    status: OrderStatus,
}

impl Order {
    /// Creates a new, unfilled order.
    ///
    /// # Arguments
    /// * `id` - Caller-assigned identifier
    /// * `side` - Bid or Ask
    /// * `size` - Initial size; validated by the book on placement
    /// * `arrival_sequence` - Caller-assigned arrival counter
    pub fn new(id: OrderId, side: Side, size: Decimal, arrival_sequence: u64) -> Self {
        Self {
            id,
            side,
            original_size: size,
            remaining_size: size,
            arrival_sequence,
            status: OrderStatus::Unfilled,
        }
    }

    #[inline]
    pub fn id(&self) -> OrderId {
        self.id
    }

    #[inline]
    pub fn side(&self) -> Side {
        self.side
    }

    #[inline]
    pub fn original_size(&self) -> Decimal {
        self.original_size
    }

    #[inline]
    pub fn remaining_size(&self) -> Decimal {
        self.remaining_size
    }

    /// Size matched so far.
    pub fn filled_size(&self) -> Decimal {
        self.original_size - self.remaining_size
    }

    #[inline]
    pub fn arrival_sequence(&self) -> u64 {
        self.arrival_sequence
    }

    #[inline]
    pub fn status(&self) -> OrderStatus {
        self.status
    }

    /// Returns true once the remaining size has reached zero.
    #[inline]
    pub fn is_filled(&self) -> bool {
        self.remaining_size.is_zero()
    }

    /// Reduces the remaining size by `size` and updates the status.
    ///
    /// Callers pass `size <= remaining_size`.
    pub(crate) fn apply_fill(&mut self, size: Decimal) {
        self.remaining_size -= size;
        self.status = if self.remaining_size.is_zero() {
            OrderStatus::Filled
        } else {
            OrderStatus::PartiallyFilled
        };
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.status = OrderStatus::Cancelled;
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[size: {:.2}]", self.remaining_size)
    }
}

/// A single fill between a resting maker and an incoming taker.
///
/// Produced by the matcher, never mutated, handed to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    /// The resting order that provided liquidity.
    pub maker_order_id: OrderId,
    /// The incoming order that took liquidity.
    pub taker_order_id: OrderId,
    /// Side of the taker; the maker is on the opposite side.
    pub taker_side: Side,
    /// Size exchanged. Always positive.
    pub size_filled: Decimal,
    /// The maker's resting price.
    pub price: Decimal,
    /// Maker's remaining size after this fill.
    pub maker_remaining: Decimal,
    /// Taker's remaining size after this fill.
    pub taker_remaining: Decimal,
}

impl Match {
    /// Id of the buying order in this match.
    pub fn bid_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Bid => self.taker_order_id,
            Side::Ask => self.maker_order_id,
        }
    }

    /// Id of the selling order in this match.
    pub fn ask_order_id(&self) -> OrderId {
        match self.taker_side {
            Side::Ask => self.taker_order_id,
            Side::Bid => self.maker_order_id,
        }
    }

    pub fn maker_filled(&self) -> bool {
        self.maker_remaining.is_zero()
    }
}

//--------------------------------------------------------------------------------------------------
//  TESTS
//--------------------------------------------------------------------------------------------------
// | Name                         | Description                                      |
// |------------------------------|--------------------------------------------------|
// | test_order_creation          | Verify Order construction defaults.              |
// | test_apply_fill_transitions  | Partial then full fill updates status.           |
// | test_match_sides             | bid/ask ids resolve from the taker side.         |
// | test_side_opposite           | Side::opposite flips.                            |
//--------------------------------------------------------------------------------------------------
