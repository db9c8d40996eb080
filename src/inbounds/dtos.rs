use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::models::ids::{OrderFactory, OrderIdGenerator};
use crate::domain::models::orderbook::{MarketOrderOutcome, TopOfBook};
use crate::domain::models::types::{Match, Order, OrderId, Side};

/// +----------------------------------------------------------+
/// | STRUCTS | TRAITS | ENUMS | FUNCTIONS                     |
/// +----------+-------+-------+------------------------------+
/// | Enums:                                                   |
/// |   - CommandRequest                                       |
/// |   - CommandOutcome                                       |
/// | Structs:                                                 |
/// |   - ReplayRecord                                         |
/// | Implementations:                                         |
/// |   - CommandRequest::into_command                         |
/// +----------------------------------------------------------+

/// One book command as it appears in a replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum CommandRequest {
    /// Rest an order at a price.
    Limit {
        side: Side,
        price: Decimal,
        size: Decimal,
        /// Order id; drawn from the generator when absent.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },

    /// Take liquidity immediately.
    Market {
        side: Side,
        size: Decimal,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<Uuid>,
    },

    /// Remove a resting order.
    Cancel { id: Uuid },
}

/// A request with its order built and ready for the book.
#[derive(Debug, Clone, PartialEq)]
pub enum BookCommand {
    Limit { price: Decimal, order: Order },
    Market { order: Order },
    Cancel { order_id: OrderId },
}

impl CommandRequest {
    /// Builds the book command, assigning ids and arrival sequences from `factory`.
    pub fn into_command<G: OrderIdGenerator>(self, factory: &mut OrderFactory<G>) -> BookCommand {
        match self {
            CommandRequest::Limit {
                side,
                price,
                size,
                id,
            } => BookCommand::Limit {
                price,
                order: build_order(factory, id, side, size),
            },
            CommandRequest::Market { side, size, id } => BookCommand::Market {
                order: build_order(factory, id, side, size),
            },
            CommandRequest::Cancel { id } => BookCommand::Cancel {
                order_id: OrderId::from_uuid(id),
            },
        }
    }
}

fn build_order<G: OrderIdGenerator>(
    factory: &mut OrderFactory<G>,
    id: Option<Uuid>,
    side: Side,
    size: Decimal,
) -> Order {
    match id {
        Some(id) => factory.order_with_id(OrderId::from_uuid(id), side, size),
        None => factory.order(side, size),
    }
}

/// Result of applying one command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "lowercase")]
pub enum CommandOutcome {
    Rested {
        order_id: OrderId,
        side: Side,
        price: Decimal,
        size: Decimal,
    },
    Matched {
        order_id: OrderId,
        side: Side,
        filled: Decimal,
        matches: Vec<Match>,
    },
    Cancelled {
        order_id: OrderId,
        side: Side,
        remaining: Decimal,
    },
    Rejected {
        reason: String,
    },
}

impl CommandOutcome {
    pub fn rested(price: Decimal, order: &Order) -> Self {
        CommandOutcome::Rested {
            order_id: order.id(),
            side: order.side(),
            price,
            size: order.remaining_size(),
        }
    }

    pub fn cancelled(order: &Order) -> Self {
        CommandOutcome::Cancelled {
            order_id: order.id(),
            side: order.side(),
            remaining: order.remaining_size(),
        }
    }

    pub fn is_rejected(&self) -> bool {
        matches!(self, CommandOutcome::Rejected { .. })
    }
}

impl From<MarketOrderOutcome> for CommandOutcome {
    fn from(outcome: MarketOrderOutcome) -> Self {
        CommandOutcome::Matched {
            order_id: outcome.order.id(),
            side: outcome.order.side(),
            filled: outcome.filled_size(),
            matches: outcome.matches,
        }
    }
}

/// One line of replay output: the script line number, the outcome, and the top
/// of book once the command has been applied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayRecord {
    pub line: usize,
    #[serde(flatten)]
    pub outcome: CommandOutcome,
    pub top: TopOfBook,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::ids::SequentialIdGenerator;
    use rust_decimal_macros::dec;

    #[test]
    fn test_parse_requests() {
        let limit: CommandRequest =
            serde_json::from_str(r#"{"type":"limit","side":"bid","price":"100","size":"5"}"#)
                .unwrap();
        assert_eq!(
            limit,
            CommandRequest::Limit {
                side: Side::Bid,
                price: dec!(100),
                size: dec!(5),
                id: None,
            }
        );

        let cancel: CommandRequest = serde_json::from_str(
            r#"{"type":"cancel","id":"00000000-0000-0000-0000-000000000007"}"#,
        )
        .unwrap();
        assert_eq!(cancel, CommandRequest::Cancel { id: Uuid::from_u128(7) });

        assert!(serde_json::from_str::<CommandRequest>(r#"{"type":"stop","size":"1"}"#).is_err());
    }

    #[test]
    fn test_into_command_assigns_ids() {
        let mut factory = OrderFactory::new(SequentialIdGenerator::new());
        let request = CommandRequest::Market {
            side: Side::Ask,
            size: dec!(2),
            id: None,
        };

        let BookCommand::Market { order } = request.into_command(&mut factory) else {
            panic!("expected a market command");
        };
        assert_eq!(order.id(), OrderId::from_uuid(Uuid::from_u128(1)));
        assert_eq!(order.side(), Side::Ask);
        assert_eq!(order.remaining_size(), dec!(2));

        let explicit = CommandRequest::Limit {
            side: Side::Bid,
            price: dec!(9),
            size: dec!(1),
            id: Some(Uuid::from_u128(42)),
        };
        let BookCommand::Limit { price, order } = explicit.into_command(&mut factory) else {
            panic!("expected a limit command");
        };
        assert_eq!(price, dec!(9));
        assert_eq!(order.id(), OrderId::from_uuid(Uuid::from_u128(42)));
        assert_eq!(order.arrival_sequence(), 2);
    }

    #[test]
    fn test_record_serialization() {
        let record = ReplayRecord {
            line: 3,
            outcome: CommandOutcome::Rejected {
                reason: "Order book empty".to_string(),
            },
            top: TopOfBook::default(),
        };

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["line"], 3);
        assert_eq!(json["outcome"], "rejected");
        assert_eq!(json["reason"], "Order book empty");
        assert!(json["top"]["best_bid"].is_null());
    }
}
