//--------------------------------------------------------------------------------------------------
// MODULE OVERVIEW
//--------------------------------------------------------------------------------------------------
// Identifier and arrival-sequence generation. The book never invents ids or
// timestamps itself; callers inject a generator so matching stays reproducible.
//
// | Component              | Description                                              |
// |------------------------|----------------------------------------------------------|
// | OrderIdGenerator       | Trait supplying order ids and arrival sequences          |
// | SequentialIdGenerator  | Counter-based ids for tests and replay, skips reserved   |
// | ClockIdGenerator       | Random v4 ids with wall-clock nanosecond sequences       |
// | OrderFactory           | Builds bid/ask orders from a generator                   |
//--------------------------------------------------------------------------------------------------

use chrono::Utc;
use rust_decimal::Decimal;
use uuid::Uuid;

use super::types::{Order, OrderId, Side};

/// Source of order identifiers and arrival sequences.
pub trait OrderIdGenerator {
    /// Returns a fresh, never-before-issued order id.
    fn next_id(&mut self) -> OrderId;

    /// Returns an arrival sequence strictly greater than any previously returned.
    fn next_sequence(&mut self) -> u64;

    /// Records an id chosen by the caller so that `next_id` never issues it.
    fn reserve(&mut self, _id: OrderId) {}
}

/// Counter-backed generator. Id `n` is the UUID whose 128-bit value is `n`.
#[derive(Debug, Clone, Default)]
pub struct SequentialIdGenerator {
    last_id: u64,
    last_sequence: u64,
}

impl SequentialIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts counting after `start`; the first id and sequence issued are `start + 1`.
    pub fn starting_at(start: u64) -> Self {
        Self {
            last_id: start,
            last_sequence: start,
        }
    }
}

impl OrderIdGenerator for SequentialIdGenerator {
    fn next_id(&mut self) -> OrderId {
        self.last_id += 1;
        OrderId::from_uuid(Uuid::from_u128(self.last_id as u128))
    }

    fn next_sequence(&mut self) -> u64 {
        self.last_sequence += 1;
        self.last_sequence
    }

    /// Moves the counter past `id` when it lies in the counter's range.
    fn reserve(&mut self, id: OrderId) {
        if let Ok(n) = u64::try_from(id.as_uuid().as_u128()) {
            self.last_id = self.last_id.max(n);
        }
    }
}

/// Random ids and wall-clock sequences, for live use.
#[derive(Debug, Clone, Default)]
pub struct ClockIdGenerator {
    last_sequence: u64,
}

impl ClockIdGenerator {
    pub fn new() -> Self {
        Self::default()
    }
}

impl OrderIdGenerator for ClockIdGenerator {
    fn next_id(&mut self) -> OrderId {
        OrderId::from_uuid(Uuid::new_v4())
    }

    fn next_sequence(&mut self) -> u64 {
        let now = Utc::now()
            .timestamp_nanos_opt()
            .map(|nanos| nanos.max(0) as u64)
            .unwrap_or(0);
        // clock may stall or step back; the sequence must not
        self.last_sequence = now.max(self.last_sequence + 1);
        self.last_sequence
    }
}

/// Convenience builder for orders drawing ids and sequences from a generator.
#[derive(Debug, Clone, Default)]
pub struct OrderFactory<G: OrderIdGenerator> {
    generator: G,
}

impl<G: OrderIdGenerator> OrderFactory<G> {
    pub fn new(generator: G) -> Self {
        Self { generator }
    }

    pub fn order(&mut self, side: Side, size: Decimal) -> Order {
        let id = self.generator.next_id();
        let sequence = self.generator.next_sequence();
        Order::new(id, side, size, sequence)
    }

    /// Builds an order with a caller-chosen id; only the sequence is generated.
    ///
    /// The id is reserved, so later generated ids cannot collide with it.
    pub fn order_with_id(&mut self, id: OrderId, side: Side, size: Decimal) -> Order {
        self.generator.reserve(id);
        Order::new(id, side, size, self.generator.next_sequence())
    }

    pub fn bid(&mut self, size: Decimal) -> Order {
        self.order(Side::Bid, size)
    }

    pub fn ask(&mut self, size: Decimal) -> Order {
        self.order(Side::Ask, size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_sequential_ids_are_deterministic() {
        let mut a = SequentialIdGenerator::new();
        let mut b = SequentialIdGenerator::new();
        for _ in 0..5 {
            assert_eq!(a.next_id(), b.next_id());
        }
        assert_eq!(
            a.next_id().to_string(),
            "00000000-0000-0000-0000-000000000006"
        );
    }

    #[test]
    fn test_explicit_ids_are_never_reissued() {
        let mut factory = OrderFactory::new(SequentialIdGenerator::new());
        let first = factory.bid(dec!(1));
        let explicit = OrderId::from_uuid(Uuid::from_u128(10));
        let chosen = factory.order_with_id(explicit, Side::Ask, dec!(1));
        let next = factory.bid(dec!(1));

        assert_eq!(first.id(), OrderId::from_uuid(Uuid::from_u128(1)));
        assert_eq!(chosen.id(), explicit);
        assert_eq!(next.id(), OrderId::from_uuid(Uuid::from_u128(11)));

        // ids below the counter or outside its range leave it alone
        factory.order_with_id(OrderId::from_uuid(Uuid::from_u128(3)), Side::Bid, dec!(1));
        factory.order_with_id(OrderId::from_uuid(Uuid::new_v4()), Side::Bid, dec!(1));
        assert_eq!(factory.bid(dec!(1)).id(), OrderId::from_uuid(Uuid::from_u128(12)));
        assert!(chosen.arrival_sequence() < next.arrival_sequence());
    }

    #[test]
    fn test_clock_sequence_strictly_increases() {
        let mut generator = ClockIdGenerator::new();
        let mut last = 0;
        for _ in 0..1_000 {
            let seq = generator.next_sequence();
            assert!(seq > last);
            last = seq;
        }
        assert_ne!(generator.next_id(), generator.next_id());
    }

    #[test]
    fn test_factory_assigns_increasing_sequences() {
        let mut factory = OrderFactory::new(SequentialIdGenerator::new());
        let first = factory.bid(dec!(1));
        let second = factory.ask(dec!(2));

        assert_eq!(first.side(), Side::Bid);
        assert_eq!(second.side(), Side::Ask);
        assert!(second.arrival_sequence() > first.arrival_sequence());
        assert_ne!(first.id(), second.id());
    }
}
