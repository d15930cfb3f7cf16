//! Output types of the matching engine.
//!
//! An [`Allocation`] records how much of one order filled at the batch's
//! uniform clearing price. Allocations are never persisted by the core.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{OrderId, OrderSide};

/// A fill of one order at the clearing price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Allocation {
    pub order_id: OrderId,
    pub side: OrderSide,
    pub quantity: Decimal,
    pub price: Decimal,
}

impl std::fmt::Display for Allocation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Fill[{}] {} {} @ {}",
            self.order_id, self.side, self.quantity, self.price
        )
    }
}

/// The result of clearing one batch.
///
/// Allocations list participating buys in priority order, then participating
/// sells in priority order. Both sides sum to `total_volume`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingResult {
    pub clearing_price: Decimal,
    pub allocations: Vec<Allocation>,
    pub total_volume: Decimal,
}

impl MatchingResult {
    /// A result with a reported price but nothing traded.
    #[must_use]
    pub fn empty(clearing_price: Decimal) -> Self {
        Self {
            clearing_price,
            allocations: Vec::new(),
            total_volume: Decimal::ZERO,
        }
    }

    /// Sum of filled quantities on one side.
    #[must_use]
    pub fn side_volume(&self, side: OrderSide) -> Decimal {
        self.allocations
            .iter()
            .filter(|a| a.side == side)
            .map(|a| a.quantity)
            .sum()
    }

    /// The allocation for a given order, if it participated.
    #[must_use]
    pub fn allocation_for(&self, order_id: &OrderId) -> Option<&Allocation> {
        self.allocations.iter().find(|a| a.order_id == *order_id)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.allocations.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fill(side: OrderSide, qty: i64) -> Allocation {
        Allocation {
            order_id: OrderId::new(),
            side,
            quantity: Decimal::new(qty, 0),
            price: Decimal::new(105, 1),
        }
    }

    #[test]
    fn side_volume_sums_one_side() {
        let result = MatchingResult {
            clearing_price: Decimal::new(105, 1),
            allocations: vec![
                fill(OrderSide::Buy, 30),
                fill(OrderSide::Buy, 20),
                fill(OrderSide::Sell, 50),
            ],
            total_volume: Decimal::new(50, 0),
        };
        assert_eq!(result.side_volume(OrderSide::Buy), Decimal::new(50, 0));
        assert_eq!(result.side_volume(OrderSide::Sell), Decimal::new(50, 0));
    }

    #[test]
    fn empty_result_keeps_price() {
        let result = MatchingResult::empty(Decimal::TEN);
        assert!(result.is_empty());
        assert_eq!(result.clearing_price, Decimal::TEN);
        assert_eq!(result.total_volume, Decimal::ZERO);
    }

    #[test]
    fn display_names_side() {
        let a = fill(OrderSide::Sell, 2);
        assert!(format!("{a}").contains("SELL"));
    }
}
