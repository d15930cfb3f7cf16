//! Order types for the UniClear batch auction.
//!
//! An order with no limit price is a market order: it is willing to trade
//! at whatever uniform price the batch clears at.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketId, OrderId, PlannedBatchId};

/// Which side of the book this order is on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderSide {
    Buy,
    Sell,
}

impl std::fmt::Display for OrderSide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Buy => write!(f, "BUY"),
            Self::Sell => write!(f, "SELL"),
        }
    }
}

/// The type of order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum OrderType {
    Limit,
    Market,
}

impl std::fmt::Display for OrderType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Limit => write!(f, "LIMIT"),
            Self::Market => write!(f, "MARKET"),
        }
    }
}

/// An order submitted to a batch. Immutable once matched against.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub market: MarketId,
    pub side: OrderSide,
    pub order_type: OrderType,
    /// Limit price; `None` for market orders.
    pub price: Option<Decimal>,
    pub quantity: Decimal,
    pub submitted_at: DateTime<Utc>,
    /// The planned batch this order was assigned to at intake.
    pub batch_id: Option<PlannedBatchId>,
}

impl Order {
    /// Create a limit order.
    #[must_use]
    pub fn limit(
        market: MarketId,
        side: OrderSide,
        price: Decimal,
        quantity: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            market,
            side,
            order_type: OrderType::Limit,
            price: Some(price),
            quantity,
            submitted_at,
            batch_id: None,
        }
    }

    /// Create a market order.
    #[must_use]
    pub fn market(
        market: MarketId,
        side: OrderSide,
        quantity: Decimal,
        submitted_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: OrderId::new(),
            market,
            side,
            order_type: OrderType::Market,
            price: None,
            quantity,
            submitted_at,
            batch_id: None,
        }
    }

    /// Whether this order trades at any price.
    #[must_use]
    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market || self.price.is_none()
    }

    /// The limit price, or `None` for market orders.
    #[must_use]
    pub fn limit_price(&self) -> Option<Decimal> {
        if self.is_market() { None } else { self.price }
    }

    /// Price used for priority ordering: market buys rank as `Decimal::MAX`,
    /// market sells as zero.
    #[must_use]
    pub fn effective_price(&self) -> Decimal {
        match (self.limit_price(), self.side) {
            (Some(price), _) => price,
            (None, OrderSide::Buy) => Decimal::MAX,
            (None, OrderSide::Sell) => Decimal::ZERO,
        }
    }

    /// Whether this order accepts execution at `price`.
    #[must_use]
    pub fn is_matchable_at(&self, price: Decimal) -> bool {
        match (self.limit_price(), self.side) {
            (None, _) => true,
            (Some(limit), OrderSide::Buy) => limit >= price,
            (Some(limit), OrderSide::Sell) => limit <= price,
        }
    }
}

/// Test helpers.
#[cfg(any(test, feature = "test-helpers"))]
impl Order {
    pub fn dummy_limit(side: OrderSide, price: Decimal, qty: Decimal) -> Self {
        Self::limit(MarketId::from_bytes([7; 16]), side, price, qty, Utc::now())
    }

    pub fn dummy_market(side: OrderSide, qty: Decimal) -> Self {
        Self::market(MarketId::from_bytes([7; 16]), side, qty, Utc::now())
    }
}
