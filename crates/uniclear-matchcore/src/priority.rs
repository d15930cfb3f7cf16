//! Price-time priority ordering of one side of a batch.
//!
//! Buys rank by descending price (a market buy outranks every limit),
//! sells by ascending price (a market sell outranks every limit). Equal
//! prices fall back to the earlier submission, then to the order id so
//! the ranking is total and independent of input order.

use std::cmp::Ordering;

use uniclear_types::Order;

/// Priority comparison for buy orders (best first).
#[must_use]
pub fn buy_priority(a: &Order, b: &Order) -> Ordering {
    b.effective_price()
        .cmp(&a.effective_price())
        .then(a.submitted_at.cmp(&b.submitted_at))
        .then(a.id.cmp(&b.id))
}

/// Priority comparison for sell orders (best first).
#[must_use]
pub fn sell_priority(a: &Order, b: &Order) -> Ordering {
    a.effective_price()
        .cmp(&b.effective_price())
        .then(a.submitted_at.cmp(&b.submitted_at))
        .then(a.id.cmp(&b.id))
}

/// Buys in priority order.
#[must_use]
pub fn sort_buys(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| buy_priority(a, b));
    sorted
}

/// Sells in priority order.
#[must_use]
pub fn sort_sells(orders: &[Order]) -> Vec<&Order> {
    let mut sorted: Vec<&Order> = orders.iter().collect();
    sorted.sort_by(|a, b| sell_priority(a, b));
    sorted
}
