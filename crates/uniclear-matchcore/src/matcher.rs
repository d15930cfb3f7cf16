//! Pure deterministic batch matcher.
//!
//! ```text
//! match_orders(buys, sells, tick_size) -> MatchingResult
//! ```
//!
//! ## Algorithm
//!
//! 1. Rank each side by price-time priority
//! 2. Discover the uniform clearing price
//! 3. Keep the orders that accept that price (market orders always do)
//! 4. Matched volume = min(eligible demand, eligible supply)
//! 5. Allocate the volume on each side, pro-rata when over-subscribed
//!
//! There is no error path; an empty or one-sided batch yields a result
//! with zero volume and no allocations.

use rust_decimal::Decimal;
use uniclear_types::{MatchingResult, Order, OrderSide};

use crate::{allocate_side, compute_clearing_price, sort_buys, sort_sells};

/// Clear one batch given its buy side and its sell side.
#[must_use]
pub fn match_orders(buys: &[Order], sells: &[Order], tick_size: Decimal) -> MatchingResult {
    let buys = sort_buys(buys);
    let sells = sort_sells(sells);

    let clearing = compute_clearing_price(&buys, &sells, tick_size);
    let price = clearing.clearing_price;

    if !clearing.method.is_crossing() {
        tracing::debug!(
            buys = buys.len(),
            sells = sells.len(),
            clearing_price = %price,
            method = ?clearing.method,
            "Batch does not cross"
        );
        return MatchingResult::empty(price);
    }

    let eligible_buys: Vec<&Order> = buys
        .into_iter()
        .filter(|o| o.is_matchable_at(price))
        .collect();
    let eligible_sells: Vec<&Order> = sells
        .into_iter()
        .filter(|o| o.is_matchable_at(price))
        .collect();

    if eligible_buys.is_empty() || eligible_sells.is_empty() {
        tracing::debug!(
            clearing_price = %price,
            eligible_buys = eligible_buys.len(),
            eligible_sells = eligible_sells.len(),
            "No counterparty at clearing price"
        );
        return MatchingResult::empty(price);
    }

    let demand: Decimal = eligible_buys.iter().map(|o| o.quantity).sum();
    let supply: Decimal = eligible_sells.iter().map(|o| o.quantity).sum();
    let volume = demand.min(supply);

    let mut allocations = allocate_side(&eligible_buys, volume, price);
    allocations.extend(allocate_side(&eligible_sells, volume, price));

    tracing::debug!(
        clearing_price = %price,
        method = ?clearing.method,
        volume = %volume,
        fills = allocations.len(),
        "Batch cleared"
    );

    MatchingResult {
        clearing_price: price,
        allocations,
        total_volume: volume,
    }
}

/// Clear a mixed batch, splitting it by side first.
#[must_use]
pub fn match_batch(orders: &[Order], tick_size: Decimal) -> MatchingResult {
    let (buys, sells): (Vec<Order>, Vec<Order>) = orders
        .iter()
        .cloned()
        .partition(|o| o.side == OrderSide::Buy);
    match_orders(&buys, &sells, tick_size)
}
