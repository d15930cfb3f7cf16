//! Tick alignment of prices.

use rust_decimal::{Decimal, RoundingStrategy};

/// Snap `price` to the nearest multiple of `tick_size`, halves away from zero.
///
/// A non-positive tick, or a price too large to divide (such as the
/// `Decimal::MAX` rank of a market buy), is returned unchanged.
#[must_use]
pub fn align_to_tick(price: Decimal, tick_size: Decimal) -> Decimal {
    if tick_size <= Decimal::ZERO {
        return price;
    }
    price
        .checked_div(tick_size)
        .map(|ticks| ticks.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|ticks| ticks.checked_mul(tick_size))
        .unwrap_or(price)
}

/// Midpoint between the best bid and the best ask.
///
/// A missing bid counts as 0. A missing ask is unbounded, and any midpoint
/// with an unbounded end is itself unbounded: `Decimal::MAX`, the same rank
/// a market buy takes in priority ordering. Only market sells accept it.
#[must_use]
pub fn midpoint(best_bid: Option<Decimal>, best_ask: Option<Decimal>) -> Decimal {
    match (best_bid, best_ask) {
        (Some(bid), Some(ask)) => bid
            .checked_add(ask)
            .map(|sum| sum / Decimal::TWO)
            .or_else(|| (bid / Decimal::TWO).checked_add(ask / Decimal::TWO))
            .unwrap_or(Decimal::MAX),
        (None, Some(ask)) => ask / Decimal::TWO,
        (_, None) => Decimal::MAX,
    }
}
