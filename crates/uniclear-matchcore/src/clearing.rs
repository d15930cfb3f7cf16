//! Clearing price discovery for batch auctions.
//!
//! Walks the distinct limit prices of the batch in ascending order. At each
//! level the level's sell quantity joins the supply accumulator *first*, and
//! only then is demand tested against it; the level's buy quantity joins the
//! demand accumulator after the test. This sequencing decides which way
//! ties lean and is part of the matching contract.
//!
//! When no level crosses, market quantities are added to both accumulators
//! and, if they now cross, the batch clears at the bid/ask midpoint. A book
//! of market orders only skips the walk and goes straight to the midpoint.
//!
//! An unbounded midpoint is reported as `Decimal::MAX`. Limit buys never
//! accept it, so such a batch trades only between market buys and sells.
//!
//! The algorithm is deterministic: same multiset of orders → same price.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use uniclear_types::Order;

use crate::tick::{align_to_tick, midpoint};

/// How the clearing price was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClearingMethod {
    /// No orders at all.
    EmptyBook,
    /// Sells only; the price is the best ask, nothing trades.
    SellOnly,
    /// Buys only; a buy-only book never clears.
    BuyOnly,
    /// Demand covered supply at a limit price level.
    LevelCrossing,
    /// No level crossed but total demand (market orders included) covers
    /// total supply; bid/ask midpoint.
    MarketMidpoint,
    /// Market orders only; the midpoint of 0 and an unbounded ask.
    MarketOnlyMidpoint,
    /// Demand never covered supply.
    NoCrossing,
}

impl ClearingMethod {
    /// Whether orders may trade at the discovered price.
    #[must_use]
    pub fn is_crossing(self) -> bool {
        matches!(
            self,
            Self::LevelCrossing | Self::MarketMidpoint | Self::MarketOnlyMidpoint
        )
    }
}

/// Result of clearing price computation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClearingResult {
    /// The uniform clearing price (0 when nothing can clear).
    pub clearing_price: Decimal,
    pub method: ClearingMethod,
    /// Highest buy limit in the batch.
    pub best_bid: Option<Decimal>,
    /// Lowest sell limit in the batch.
    pub best_ask: Option<Decimal>,
}

/// Compute the uniform clearing price for one batch.
///
/// `buys` and `sells` must already be in priority order
/// (see [`sort_buys`](crate::sort_buys) / [`sort_sells`](crate::sort_sells)).
#[must_use]
pub fn compute_clearing_price(
    buys: &[&Order],
    sells: &[&Order],
    tick_size: Decimal,
) -> ClearingResult {
    let best_bid = buys.iter().filter_map(|o| o.limit_price()).max();
    let best_ask = sells.iter().filter_map(|o| o.limit_price()).min();
    let result = |clearing_price, method| ClearingResult {
        clearing_price,
        method,
        best_bid,
        best_ask,
    };

    match (buys.first(), sells.first()) {
        (None, None) => return result(Decimal::ZERO, ClearingMethod::EmptyBook),
        (None, Some(best_sell)) => {
            // A market sell ranks first and pins the reported price to zero.
            let price = best_sell
                .limit_price()
                .map_or(Decimal::ZERO, |p| align_to_tick(p, tick_size));
            return result(price, ClearingMethod::SellOnly);
        }
        (Some(_), None) => return result(Decimal::ZERO, ClearingMethod::BuyOnly),
        (Some(_), Some(_)) => {}
    }

    if best_bid.is_none() && best_ask.is_none() {
        let price = align_to_tick(midpoint(None, None), tick_size);
        return result(price, ClearingMethod::MarketOnlyMidpoint);
    }

    // (buy quantity, sell quantity) per distinct limit price, ascending.
    let mut levels: BTreeMap<Decimal, (Decimal, Decimal)> = BTreeMap::new();
    for order in buys {
        if let Some(price) = order.limit_price() {
            levels.entry(price).or_default().0 += order.quantity;
        }
    }
    for order in sells {
        if let Some(price) = order.limit_price() {
            levels.entry(price).or_default().1 += order.quantity;
        }
    }

    let mut cum_demand = Decimal::ZERO;
    let mut cum_supply = Decimal::ZERO;
    for (price, (buy_qty, sell_qty)) in &levels {
        cum_supply += *sell_qty;
        if covers(cum_demand, cum_supply) {
            return result(align_to_tick(*price, tick_size), ClearingMethod::LevelCrossing);
        }
        cum_demand += *buy_qty;
    }

    cum_demand += market_quantity(buys);
    cum_supply += market_quantity(sells);
    if !covers(cum_demand, cum_supply) {
        return result(Decimal::ZERO, ClearingMethod::NoCrossing);
    }

    let mid = midpoint(best_bid, best_ask);
    result(align_to_tick(mid, tick_size), ClearingMethod::MarketMidpoint)
}

/// Demand covers supply. An empty demand accumulator covers nothing.
fn covers(demand: Decimal, supply: Decimal) -> bool {
    demand > Decimal::ZERO && demand >= supply
}

fn market_quantity(orders: &[&Order]) -> Decimal {
    orders
        .iter()
        .filter(|o| o.is_market())
        .map(|o| o.quantity)
        .sum()
}

#[cfg(test)]
mod tests {
    use rust_decimal::Decimal;
    use uniclear_types::*;

    use super::*;
    use crate::{sort_buys, sort_sells};

    fn tick() -> Decimal {
        Decimal::new(1, 2)
    }

    fn limit(side: OrderSide, price: Decimal, qty: i64) -> Order {
        Order::dummy_limit(side, price, Decimal::new(qty, 0))
    }

    fn clear(buys: &[Order], sells: &[Order]) -> ClearingResult {
        compute_clearing_price(&sort_buys(buys), &sort_sells(sells), tick())
    }

    #[test]
    fn empty_book_clears_at_zero() {
        let result = clear(&[], &[]);
        assert_eq!(result.clearing_price, Decimal::ZERO);
        assert_eq!(result.method, ClearingMethod::EmptyBook);
    }

    #[test]
    fn sell_only_reports_best_ask() {
        let sells = vec![
            limit(OrderSide::Sell, Decimal::new(11_004, 3), 5),
            limit(OrderSide::Sell, Decimal::new(12, 0), 5),
        ];
        let result = clear(&[], &sells);
        assert_eq!(result.clearing_price, Decimal::new(1100, 2));
        assert_eq!(result.method, ClearingMethod::SellOnly);
        assert!(!result.method.is_crossing());
    }

    #[test]
    fn sell_only_with_market_sell_reports_zero() {
        let sells = vec![
            limit(OrderSide::Sell, Decimal::new(11, 0), 5),
            Order::dummy_market(OrderSide::Sell, Decimal::ONE),
        ];
        let result = clear(&[], &sells);
        assert_eq!(result.clearing_price, Decimal::ZERO);
    }

    #[test]
    fn buy_only_never_clears() {
        let buys = vec![limit(OrderSide::Buy, Decimal::new(11, 0), 5)];
        let result = clear(&buys, &[]);
        assert_eq!(result.clearing_price, Decimal::ZERO);
        assert_eq!(result.method, ClearingMethod::BuyOnly);
    }

    #[test]
    fn level_walk_stops_at_first_covered_level() {
        let buys = vec![
            limit(OrderSide::Buy, Decimal::new(105, 1), 100),
            limit(OrderSide::Buy, Decimal::new(10, 0), 100),
        ];
        let sells = vec![
            limit(OrderSide::Sell, Decimal::new(11, 0), 100),
            limit(OrderSide::Sell, Decimal::new(115, 1), 100),
        ];
        let result = clear(&buys, &sells);
        assert_eq!(result.clearing_price, Decimal::new(105, 1));
        assert_eq!(result.method, ClearingMethod::LevelCrossing);
        assert_eq!(result.best_bid, Some(Decimal::new(105, 1)));
        assert_eq!(result.best_ask, Some(Decimal::new(11, 0)));
    }

    #[test]
    fn sell_quantity_counts_before_the_test() {
        // At 10: supply 50 arrives before demand is tested, demand 0 → no.
        // At 12: supply 50, demand 60 from level 10 → cross at 12.
        let buys = vec![limit(OrderSide::Buy, Decimal::new(10, 0), 60)];
        let sells = vec![
            limit(OrderSide::Sell, Decimal::new(10, 0), 50),
            limit(OrderSide::Sell, Decimal::new(12, 0), 0),
        ];
        let result = clear(&buys, &sells);
        assert_eq!(result.clearing_price, Decimal::new(12, 0));
    }

    #[test]
    fn no_level_cross_falls_back_to_midpoint() {
        let buys = vec![
            limit(OrderSide::Buy, Decimal::new(11, 0), 50),
            limit(OrderSide::Buy, Decimal::new(11, 0), 50),
        ];
        let sells = vec![limit(OrderSide::Sell, Decimal::new(10, 0), 70)];
        let result = clear(&buys, &sells);
        assert_eq!(result.clearing_price, Decimal::new(105, 1));
        assert_eq!(result.method, ClearingMethod::MarketMidpoint);
    }

    #[test]
    fn market_quantity_enables_midpoint_cross() {
        let buys = vec![
            limit(OrderSide::Buy, Decimal::new(9, 0), 10),
            Order::dummy_market(OrderSide::Buy, Decimal::new(100, 0)),
        ];
        let sells = vec![limit(OrderSide::Sell, Decimal::new(10, 0), 50)];
        let result = clear(&buys, &sells);
        assert_eq!(result.method, ClearingMethod::MarketMidpoint);
        assert_eq!(result.clearing_price, Decimal::new(95, 1));
    }

    #[test]
    fn insufficient_demand_does_not_cross() {
        let buys = vec![limit(OrderSide::Buy, Decimal::new(10, 0), 10)];
        let sells = vec![Order::dummy_market(OrderSide::Sell, Decimal::new(100, 0))];
        let result = clear(&buys, &sells);
        assert_eq!(result.method, ClearingMethod::NoCrossing);
        assert_eq!(result.clearing_price, Decimal::ZERO);
    }

    #[test]
    fn missing_ask_gives_unbounded_midpoint() {
        let buys = vec![limit(OrderSide::Buy, Decimal::new(10, 0), 100)];
        let sells = vec![Order::dummy_market(OrderSide::Sell, Decimal::new(50, 0))];
        let result = clear(&buys, &sells);
        assert_eq!(result.method, ClearingMethod::MarketMidpoint);
        assert_eq!(result.clearing_price, Decimal::MAX);
        assert_eq!(result.best_ask, None);
    }

    #[test]
    fn all_market_book_skips_the_walk() {
        // Supply exceeds demand, yet there is no walk to fail.
        let buys = vec![Order::dummy_market(OrderSide::Buy, Decimal::ONE)];
        let sells = vec![Order::dummy_market(OrderSide::Sell, Decimal::new(5, 0))];
        let result = clear(&buys, &sells);
        assert_eq!(result.method, ClearingMethod::MarketOnlyMidpoint);
        assert!(result.method.is_crossing());
        assert_eq!(result.clearing_price, Decimal::MAX);
    }
}
