//! Pro-rata allocation of the matched volume across one side.

use rust_decimal::{Decimal, RoundingStrategy};
use uniclear_types::{Allocation, Order, constants};

/// Allocate `available` volume across `orders` (in priority order) at `price`.
///
/// If the side asks for no more than `available`, every order fills
/// completely. Otherwise every order but the last gets its proportional
/// share truncated to [`constants::ALLOCATION_SCALE`] fractional digits, and
/// the last order gets whatever is left, so the side sums to `available`
/// exactly.
#[must_use]
pub fn allocate_side(orders: &[&Order], available: Decimal, price: Decimal) -> Vec<Allocation> {
    let side_total: Decimal = orders.iter().map(|o| o.quantity).sum();
    let fill = |order: &Order, quantity| Allocation {
        order_id: order.id,
        side: order.side,
        quantity,
        price,
    };

    if side_total <= available {
        return orders.iter().map(|&o| fill(o, o.quantity)).collect();
    }

    let last = orders.len() - 1;
    let mut allocated = Decimal::ZERO;
    let mut fills = Vec::with_capacity(orders.len());
    for (idx, &order) in orders.iter().enumerate() {
        let quantity = if idx == last {
            available - allocated
        } else {
            pro_rata_share(order.quantity, available, side_total)
        };
        allocated += quantity;
        fills.push(fill(order, quantity));
    }
    fills
}

/// `floor(quantity × available / side_total)` at the allocation scale.
fn pro_rata_share(quantity: Decimal, available: Decimal, side_total: Decimal) -> Decimal {
    let share = quantity
        .checked_mul(available)
        .map_or_else(|| quantity / side_total * available, |q| q / side_total);
    share.round_dp_with_strategy(constants::ALLOCATION_SCALE, RoundingStrategy::ToZero)
}
