//! Leaf encodings for batch commitments.
//!
//! Each leaf is SHA-256 over a domain tag followed by the record's fields.
//! Decimals are normalized first, so `10.50` and `10.5` commit identically.

use rust_decimal::Decimal;
use uniclear_types::{Allocation, MatchingResult, Order, OrderSide, Result};

use crate::{MerkleHash, MerkleTree, hash};

const FILL_TAG: &[u8] = b"uniclear:fill:v1:";
const ORDER_TAG: &[u8] = b"uniclear:order:v1:";

fn side_byte(side: OrderSide) -> u8 {
    match side {
        OrderSide::Buy => b'B',
        OrderSide::Sell => b'S',
    }
}

fn push_decimal(buf: &mut Vec<u8>, value: Decimal) {
    buf.extend_from_slice(value.normalize().to_string().as_bytes());
    buf.push(b'|');
}

/// Leaf digest for one fill.
#[must_use]
pub fn allocation_leaf(allocation: &Allocation) -> MerkleHash {
    let mut buf = Vec::with_capacity(96);
    buf.extend_from_slice(FILL_TAG);
    buf.extend_from_slice(allocation.order_id.0.as_bytes());
    buf.push(side_byte(allocation.side));
    push_decimal(&mut buf, allocation.quantity);
    push_decimal(&mut buf, allocation.price);
    hash(&buf)
}

/// Leaf digest for one order as admitted to a batch.
///
/// Market orders encode their price as `M`.
#[must_use]
pub fn order_leaf(order: &Order) -> MerkleHash {
    let mut buf = Vec::with_capacity(128);
    buf.extend_from_slice(ORDER_TAG);
    buf.extend_from_slice(order.id.0.as_bytes());
    buf.extend_from_slice(order.market.0.as_bytes());
    buf.push(side_byte(order.side));
    push_decimal(&mut buf, order.quantity);
    match order.limit_price() {
        Some(price) => push_decimal(&mut buf, price),
        None => buf.extend_from_slice(b"M|"),
    }
    buf.extend_from_slice(&order.submitted_at.timestamp_millis().to_be_bytes());
    hash(&buf)
}

/// Commit to a batch's fills, in allocation order.
///
/// # Errors
/// `InvalidInput` if the batch traded nothing.
pub fn commit_allocations(result: &MatchingResult) -> Result<MerkleTree> {
    let leaves: Vec<MerkleHash> = result.allocations.iter().map(allocation_leaf).collect();
    MerkleTree::build(&leaves)
}

/// Commit to the orders admitted to a batch, in the given order.
///
/// # Errors
/// `InvalidInput` if `orders` is empty.
pub fn commit_orders(orders: &[Order]) -> Result<MerkleTree> {
    let leaves: Vec<MerkleHash> = orders.iter().map(order_leaf).collect();
    MerkleTree::build(&leaves)
}
