//! # uniclear-matchcore
//!
//! **Pure deterministic batch matching for UniClear.**
//!
//! MatchCore takes the buy and sell orders of one batch and produces a
//! single uniform clearing price plus a fill for every participating order.
//! It has:
//!
//! - **Zero side effects**: no storage, no clocks, no shared state
//! - **Permutation invariance**: the same multiset of orders gives the same
//!   result whatever order the slices arrive in
//! - **Exact pro-rata**: an over-subscribed side always sums to the matched
//!   volume, the last order in priority absorbs the rounding remainder
//! - **No error path**: empty and one-sided books clear to an empty result

pub mod allocation;
pub mod clearing;
pub mod matcher;
pub mod priority;
pub mod tick;

pub use allocation::allocate_side;
pub use clearing::{ClearingMethod, ClearingResult, compute_clearing_price};
pub use matcher::{match_batch, match_orders};
pub use priority::{sort_buys, sort_sells};
pub use tick::align_to_tick;
