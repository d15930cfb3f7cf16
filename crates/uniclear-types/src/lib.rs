//! # uniclear-types
//!
//! Shared types, errors, and configuration for the **UniClear** batch auction.
//!
//! This crate is the leaf dependency of the workspace; every other crate
//! depends on it. It defines:
//!
//! - **Identifiers**: [`OrderId`], [`MarketId`], [`PlannedBatchId`], [`ReservationId`], [`Slot`], [`MarketPair`]
//! - **Order model**: [`Order`], [`OrderSide`], [`OrderType`]
//! - **Matching output**: [`Allocation`], [`MatchingResult`]
//! - **Batch planning**: [`PlannedBatch`], [`BatchStatus`], [`BatchAssignment`]
//! - **Reservations**: [`Reservation`], [`ReservationStatus`], [`ReceiptEvent`]
//! - **Markets**: [`Market`]
//! - **Configuration**: [`SchedulerConfig`], [`UniclearConfig`]
//! - **Errors**: [`UniclearError`] with `UC_ERR_` prefix codes
//! - **Constants**: system-wide defaults

pub mod allocation;
pub mod batch;
pub mod config;
pub mod constants;
pub mod error;
pub mod ids;
pub mod market;
pub mod order;
pub mod reservation;

// Re-export all primary types at crate root for ergonomic imports:
//   use uniclear_types::{Order, OrderSide, PlannedBatch, ...};

pub use allocation::*;
pub use batch::*;
pub use config::*;
pub use error::*;
pub use ids::*;
pub use market::*;
pub use order::*;
pub use reservation::*;

// Constants are accessed via `uniclear_types::constants::FOO`
// (not re-exported to avoid name collisions).
