//! # uniclear-scheduler
//!
//! **Keeps every active market a few reserved batches ahead.**
//!
//! A [`BatchScheduler`] runs a planning pass on a fixed interval. Each pass
//! reserves network slots for the upcoming batches of every active market
//! through a [`ReservationClient`] and records them in a [`BatchStore`].
//! Order intake asks [`BatchScheduler::find_next_batch_for_order`] which
//! batch a new order joins and until when.
//!
//! Dependencies are injected as trait objects:
//!
//! - [`BatchStore`]: persistence; [`InMemoryBatchStore`] ships in-process
//! - [`ReservationClient`]: slot reservations and receipts;
//!   [`SimulatedReservationClient`] is a seeded double
//! - [`Clock`]: [`SystemClock`] or a hand-driven [`ManualClock`]
//!
//! Nothing here is fatal. A market or a single batch that fails to plan is
//! logged and the pass moves on; a refused reservation becomes a FAILED
//! batch.

pub mod clock;
pub mod reservation;
pub mod scheduler;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use reservation::{ReservationClient, SimulatedReservationClient};
pub use scheduler::{BatchScheduler, MarketWindow, PassReport, SchedulerStatus};
pub use store::{BatchStore, InMemoryBatchStore};
