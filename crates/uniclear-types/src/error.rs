//! Error types for the UniClear batch auction.
//!
//! All errors use the `UC_ERR_` prefix convention for easy grepping in logs.
//! Error codes are grouped by subsystem:
//! - 2xx: Commitment errors
//! - 3xx: Scheduling / persistence errors
//! - 4xx: Reservation errors
//! - 9xx: Configuration errors
//!
//! The matching engine has no error path: every order set clears to a
//! well-formed (possibly empty) result.

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::{BatchStatus, MarketId, PlannedBatchId, ReservationId, Slot};

/// Central error enum for all UniClear operations.
#[derive(Debug, Error)]
pub enum UniclearError {
    // =================================================================
    // Commitment Errors (2xx)
    // =================================================================
    /// A commitment tree was requested over an unusable leaf set.
    #[error("UC_ERR_200: Invalid commitment input: {reason}")]
    InvalidInput { reason: String },

    // =================================================================
    // Scheduling / Persistence Errors (3xx)
    // =================================================================
    /// Planning one market failed; the pass continued with the others.
    #[error("UC_ERR_300: Planning pass failed for {market}: {reason}")]
    PlanningPassFailed { market: MarketId, reason: String },

    /// A planned batch already exists for this (market, slot).
    #[error("UC_ERR_301: Batch already planned for {market} at {slot}")]
    DuplicateSlot { market: MarketId, slot: Slot },

    /// A planned batch of this market already sits within the eta tolerance.
    #[error("UC_ERR_302: Batch already planned for {market} near {eta}")]
    EtaConflict {
        market: MarketId,
        eta: DateTime<Utc>,
    },

    /// The requested planned batch does not exist.
    #[error("UC_ERR_303: Planned batch not found: {0}")]
    BatchNotFound(PlannedBatchId),

    /// The storage layer failed.
    #[error("UC_ERR_305: Persistence error: {0}")]
    Persistence(String),

    /// A planned batch cannot move from its current status to the requested one.
    #[error("UC_ERR_306: Illegal transition for {batch}: {from} -> {to}")]
    IllegalTransition {
        batch: PlannedBatchId,
        from: BatchStatus,
        to: BatchStatus,
    },

    // =================================================================
    // Reservation Errors (4xx)
    // =================================================================
    /// The reservation capability refused or failed the request.
    #[error("UC_ERR_400: Reservation failed for {market} at {slot}: {reason}")]
    ReservationFailed {
        market: MarketId,
        slot: Slot,
        reason: String,
    },

    /// A just-in-time bid did not win capacity.
    #[error("UC_ERR_401: Just-in-time request lost for {market}: {reason}")]
    JustInTimeLost { market: MarketId, reason: String },

    /// The reservation capability does not know this reservation.
    #[error("UC_ERR_402: Reservation not found: {0}")]
    ReservationNotFound(ReservationId),

    // =================================================================
    // Configuration (9xx)
    // =================================================================
    /// Configuration error (invalid config file, missing fields, etc.).
    #[error("UC_ERR_902: Configuration error: {0}")]
    Configuration(String),
}

/// Crate-wide `Result` alias.
pub type Result<T> = std::result::Result<T, UniclearError>;

impl UniclearError {
    /// Whether a failure on one batch leaves the rest of its market
    /// plannable.
    ///
    /// A configuration error affects every candidate of the market alike,
    /// so the scheduler gives up on the market for this pass instead.
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        !matches!(self, Self::Configuration(_))
    }
}
