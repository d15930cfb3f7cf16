//! Slot reservation types owned by the external reservation capability.
//!
//! The scheduler only records a reservation's id when it plans a batch;
//! everything after that travels as [`ReceiptEvent`]s.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketId, ReservationId, Slot};

/// How the capacity was requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationMode {
    /// Reserved for a specific future slot.
    AheadOfTime { slot: Slot },
    /// Auction-style request close to execution time.
    JustInTime { bid_amount: Decimal },
}

/// Status of a reservation as reported by the capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReservationStatus {
    Pending,
    PreConfirmed,
    Finalized,
    Failed,
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Pending => write!(f, "PENDING"),
            Self::PreConfirmed => write!(f, "PRE_CONFIRMED"),
            Self::Finalized => write!(f, "FINALIZED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl ReservationStatus {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Finalized | Self::Failed)
    }
}

/// A reservation record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reservation {
    pub id: ReservationId,
    pub market: MarketId,
    pub mode: ReservationMode,
    pub status: ReservationStatus,
    pub requested_at: DateTime<Utc>,
}

/// A receipt pushed by the reservation capability.
///
/// Per reservation there is at most one `PreConfirmation` and at most one
/// terminal event, delivered in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptEvent {
    PreConfirmation {
        reservation_id: ReservationId,
        at: DateTime<Utc>,
    },
    FinalInclusion {
        reservation_id: ReservationId,
        settlement_ref: String,
        at: DateTime<Utc>,
    },
    Failed {
        reservation_id: ReservationId,
        reason: String,
        at: DateTime<Utc>,
    },
}

impl ReceiptEvent {
    #[must_use]
    pub fn reservation_id(&self) -> ReservationId {
        match self {
            Self::PreConfirmation { reservation_id, .. }
            | Self::FinalInclusion { reservation_id, .. }
            | Self::Failed { reservation_id, .. } => *reservation_id,
        }
    }

    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::PreConfirmation { .. })
    }

    /// The reservation status this event moves to.
    #[must_use]
    pub fn status(&self) -> ReservationStatus {
        match self {
            Self::PreConfirmation { .. } => ReservationStatus::PreConfirmed,
            Self::FinalInclusion { .. } => ReservationStatus::Finalized,
            Self::Failed { .. } => ReservationStatus::Failed,
        }
    }
}
