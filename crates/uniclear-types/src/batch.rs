//! Planned batch lifecycle types.
//!
//! A [`PlannedBatch`] is one future round of the auction for one market,
//! tied to a reserved network slot:
//! **PLANNED → INCLUSION_PUBLISHED → EXECUTED**, or **FAILED** when the
//! slot reservation could not be obtained.
//!
//! The scheduler creates rows; only the execution step advances them.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::{MarketId, PlannedBatchId, ReservationId, Slot};

/// Lifecycle status of a planned batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BatchStatus {
    /// Slot reserved; accepting orders until the cutoff.
    Planned,
    /// The batch's commitment was published for inclusion.
    InclusionPublished,
    /// Matching ran and the result root is committed.
    Executed,
    /// The slot reservation failed; the batch never runs.
    Failed,
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Planned => write!(f, "PLANNED"),
            Self::InclusionPublished => write!(f, "INCLUSION_PUBLISHED"),
            Self::Executed => write!(f, "EXECUTED"),
            Self::Failed => write!(f, "FAILED"),
        }
    }
}

impl BatchStatus {
    /// Statuses that count towards a market's look-ahead window.
    #[must_use]
    pub fn is_live(self) -> bool {
        matches!(self, Self::Planned | Self::InclusionPublished)
    }

    /// PLANNED → INCLUSION_PUBLISHED → EXECUTED; FAILED and EXECUTED are final.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Planned, Self::InclusionPublished) | (Self::InclusionPublished, Self::Executed)
        )
    }
}

/// One future batch of a market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlannedBatch {
    pub id: PlannedBatchId,
    pub market: MarketId,
    pub slot: Slot,
    /// Estimated time of arrival (execution time) of the batch.
    pub eta: DateTime<Utc>,
    pub status: BatchStatus,
    /// `None` when the reservation failed.
    pub reservation_id: Option<ReservationId>,
    /// Merkle root committed by the execution step.
    pub merkle_root: Option<[u8; 32]>,
    /// When the commitment was included on the network.
    pub included_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl PlannedBatch {
    /// A batch whose slot reservation was accepted.
    #[must_use]
    pub fn planned(
        market: MarketId,
        slot: Slot,
        eta: DateTime<Utc>,
        reservation_id: ReservationId,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlannedBatchId::new(),
            market,
            slot,
            eta,
            status: BatchStatus::Planned,
            reservation_id: Some(reservation_id),
            merkle_root: None,
            included_at: None,
            created_at,
        }
    }

    /// A batch recorded after its slot reservation failed.
    #[must_use]
    pub fn failed(
        market: MarketId,
        slot: Slot,
        eta: DateTime<Utc>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: PlannedBatchId::new(),
            market,
            slot,
            eta,
            status: BatchStatus::Failed,
            reservation_id: None,
            merkle_root: None,
            included_at: None,
            created_at,
        }
    }

    /// Last instant an order may still join this batch.
    ///
    /// Saturates at the earliest representable instant.
    #[must_use]
    pub fn cutoff(&self, lead: Duration) -> DateTime<Utc> {
        self.eta
            .checked_sub_signed(lead)
            .unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    /// Live and still in the future.
    #[must_use]
    pub fn is_upcoming(&self, now: DateTime<Utc>) -> bool {
        self.status.is_live() && self.eta > now
    }

    #[must_use]
    pub fn root_hex(&self) -> Option<String> {
        self.merkle_root.map(hex::encode)
    }
}

/// Answer to "which batch should a new order join".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchAssignment {
    pub batch: PlannedBatch,
    /// `batch.eta - cutoff_lead`.
    pub cutoff: DateTime<Utc>,
}
