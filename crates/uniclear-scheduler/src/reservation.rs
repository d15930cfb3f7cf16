//! Slot reservation capability.
//!
//! [`ReservationClient`] is what the scheduler calls to reserve network
//! capacity for a batch. Outcomes arrive later as [`ReceiptEvent`]s on a
//! broadcast channel; dropping the receiver unsubscribes.
//!
//! [`SimulatedReservationClient`] is a seeded in-process double. All of its
//! randomness lives here and never reaches the planner.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tokio::sync::broadcast;
use uniclear_types::{
    MarketId, ReceiptEvent, Reservation, ReservationId, ReservationMode, ReservationStatus,
    Result, Slot, UniclearError, constants,
};

use crate::{Clock, SystemClock};

/// Reserves execution capacity on the underlying network.
#[async_trait]
pub trait ReservationClient: Send + Sync {
    /// Reserve capacity for a specific future slot.
    ///
    /// Acceptance only means the request was taken; the outcome is reported
    /// through [`subscribe_receipts`](Self::subscribe_receipts).
    async fn reserve_ahead_of_time(&self, market: MarketId, slot: Slot) -> Result<ReservationId>;

    /// Auction-style request close to execution time.
    async fn request_just_in_time(
        &self,
        market: MarketId,
        bid_amount: Decimal,
    ) -> Result<ReservationId>;

    /// Give back a reservation the caller will not use.
    ///
    /// An open reservation ends `Failed` and its slot becomes free again.
    /// Releasing a reservation that already reached a terminal status does
    /// nothing.
    async fn release(&self, reservation: ReservationId) -> Result<()>;

    /// Receive receipt events from now on. Drop the receiver to unsubscribe.
    fn subscribe_receipts(&self) -> broadcast::Receiver<ReceiptEvent>;
}

// ---------------------------------------------------------------------------
// SimulatedReservationClient
// ---------------------------------------------------------------------------

#[derive(Debug)]
struct SimState {
    rng: StdRng,
    /// Chance an ahead-of-time request is refused outright.
    failure_probability: f64,
    /// Chance a pre-confirmed reservation ends `Failed` instead of `Finalized`.
    finality_failure_probability: f64,
    jit_acceptance_probability: f64,
    failing_slots: HashSet<(MarketId, Slot)>,
    reservations: BTreeMap<ReservationId, Reservation>,
    /// Live ahead-of-time reservations, keyed by target.
    held_slots: HashSet<(MarketId, Slot)>,
}

/// Deterministic, seeded stand-in for the reservation network.
#[derive(Debug)]
pub struct SimulatedReservationClient {
    state: Mutex<SimState>,
    receipts: broadcast::Sender<ReceiptEvent>,
    clock: Arc<dyn Clock>,
}

impl SimulatedReservationClient {
    /// A client that accepts every request.
    #[must_use]
    pub fn new(seed: u64) -> Self {
        let (receipts, _) = broadcast::channel(constants::RECEIPT_CHANNEL_CAPACITY);
        Self {
            state: Mutex::new(SimState {
                rng: StdRng::seed_from_u64(seed),
                failure_probability: 0.0,
                finality_failure_probability: 0.0,
                jit_acceptance_probability: 1.0,
                failing_slots: HashSet::new(),
                reservations: BTreeMap::new(),
                held_slots: HashSet::new(),
            }),
            receipts,
            clock: Arc::new(SystemClock),
        }
    }

    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    #[must_use]
    pub fn with_failure_probability(self, p: f64) -> Self {
        self.lock().failure_probability = p.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_finality_failure_probability(self, p: f64) -> Self {
        self.lock().finality_failure_probability = p.clamp(0.0, 1.0);
        self
    }

    #[must_use]
    pub fn with_jit_acceptance_probability(self, p: f64) -> Self {
        self.lock().jit_acceptance_probability = p.clamp(0.0, 1.0);
        self
    }

    /// Refuse every ahead-of-time request for this (market, slot).
    pub fn fail_slot(&self, market: MarketId, slot: Slot) {
        self.lock().failing_slots.insert((market, slot));
    }

    #[must_use]
    pub fn reservation(&self, id: ReservationId) -> Option<Reservation> {
        self.lock().reservations.get(&id).cloned()
    }

    #[must_use]
    pub fn reservation_count(&self) -> usize {
        self.lock().reservations.len()
    }

    /// Advance every open reservation by one step and publish the receipts.
    ///
    /// `Pending` reservations are pre-confirmed; `PreConfirmed` ones reach a
    /// terminal status. Terminal reservations emit nothing further, so each
    /// reservation yields at most one pre-confirmation and one terminal event.
    /// Returns the number of events published.
    pub fn deliver_receipts(&self) -> usize {
        let at = self.clock.now();
        let mut events = Vec::new();
        {
            let mut state = self.lock();
            let SimState {
                rng,
                finality_failure_probability,
                reservations,
                held_slots,
                ..
            } = &mut *state;

            for reservation in reservations.values_mut() {
                let event = match reservation.status {
                    ReservationStatus::Pending => ReceiptEvent::PreConfirmation {
                        reservation_id: reservation.id,
                        at,
                    },
                    ReservationStatus::PreConfirmed => {
                        if rng.gen_bool(*finality_failure_probability) {
                            if let ReservationMode::AheadOfTime { slot } = reservation.mode {
                                held_slots.remove(&(reservation.market, slot));
                            }
                            ReceiptEvent::Failed {
                                reservation_id: reservation.id,
                                reason: "slot capacity revoked".into(),
                                at,
                            }
                        } else {
                            ReceiptEvent::FinalInclusion {
                                reservation_id: reservation.id,
                                settlement_ref: settlement_ref(reservation),
                                at,
                            }
                        }
                    }
                    ReservationStatus::Finalized | ReservationStatus::Failed => continue,
                };
                reservation.status = event.status();
                events.push(event);
            }
        }

        let published = events.len();
        for event in events {
            // No subscribers is not an error.
            let _ = self.receipts.send(event);
        }
        if published > 0 {
            tracing::debug!(events = published, "Delivered reservation receipts");
        }
        published
    }

    fn record(&self, state: &mut SimState, market: MarketId, mode: ReservationMode) -> ReservationId {
        let reservation = Reservation {
            id: ReservationId::new(),
            market,
            mode,
            status: ReservationStatus::Pending,
            requested_at: self.clock.now(),
        };
        let id = reservation.id;
        state.reservations.insert(id, reservation);
        id
    }

    fn lock(&self) -> MutexGuard<'_, SimState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

fn settlement_ref(reservation: &Reservation) -> String {
    match reservation.mode {
        ReservationMode::AheadOfTime { slot } => format!("sim:{}:{slot}", reservation.market),
        ReservationMode::JustInTime { .. } => format!("sim:{}:jit", reservation.market),
    }
}

#[async_trait]
impl ReservationClient for SimulatedReservationClient {
    async fn reserve_ahead_of_time(&self, market: MarketId, slot: Slot) -> Result<ReservationId> {
        let mut state = self.lock();
        let failure_probability = state.failure_probability;

        let reason = if state.failing_slots.contains(&(market, slot)) {
            Some("slot unavailable")
        } else if state.held_slots.contains(&(market, slot)) {
            Some("slot already reserved")
        } else if state.rng.gen_bool(failure_probability) {
            Some("network refused reservation")
        } else {
            None
        };
        if let Some(reason) = reason {
            return Err(UniclearError::ReservationFailed {
                market,
                slot,
                reason: reason.into(),
            });
        }

        state.held_slots.insert((market, slot));
        Ok(self.record(&mut state, market, ReservationMode::AheadOfTime { slot }))
    }

    async fn request_just_in_time(
        &self,
        market: MarketId,
        bid_amount: Decimal,
    ) -> Result<ReservationId> {
        if bid_amount <= Decimal::ZERO {
            return Err(UniclearError::JustInTimeLost {
                market,
                reason: format!("bid must be positive, got {bid_amount}"),
            });
        }
        let mut state = self.lock();
        let acceptance = state.jit_acceptance_probability;
        if !state.rng.gen_bool(acceptance) {
            return Err(UniclearError::JustInTimeLost {
                market,
                reason: "outbid".into(),
            });
        }
        Ok(self.record(&mut state, market, ReservationMode::JustInTime { bid_amount }))
    }

    async fn release(&self, reservation_id: ReservationId) -> Result<()> {
        let at = self.clock.now();
        {
            let mut state = self.lock();
            let SimState {
                reservations,
                held_slots,
                ..
            } = &mut *state;
            let reservation = reservations
                .get_mut(&reservation_id)
                .ok_or(UniclearError::ReservationNotFound(reservation_id))?;
            if reservation.status.is_terminal() {
                return Ok(());
            }
            if let ReservationMode::AheadOfTime { slot } = reservation.mode {
                held_slots.remove(&(reservation.market, slot));
            }
            reservation.status = ReservationStatus::Failed;
        }
        let _ = self.receipts.send(ReceiptEvent::Failed {
            reservation_id,
            reason: "released".into(),
            at,
        });
        tracing::debug!(reservation = %reservation_id, "Released reservation");
        Ok(())
    }

    fn subscribe_receipts(&self) -> broadcast::Receiver<ReceiptEvent> {
        self.receipts.subscribe()
    }
}
