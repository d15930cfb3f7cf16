//! Persistence boundary for markets and planned batches.
//!
//! The scheduler's idempotency rests on [`BatchStore::insert_if_absent`]:
//! it must check (market, slot) uniqueness and the eta tolerance and insert
//! in one step, so two overlapping passes can never both create a batch.

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use tokio::sync::Mutex;
use uniclear_types::{
    BatchStatus, Market, MarketId, PlannedBatch, PlannedBatchId, Result, UniclearError,
};

/// Storage for markets and their planned batches.
#[async_trait]
pub trait BatchStore: Send + Sync {
    /// Markets with `active == true`.
    async fn active_markets(&self) -> Result<Vec<Market>>;

    /// Insert or replace a market by id.
    async fn upsert_market(&self, market: Market) -> Result<()>;

    /// Live batches (PLANNED or INCLUSION_PUBLISHED) of `market` with
    /// `eta > now`, earliest first.
    async fn future_batches(&self, market: MarketId, now: DateTime<Utc>)
    -> Result<Vec<PlannedBatch>>;

    /// Whether any batch of `market`, in any status, has an eta within
    /// `tolerance` of `eta`.
    async fn exists_within(
        &self,
        market: MarketId,
        eta: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<bool>;

    /// Atomically insert `batch` unless its (market, slot) is taken
    /// (`DuplicateSlot`) or another batch of the market sits within
    /// `tolerance` of its eta (`EtaConflict`).
    async fn insert_if_absent(&self, batch: PlannedBatch, tolerance: Duration) -> Result<()>;

    /// Earliest PLANNED batch of `market` with `eta > after`.
    async fn next_planned_after(
        &self,
        market: MarketId,
        after: DateTime<Utc>,
    ) -> Result<Option<PlannedBatch>>;

    /// Move a batch forward in its lifecycle, recording the commitment root
    /// and the inclusion time when given.
    async fn advance_status(
        &self,
        id: PlannedBatchId,
        status: BatchStatus,
        merkle_root: Option<[u8; 32]>,
        at: DateTime<Utc>,
    ) -> Result<PlannedBatch>;

    /// Every batch of `market`, earliest eta first.
    async fn list_batches(&self, market: MarketId) -> Result<Vec<PlannedBatch>>;
}

// ---------------------------------------------------------------------------
// InMemoryBatchStore
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
struct StoreState {
    markets: BTreeMap<MarketId, Market>,
    batches: BTreeMap<PlannedBatchId, PlannedBatch>,
}

impl StoreState {
    fn batches_of(&self, market: MarketId) -> impl Iterator<Item = &PlannedBatch> {
        self.batches.values().filter(move |b| b.market == market)
    }

    fn within(&self, market: MarketId, eta: DateTime<Utc>, tolerance: Duration) -> bool {
        self.batches_of(market)
            .any(|b| (b.eta - eta).abs() <= tolerance)
    }
}

/// A [`BatchStore`] held in process memory behind one lock.
#[derive(Debug, Default)]
pub struct InMemoryBatchStore {
    state: Mutex<StoreState>,
}

impl InMemoryBatchStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A store preloaded with `markets`.
    #[must_use]
    pub fn with_markets(markets: impl IntoIterator<Item = Market>) -> Self {
        let state = StoreState {
            markets: markets.into_iter().map(|m| (m.id, m)).collect(),
            batches: BTreeMap::new(),
        };
        Self {
            state: Mutex::new(state),
        }
    }
}

fn by_eta(mut batches: Vec<PlannedBatch>) -> Vec<PlannedBatch> {
    batches.sort_by_key(|b| (b.eta, b.slot));
    batches
}

#[async_trait]
impl BatchStore for InMemoryBatchStore {
    async fn active_markets(&self) -> Result<Vec<Market>> {
        let state = self.state.lock().await;
        Ok(state.markets.values().filter(|m| m.active).cloned().collect())
    }

    async fn upsert_market(&self, market: Market) -> Result<()> {
        self.state.lock().await.markets.insert(market.id, market);
        Ok(())
    }

    async fn future_batches(
        &self,
        market: MarketId,
        now: DateTime<Utc>,
    ) -> Result<Vec<PlannedBatch>> {
        let state = self.state.lock().await;
        Ok(by_eta(
            state
                .batches_of(market)
                .filter(|b| b.is_upcoming(now))
                .cloned()
                .collect(),
        ))
    }

    async fn exists_within(
        &self,
        market: MarketId,
        eta: DateTime<Utc>,
        tolerance: Duration,
    ) -> Result<bool> {
        Ok(self.state.lock().await.within(market, eta, tolerance))
    }

    async fn insert_if_absent(&self, batch: PlannedBatch, tolerance: Duration) -> Result<()> {
        let mut state = self.state.lock().await;
        if state
            .batches_of(batch.market)
            .any(|b| b.slot == batch.slot)
        {
            return Err(UniclearError::DuplicateSlot {
                market: batch.market,
                slot: batch.slot,
            });
        }
        if state.within(batch.market, batch.eta, tolerance) {
            return Err(UniclearError::EtaConflict {
                market: batch.market,
                eta: batch.eta,
            });
        }
        state.batches.insert(batch.id, batch);
        Ok(())
    }

    async fn next_planned_after(
        &self,
        market: MarketId,
        after: DateTime<Utc>,
    ) -> Result<Option<PlannedBatch>> {
        let state = self.state.lock().await;
        Ok(state
            .batches_of(market)
            .filter(|b| b.status == BatchStatus::Planned && b.eta > after)
            .min_by_key(|b| (b.eta, b.slot))
            .cloned())
    }

    async fn advance_status(
        &self,
        id: PlannedBatchId,
        status: BatchStatus,
        merkle_root: Option<[u8; 32]>,
        at: DateTime<Utc>,
    ) -> Result<PlannedBatch> {
        let mut state = self.state.lock().await;
        let batch = state
            .batches
            .get_mut(&id)
            .ok_or(UniclearError::BatchNotFound(id))?;
        if !batch.status.can_transition_to(status) {
            return Err(UniclearError::IllegalTransition {
                batch: id,
                from: batch.status,
                to: status,
            });
        }
        batch.status = status;
        if status == BatchStatus::InclusionPublished {
            batch.included_at = Some(at);
        }
        if merkle_root.is_some() {
            batch.merkle_root = merkle_root;
        }
        Ok(batch.clone())
    }

    async fn list_batches(&self, market: MarketId) -> Result<Vec<PlannedBatch>> {
        let state = self.state.lock().await;
        Ok(by_eta(state.batches_of(market).cloned().collect()))
    }
}
