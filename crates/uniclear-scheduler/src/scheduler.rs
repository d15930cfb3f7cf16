//! Rolling-window batch planner.
//!
//! Every `plan_interval_ms` a planning pass tops each active market up to
//! `look_ahead_batches` live future batches:
//!
//! ```text
//! live   = PLANNED | INCLUSION_PUBLISHED with eta > now
//! start  = (latest live eta | now) + cadence
//! for eta in start, start + cadence, ...   until L − |live| batches attempted
//!     skip   if any batch of the market sits within eta_tolerance
//!     slot   = eta_ms / slot_duration_ms
//!     reserve(market, slot) → PLANNED,  or FAILED on refusal
//! ```
//!
//! FAILED rows keep occupying their eta, so a refused slot is never retried.
//! A store error on one candidate is logged and the pass moves on to the
//! next one; a reservation whose row could not be stored is released.
//! Passes never overlap: a tick that finds the previous pass still running
//! is skipped. The store's atomic insert is the backstop.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{Mutex, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use uniclear_types::{
    BatchAssignment, Market, MarketId, PlannedBatch, ReservationId, Result, SchedulerConfig,
    Slot, UniclearError,
};

use crate::{BatchStore, Clock, ReservationClient};

/// Outcome of one planning pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PassReport {
    pub started_at: Option<DateTime<Utc>>,
    /// Markets planned without error.
    pub markets_planned: usize,
    /// New PLANNED batches.
    pub batches_created: usize,
    /// Candidates that already had a batch within the eta tolerance.
    pub skipped_existing: usize,
    /// Candidates recorded as FAILED.
    pub reservation_failures: usize,
    /// Candidates dropped after a store error; their market kept planning.
    pub batch_failures: usize,
    /// Markets whose planning raised an error.
    pub market_failures: usize,
    /// The pass did not run because another one was in flight.
    pub skipped_overlap: bool,
}

/// Window summary for one market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MarketWindow {
    pub market: MarketId,
    pub symbol: String,
    pub future_batches: usize,
    pub next_eta: Option<DateTime<Utc>>,
    pub next_cutoff: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub running: bool,
    pub config: SchedulerConfig,
    pub last_report: Option<PassReport>,
    pub markets: Vec<MarketWindow>,
}

struct Runner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// What planning one candidate eta amounted to.
enum Candidate {
    /// A batch already sits at this eta.
    Occupied,
    /// A PLANNED or FAILED row was stored.
    Attempted,
}

/// `from + by`, or a configuration error past the range of `DateTime`.
fn later(from: DateTime<Utc>, by: chrono::Duration) -> Result<DateTime<Utc>> {
    from.checked_add_signed(by).ok_or_else(|| {
        UniclearError::Configuration(format!("{from} + {by} is out of range"))
    })
}

/// Keeps a rolling window of reserved batches per market.
pub struct BatchScheduler {
    config: SchedulerConfig,
    store: Arc<dyn BatchStore>,
    reservations: Arc<dyn ReservationClient>,
    clock: Arc<dyn Clock>,
    pass_guard: Mutex<()>,
    last_report: Mutex<Option<PassReport>>,
    runner: Mutex<Option<Runner>>,
}

impl BatchScheduler {
    /// # Errors
    /// `Configuration` if `config` does not validate.
    pub fn new(
        config: SchedulerConfig,
        store: Arc<dyn BatchStore>,
        reservations: Arc<dyn ReservationClient>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            reservations,
            clock,
            pass_guard: Mutex::new(()),
            last_report: Mutex::new(None),
            runner: Mutex::new(None),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub async fn is_running(&self) -> bool {
        self.runner.lock().await.is_some()
    }

    /// Run one pass now, then one every `plan_interval_ms` until [`stop`].
    ///
    /// Calling `start` on a running scheduler only logs a warning.
    ///
    /// [`stop`]: Self::stop
    pub async fn start(self: &Arc<Self>) {
        let mut runner = self.runner.lock().await;
        if runner.is_some() {
            tracing::warn!("Batch scheduler already running; start ignored");
            return;
        }

        tracing::info!(
            look_ahead = self.config.look_ahead_batches,
            interval_ms = self.config.plan_interval_ms,
            cutoff_lead_ms = self.config.cutoff_lead_ms,
            clock = self.clock.name(),
            "Batch scheduler starting"
        );
        self.run_planning_pass().await;

        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let period = self.config.plan_interval();
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        this.run_planning_pass().await;
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
        });

        *runner = Some(Runner { shutdown, handle });
    }

    /// Stop scheduling passes. A pass already running completes first.
    /// Stopping a stopped scheduler does nothing.
    pub async fn stop(&self) {
        let Some(runner) = self.runner.lock().await.take() else {
            tracing::debug!("Batch scheduler not running; stop ignored");
            return;
        };
        let _ = runner.shutdown.send(true);
        if let Err(e) = runner.handle.await {
            tracing::error!(error = %e, "Planning loop ended abnormally");
        }
        tracing::info!("Batch scheduler stopped");
    }

    /// Run a single planning pass over every active market.
    ///
    /// Returns a report with `skipped_overlap` set, and changes nothing, if
    /// another pass is in flight.
    pub async fn run_planning_pass(&self) -> PassReport {
        let Ok(_guard) = self.pass_guard.try_lock() else {
            tracing::warn!("Previous planning pass still running; skipping");
            return PassReport {
                skipped_overlap: true,
                ..PassReport::default()
            };
        };

        let now = self.clock.now();
        let mut report = PassReport {
            started_at: Some(now),
            ..PassReport::default()
        };

        match self.store.active_markets().await {
            Ok(markets) => {
                for market in &markets {
                    if let Err(e) = self.plan_market(market, now, &mut report).await {
                        report.market_failures += 1;
                        let failure = UniclearError::PlanningPassFailed {
                            market: market.id,
                            reason: e.to_string(),
                        };
                        tracing::error!(
                            market = %market.id,
                            symbol = %market.symbol(),
                            error = %failure,
                            "Market planning failed"
                        );
                    } else {
                        report.markets_planned += 1;
                    }
                }
            }
            Err(e) => {
                tracing::error!(error = %e, "Could not load active markets");
            }
        }

        tracing::info!(
            markets = report.markets_planned,
            created = report.batches_created,
            skipped = report.skipped_existing,
            reservation_failures = report.reservation_failures,
            batch_failures = report.batch_failures,
            market_failures = report.market_failures,
            "Planning pass complete"
        );

        *self.last_report.lock().await = Some(report.clone());
        report
    }

    async fn plan_market(
        &self,
        market: &Market,
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) -> Result<()> {
        market.validate()?;
        let cadence = market.cadence();

        let live = self.store.future_batches(market.id, now).await?;
        let wanted = self.config.look_ahead_batches.saturating_sub(live.len());
        if wanted == 0 {
            return Ok(());
        }

        let mut eta = later(live.last().map_or(now, |b| b.eta), cadence)?;
        let mut attempted = 0;
        // Every skipped candidate collides with a stored row, so the scan
        // is bounded by the window plus the rows already in it.
        let max_candidates = self
            .config
            .look_ahead_batches
            .saturating_mul(2)
            .saturating_add(live.len());

        for _ in 0..max_candidates {
            if attempted == wanted {
                break;
            }
            let candidate = eta;
            eta = later(candidate, cadence)?;

            match self.plan_candidate(market, candidate, now, report).await {
                Ok(Candidate::Occupied) => {}
                Ok(Candidate::Attempted) => attempted += 1,
                Err(e) if e.is_recoverable() => {
                    attempted += 1;
                    report.batch_failures += 1;
                    tracing::error!(
                        market = %market.id,
                        eta = %candidate,
                        error = %e,
                        "Batch planning failed; continuing with next candidate"
                    );
                }
                Err(e) => return Err(e),
            }
        }
        Ok(())
    }

    /// Reserve and record one candidate eta.
    ///
    /// A reservation whose batch could not be stored is released before the
    /// error is returned.
    async fn plan_candidate(
        &self,
        market: &Market,
        eta: DateTime<Utc>,
        now: DateTime<Utc>,
        report: &mut PassReport,
    ) -> Result<Candidate> {
        let tolerance = self.config.eta_tolerance();
        if self.store.exists_within(market.id, eta, tolerance).await? {
            report.skipped_existing += 1;
            tracing::debug!(market = %market.id, %eta, "Batch already planned");
            return Ok(Candidate::Occupied);
        }

        let slot = Slot::from_eta(eta, self.config.slot_duration_ms);
        let reservation = match self.reservations.reserve_ahead_of_time(market.id, slot).await {
            Ok(reservation_id) => Some(reservation_id),
            Err(e) => {
                tracing::warn!(
                    market = %market.id,
                    %slot,
                    %eta,
                    error = %e,
                    "Slot reservation failed; recording FAILED batch"
                );
                report.reservation_failures += 1;
                None
            }
        };
        let batch = match reservation {
            Some(reservation_id) => PlannedBatch::planned(market.id, slot, eta, reservation_id, now),
            None => PlannedBatch::failed(market.id, slot, eta, now),
        };

        match self.store.insert_if_absent(batch, tolerance).await {
            Ok(()) => {
                if reservation.is_some() {
                    report.batches_created += 1;
                    tracing::debug!(market = %market.id, %slot, %eta, "Planned batch");
                }
                Ok(Candidate::Attempted)
            }
            Err(e) => {
                if let Some(reservation_id) = reservation {
                    self.release_unused(market, reservation_id).await;
                }
                match e {
                    UniclearError::DuplicateSlot { .. } | UniclearError::EtaConflict { .. } => {
                        report.skipped_existing += 1;
                        tracing::debug!(market = %market.id, error = %e, "Batch planned concurrently");
                        Ok(Candidate::Occupied)
                    }
                    e => Err(e),
                }
            }
        }
    }

    async fn release_unused(&self, market: &Market, reservation: ReservationId) {
        if let Err(e) = self.reservations.release(reservation).await {
            tracing::error!(
                market = %market.id,
                %reservation,
                error = %e,
                "Could not release unused reservation"
            );
        }
    }

    /// The batch a new order for `market` should join, if any.
    ///
    /// This is the earliest PLANNED batch whose eta is strictly later than
    /// `now + cutoff_lead`, together with its cutoff. `None` means no batch is
    /// assignable right now.
    pub async fn find_next_batch_for_order(
        &self,
        market: MarketId,
    ) -> Result<Option<BatchAssignment>> {
        let lead = self.config.cutoff_lead();
        let after = later(self.clock.now(), lead)?;
        let next = self.store.next_planned_after(market, after).await?;
        Ok(next.map(|batch| BatchAssignment {
            cutoff: batch.cutoff(lead),
            batch,
        }))
    }

    pub async fn get_status(&self) -> Result<SchedulerStatus> {
        let now = self.clock.now();
        let lead = self.config.cutoff_lead();
        let mut markets = Vec::new();
        for market in self.store.active_markets().await? {
            let future = self.store.future_batches(market.id, now).await?;
            let next = future.first();
            markets.push(MarketWindow {
                market: market.id,
                symbol: market.symbol(),
                future_batches: future.len(),
                next_eta: next.map(|b| b.eta),
                next_cutoff: next.map(|b| b.cutoff(lead)),
            });
        }
        Ok(SchedulerStatus {
            running: self.is_running().await,
            config: self.config.clone(),
            last_report: self.last_report.lock().await.clone(),
            markets,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;
    use chrono::{Duration, TimeZone};
    use uniclear_types::{BatchStatus, PlannedBatchId, ReceiptEvent};

    use super::*;
    use crate::{InMemoryBatchStore, ManualClock, SimulatedReservationClient};

    const CADENCE_MS: u64 = 10_000;

    fn start_time() -> DateTime<Utc> {
        Utc.timestamp_millis_opt(1_700_000_000_000).unwrap()
    }

    fn market() -> Market {
        let mut m = Market::btc_usdt();
        m.cadence_ms = CADENCE_MS;
        m
    }

    fn config() -> SchedulerConfig {
        SchedulerConfig {
            look_ahead_batches: 3,
            plan_interval_ms: 5_000,
            cutoff_lead_ms: 2_000,
            eta_tolerance_ms: 1_000,
            slot_duration_ms: 2_000,
        }
    }

    struct Harness {
        scheduler: Arc<BatchScheduler>,
        store: Arc<InMemoryBatchStore>,
        client: Arc<SimulatedReservationClient>,
        clock: Arc<ManualClock>,
    }

    fn harness_with(markets: Vec<Market>, client: SimulatedReservationClient) -> Harness {
        let store = Arc::new(InMemoryBatchStore::with_markets(markets));
        let client = Arc::new(client);
        let clock = Arc::new(ManualClock::new(start_time()));
        let scheduler = Arc::new(
            BatchScheduler::new(config(), store.clone(), client.clone(), clock.clone()).unwrap(),
        );
        Harness {
            scheduler,
            store,
            client,
            clock,
        }
    }

    fn harness(m: &Market) -> Harness {
        harness_with(vec![m.clone()], SimulatedReservationClient::new(1))
    }

    #[test]
    fn invalid_config_rejected() {
        let cfg = SchedulerConfig {
            look_ahead_batches: 0,
            ..config()
        };
        let result = BatchScheduler::new(
            cfg,
            Arc::new(InMemoryBatchStore::new()),
            Arc::new(SimulatedReservationClient::new(0)),
            Arc::new(ManualClock::new(start_time())),
        );
        assert!(matches!(result, Err(UniclearError::Configuration(_))));
    }

    #[tokio::test]
    async fn first_pass_fills_window_one_cadence_apart() {
        let m = market();
        let h = harness(&m);
        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.batches_created, 3);
        assert_eq!(report.markets_planned, 1);

        let batches = h.store.future_batches(m.id, start_time()).await.unwrap();
        assert_eq!(batches.len(), 3);
        for (i, batch) in batches.iter().enumerate() {
            let expected = start_time() + m.cadence() * i32::try_from(i + 1).unwrap();
            assert_eq!(batch.eta, expected);
            assert_eq!(batch.status, BatchStatus::Planned);
            assert!(batch.reservation_id.is_some());
            assert_eq!(batch.slot, Slot::from_eta(batch.eta, 2_000));
        }
        assert_eq!(h.client.reservation_count(), 3);
    }

    #[tokio::test]
    async fn back_to_back_passes_are_idempotent() {
        let m = market();
        let h = harness(&m);
        h.scheduler.run_planning_pass().await;
        let second = h.scheduler.run_planning_pass().await;
        assert_eq!(second.batches_created, 0);
        assert_eq!(h.store.list_batches(m.id).await.unwrap().len(), 3);
        assert_eq!(h.client.reservation_count(), 3);
    }

    #[tokio::test]
    async fn window_rolls_forward_and_converges() {
        let m = market();
        let h = harness(&m);
        for _ in 0..10 {
            h.scheduler.run_planning_pass().await;
            h.clock.advance(Duration::milliseconds(4_000));
        }
        let now = h.clock.now();
        h.scheduler.run_planning_pass().await;
        let future = h.store.future_batches(m.id, now).await.unwrap();
        assert_eq!(future.len(), 3);
        for pair in future.windows(2) {
            assert_eq!(pair[1].eta - pair[0].eta, m.cadence());
        }
    }

    #[tokio::test]
    async fn refused_reservation_recorded_failed_and_not_retried() {
        let m = market();
        let h = harness(&m);
        let second_eta = start_time() + m.cadence() * 2;
        h.client.fail_slot(m.id, Slot::from_eta(second_eta, 2_000));

        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.batches_created, 2);
        assert_eq!(report.reservation_failures, 1);

        let all = h.store.list_batches(m.id).await.unwrap();
        let failed: Vec<_> = all
            .iter()
            .filter(|b| b.status == BatchStatus::Failed)
            .collect();
        assert_eq!(failed.len(), 1);
        assert_eq!(failed[0].eta, second_eta);
        assert!(failed[0].reservation_id.is_none());

        // The next pass tops the window up past the failed eta.
        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.reservation_failures, 0);
        assert_eq!(report.batches_created, 1);
        let all = h.store.list_batches(m.id).await.unwrap();
        assert_eq!(
            all.iter().filter(|b| b.eta == second_eta).count(),
            1,
            "failed eta must not be replanned"
        );
        assert_eq!(
            h.store.future_batches(m.id, start_time()).await.unwrap().len(),
            3
        );
    }

    /// Delegates to an in-memory store but fails reads for one market and
    /// the first `failing_inserts` inserts.
    struct FlakyStore {
        inner: InMemoryBatchStore,
        broken: Option<MarketId>,
        failing_inserts: AtomicUsize,
    }

    impl FlakyStore {
        fn new(markets: Vec<Market>) -> Self {
            Self {
                inner: InMemoryBatchStore::with_markets(markets),
                broken: None,
                failing_inserts: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl BatchStore for FlakyStore {
        async fn active_markets(&self) -> Result<Vec<Market>> {
            self.inner.active_markets().await
        }
        async fn upsert_market(&self, market: Market) -> Result<()> {
            self.inner.upsert_market(market).await
        }
        async fn future_batches(
            &self,
            market: MarketId,
            now: DateTime<Utc>,
        ) -> Result<Vec<PlannedBatch>> {
            if Some(market) == self.broken {
                return Err(UniclearError::Persistence("connection reset".into()));
            }
            self.inner.future_batches(market, now).await
        }
        async fn exists_within(
            &self,
            market: MarketId,
            eta: DateTime<Utc>,
            tolerance: Duration,
        ) -> Result<bool> {
            self.inner.exists_within(market, eta, tolerance).await
        }
        async fn insert_if_absent(&self, batch: PlannedBatch, tolerance: Duration) -> Result<()> {
            let failing = self
                .failing_inserts
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if failing {
                return Err(UniclearError::Persistence("transient".into()));
            }
            self.inner.insert_if_absent(batch, tolerance).await
        }
        async fn next_planned_after(
            &self,
            market: MarketId,
            after: DateTime<Utc>,
        ) -> Result<Option<PlannedBatch>> {
            self.inner.next_planned_after(market, after).await
        }
        async fn advance_status(
            &self,
            id: PlannedBatchId,
            status: BatchStatus,
            merkle_root: Option<[u8; 32]>,
            at: DateTime<Utc>,
        ) -> Result<PlannedBatch> {
            self.inner.advance_status(id, status, merkle_root, at).await
        }
        async fn list_batches(&self, market: MarketId) -> Result<Vec<PlannedBatch>> {
            self.inner.list_batches(market).await
        }
    }

    #[tokio::test]
    async fn one_market_failing_does_not_abort_pass() {
        let good = market();
        let bad = Market::eth_usdt();
        let store = Arc::new(FlakyStore {
            broken: Some(bad.id),
            ..FlakyStore::new(vec![good.clone(), bad.clone()])
        });
        let scheduler = BatchScheduler::new(
            config(),
            store.clone(),
            Arc::new(SimulatedReservationClient::new(2)),
            Arc::new(ManualClock::new(start_time())),
        )
        .unwrap();

        let report = scheduler.run_planning_pass().await;
        assert_eq!(report.market_failures, 1);
        assert_eq!(report.markets_planned, 1);
        assert_eq!(report.batches_created, 3);
        assert_eq!(store.inner.list_batches(good.id).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn store_error_on_one_batch_keeps_planning_the_market() {
        let m = market();
        let store = Arc::new(FlakyStore {
            failing_inserts: AtomicUsize::new(1),
            ..FlakyStore::new(vec![m.clone()])
        });
        let client = Arc::new(SimulatedReservationClient::new(2));
        let mut receipts = client.subscribe_receipts();
        let scheduler = BatchScheduler::new(
            config(),
            store.clone(),
            client.clone(),
            Arc::new(ManualClock::new(start_time())),
        )
        .unwrap();

        let report = scheduler.run_planning_pass().await;
        assert_eq!(report.market_failures, 0);
        assert_eq!(report.markets_planned, 1);
        assert_eq!(report.batch_failures, 1);
        assert_eq!(report.batches_created, 2);

        // The reservation behind the lost row was handed back.
        let rows = store.inner.list_batches(m.id).await.unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(client.reservation_count(), 3);
        let released = receipts.try_recv().unwrap();
        assert!(matches!(released, ReceiptEvent::Failed { .. }));
        assert!(
            rows.iter()
                .all(|b| b.reservation_id != Some(released.reservation_id()))
        );
        assert!(receipts.try_recv().is_err());

        let report = scheduler.run_planning_pass().await;
        assert_eq!(report.batch_failures, 0);
        assert_eq!(report.batches_created, 1);
        assert_eq!(
            store.inner.future_batches(m.id, start_time()).await.unwrap().len(),
            3
        );
    }

    #[tokio::test]
    async fn oversized_cadence_fails_only_its_market() {
        let good = market();
        let mut huge = Market::eth_usdt();
        huge.cadence_ms = u64::MAX;
        let h = harness_with(
            vec![good.clone(), huge.clone()],
            SimulatedReservationClient::new(3),
        );

        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.market_failures, 1);
        assert_eq!(report.markets_planned, 1);
        assert_eq!(report.batches_created, 3);
        assert!(h.store.list_batches(huge.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn clock_at_end_of_time_reports_errors() {
        let m = market();
        let h = harness(&m);
        h.clock.set(DateTime::<Utc>::MAX_UTC - Duration::seconds(1));

        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.market_failures, 1);
        assert!(h.store.list_batches(m.id).await.unwrap().is_empty());

        let err = h.scheduler.find_next_batch_for_order(m.id).await.unwrap_err();
        assert!(matches!(err, UniclearError::Configuration(_)));
        assert!(h.scheduler.get_status().await.is_ok());
    }

    #[tokio::test]
    async fn inactive_markets_are_not_planned() {
        let mut halted = market();
        halted.active = false;
        let h = harness(&halted);
        let report = h.scheduler.run_planning_pass().await;
        assert_eq!(report.markets_planned, 0);
        assert!(h.store.list_batches(halted.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn order_assignment_respects_cutoff() {
        let m = market();
        let h = harness(&m);
        h.scheduler.run_planning_pass().await;

        let first_eta = start_time() + m.cadence();
        let assignment = h.scheduler.find_next_batch_for_order(m.id).await.unwrap().unwrap();
        assert_eq!(assignment.batch.eta, first_eta);
        assert_eq!(assignment.cutoff, first_eta - Duration::milliseconds(2_000));

        // Exactly at the cutoff the first batch is no longer assignable.
        h.clock.set(first_eta - Duration::milliseconds(2_000));
        let assignment = h.scheduler.find_next_batch_for_order(m.id).await.unwrap().unwrap();
        assert_eq!(assignment.batch.eta, first_eta + m.cadence());
    }

    #[tokio::test]
    async fn no_assignable_batch_is_none() {
        let m = market();
        let h = harness(&m);
        assert!(h.scheduler.find_next_batch_for_order(m.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn overlapping_pass_is_skipped() {
        let m = market();
        let h = harness(&m);
        let _held = h.scheduler.pass_guard.lock().await;
        let report = h.scheduler.run_planning_pass().await;
        assert!(report.skipped_overlap);
        assert!(h.store.list_batches(m.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn status_reports_window() {
        let m = market();
        let h = harness(&m);
        let status = h.scheduler.get_status().await.unwrap();
        assert!(!status.running);
        assert!(status.last_report.is_none());
        assert_eq!(status.markets[0].future_batches, 0);

        h.scheduler.run_planning_pass().await;
        let status = h.scheduler.get_status().await.unwrap();
        let window = &status.markets[0];
        assert_eq!(window.future_batches, 3);
        assert_eq!(window.next_eta, Some(start_time() + m.cadence()));
        assert_eq!(
            window.next_cutoff,
            Some(start_time() + m.cadence() - Duration::milliseconds(2_000))
        );
        assert_eq!(status.last_report.unwrap().batches_created, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn start_runs_immediately_then_on_interval() {
        let m = market();
        let h = harness(&m);
        h.scheduler.start().await;
        assert!(h.scheduler.is_running().await);
        assert_eq!(h.store.list_batches(m.id).await.unwrap().len(), 3);

        // Let the first batch pass; the next tick tops the window up.
        h.clock.advance(Duration::milliseconds(11_000));
        tokio::time::sleep(std::time::Duration::from_millis(5_100)).await;
        assert_eq!(h.store.list_batches(m.id).await.unwrap().len(), 4);

        h.scheduler.stop().await;
        assert!(!h.scheduler.is_running().await);

        h.clock.advance(Duration::milliseconds(30_000));
        tokio::time::sleep(std::time::Duration::from_millis(20_000)).await;
        assert_eq!(h.store.list_batches(m.id).await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn double_start_and_double_stop_are_harmless() {
        let m = market();
        let h = harness(&m);
        h.scheduler.start().await;
        h.scheduler.start().await;
        assert_eq!(h.client.reservation_count(), 3);
        h.scheduler.stop().await;
        h.scheduler.stop().await;
        assert!(!h.scheduler.is_running().await);
    }
}
