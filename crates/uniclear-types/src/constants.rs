//! System-wide constants for the UniClear batch auction.

/// Number of future batches the scheduler keeps reserved per market.
pub const DEFAULT_LOOK_AHEAD_BATCHES: usize = 5;

/// Interval between two planning passes in milliseconds.
pub const DEFAULT_PLAN_INTERVAL_MS: u64 = 5_000;

/// How long before a batch's eta order intake closes, in milliseconds.
pub const DEFAULT_CUTOFF_LEAD_MS: u64 = 2_000;

/// Two planned batches of one market closer than this are the same batch.
pub const DEFAULT_ETA_TOLERANCE_MS: u64 = 1_000;

/// Duration of one network slot; `slot = eta_ms / SLOT_DURATION_MS`.
pub const DEFAULT_SLOT_DURATION_MS: u64 = 2_000;

/// Default spacing between two consecutive batches of a market.
pub const DEFAULT_CADENCE_MS: u64 = 10_000;

/// Fractional digits kept by pro-rata allocation before the remainder
/// is handed to the last order.
pub const ALLOCATION_SCALE: u32 = 9;

/// Capacity of the reservation receipt broadcast channel.
pub const RECEIPT_CHANNEL_CAPACITY: usize = 1_024;

/// Upper bound for every millisecond setting and market cadence: one year.
/// Keeps all eta arithmetic far inside the range of `DateTime<Utc>`.
pub const MAX_DURATION_MS: u64 = 365 * 24 * 60 * 60 * 1_000;
