//! Configuration types for the batch scheduler and the markets it serves.

use std::time::Duration as StdDuration;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::{Market, Result, UniclearError, constants};

/// Batch scheduler configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Future batches kept reserved per market.
    pub look_ahead_batches: usize,
    /// Interval between two planning passes.
    pub plan_interval_ms: u64,
    /// Order intake for a batch closes this long before its eta.
    pub cutoff_lead_ms: u64,
    /// Batches of one market closer than this are considered the same.
    pub eta_tolerance_ms: u64,
    /// Divisor turning an eta into a network slot number.
    pub slot_duration_ms: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            look_ahead_batches: constants::DEFAULT_LOOK_AHEAD_BATCHES,
            plan_interval_ms: constants::DEFAULT_PLAN_INTERVAL_MS,
            cutoff_lead_ms: constants::DEFAULT_CUTOFF_LEAD_MS,
            eta_tolerance_ms: constants::DEFAULT_ETA_TOLERANCE_MS,
            slot_duration_ms: constants::DEFAULT_SLOT_DURATION_MS,
        }
    }
}

impl SchedulerConfig {
    /// Parse a JSON document; missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| UniclearError::Configuration(e.to_string()))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject configurations the scheduler cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.look_ahead_batches == 0 {
            return Err(UniclearError::Configuration(
                "look_ahead_batches must be > 0".into(),
            ));
        }
        if self.plan_interval_ms == 0 {
            return Err(UniclearError::Configuration(
                "plan_interval_ms must be > 0".into(),
            ));
        }
        if self.slot_duration_ms == 0 {
            return Err(UniclearError::Configuration(
                "slot_duration_ms must be > 0".into(),
            ));
        }
        for (name, value) in [
            ("plan_interval_ms", self.plan_interval_ms),
            ("cutoff_lead_ms", self.cutoff_lead_ms),
            ("eta_tolerance_ms", self.eta_tolerance_ms),
            ("slot_duration_ms", self.slot_duration_ms),
        ] {
            if value > constants::MAX_DURATION_MS {
                return Err(UniclearError::Configuration(format!(
                    "{name} must be <= {} ms, got {value}",
                    constants::MAX_DURATION_MS
                )));
            }
        }
        Ok(())
    }

    #[must_use]
    pub fn plan_interval(&self) -> StdDuration {
        StdDuration::from_millis(self.plan_interval_ms)
    }

    #[must_use]
    pub fn cutoff_lead(&self) -> Duration {
        millis(self.cutoff_lead_ms)
    }

    #[must_use]
    pub fn eta_tolerance(&self) -> Duration {
        millis(self.eta_tolerance_ms)
    }
}

/// Top-level configuration: scheduler settings plus the market catalogue.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UniclearConfig {
    pub scheduler: SchedulerConfig,
    pub markets: Vec<Market>,
}

impl UniclearConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let cfg: Self = serde_json::from_str(json)
            .map_err(|e| UniclearError::Configuration(e.to_string()))?;
        cfg.scheduler.validate()?;
        for market in &cfg.markets {
            market.validate()?;
        }
        Ok(cfg)
    }
}

/// Saturates instead of panicking on values past the `Duration` range.
pub(crate) fn millis(ms: u64) -> Duration {
    i64::try_from(ms)
        .ok()
        .and_then(Duration::try_milliseconds)
        .unwrap_or(Duration::MAX)
}
