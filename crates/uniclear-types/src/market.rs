//! Market records the scheduler plans batches for.

use chrono::Duration;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{MarketId, MarketPair, Result, UniclearError, constants};

/// A market with its batch cadence and price granularity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Market {
    pub id: MarketId,
    pub pair: MarketPair,
    /// Spacing between two consecutive batches, in milliseconds.
    pub cadence_ms: u64,
    /// Tick size (price granularity).
    pub tick_size: Decimal,
    /// Inactive markets are skipped by planning passes.
    pub active: bool,
}

impl Market {
    #[must_use]
    pub fn new(pair: MarketPair, cadence_ms: u64, tick_size: Decimal) -> Self {
        Self {
            id: MarketId::new(),
            pair,
            cadence_ms,
            tick_size,
            active: true,
        }
    }

    /// Create a default BTC/USDT market.
    #[must_use]
    pub fn btc_usdt() -> Self {
        Self::new(
            MarketPair::new("BTC", "USDT"),
            constants::DEFAULT_CADENCE_MS,
            Decimal::new(1, 2), // 0.01 USDT
        )
    }

    /// Create a default ETH/USDT market.
    #[must_use]
    pub fn eth_usdt() -> Self {
        Self::new(
            MarketPair::new("ETH", "USDT"),
            constants::DEFAULT_CADENCE_MS,
            Decimal::new(1, 2), // 0.01 USDT
        )
    }

    #[must_use]
    pub fn cadence(&self) -> Duration {
        crate::config::millis(self.cadence_ms)
    }

    /// Cadence must be positive and at most [`constants::MAX_DURATION_MS`].
    pub fn validate(&self) -> Result<()> {
        if self.cadence_ms == 0 || self.cadence_ms > constants::MAX_DURATION_MS {
            return Err(UniclearError::Configuration(format!(
                "market {} cadence must be in 1..={} ms, got {}",
                self.symbol(),
                constants::MAX_DURATION_MS,
                self.cadence_ms
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn symbol(&self) -> String {
        self.pair.symbol()
    }
}
