//! Periodic aging of learned addresses.

use crate::stats::FdbStats;
use crate::table::AddressTable;
use lswitch_types::Timestamp;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Default sweep period in seconds.
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 5;

/// Default entry lifetime in seconds (60 sweep periods).
pub const DEFAULT_TTL_SECS: u64 = 300;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AgingConfigError {
    #[error("sweep interval must be greater than zero")]
    ZeroSweepInterval,

    #[error("ttl must be greater than zero")]
    ZeroTtl,

    #[error("ttl ({ttl_secs}s) must be longer than the sweep interval ({sweep_interval_secs}s)")]
    TtlNotLongerThanSweep {
        ttl_secs: u64,
        sweep_interval_secs: u64,
    },
}

/// Aging parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgingConfig {
    /// How often the sweeper runs.
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// How long an entry survives without being seen as a frame source.
    #[serde(default = "default_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_sweep_interval_secs() -> u64 {
    DEFAULT_SWEEP_INTERVAL_SECS
}

fn default_ttl_secs() -> u64 {
    DEFAULT_TTL_SECS
}

impl Default for AgingConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            ttl_secs: default_ttl_secs(),
        }
    }
}

impl AgingConfig {
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn validate(&self) -> Result<(), AgingConfigError> {
        if self.sweep_interval_secs == 0 {
            return Err(AgingConfigError::ZeroSweepInterval);
        }
        if self.ttl_secs == 0 {
            return Err(AgingConfigError::ZeroTtl);
        }
        if self.ttl_secs <= self.sweep_interval_secs {
            return Err(AgingConfigError::TtlNotLongerThanSweep {
                ttl_secs: self.ttl_secs,
                sweep_interval_secs: self.sweep_interval_secs,
            });
        }
        Ok(())
    }
}

/// Result of one aging tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SweepOutcome {
    /// The table was scanned and `evicted` entries were removed.
    Swept { evicted: usize },
    /// The table was busy; nothing was done and the next tick will retry.
    Skipped,
}

impl SweepOutcome {
    pub fn evicted(&self) -> usize {
        match self {
            SweepOutcome::Swept { evicted } => *evicted,
            SweepOutcome::Skipped => 0,
        }
    }
}

/// Evicts stale entries from an [`AddressTable`].
///
/// The sweeper holds no timer. The host calls [`sweep`](Self::sweep) once
/// per `sweep_interval`.
#[derive(Debug, Clone)]
pub struct AgingSweeper {
    config: AgingConfig,
}

impl AgingSweeper {
    pub fn new(config: AgingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AgingConfig {
        &self.config
    }

    pub fn ttl_secs(&self) -> u64 {
        self.config.ttl_secs
    }

    /// Runs one sweep against `table`.
    ///
    /// Never blocks: if the table lock is held elsewhere the tick is
    /// skipped rather than queued.
    pub fn sweep(
        &self,
        table: &Mutex<AddressTable>,
        stats: &FdbStats,
        now: Timestamp,
    ) -> SweepOutcome {
        let Some(mut table) = table.try_lock() else {
            FdbStats::bump(&stats.sweeps_skipped);
            warn!(%now, "FDB busy, skipping aging sweep");
            return SweepOutcome::Skipped;
        };

        let evicted = table.evict_expired(now, self.config.ttl_secs);
        let remaining = table.len();
        drop(table);

        FdbStats::bump(&stats.sweeps);
        FdbStats::add(&stats.aged_out, evicted as u64);

        if evicted > 0 {
            info!(%now, evicted, remaining, "Aged out FDB entries");
        } else {
            debug!(%now, remaining, "FDB aging sweep found nothing stale");
        }

        SweepOutcome::Swept { evicted }
    }
}

impl Default for AgingSweeper {
    fn default() -> Self {
        Self::new(AgingConfig::default())
    }
}
