//! FDB counters.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counters updated by the forwarding engine and aging sweeper.
#[derive(Debug, Default)]
pub struct FdbStats {
    pub learned: AtomicU64,
    pub refreshed: AtomicU64,
    pub moved: AtomicU64,
    pub forwarded: AtomicU64,
    pub flooded: AtomicU64,
    pub aged_out: AtomicU64,
    pub sweeps: AtomicU64,
    pub sweeps_skipped: AtomicU64,
}

/// Point-in-time copy of [`FdbStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FdbStatsSnapshot {
    pub learned: u64,
    pub refreshed: u64,
    pub moved: u64,
    pub forwarded: u64,
    pub flooded: u64,
    pub aged_out: u64,
    pub sweeps: u64,
    pub sweeps_skipped: u64,
}

impl FdbStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn add(counter: &AtomicU64, n: u64) {
        counter.fetch_add(n, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> FdbStatsSnapshot {
        FdbStatsSnapshot {
            learned: self.learned.load(Ordering::Relaxed),
            refreshed: self.refreshed.load(Ordering::Relaxed),
            moved: self.moved.load(Ordering::Relaxed),
            forwarded: self.forwarded.load(Ordering::Relaxed),
            flooded: self.flooded.load(Ordering::Relaxed),
            aged_out: self.aged_out.load(Ordering::Relaxed),
            sweeps: self.sweeps.load(Ordering::Relaxed),
            sweeps_skipped: self.sweeps_skipped.load(Ordering::Relaxed),
        }
    }
}

impl FdbStatsSnapshot {
    /// Frames handled by the engine.
    pub fn decisions(&self) -> u64 {
        self.forwarded + self.flooded
    }
}
