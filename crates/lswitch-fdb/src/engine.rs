//! Forwarding decisions.

use crate::aging::{AgingConfig, AgingSweeper, SweepOutcome};
use crate::stats::{FdbStats, FdbStatsSnapshot};
use crate::table::{AddressTable, LearnOutcome};
use lswitch_types::{MacAddress, PortNo, Timestamp};
use parking_lot::Mutex;
use tracing::{debug, info, trace};

/// What the controller should do with a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Destination is known: install a flow to this port and send the
    /// frame out of it.
    Forward(PortNo),
    /// Destination is unknown: send the frame out of every port except
    /// the ingress port, without installing a flow.
    Flood,
}

/// Learning-bridge decision logic for one switch.
///
/// The engine exclusively owns its [`AddressTable`]. Frame handling and
/// aging both go through the same lock, so learns for an address are
/// applied in the order frames arrive.
///
/// No special handling exists for broadcast or multicast destinations and
/// there is no loop prevention; callers that need either must filter
/// before calling [`decide`](Self::decide).
#[derive(Debug)]
pub struct ForwardingEngine {
    table: Mutex<AddressTable>,
    sweeper: AgingSweeper,
    stats: FdbStats,
}

impl ForwardingEngine {
    pub fn new(config: AgingConfig) -> Self {
        Self {
            table: Mutex::new(AddressTable::new()),
            sweeper: AgingSweeper::new(config),
            stats: FdbStats::new(),
        }
    }

    /// Learns `src` on `in_port`, then resolves `dst`.
    pub fn decide(
        &self,
        src: MacAddress,
        in_port: PortNo,
        dst: MacAddress,
        now: Timestamp,
    ) -> Disposition {
        let (learned, egress) = {
            let mut table = self.table.lock();
            let learned = table.learn(src, in_port, now);
            (learned, table.lookup(&dst))
        };

        match learned {
            LearnOutcome::Learned => {
                FdbStats::bump(&self.stats.learned);
                debug!(mac = %src, port = %in_port, "Learned address");
            }
            LearnOutcome::Refreshed => {
                FdbStats::bump(&self.stats.refreshed);
            }
            LearnOutcome::Moved { from } => {
                FdbStats::bump(&self.stats.moved);
                info!(mac = %src, %from, to = %in_port, "Address moved");
            }
        }

        match egress {
            Some(port) => {
                FdbStats::bump(&self.stats.forwarded);
                trace!(%src, %dst, %port, "Forward");
                Disposition::Forward(port)
            }
            None => {
                FdbStats::bump(&self.stats.flooded);
                trace!(%src, %dst, "Flood");
                Disposition::Flood
            }
        }
    }

    /// Runs one aging sweep over this engine's table.
    pub fn age_tick(&self, now: Timestamp) -> SweepOutcome {
        self.sweeper.sweep(&self.table, &self.stats, now)
    }

    pub fn lookup(&self, address: &MacAddress) -> Option<PortNo> {
        self.table.lock().lookup(address)
    }

    /// Forgets every address learned on `port`.
    pub fn flush_port(&self, port: PortNo) -> usize {
        let flushed = self.table.lock().flush_port(port);
        if flushed > 0 {
            info!(%port, flushed, "Flushed FDB entries for port");
        }
        flushed
    }

    pub fn len(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.lock().is_empty()
    }

    pub fn aging_config(&self) -> &AgingConfig {
        self.sweeper.config()
    }

    pub fn stats(&self) -> FdbStatsSnapshot {
        self.stats.snapshot()
    }
}

impl Default for ForwardingEngine {
    fn default() -> Self {
        Self::new(AgingConfig::default())
    }
}
