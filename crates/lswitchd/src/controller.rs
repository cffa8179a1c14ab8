//! LearningSwitch - per-switch learning controller
//!
//! Event flow:
//! 1. switch ready → create the switch's FDB, install the table-miss flow
//! 2. packet-in → dump diagnostics, decide, then program the switch:
//!    `Forward(p)` installs an exact-match flow to `p` and sends the frame
//!    out of `p`; `Flood` sends the frame out of every port but the ingress
//! 3. aging tick → sweep every switch's FDB

use lswitch_fdb::{AgingConfig, Disposition, ForwardingEngine, SweepOutcome};
use lswitch_types::{DatapathId, PortNo, Timestamp};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::actuator::{ActuatorError, FlowActuator, FlowMod};
use crate::config_file::LswitchConfig;
use crate::diagnostics::PacketDumper;
use crate::packet::{ExactMatch, PacketIn};

/// Totals from one aging tick across all switches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AgingReport {
    pub switches: usize,
    pub evicted: usize,
    pub skipped: usize,
}

/// Learning-switch controller managing any number of switches.
///
/// Each switch gets its own [`ForwardingEngine`]; tables are never shared
/// between datapaths.
pub struct LearningSwitch<A> {
    actuator: A,
    aging: AgingConfig,
    dumper: PacketDumper,
    switches: RwLock<HashMap<DatapathId, Arc<ForwardingEngine>>>,
}

impl<A: FlowActuator> LearningSwitch<A> {
    pub fn new(actuator: A, config: &LswitchConfig) -> Self {
        Self {
            actuator,
            aging: config.aging,
            dumper: PacketDumper::new(&config.diagnostics),
            switches: RwLock::new(HashMap::new()),
        }
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    /// Returns the FDB of `dpid`, creating it on first use.
    fn engine_for(&self, dpid: DatapathId) -> Arc<ForwardingEngine> {
        if let Some(engine) = self.switches.read().get(&dpid) {
            return Arc::clone(engine);
        }

        let mut switches = self.switches.write();
        let engine = switches.entry(dpid).or_insert_with(|| {
            debug!(%dpid, "Creating FDB for switch");
            Arc::new(ForwardingEngine::new(self.aging))
        });
        Arc::clone(engine)
    }

    pub fn engine(&self, dpid: DatapathId) -> Option<Arc<ForwardingEngine>> {
        self.switches.read().get(&dpid).cloned()
    }

    pub fn switch_count(&self) -> usize {
        self.switches.read().len()
    }

    /// Datapaths with an FDB, in ascending order.
    pub fn switch_ids(&self) -> Vec<DatapathId> {
        let mut ids: Vec<DatapathId> = self.switches.read().keys().copied().collect();
        ids.sort();
        ids
    }

    /// Prepares a newly connected switch.
    ///
    /// Installs a catch-all flow so that every packet without a more
    /// specific flow is sent to the controller.
    #[instrument(skip(self))]
    pub async fn switch_ready(&self, dpid: DatapathId) -> Result<(), ActuatorError> {
        self.engine_for(dpid);
        self.actuator.install_flow(dpid, &FlowMod::table_miss()).await?;
        info!(%dpid, "Switch ready");
        Ok(())
    }

    /// Forgets a switch and everything learned on it.
    pub fn switch_disconnected(&self, dpid: DatapathId) -> bool {
        let removed = self.switches.write().remove(&dpid).is_some();
        if removed {
            info!(%dpid, "Switch disconnected, FDB dropped");
        }
        removed
    }

    /// Forgets addresses learned on a port that went down.
    pub fn port_down(&self, dpid: DatapathId, port: PortNo) -> usize {
        match self.engine(dpid) {
            Some(engine) => engine.flush_port(port),
            None => 0,
        }
    }

    /// Handles one packet-in and programs the switch accordingly.
    ///
    /// Actuator failures are logged and dropped; the decision is returned
    /// either way.
    #[instrument(skip(self, packet), fields(dpid = %packet.datapath_id, in_port = %packet.in_port))]
    pub async fn packet_in(&self, packet: &PacketIn, now: Timestamp) -> Disposition {
        self.dumper.dump(packet);

        let dpid = packet.datapath_id;
        let engine = self.engine_for(dpid);
        let disposition = engine.decide(packet.eth_src, packet.in_port, packet.eth_dst, now);

        if let Err(e) = self.actuate(packet, disposition).await {
            warn!(%dpid, error = %e, "Failed to program switch, dropping packet");
        }

        disposition
    }

    async fn actuate(
        &self,
        packet: &PacketIn,
        disposition: Disposition,
    ) -> Result<(), ActuatorError> {
        let dpid = packet.datapath_id;
        match disposition {
            Disposition::Forward(port) => {
                let flow = FlowMod::unicast(ExactMatch::from_packet(packet), port);
                self.actuator.install_flow(dpid, &flow).await?;
                self.actuator.packet_out(dpid, packet, port).await
            }
            Disposition::Flood => self.actuator.packet_out(dpid, packet, PortNo::ALL).await,
        }
    }

    /// Runs one aging sweep on every switch.
    pub fn age_tick(&self, now: Timestamp) -> AgingReport {
        // Snapshot the engines so the map lock is not held while sweeping.
        let engines: Vec<Arc<ForwardingEngine>> = self.switches.read().values().cloned().collect();

        let mut report = AgingReport {
            switches: engines.len(),
            ..AgingReport::default()
        };
        for engine in engines {
            match engine.age_tick(now) {
                SweepOutcome::Swept { evicted } => report.evicted += evicted,
                SweepOutcome::Skipped => report.skipped += 1,
            }
        }

        if report.evicted > 0 || report.skipped > 0 {
            info!(
                %now,
                switches = report.switches,
                evicted = report.evicted,
                skipped = report.skipped,
                "FDB aging tick"
            );
        }
        report
    }
}
