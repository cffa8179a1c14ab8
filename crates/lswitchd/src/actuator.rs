//! Switch programming collaborator.
//!
//! The controller decides what should happen to a frame; a
//! [`FlowActuator`] turns that into flow-mod and packet-out messages on
//! the wire. Encoding and the switch session live behind this trait.

use async_trait::async_trait;
use lswitch_types::{DatapathId, PortNo};
use thiserror::Error;
use tracing::info;

use crate::packet::{ExactMatch, PacketIn};

/// Priority of the table-miss flow.
pub const TABLE_MISS_PRIORITY: u16 = 0;

/// OpenFlow default flow priority, used for learned unicast flows.
pub const DEFAULT_PRIORITY: u16 = 0x8000;

/// `max_len` asking the switch to send the whole packet to the controller.
pub const NO_BUFFER_MAX_LEN: u16 = 0xffff;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActuatorError {
    #[error("switch {dpid} rejected request: {reason}")]
    Rejected { dpid: DatapathId, reason: String },

    #[error("switch {0} is not connected")]
    Disconnected(DatapathId),
}

/// Which packets a flow applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowMatch {
    /// Every packet.
    All,
    /// Packets with exactly these headers.
    Exact(ExactMatch),
}

/// A flow-table entry with a single output action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowMod {
    pub flow_match: FlowMatch,
    pub priority: u16,
    pub out_port: PortNo,
    /// Bytes of the packet to send when `out_port` is the controller.
    pub max_len: Option<u16>,
    /// Ask the switch for a flow-removed message when the entry goes away.
    pub send_flow_removed: bool,
}

impl FlowMod {
    /// The lowest-priority catch-all that sends unmatched packets to the
    /// controller unbuffered.
    pub fn table_miss() -> Self {
        Self {
            flow_match: FlowMatch::All,
            priority: TABLE_MISS_PRIORITY,
            out_port: PortNo::CONTROLLER,
            max_len: Some(NO_BUFFER_MAX_LEN),
            send_flow_removed: true,
        }
    }

    /// An exact-match flow steering a learned destination to its port.
    pub fn unicast(flow_match: ExactMatch, out_port: PortNo) -> Self {
        Self {
            flow_match: FlowMatch::Exact(flow_match),
            priority: DEFAULT_PRIORITY,
            out_port,
            max_len: None,
            send_flow_removed: false,
        }
    }
}

/// Programs switches on behalf of the controller.
#[async_trait]
pub trait FlowActuator: Send + Sync {
    /// Adds `flow` to the flow table of `dpid`.
    async fn install_flow(&self, dpid: DatapathId, flow: &FlowMod) -> Result<(), ActuatorError>;

    /// Sends the frame carried by `packet` out of `out_port` on `dpid`.
    ///
    /// `PortNo::ALL` means every port except the ingress port.
    async fn packet_out(
        &self,
        dpid: DatapathId,
        packet: &PacketIn,
        out_port: PortNo,
    ) -> Result<(), ActuatorError>;
}

/// Actuator that only logs what it would send.
///
/// Used when the daemon runs without a switch connection, e.g. replaying
/// a captured event feed.
#[derive(Debug, Clone, Copy, Default)]
pub struct LoggingActuator;

#[async_trait]
impl FlowActuator for LoggingActuator {
    async fn install_flow(&self, dpid: DatapathId, flow: &FlowMod) -> Result<(), ActuatorError> {
        match &flow.flow_match {
            FlowMatch::All => info!(
                %dpid,
                priority = flow.priority,
                out_port = %flow.out_port,
                "flow-mod add: match all"
            ),
            FlowMatch::Exact(m) => info!(
                %dpid,
                priority = flow.priority,
                in_port = %m.in_port,
                eth_src = %m.eth_src,
                eth_dst = %m.eth_dst,
                out_port = %flow.out_port,
                "flow-mod add: exact match"
            ),
        }
        Ok(())
    }

    async fn packet_out(
        &self,
        dpid: DatapathId,
        packet: &PacketIn,
        out_port: PortNo,
    ) -> Result<(), ActuatorError> {
        info!(
            %dpid,
            in_port = %packet.in_port,
            eth_dst = %packet.eth_dst,
            %out_port,
            "packet-out"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lswitch_types::MacAddress;

    #[test]
    fn test_table_miss_flow() {
        let flow = FlowMod::table_miss();
        assert_eq!(flow.flow_match, FlowMatch::All);
        assert_eq!(flow.priority, TABLE_MISS_PRIORITY);
        assert_eq!(flow.out_port, PortNo::CONTROLLER);
        assert_eq!(flow.max_len, Some(NO_BUFFER_MAX_LEN));
        assert!(flow.send_flow_removed);
    }

    #[test]
    fn test_unicast_flow_outranks_table_miss() {
        let packet = PacketIn::new(
            DatapathId::new(1),
            PortNo::new(1),
            MacAddress::new([2, 0, 0, 0, 0, 1]),
            MacAddress::new([2, 0, 0, 0, 0, 2]),
        );
        let flow = FlowMod::unicast(ExactMatch::from(&packet), PortNo::new(2));

        assert!(flow.priority > FlowMod::table_miss().priority);
        assert_eq!(flow.out_port, PortNo::new(2));
        assert!(matches!(flow.flow_match, FlowMatch::Exact(_)));
    }

    #[tokio::test]
    async fn test_logging_actuator_accepts_everything() {
        let actuator = LoggingActuator;
        let dpid = DatapathId::new(7);
        let packet = PacketIn::new(dpid, PortNo::new(1), MacAddress::ZERO, MacAddress::BROADCAST);

        assert!(actuator.install_flow(dpid, &FlowMod::table_miss()).await.is_ok());
        assert!(actuator.packet_out(dpid, &packet, PortNo::ALL).await.is_ok());
    }
}
