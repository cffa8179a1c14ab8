//! Packet-in metadata and the flow key derived from it.

use lswitch_types::{DatapathId, MacAddress, PortNo};
use serde::{Deserialize, Serialize};
use std::net::Ipv4Addr;

/// Header fields of a frame the switch sent to the controller.
///
/// Only `in_port`, `eth_src` and `eth_dst` take part in forwarding. The
/// remaining fields are carried opaquely so they can be copied into the
/// installed flow key and printed by the diagnostics dumper.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketIn {
    pub datapath_id: DatapathId,
    pub in_port: PortNo,
    pub eth_src: MacAddress,
    pub eth_dst: MacAddress,
    #[serde(default)]
    pub eth_type: Option<u16>,
    #[serde(default)]
    pub vlan_vid: Option<u16>,
    #[serde(default)]
    pub ipv4_src: Option<Ipv4Addr>,
    #[serde(default)]
    pub ipv4_dst: Option<Ipv4Addr>,
    #[serde(default)]
    pub ip_proto: Option<u8>,
    #[serde(default)]
    pub l4_src: Option<u16>,
    #[serde(default)]
    pub l4_dst: Option<u16>,
    #[serde(default)]
    pub total_len: u16,
    #[serde(flatten)]
    pub details: PacketDetails,
}

/// Message metadata and less common header fields.
///
/// Never used for forwarding or flow keys; only printed by the
/// diagnostics dumper.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PacketDetails {
    pub transaction_id: Option<u32>,
    pub buffer_id: Option<u32>,
    pub reason: Option<u8>,
    pub table_id: Option<u8>,
    pub cookie: Option<u64>,
    pub ip_dscp: Option<u8>,
    pub ip_ecn: Option<u8>,
    pub vlan_prio: Option<u8>,
    pub arp_op: Option<u16>,
    pub arp_sha: Option<MacAddress>,
    pub arp_spa: Option<Ipv4Addr>,
    pub arp_tpa: Option<Ipv4Addr>,
    pub icmpv4_type: Option<u8>,
    pub icmpv4_code: Option<u8>,
    pub pbb_isid: Option<u32>,
    pub mpls_label: Option<u32>,
    pub mpls_tc: Option<u8>,
    pub mpls_bos: Option<u8>,
}

impl PacketIn {
    /// Creates a bare L2 packet-in with no upper-layer fields.
    pub fn new(
        datapath_id: DatapathId,
        in_port: PortNo,
        eth_src: MacAddress,
        eth_dst: MacAddress,
    ) -> Self {
        Self {
            datapath_id,
            in_port,
            eth_src,
            eth_dst,
            eth_type: None,
            vlan_vid: None,
            ipv4_src: None,
            ipv4_dst: None,
            ip_proto: None,
            l4_src: None,
            l4_dst: None,
            total_len: 0,
            details: PacketDetails::default(),
        }
    }

    pub fn is_ipv4(&self) -> bool {
        self.eth_type == Some(ETH_TYPE_IPV4) || self.ipv4_src.is_some()
    }
}

pub const ETH_TYPE_IPV4: u16 = 0x0800;
pub const ETH_TYPE_IPV6: u16 = 0x86dd;

pub const IP_PROTO_TCP: u8 = 6;
pub const IP_PROTO_UDP: u8 = 17;
pub const IP_PROTO_SCTP: u8 = 132;

/// Exact-match flow key built from every header field of a packet.
///
/// Flows installed for forwarded traffic match only packets identical in
/// these fields to the one that triggered the installation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ExactMatch {
    pub in_port: PortNo,
    pub eth_src: MacAddress,
    pub eth_dst: MacAddress,
    pub eth_type: Option<u16>,
    pub vlan_vid: Option<u16>,
    pub ipv4_src: Option<Ipv4Addr>,
    pub ipv4_dst: Option<Ipv4Addr>,
    pub ip_proto: Option<u8>,
    pub l4_src: Option<u16>,
    pub l4_dst: Option<u16>,
}

impl ExactMatch {
    pub fn from_packet(packet: &PacketIn) -> Self {
        Self {
            in_port: packet.in_port,
            eth_src: packet.eth_src,
            eth_dst: packet.eth_dst,
            eth_type: packet.eth_type,
            vlan_vid: packet.vlan_vid,
            ipv4_src: packet.ipv4_src,
            ipv4_dst: packet.ipv4_dst,
            ip_proto: packet.ip_proto,
            l4_src: packet.l4_src,
            l4_dst: packet.l4_dst,
        }
    }
}

impl From<&PacketIn> for ExactMatch {
    fn from(packet: &PacketIn) -> Self {
        Self::from_packet(packet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_minimal_packet() {
        let json = r#"{
            "datapath_id": 1,
            "in_port": 2,
            "eth_src": "00:00:00:00:00:01",
            "eth_dst": "00:00:00:00:00:02"
        }"#;
        let packet: PacketIn = serde_json::from_str(json).unwrap();

        assert_eq!(
            packet,
            PacketIn::new(
                DatapathId::new(1),
                PortNo::new(2),
                "00:00:00:00:00:01".parse().unwrap(),
                "00:00:00:00:00:02".parse().unwrap(),
            )
        );
        assert!(!packet.is_ipv4());
    }

    #[test]
    fn test_deserialize_ipv4_packet() {
        let json = r#"{
            "datapath_id": 1,
            "in_port": 2,
            "eth_src": "00:00:00:00:00:01",
            "eth_dst": "00:00:00:00:00:02",
            "eth_type": 2048,
            "ipv4_src": "192.168.0.1",
            "ipv4_dst": "192.168.0.2",
            "ip_proto": 17,
            "l4_src": 5000,
            "l4_dst": 53,
            "total_len": 98
        }"#;
        let packet: PacketIn = serde_json::from_str(json).unwrap();

        assert!(packet.is_ipv4());
        assert_eq!(packet.ipv4_dst, Some(Ipv4Addr::new(192, 168, 0, 2)));
        assert_eq!(packet.total_len, 98);
        assert_eq!(packet.details, PacketDetails::default());
    }

    #[test]
    fn test_deserialize_details_alongside_headers() {
        let json = r#"{
            "datapath_id": 1,
            "in_port": 2,
            "eth_src": "00:00:00:00:00:01",
            "eth_dst": "ff:ff:ff:ff:ff:ff",
            "eth_type": 2054,
            "buffer_id": 4294967295,
            "cookie": 18,
            "arp_op": 1,
            "arp_sha": "00:00:00:00:00:01",
            "arp_spa": "192.168.0.1",
            "arp_tpa": "192.168.0.2",
            "mpls_label": 16
        }"#;
        let packet: PacketIn = serde_json::from_str(json).unwrap();

        assert_eq!(packet.details.buffer_id, Some(0xffff_ffff));
        assert_eq!(packet.details.cookie, Some(18));
        assert_eq!(packet.details.arp_op, Some(1));
        assert_eq!(packet.details.arp_sha, Some(packet.eth_src));
        assert_eq!(packet.details.arp_tpa, Some(Ipv4Addr::new(192, 168, 0, 2)));
        assert_eq!(packet.details.mpls_label, Some(16));
        assert_eq!(packet.details.icmpv4_type, None);
    }

    #[test]
    fn test_exact_match_copies_all_headers() {
        let mut packet = PacketIn::new(
            DatapathId::new(1),
            PortNo::new(3),
            MacAddress::new([2, 0, 0, 0, 0, 1]),
            MacAddress::new([2, 0, 0, 0, 0, 2]),
        );
        packet.eth_type = Some(ETH_TYPE_IPV4);
        packet.vlan_vid = Some(100);
        packet.ip_proto = Some(6);
        packet.l4_dst = Some(80);

        let key = ExactMatch::from(&packet);

        assert_eq!(key.in_port, PortNo::new(3));
        assert_eq!(key.eth_src, packet.eth_src);
        assert_eq!(key.eth_dst, packet.eth_dst);
        assert_eq!(key.vlan_vid, Some(100));
        assert_eq!(key.ip_proto, Some(6));
        assert_eq!(key.l4_dst, Some(80));
    }
}
