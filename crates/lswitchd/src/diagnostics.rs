//! Packet field dumps for troubleshooting.
//!
//! Prints the header fields of packets whose IPv4 source and destination
//! are both on a watch list. Nothing here influences forwarding.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::net::Ipv4Addr;
use tracing::info;

use crate::packet::{
    PacketIn, ETH_TYPE_IPV4, ETH_TYPE_IPV6, IP_PROTO_SCTP, IP_PROTO_TCP, IP_PROTO_UDP,
};

/// Diagnostics configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosticsConfig {
    /// Dump matching packets
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Hosts whose traffic is dumped
    #[serde(default = "default_watch_addresses")]
    pub watch_addresses: Vec<Ipv4Addr>,
}

fn default_enabled() -> bool {
    true
}

fn default_watch_addresses() -> Vec<Ipv4Addr> {
    vec![
        Ipv4Addr::new(192, 168, 0, 1),
        Ipv4Addr::new(192, 168, 0, 2),
        Ipv4Addr::new(192, 168, 0, 3),
    ]
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            watch_addresses: default_watch_addresses(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PacketDumper {
    enabled: bool,
    watch: HashSet<Ipv4Addr>,
}

impl PacketDumper {
    pub fn new(config: &DiagnosticsConfig) -> Self {
        Self {
            enabled: config.enabled,
            watch: config.watch_addresses.iter().copied().collect(),
        }
    }

    /// True for IPv4 packets between two watched hosts.
    pub fn should_dump(&self, packet: &PacketIn) -> bool {
        if !self.enabled || !packet.is_ipv4() {
            return false;
        }
        match (packet.ipv4_src, packet.ipv4_dst) {
            (Some(src), Some(dst)) => self.watch.contains(&src) && self.watch.contains(&dst),
            _ => false,
        }
    }

    /// Header groups present in `packet`, in the order they are logged.
    pub fn sections(packet: &PacketIn) -> Vec<DumpSection> {
        let details = &packet.details;
        let mut sections = Vec::new();

        if matches!(packet.eth_type, Some(ETH_TYPE_IPV4) | Some(ETH_TYPE_IPV6)) {
            sections.push(DumpSection::Ip);
        }
        if packet.vlan_vid.is_some() {
            sections.push(DumpSection::Vlan);
        }
        if details.arp_op.is_some() {
            sections.push(DumpSection::Arp);
        }
        if details.icmpv4_type.is_some() {
            sections.push(DumpSection::Icmpv4);
        }
        if packet.l4_src.is_some() || packet.l4_dst.is_some() {
            sections.push(match packet.ip_proto {
                Some(IP_PROTO_TCP) => DumpSection::Tcp,
                Some(IP_PROTO_SCTP) => DumpSection::Sctp,
                Some(IP_PROTO_UDP) | None => DumpSection::Udp,
                Some(_) => DumpSection::L4,
            });
        }
        if details.pbb_isid.is_some() {
            sections.push(DumpSection::Pbb);
        }
        if details.mpls_label.is_some() {
            sections.push(DumpSection::Mpls);
        }
        sections
    }

    /// Logs the packet if it passes [`should_dump`](Self::should_dump).
    ///
    /// Returns whether anything was logged.
    pub fn dump(&self, packet: &PacketIn) -> bool {
        if !self.should_dump(packet) {
            return false;
        }

        let details = &packet.details;
        info!(
            dpid = %packet.datapath_id,
            transaction_id = ?details.transaction_id.map(hex),
            buffer_id = ?details.buffer_id.map(hex),
            total_len = packet.total_len,
            reason = ?details.reason.map(hex),
            table_id = ?details.table_id,
            cookie = ?details.cookie.map(hex),
            in_port = %packet.in_port,
            "Received a packet"
        );
        info!(
            eth_src = %packet.eth_src,
            eth_dst = %packet.eth_dst,
            eth_type = ?packet.eth_type.map(|t| format!("{:#06x}", t)),
            "  ethernet"
        );

        for section in Self::sections(packet) {
            match section {
                DumpSection::Ip => info!(
                    ip_dscp = ?details.ip_dscp,
                    ip_ecn = ?details.ip_ecn,
                    ip_proto = ?packet.ip_proto,
                    ipv4_src = ?packet.ipv4_src,
                    ipv4_dst = ?packet.ipv4_dst,
                    "  ip"
                ),
                DumpSection::Vlan => info!(
                    vlan_vid = ?packet.vlan_vid.map(hex),
                    vlan_prio = ?details.vlan_prio,
                    "  vlan"
                ),
                DumpSection::Arp => info!(
                    arp_op = ?details.arp_op,
                    arp_sha = ?details.arp_sha.map(|mac| mac.to_string()),
                    arp_spa = ?details.arp_spa,
                    arp_tpa = ?details.arp_tpa,
                    "  arp"
                ),
                DumpSection::Icmpv4 => info!(
                    icmpv4_type = ?details.icmpv4_type.map(hex),
                    icmpv4_code = ?details.icmpv4_code.map(hex),
                    "  icmpv4"
                ),
                DumpSection::Tcp | DumpSection::Udp | DumpSection::Sctp | DumpSection::L4 => {
                    info!(
                        protocol = section.name(),
                        src = ?packet.l4_src.map(hex),
                        dst = ?packet.l4_dst.map(hex),
                        "  transport"
                    )
                }
                DumpSection::Pbb => info!(pbb_isid = ?details.pbb_isid.map(hex), "  pbb"),
                DumpSection::Mpls => info!(
                    mpls_label = ?details.mpls_label.map(hex),
                    mpls_tc = ?details.mpls_tc,
                    mpls_bos = ?details.mpls_bos,
                    "  mpls"
                ),
            }
        }
        true
    }
}

/// A group of header fields logged together.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DumpSection {
    Ip,
    Vlan,
    Arp,
    Icmpv4,
    Tcp,
    Udp,
    Sctp,
    /// Ports of some other IP protocol
    L4,
    Pbb,
    Mpls,
}

impl DumpSection {
    pub fn name(&self) -> &'static str {
        match self {
            DumpSection::Ip => "ip",
            DumpSection::Vlan => "vlan",
            DumpSection::Arp => "arp",
            DumpSection::Icmpv4 => "icmpv4",
            DumpSection::Tcp => "tcp",
            DumpSection::Udp => "udp",
            DumpSection::Sctp => "sctp",
            DumpSection::L4 => "l4",
            DumpSection::Pbb => "pbb",
            DumpSection::Mpls => "mpls",
        }
    }
}

fn hex<T: std::fmt::LowerHex>(value: T) -> String {
    format!("{:#x}", value)
}

impl Default for PacketDumper {
    fn default() -> Self {
        Self::new(&DiagnosticsConfig::default())
    }
}
