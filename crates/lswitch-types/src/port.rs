//! OpenFlow port numbers.

use crate::ParseError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A switch port number.
///
/// Physical ports are small positive integers. Values from
/// `0xffffff00` upward are reserved by OpenFlow 1.3 for logical
/// destinations such as "all ports" or "the controller".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PortNo(u32);

impl PortNo {
    /// Highest number usable for a physical port.
    pub const MAX: PortNo = PortNo(0xffff_ff00);

    /// Send back out the ingress port.
    pub const IN_PORT: PortNo = PortNo(0xffff_fff8);

    /// Flood along the switch's non-blocked ports.
    pub const FLOOD: PortNo = PortNo(0xffff_fffb);

    /// Every port except the ingress port.
    pub const ALL: PortNo = PortNo(0xffff_fffc);

    /// The controller.
    pub const CONTROLLER: PortNo = PortNo(0xffff_fffd);

    /// The switch's local networking stack.
    pub const LOCAL: PortNo = PortNo(0xffff_fffe);

    /// Wildcard / no port.
    pub const ANY: PortNo = PortNo(0xffff_ffff);

    pub const fn new(port: u32) -> Self {
        PortNo(port)
    }

    pub const fn as_u32(&self) -> u32 {
        self.0
    }

    /// Returns true if this is one of the OpenFlow reserved port numbers.
    pub const fn is_reserved(&self) -> bool {
        self.0 >= Self::MAX.0
    }

    fn reserved_name(&self) -> Option<&'static str> {
        match *self {
            Self::IN_PORT => Some("IN_PORT"),
            Self::FLOOD => Some("FLOOD"),
            Self::ALL => Some("ALL"),
            Self::CONTROLLER => Some("CONTROLLER"),
            Self::LOCAL => Some("LOCAL"),
            Self::ANY => Some("ANY"),
            _ => None,
        }
    }
}

impl fmt::Display for PortNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.reserved_name() {
            Some(name) => write!(f, "{}", name),
            None => write!(f, "{}", self.0),
        }
    }
}

impl FromStr for PortNo {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "IN_PORT" => Ok(Self::IN_PORT),
            "FLOOD" => Ok(Self::FLOOD),
            "ALL" => Ok(Self::ALL),
            "CONTROLLER" => Ok(Self::CONTROLLER),
            "LOCAL" => Ok(Self::LOCAL),
            "ANY" => Ok(Self::ANY),
            other => other
                .parse::<u32>()
                .map(PortNo)
                .map_err(|_| ParseError::InvalidPortNo(s.to_string())),
        }
    }
}

impl From<u32> for PortNo {
    fn from(port: u32) -> Self {
        PortNo(port)
    }
}
