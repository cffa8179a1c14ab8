//! Common types for the learning-switch control plane.
//!
//! - [`MacAddress`]: 48-bit Ethernet MAC addresses
//! - [`PortNo`]: OpenFlow switch port numbers, including reserved ports
//! - [`DatapathId`]: 64-bit switch identifiers
//! - [`Timestamp`]: caller-supplied monotonic time in seconds

mod datapath;
mod mac;
mod port;
mod time;

pub use datapath::DatapathId;
pub use mac::MacAddress;
pub use port::PortNo;
pub use time::Timestamp;

/// Common error type for parsing failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("invalid MAC address format: {0}")]
    InvalidMacAddress(String),

    #[error("invalid datapath id: {0}")]
    InvalidDatapathId(String),

    #[error("invalid port number: {0}")]
    InvalidPortNo(String),
}
