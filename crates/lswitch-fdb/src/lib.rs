//! Forwarding database (FDB) for an OpenFlow learning switch.
//!
//! This crate owns the part of the controller that decides where frames go:
//!
//! - [`AddressTable`]: MAC address to (port, last-seen) learning table
//! - [`AgingSweeper`]: evicts entries that have not been seen for a TTL
//! - [`ForwardingEngine`]: learns the source of each frame and returns a
//!   [`Disposition`] for its destination
//! - [`FdbStats`]: counters for learning, forwarding and aging
//!
//! # Flow
//!
//! ```text
//! packet-in ──▶ ForwardingEngine::decide ──▶ learn(src) ──▶ lookup(dst)
//!                                                               │
//!                                    Forward(port) / Flood ◀────┘
//!
//! timer ──▶ ForwardingEngine::age_tick ──▶ AgingSweeper::sweep ──▶ evict_expired
//! ```
//!
//! Time is always passed in by the caller, so every operation here is
//! deterministic. Programming the switch and scheduling the aging timer
//! are left to the host controller.

mod aging;
mod engine;
mod stats;
mod table;

pub use aging::{
    AgingConfig, AgingConfigError, AgingSweeper, SweepOutcome, DEFAULT_SWEEP_INTERVAL_SECS,
    DEFAULT_TTL_SECS,
};
pub use engine::{Disposition, ForwardingEngine};
pub use stats::{FdbStats, FdbStatsSnapshot};
pub use table::{AddressTable, FdbEntry, LearnOutcome};

pub use lswitch_types::{MacAddress, PortNo, Timestamp};
