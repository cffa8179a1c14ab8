//! lswitchd - OpenFlow learning-switch controller host
//!
//! Wraps the `lswitch-fdb` forwarding engine with everything a controller
//! needs around it: per-switch tables, switch programming through a
//! [`FlowActuator`], the periodic aging timer, packet diagnostics and a
//! JSON-lines event feed.
//!
//! ```text
//! event feed ──▶ LearningSwitch ──▶ ForwardingEngine (per datapath)
//!                     │                     ▲
//!                     ▼                     │ age_tick
//!               FlowActuator         AgingScheduler
//!          (flow-mod / packet-out)
//! ```

pub mod actuator;
pub mod config_file;
pub mod controller;
pub mod diagnostics;
pub mod error;
pub mod events;
pub mod packet;
pub mod scheduler;

pub use actuator::{ActuatorError, FlowActuator, FlowMatch, FlowMod, LoggingActuator};
pub use config_file::{LswitchConfig, DEFAULT_CONFIG_PATH};
pub use controller::{AgingReport, LearningSwitch};
pub use diagnostics::{DiagnosticsConfig, DumpSection, PacketDumper};
pub use error::{LswitchError, Result};
pub use events::{dispatch, parse_event, run_event_feed, ControllerEvent, FeedSummary};
pub use packet::{ExactMatch, PacketDetails, PacketIn};
pub use scheduler::{AgingScheduler, MonotonicClock};

pub use lswitch_fdb::{Disposition, ForwardingEngine};
pub use lswitch_types::{DatapathId, MacAddress, PortNo, Timestamp};
