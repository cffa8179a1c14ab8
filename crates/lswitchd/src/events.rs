//! Controller event feed.
//!
//! Events arrive as newline-delimited JSON, one object per line, tagged by
//! an `event` field:
//!
//! ```text
//! {"event":"switch_ready","datapath_id":1}
//! {"event":"packet_in","datapath_id":1,"in_port":1,"eth_src":"00:00:00:00:00:01","eth_dst":"00:00:00:00:00:02"}
//! {"event":"port_down","datapath_id":1,"port":1}
//! {"event":"switch_disconnected","datapath_id":1}
//! ```
//!
//! Blank lines and lines starting with `#` are ignored. A malformed line
//! is logged and skipped; it never stops the feed.

use lswitch_types::{DatapathId, PortNo};
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, warn};

use crate::actuator::FlowActuator;
use crate::controller::LearningSwitch;
use crate::error::{LswitchError, Result};
use crate::packet::PacketIn;
use crate::scheduler::MonotonicClock;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ControllerEvent {
    SwitchReady { datapath_id: DatapathId },
    PacketIn(PacketIn),
    PortDown { datapath_id: DatapathId, port: PortNo },
    SwitchDisconnected { datapath_id: DatapathId },
}

/// Counters for a finished feed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedSummary {
    pub events: u64,
    pub packets: u64,
    pub malformed: u64,
}

/// Parses one feed line. `Ok(None)` means the line carries no event.
pub fn parse_event(line: &str, line_no: usize) -> Result<Option<ControllerEvent>> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return Ok(None);
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|source| LswitchError::Event {
            line: line_no,
            source,
        })
}

/// Applies one event to the controller.
pub async fn dispatch<A: FlowActuator>(
    controller: &LearningSwitch<A>,
    event: &ControllerEvent,
    clock: &MonotonicClock,
) {
    match event {
        ControllerEvent::SwitchReady { datapath_id } => {
            if let Err(e) = controller.switch_ready(*datapath_id).await {
                warn!(dpid = %datapath_id, error = %e, "Failed to initialise switch");
            }
        }
        ControllerEvent::PacketIn(packet) => {
            let disposition = controller.packet_in(packet, clock.now()).await;
            debug!(?disposition, "Packet handled");
        }
        ControllerEvent::PortDown { datapath_id, port } => {
            controller.port_down(*datapath_id, *port);
        }
        ControllerEvent::SwitchDisconnected { datapath_id } => {
            controller.switch_disconnected(*datapath_id);
        }
    }
}

/// Reads events from `reader` until end of input.
///
/// Lines are read as raw bytes so that invalid UTF-8 is counted as a
/// malformed line instead of ending the feed. Only I/O errors end it early.
pub async fn run_event_feed<R, A>(
    mut reader: R,
    controller: &LearningSwitch<A>,
    clock: &MonotonicClock,
) -> Result<FeedSummary>
where
    R: AsyncBufRead + Unpin,
    A: FlowActuator,
{
    let mut summary = FeedSummary::default();
    let mut buf = Vec::new();
    let mut line_no = 0usize;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        line_no += 1;

        let event = match decode_line(&buf, line_no) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(e) => {
                warn!(error = %e, "Skipping event");
                summary.malformed += 1;
                continue;
            }
        };

        if matches!(event, ControllerEvent::PacketIn(_)) {
            summary.packets += 1;
        }
        summary.events += 1;
        dispatch(controller, &event, clock).await;
    }

    Ok(summary)
}

fn decode_line(raw: &[u8], line_no: usize) -> Result<Option<ControllerEvent>> {
    let line = std::str::from_utf8(raw).map_err(|source| LswitchError::Encoding {
        line: line_no,
        source,
    })?;
    parse_event(line, line_no)
}
