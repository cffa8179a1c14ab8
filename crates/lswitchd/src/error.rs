//! Error types for lswitchd

use crate::actuator::ActuatorError;
use lswitch_fdb::AgingConfigError;
use thiserror::Error;

/// Errors that can occur in the controller host.
///
/// The forwarding engine itself never fails; everything here comes from
/// the surroundings: configuration, the event feed and the switch
/// programming collaborator.
#[derive(Debug, Error)]
pub enum LswitchError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid aging configuration: {0}")]
    Aging(#[from] AgingConfigError),

    #[error("Malformed event on line {line}: {source}")]
    Event {
        line: usize,
        #[source]
        source: serde_json::Error,
    },

    #[error("Event on line {line} is not valid UTF-8: {source}")]
    Encoding {
        line: usize,
        #[source]
        source: std::str::Utf8Error,
    },

    #[error("Actuator error: {0}")]
    Actuator(#[from] ActuatorError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for lswitchd operations
pub type Result<T> = std::result::Result<T, LswitchError>;
