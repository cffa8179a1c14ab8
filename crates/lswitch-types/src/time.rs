//! Caller-supplied time.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Add;

/// A monotonic point in time, in whole seconds since an arbitrary origin.
///
/// The forwarding table never reads a clock; every operation is handed
/// the current `Timestamp` by its caller.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Timestamp(u64);

impl Timestamp {
    pub const ZERO: Timestamp = Timestamp(0);

    pub const fn from_secs(secs: u64) -> Self {
        Timestamp(secs)
    }

    pub const fn as_secs(&self) -> u64 {
        self.0
    }

    /// Seconds elapsed since `earlier`, or 0 if `earlier` is in the future.
    pub const fn saturating_elapsed(&self, earlier: Timestamp) -> u64 {
        self.0.saturating_sub(earlier.0)
    }
}

impl Add<u64> for Timestamp {
    type Output = Timestamp;

    fn add(self, secs: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}s", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_elapsed() {
        let t = Timestamp::from_secs(10);
        assert_eq!(t.saturating_elapsed(Timestamp::from_secs(4)), 6);
        assert_eq!(t.saturating_elapsed(Timestamp::from_secs(15)), 0);
    }

    #[test]
    fn test_add_saturates() {
        assert_eq!(Timestamp::from_secs(1) + 2, Timestamp::from_secs(3));
        assert_eq!(Timestamp::from_secs(u64::MAX) + 1, Timestamp::from_secs(u64::MAX));
    }
}
