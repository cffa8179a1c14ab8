//! The MAC learning table.

use lswitch_types::{MacAddress, PortNo, Timestamp};
use std::collections::HashMap;

/// A learned address.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FdbEntry {
    pub address: MacAddress,
    pub port: PortNo,
    pub last_seen: Timestamp,
}

impl FdbEntry {
    /// Returns true once `ttl_secs` or more have passed since the entry was last seen.
    pub fn is_expired(&self, now: Timestamp, ttl_secs: u64) -> bool {
        now.saturating_elapsed(self.last_seen) >= ttl_secs
    }
}

/// What a call to [`AddressTable::learn`] did to the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LearnOutcome {
    /// The address was not in the table.
    Learned,
    /// The address was already known on the same port.
    Refreshed,
    /// The address was known on a different port and has moved.
    Moved { from: PortNo },
}

/// Forwarding database keyed by MAC address.
///
/// One entry per address. A learn always overwrites the stored port, so a
/// host that moves between ports is followed immediately. Entries leave
/// the table only through [`evict_expired`](Self::evict_expired) or an
/// explicit flush; a lookup miss never removes anything.
#[derive(Debug, Clone, Default)]
pub struct AddressTable {
    entries: HashMap<MacAddress, FdbEntry>,
}

impl AddressTable {
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Records that `address` was seen on `port` at `now`.
    ///
    /// `last_seen` never moves backwards: if `now` is older than the stored
    /// timestamp the port is still updated but the newer timestamp is kept.
    pub fn learn(&mut self, address: MacAddress, port: PortNo, now: Timestamp) -> LearnOutcome {
        match self.entries.get_mut(&address) {
            Some(entry) => {
                let previous = entry.port;
                entry.port = port;
                entry.last_seen = entry.last_seen.max(now);
                if previous == port {
                    LearnOutcome::Refreshed
                } else {
                    LearnOutcome::Moved { from: previous }
                }
            }
            None => {
                self.entries.insert(
                    address,
                    FdbEntry {
                        address,
                        port,
                        last_seen: now,
                    },
                );
                LearnOutcome::Learned
            }
        }
    }

    /// Returns the port `address` was last seen on.
    pub fn lookup(&self, address: &MacAddress) -> Option<PortNo> {
        self.entries.get(address).map(|entry| entry.port)
    }

    pub fn get(&self, address: &MacAddress) -> Option<&FdbEntry> {
        self.entries.get(address)
    }

    /// Removes every entry whose age has reached `ttl_secs`.
    ///
    /// Returns the number of entries removed.
    pub fn evict_expired(&mut self, now: Timestamp, ttl_secs: u64) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| !entry.is_expired(now, ttl_secs));
        before - self.entries.len()
    }

    /// Removes every entry learned on `port`.
    pub fn flush_port(&mut self, port: PortNo) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.port != port);
        before - self.entries.len()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FdbEntry> {
        self.entries.values()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn mac(last: u8) -> MacAddress {
        MacAddress::new([0x00, 0x00, 0x00, 0x00, 0x00, last])
    }

    fn t(secs: u64) -> Timestamp {
        Timestamp::from_secs(secs)
    }

    #[test]
    fn test_learn_then_lookup() {
        let mut table = AddressTable::new();

        assert!(table.lookup(&mac(1)).is_none());
        assert_eq!(table.learn(mac(1), PortNo::new(3), t(0)), LearnOutcome::Learned);
        assert_eq!(table.lookup(&mac(1)), Some(PortNo::new(3)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_lookup_miss_does_not_create_entry() {
        let table = AddressTable::new();

        assert!(table.lookup(&mac(9)).is_none());
        assert!(table.is_empty());
    }

    #[test]
    fn test_last_write_wins() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));

        let outcome = table.learn(mac(1), PortNo::new(2), t(5));

        assert_eq!(outcome, LearnOutcome::Moved { from: PortNo::new(1) });
        assert_eq!(table.lookup(&mac(1)), Some(PortNo::new(2)));
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_refresh_on_same_port_updates_last_seen() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));

        assert_eq!(table.learn(mac(1), PortNo::new(1), t(42)), LearnOutcome::Refreshed);
        assert_eq!(table.get(&mac(1)).unwrap().last_seen, t(42));
    }

    #[test]
    fn test_last_seen_never_moves_backwards() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(100));
        table.learn(mac(1), PortNo::new(4), t(90));

        let entry = table.get(&mac(1)).unwrap();
        assert_eq!(entry.port, PortNo::new(4));
        assert_eq!(entry.last_seen, t(100));
    }

    #[test]
    fn test_evict_boundary() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));

        assert_eq!(table.evict_expired(t(59), 60), 0);
        assert_eq!(table.lookup(&mac(1)), Some(PortNo::new(1)));

        assert_eq!(table.evict_expired(t(60), 60), 1);
        assert!(table.lookup(&mac(1)).is_none());
    }

    #[test]
    fn test_evict_is_idempotent() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));
        table.learn(mac(2), PortNo::new(2), t(50));

        assert_eq!(table.evict_expired(t(70), 60), 1);
        assert_eq!(table.evict_expired(t(70), 60), 0);
        assert_eq!(table.lookup(&mac(2)), Some(PortNo::new(2)));
    }

    #[test]
    fn test_refresh_postpones_eviction() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));
        table.learn(mac(1), PortNo::new(1), t(30));

        assert_eq!(table.evict_expired(t(60), 60), 0);
        assert_eq!(table.evict_expired(t(90), 60), 1);
    }

    #[test]
    fn test_flush_port() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));
        table.learn(mac(2), PortNo::new(1), t(0));
        table.learn(mac(3), PortNo::new(2), t(0));

        assert_eq!(table.flush_port(PortNo::new(1)), 2);
        assert_eq!(table.len(), 1);
        assert_eq!(table.lookup(&mac(3)), Some(PortNo::new(2)));
    }

    #[test]
    fn test_clear_and_iter() {
        let mut table = AddressTable::new();
        table.learn(mac(1), PortNo::new(1), t(0));
        table.learn(mac(2), PortNo::new(2), t(1));

        let mut ports: Vec<u32> = table.iter().map(|e| e.port.as_u32()).collect();
        ports.sort_unstable();
        assert_eq!(ports, vec![1, 2]);

        table.clear();
        assert!(table.is_empty());
    }
}
