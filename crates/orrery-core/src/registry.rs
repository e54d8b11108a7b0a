//! Process-wide transaction numbering and per-device connection sets.
//!
//! The [`Registry`] is constructed once at start-up and shared by reference
//! with the dispatch envelope, every device, and the routing layer.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock};

use orrery_types::{ClientId, DeviceKey};

/// Monotonic server transaction numbers.
///
/// The first number handed out is 1. The counter wraps at `u32::MAX`
/// rather than saturating.
#[derive(Debug)]
pub struct TransactionCounter {
    next: AtomicU32,
}

impl TransactionCounter {
    /// A counter whose first transaction is 1.
    pub const fn new() -> Self {
        Self {
            next: AtomicU32::new(1),
        }
    }

    /// Allocate the next transaction number.
    pub fn next(&self) -> u32 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for TransactionCounter {
    fn default() -> Self {
        Self::new()
    }
}

/// The clients currently connected to one device.
#[derive(Debug, Default)]
pub struct ConnectionSet {
    clients: Mutex<BTreeSet<ClientId>>,
}

impl ConnectionSet {
    /// An empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client. Adding an existing client is a no-op.
    ///
    /// Returns `true` if this was the first connection.
    pub fn add(&self, client: ClientId) -> bool {
        let mut clients = self.clients.lock();
        let was_empty = clients.is_empty();
        clients.insert(client);
        was_empty
    }

    /// Remove a client. Removing an unknown client is a no-op.
    ///
    /// Returns `true` if this removed the last connection.
    pub fn remove(&self, client: ClientId) -> bool {
        let mut clients = self.clients.lock();
        clients.remove(&client) && clients.is_empty()
    }

    /// Whether any client is connected.
    pub fn is_connected(&self) -> bool {
        !self.clients.lock().is_empty()
    }

    /// Number of connected clients.
    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }

    /// Whether no client is connected.
    pub fn is_empty(&self) -> bool {
        self.clients.lock().is_empty()
    }
}

/// Shared server state that outlives any single request.
#[derive(Debug, Default)]
pub struct Registry {
    transactions: TransactionCounter,
    connections: RwLock<BTreeMap<DeviceKey, Arc<ConnectionSet>>>,
}

impl Registry {
    /// An empty registry with the transaction counter at 1.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next server transaction number.
    pub fn next_transaction(&self) -> u32 {
        self.transactions.next()
    }

    /// The connection set for a device, created on first use.
    pub fn connections(&self, device: DeviceKey) -> Arc<ConnectionSet> {
        if let Some(set) = self.connections.read().get(&device) {
            return Arc::clone(set);
        }
        Arc::clone(self.connections.write().entry(device).or_default())
    }

    /// Whether any client is connected to the device.
    pub fn is_connected(&self, device: DeviceKey) -> bool {
        self.connections
            .read()
            .get(&device)
            .is_some_and(|set| set.is_connected())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use orrery_types::DeviceType;

    use super::*;

    #[test]
    fn counter_starts_at_one() {
        let counter = TransactionCounter::new();
        assert_eq!(counter.next(), 1);
        assert_eq!(counter.next(), 2);
    }

    #[test]
    fn counter_wraps() {
        let counter = TransactionCounter {
            next: AtomicU32::new(u32::MAX),
        };
        assert_eq!(counter.next(), u32::MAX);
        assert_eq!(counter.next(), 0);
    }

    #[test]
    fn concurrent_transactions_are_distinct() {
        let registry = Arc::new(Registry::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let registry = Arc::clone(&registry);
                std::thread::spawn(move || {
                    (0..1_000)
                        .map(|_| registry.next_transaction())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate transaction {id}");
            }
        }
        assert_eq!(seen.len(), 8_000);
    }

    #[test]
    fn connections_are_reference_counted() {
        let set = ConnectionSet::new();
        assert!(set.add(ClientId(1)));
        assert!(!set.add(ClientId(2)));
        assert!(!set.add(ClientId(2)));
        assert_eq!(set.len(), 2);

        assert!(!set.remove(ClientId(1)));
        assert!(set.is_connected());
        assert!(set.remove(ClientId(2)));
        assert!(!set.is_connected());

        assert!(!set.remove(ClientId(99)));
        assert!(set.is_empty());
    }

    #[test]
    fn registry_shares_sets_per_device() {
        let registry = Registry::new();
        let telescope = DeviceKey::new(DeviceType::Telescope, 0);
        let dome = DeviceKey::new(DeviceType::Dome, 0);

        registry.connections(telescope).add(ClientId(7));
        assert!(registry.is_connected(telescope));
        assert!(!registry.is_connected(dome));
        assert!(Arc::ptr_eq(
            &registry.connections(telescope),
            &registry.connections(telescope)
        ));
    }
}
