//! Versioned snapshot slot for handing new data to the UI thread.
//!
//! Producers on any thread [`publish`](SnapshotSlot::publish) whole snapshots;
//! the thread that owns the renderer polls with
//! [`take_newer`](SnapshotSlot::take_newer) and reconciles against the latest
//! one only. Snapshots published in between are dropped, never merged.

use std::sync::Arc;

use parking_lot::RwLock;

/// A published snapshot and its version
#[derive(Debug)]
pub struct Versioned<T> {
    /// The snapshot.
    pub value: Arc<T>,
    /// Publication counter, starting at 1.
    pub version: u64,
}

impl<T> Clone for Versioned<T> {
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            version: self.version,
        }
    }
}

#[derive(Debug)]
struct SlotState<T> {
    version: u64,
    latest: Option<Arc<T>>,
}

/// Thread-safe, last-write-wins holder of the newest snapshot.
///
/// Uses `parking_lot::RwLock`; clones share the same slot.
#[derive(Debug)]
pub struct SnapshotSlot<T> {
    inner: Arc<RwLock<SlotState<T>>>,
}

impl<T> Clone for SnapshotSlot<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> Default for SnapshotSlot<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SnapshotSlot<T> {
    /// Create an empty slot at version 0.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(RwLock::new(SlotState {
                version: 0,
                latest: None,
            })),
        }
    }

    /// Replace the held snapshot. Returns its version.
    pub fn publish(&self, value: T) -> u64 {
        let value = Arc::new(value);
        let mut state = self.inner.write();
        state.version += 1;
        state.latest = Some(value);
        state.version
    }

    /// The latest snapshot if it is newer than `seen`.
    ///
    /// ```
    /// use tola_reconcile::SnapshotSlot;
    ///
    /// let slot = SnapshotSlot::new();
    /// slot.publish("first");
    /// slot.publish("second");
    ///
    /// let latest = slot.take_newer(0).unwrap();
    /// assert_eq!((*latest.value, latest.version), ("second", 2));
    /// assert!(slot.take_newer(latest.version).is_none());
    /// ```
    pub fn take_newer(&self, seen: u64) -> Option<Versioned<T>> {
        let state = self.inner.read();
        if state.version <= seen {
            return None;
        }
        state.latest.as_ref().map(|value| Versioned {
            value: Arc::clone(value),
            version: state.version,
        })
    }

    /// The latest snapshot regardless of version.
    pub fn latest(&self) -> Option<Versioned<T>> {
        self.take_newer(0)
    }

    /// Version of the latest snapshot, 0 if none was published.
    pub fn version(&self) -> u64 {
        self.inner.read().version
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_slot() {
        let slot: SnapshotSlot<u32> = SnapshotSlot::new();
        assert_eq!(slot.version(), 0);
        assert!(slot.latest().is_none());
        assert!(slot.take_newer(0).is_none());
    }

    #[test]
    fn test_last_write_wins() {
        let slot = SnapshotSlot::new();
        assert_eq!(slot.publish(vec!["a"]), 1);
        assert_eq!(slot.publish(vec!["a", "b"]), 2);

        let seen = slot.take_newer(0).unwrap();
        assert_eq!(seen.version, 2);
        assert_eq!(*seen.value, vec!["a", "b"]);
        assert!(slot.take_newer(2).is_none());
    }

    #[test]
    fn test_clones_share_slot() {
        let producer = SnapshotSlot::new();
        let consumer = producer.clone();
        producer.publish(7);
        assert_eq!(consumer.latest().map(|v| *v.value), Some(7));
    }

    #[test]
    fn test_concurrent_publish() {
        let slot = SnapshotSlot::new();
        std::thread::scope(|scope| {
            for thread in 0..4u64 {
                let slot = slot.clone();
                scope.spawn(move || {
                    for i in 0..100 {
                        slot.publish(thread * 1000 + i);
                    }
                });
            }
        });

        assert_eq!(slot.version(), 400);
        let latest = slot.latest().unwrap();
        assert_eq!(latest.version, 400);
        assert_eq!(*latest.value % 1000, 99);
    }
}
