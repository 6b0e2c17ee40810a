//! Sharded concurrent accumulator keyed by document id.
//!
//! The parallel ranking pipeline updates many per-document slots with little
//! cross-shard contention, so the map is split into independently locked
//! ordered shards instead of sitting behind one global lock.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use parking_lot::{Mutex, MutexGuard};

use crate::document::DocumentId;

/// Default shard count of the parallel ranking accumulator.
pub const DEFAULT_SHARD_COUNT: usize = 32;

/// Fixed-shard map from document id to an accumulated value.
#[derive(Debug)]
pub struct ConcurrentMap<V> {
    shards: Vec<Mutex<BTreeMap<DocumentId, V>>>,
}

/// Scoped handle to one mapped value.
///
/// The owning shard stays locked for the lifetime of the handle; hold at
/// most one handle at a time.
pub struct ValueRef<'a, V> {
    guard: MutexGuard<'a, BTreeMap<DocumentId, V>>,
    key: DocumentId,
}

impl<V> Deref for ValueRef<'_, V> {
    type Target = V;

    fn deref(&self) -> &V {
        self.guard.get(&self.key).expect("entry inserted on access")
    }
}

impl<V> DerefMut for ValueRef<'_, V> {
    fn deref_mut(&mut self) -> &mut V {
        self.guard
            .get_mut(&self.key)
            .expect("entry inserted on access")
    }
}

impl<V: Default> ConcurrentMap<V> {
    /// Create a map with the default shard count.
    pub fn new() -> Self {
        Self::with_shards(DEFAULT_SHARD_COUNT)
    }

    /// Create a map with `shard_count` independently locked shards.
    ///
    /// Panics on a zero `shard_count`.
    pub fn with_shards(shard_count: usize) -> Self {
        assert!(shard_count > 0, "shard count must be positive");
        Self {
            shards: (0..shard_count).map(|_| Mutex::new(BTreeMap::new())).collect(),
        }
    }

    /// Lock the owning shard and expose the value for `key`, inserting the
    /// default value on first access.
    pub fn access(&self, key: DocumentId) -> ValueRef<'_, V> {
        let mut guard = self.shard(key).lock();
        guard.entry(key).or_default();
        ValueRef { guard, key }
    }

    /// Remove `key` from its shard.
    pub fn erase(&self, key: DocumentId) {
        self.shard(key).lock().remove(&key);
    }

    fn shard(&self, key: DocumentId) -> &Mutex<BTreeMap<DocumentId, V>> {
        // The unsigned cast keeps negative keys on a real shard.
        let slot = (key as u64) % self.shards.len() as u64;
        &self.shards[slot as usize]
    }
}

impl<V: Default> Default for ConcurrentMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> ConcurrentMap<V> {
    /// Merge every shard into a single ascending map.
    ///
    /// Shards are locked one at a time in order; callers must ensure writers
    /// are quiescent if they need a consistent snapshot.
    pub fn build_flat(&self) -> BTreeMap<DocumentId, V> {
        let mut flat = BTreeMap::new();
        for shard in &self.shards {
            let guard = shard.lock();
            for (&key, value) in guard.iter() {
                flat.insert(key, value.clone());
            }
        }
        flat
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_inserts_default_and_accumulates() {
        let map: ConcurrentMap<f64> = ConcurrentMap::with_shards(4);
        *map.access(7) += 1.5;
        *map.access(7) += 0.5;
        assert_eq!(map.build_flat().get(&7), Some(&2.0));
    }

    #[test]
    fn erase_removes_the_key() {
        let map: ConcurrentMap<i32> = ConcurrentMap::with_shards(4);
        *map.access(3) = 9;
        map.erase(3);
        assert!(map.build_flat().is_empty());
    }

    #[test]
    fn build_flat_is_ascending_across_shards() {
        let map: ConcurrentMap<i32> = ConcurrentMap::with_shards(3);
        for key in [5, 1, 9, 2, 33] {
            *map.access(key) = key as i32;
        }
        let keys: Vec<DocumentId> = map.build_flat().into_keys().collect();
        assert_eq!(keys, vec![1, 2, 5, 9, 33]);
    }

    #[test]
    fn negative_keys_land_on_a_shard() {
        let map: ConcurrentMap<i32> = ConcurrentMap::with_shards(32);
        *map.access(-1) = 1;
        assert_eq!(map.build_flat().get(&-1), Some(&1));
    }

    #[test]
    fn concurrent_writers_keep_every_increment() {
        let map: ConcurrentMap<u64> = ConcurrentMap::with_shards(8);
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for key in 0..64 {
                        *map.access(key) += 1;
                    }
                });
            }
        });
        let flat = map.build_flat();
        assert_eq!(flat.len(), 64);
        assert!(flat.values().all(|&count| count == 4));
    }
}
