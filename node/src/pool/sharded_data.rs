use std::collections::HashMap;
use std::num::NonZeroUsize;

use bytes::Bytes;
use parking_lot::{Mutex, RwLock};
use serde::Serialize;

use crate::pool::immunity_cache::{AddOutcome, ImmunityCache};
use crate::pool::{DataHandler, ShardedDataCacherNotifier};
use crate::utilities::to_hex;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ShardStoreStats {
    pub cache_id: String,
    pub len: usize,
    pub immune: usize,
    pub pending_immune: usize,
}

/// In-memory category pool. Partitions are created on first use.
pub struct ShardedDataPool {
    name: String,
    shard_capacity: NonZeroUsize,
    shard_stores: Mutex<HashMap<String, ImmunityCache<Bytes>>>,
    added_handlers: RwLock<Vec<DataHandler>>,
}

impl ShardedDataPool {
    pub fn new<S: Into<String>>(name: S, shard_capacity: NonZeroUsize) -> Self {
        Self {
            name: name.into(),
            shard_capacity,
            shard_stores: Mutex::new(HashMap::new()),
            added_handlers: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn is_immune(&self, key: &[u8], cache_id: &str) -> bool {
        self.shard_stores
            .lock()
            .get(cache_id)
            .map(|store| store.is_immune(key))
            .unwrap_or(false)
    }

    pub fn contains(&self, key: &[u8], cache_id: &str) -> bool {
        self.shard_stores
            .lock()
            .get(cache_id)
            .map(|store| store.contains(key))
            .unwrap_or(false)
    }

    /// Per partition statistics ordered by cache id.
    pub fn stats(&self) -> Vec<ShardStoreStats> {
        let mut stats = self
            .shard_stores
            .lock()
            .iter()
            .map(|(cache_id, store)| ShardStoreStats {
                cache_id: cache_id.clone(),
                len: store.len(),
                immune: store.immune_len(),
                pending_immune: store.pending_len(),
            })
            .collect::<Vec<_>>();
        stats.sort_by(|a, b| a.cache_id.cmp(&b.cache_id));
        stats
    }

    fn notify_added(&self, key: &[u8], data: &Bytes) {
        let handlers = self.added_handlers.read().clone();
        for handler in handlers {
            handler(key, data);
        }
    }
}

impl ShardedDataCacherNotifier for ShardedDataPool {
    fn register_on_added(&self, handler: DataHandler) {
        self.added_handlers.write().push(handler);
    }

    fn add_data(&self, key: &[u8], data: Bytes, cache_id: &str) -> bool {
        let outcome = {
            let mut stores = self.shard_stores.lock();
            let capacity = self.shard_capacity;
            stores
                .entry(cache_id.to_string())
                .or_insert_with(|| ImmunityCache::new(capacity))
                .add(key, data.clone())
        };

        match outcome {
            AddOutcome::Added => {
                self.notify_added(key, &data);
                true
            }
            AddOutcome::AlreadyPresent => false,
            AddOutcome::CapacityReached => {
                log::debug!(
                    "Pool {} partition {} is full of immune entries, dropping {}",
                    self.name,
                    cache_id,
                    to_hex(key)
                );
                false
            }
        }
    }

    fn search_first_data(&self, key: &[u8]) -> Option<Bytes> {
        self.shard_stores
            .lock()
            .values()
            .find_map(|store| store.peek(key).cloned())
    }

    fn remove_set_of_data_from_pool(&self, keys: &[Vec<u8>], cache_id: &str) {
        let mut stores = self.shard_stores.lock();
        if let Some(store) = stores.get_mut(cache_id) {
            for key in keys {
                store.remove(key);
            }
        }
    }

    fn immunize_set_of_data_against_eviction(&self, keys: &[Vec<u8>], cache_id: &str) {
        let outcome = {
            let mut stores = self.shard_stores.lock();
            let capacity = self.shard_capacity;
            stores
                .entry(cache_id.to_string())
                .or_insert_with(|| ImmunityCache::new(capacity))
                .immunize(keys)
        };

        log::trace!(
            "Pool {} partition {} immunized: now {}, future {}",
            self.name,
            cache_id,
            outcome.now_immune,
            outcome.future_immune
        );
    }

    fn clear_shard_store(&self, cache_id: &str) {
        self.shard_stores.lock().remove(cache_id);
    }
}

#[cfg(test)]
mod test {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn pool(capacity: usize) -> ShardedDataPool {
        ShardedDataPool::new("transactions", NonZeroUsize::new(capacity).unwrap())
    }

    #[test]
    fn test_add_and_search_across_partitions() {
        let pool = pool(10);

        assert!(pool.add_data(b"tx1", Bytes::from_static(b"data1"), "0"));
        assert!(pool.add_data(b"tx2", Bytes::from_static(b"data2"), "1_0"));
        assert!(!pool.add_data(b"tx2", Bytes::from_static(b"other"), "1_0"));

        assert_eq!(
            pool.search_first_data(b"tx2"),
            Some(Bytes::from_static(b"data2"))
        );
        assert_eq!(pool.search_first_data(b"tx3"), None);
    }

    #[test]
    fn test_immunized_data_survives_eviction() {
        let pool = pool(2);
        pool.immunize_set_of_data_against_eviction(&[b"tx1".to_vec()], "1_0");

        pool.add_data(b"tx1", Bytes::from_static(b"1"), "1_0");
        pool.add_data(b"tx2", Bytes::from_static(b"2"), "1_0");
        pool.add_data(b"tx3", Bytes::from_static(b"3"), "1_0");

        assert!(pool.contains(b"tx1", "1_0"));
        assert!(!pool.contains(b"tx2", "1_0"));
        assert!(pool.contains(b"tx3", "1_0"));
    }

    #[test]
    fn test_immunity_is_scoped_to_partition() {
        let pool = pool(2);
        pool.immunize_set_of_data_against_eviction(&[b"tx1".to_vec()], "1_0");

        assert!(pool.is_immune(b"tx1", "1_0"));
        assert!(!pool.is_immune(b"tx1", "2_0"));
    }

    #[test]
    fn test_remove_set_of_data() {
        let pool = pool(10);
        pool.add_data(b"tx1", Bytes::from_static(b"1"), "1_0");
        pool.add_data(b"tx2", Bytes::from_static(b"2"), "1_0");
        pool.immunize_set_of_data_against_eviction(&[b"tx1".to_vec()], "1_0");

        pool.remove_set_of_data_from_pool(&[b"tx1".to_vec(), b"tx2".to_vec()], "1_0");

        assert!(!pool.contains(b"tx1", "1_0"));
        assert!(!pool.is_immune(b"tx1", "1_0"));
        assert!(!pool.contains(b"tx2", "1_0"));
    }

    #[test]
    fn test_clear_shard_store() {
        let pool = pool(10);
        pool.add_data(b"tx1", Bytes::from_static(b"1"), "1_0");
        pool.add_data(b"tx2", Bytes::from_static(b"2"), "0");

        pool.clear_shard_store("1_0");

        assert_eq!(pool.search_first_data(b"tx1"), None);
        assert!(pool.contains(b"tx2", "0"));
    }

    #[test]
    fn test_stats() {
        let pool = pool(10);
        pool.add_data(b"tx1", Bytes::from_static(b"1"), "1_0");
        pool.immunize_set_of_data_against_eviction(&[b"tx1".to_vec(), b"tx2".to_vec()], "1_0");
        pool.add_data(b"tx3", Bytes::from_static(b"3"), "0");

        let stats = pool.stats();

        assert_eq!(
            stats,
            vec![
                ShardStoreStats {
                    cache_id: "0".to_string(),
                    len: 1,
                    immune: 0,
                    pending_immune: 0,
                },
                ShardStoreStats {
                    cache_id: "1_0".to_string(),
                    len: 1,
                    immune: 1,
                    pending_immune: 1,
                },
            ]
        );
    }

    #[test]
    fn test_immunity_outlives_consumed_transactions() {
        let pool = pool(2);
        pool.immunize_set_of_data_against_eviction(&[b"a".to_vec(), b"b".to_vec()], "1_0");
        pool.immunize_set_of_data_against_eviction(&[b"c".to_vec(), b"d".to_vec()], "1_0");

        pool.add_data(b"a", Bytes::from_static(b"a"), "1_0");
        pool.add_data(b"b", Bytes::from_static(b"b"), "1_0");
        pool.remove_set_of_data_from_pool(&[b"a".to_vec(), b"b".to_vec()], "1_0");

        assert!(pool.add_data(b"c", Bytes::from_static(b"c"), "1_0"));
        assert!(pool.add_data(b"d", Bytes::from_static(b"d"), "1_0"));
        assert!(!pool.add_data(b"filler", Bytes::from_static(b"f"), "1_0"));

        assert!(pool.is_immune(b"c", "1_0"));
        assert!(pool.contains(b"c", "1_0"));
        assert!(pool.contains(b"d", "1_0"));
    }

    #[test]
    fn test_mini_block_larger_than_partition_stays_immune() {
        let pool = pool(2);
        let tx_hashes = vec![b"tx1".to_vec(), b"tx2".to_vec(), b"tx3".to_vec()];
        pool.immunize_set_of_data_against_eviction(&tx_hashes, "1_0");

        for tx_hash in &tx_hashes {
            assert!(pool.add_data(tx_hash, Bytes::from_static(b"tx"), "1_0"));
        }

        for tx_hash in &tx_hashes {
            assert!(pool.is_immune(tx_hash, "1_0"));
            assert!(pool.contains(tx_hash, "1_0"));
        }
    }

    #[test]
    fn test_handlers_called_only_on_insert() {
        let pool = pool(10);
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        pool.register_on_added(Arc::new(move |_: &[u8], _: &Bytes| {
            counter.fetch_add(1, Ordering::SeqCst);
        }));

        pool.add_data(b"tx1", Bytes::from_static(b"1"), "0");
        pool.add_data(b"tx1", Bytes::from_static(b"1"), "0");

        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
