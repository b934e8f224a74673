use std::collections::{BTreeMap, HashMap, HashSet};
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lru::LruCache;
use parking_lot::{Mutex, RwLock};

use crate::block::MiniBlock;
use crate::pool::{HandlerId, MiniBlockCacher, MiniBlockHandler, PoolError, Result};
use crate::sharding::ShardId;
use crate::utilities::to_hex;

struct MiniBlockEntry {
    nonce: u64,
    mini_block: Arc<MiniBlock>,
}

struct MiniBlocksState {
    cache: LruCache<Vec<u8>, MiniBlockEntry>,
    /// sender shard -> header nonce -> mini-block hashes
    index: HashMap<ShardId, BTreeMap<u64, HashSet<Vec<u8>>>>,
}

impl MiniBlocksState {
    fn add_to_index(&mut self, hash: &[u8], entry: &MiniBlockEntry) {
        self.index
            .entry(entry.mini_block.sender_shard_id)
            .or_default()
            .entry(entry.nonce)
            .or_default()
            .insert(hash.to_vec());
    }

    fn remove_from_index(&mut self, hash: &[u8], entry: &MiniBlockEntry) {
        let shard_id = entry.mini_block.sender_shard_id;
        let Some(nonces) = self.index.get_mut(&shard_id) else {
            return;
        };
        if let Some(hashes) = nonces.get_mut(&entry.nonce) {
            hashes.remove(hash);
            if hashes.is_empty() {
                nonces.remove(&entry.nonce);
            }
        }
        if nonces.is_empty() {
            self.index.remove(&shard_id);
        }
    }

    fn remove(&mut self, hash: &[u8]) {
        if let Some(entry) = self.cache.pop(hash) {
            self.remove_from_index(hash, &entry);
        }
    }
}

/// LRU bounded mini-block cache that notifies registered handlers on every new mini-block.
pub struct MiniBlocksPool {
    capacity: NonZeroUsize,
    state: Mutex<MiniBlocksState>,
    handlers: RwLock<Vec<(HandlerId, MiniBlockHandler)>>,
    next_handler_id: AtomicU64,
}

impl MiniBlocksPool {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            capacity,
            state: Mutex::new(MiniBlocksState {
                cache: LruCache::new(capacity),
                index: HashMap::new(),
            }),
            handlers: RwLock::new(Vec::new()),
            next_handler_id: AtomicU64::new(0),
        }
    }
}

impl MiniBlockCacher for MiniBlocksPool {
    fn register_handler(&self, handler: MiniBlockHandler) -> HandlerId {
        let id = self.next_handler_id.fetch_add(1, Ordering::Relaxed);
        self.handlers.write().push((id, handler));
        id
    }

    fn unregister_handler(&self, id: HandlerId) {
        self.handlers.write().retain(|(handler_id, _)| *handler_id != id);
    }

    fn add(&self, hash: &[u8], nonce: u64, mini_block: Arc<MiniBlock>) -> bool {
        {
            let mut state = self.state.lock();
            if state.cache.contains(hash) {
                return false;
            }

            let entry = MiniBlockEntry {
                nonce,
                mini_block: mini_block.clone(),
            };
            state.add_to_index(hash, &entry);
            if let Some((evicted_hash, evicted)) = state.cache.push(hash.to_vec(), entry) {
                log::trace!("Evicted mini-block {}", to_hex(&evicted_hash));
                state.remove_from_index(&evicted_hash, &evicted);
            }
        }

        //Handlers may call back into the pools, never call them under the lock
        let handlers = self.handlers.read().clone();
        for (_, handler) in handlers {
            handler(hash, mini_block.as_ref());
        }
        true
    }

    fn remove(&self, hash: &[u8]) {
        self.state.lock().remove(hash);
    }

    fn remove_by_nonce_and_shard(&self, nonce: u64, shard_id: ShardId) {
        let mut state = self.state.lock();
        let hashes = state
            .index
            .get(&shard_id)
            .and_then(|nonces| nonces.get(&nonce))
            .map(|hashes| hashes.iter().cloned().collect::<Vec<_>>())
            .unwrap_or_default();
        for hash in hashes {
            state.remove(&hash);
        }
    }

    fn get(&self, hash: &[u8]) -> Option<Arc<MiniBlock>> {
        self.state
            .lock()
            .cache
            .get(hash)
            .map(|entry| entry.mini_block.clone())
    }

    fn get_by_nonce_and_shard(
        &self,
        nonce: u64,
        shard_id: ShardId,
    ) -> Result<(Vec<Arc<MiniBlock>>, Vec<Vec<u8>>)> {
        let state = self.state.lock();
        let mut mini_blocks = vec![];
        let mut hashes = vec![];
        if let Some(found) = state
            .index
            .get(&shard_id)
            .and_then(|nonces| nonces.get(&nonce))
        {
            for hash in found {
                if let Some(entry) = state.cache.peek(hash) {
                    mini_blocks.push(entry.mini_block.clone());
                    hashes.push(hash.clone());
                }
            }
        }

        if mini_blocks.is_empty() {
            return Err(PoolError::MiniBlocksNotFound { nonce, shard_id });
        }
        Ok((mini_blocks, hashes))
    }

    fn nonces(&self, shard_id: ShardId) -> Vec<u64> {
        self.state
            .lock()
            .index
            .get(&shard_id)
            .map(|nonces| nonces.keys().copied().collect())
            .unwrap_or_default()
    }

    fn clear(&self) {
        let mut state = self.state.lock();
        state.cache.clear();
        state.index.clear();
    }

    fn len(&self) -> usize {
        self.state.lock().cache.len()
    }

    fn max_size(&self) -> usize {
        self.capacity.get()
    }
}
