//! Recording stubs of the pool traits.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use parking_lot::Mutex;

use crate::block::MiniBlock;
use crate::pool::{
    DataHandler, HandlerId, MiniBlockCacher, MiniBlockHandler, PoolError, PoolsHolder, Result,
    ShardedDataCacherNotifier,
};
use crate::sharding::ShardId;

#[derive(Default)]
pub(crate) struct ShardedDataStub {
    data: Mutex<HashMap<Vec<u8>, Bytes>>,
    immunize_calls: Mutex<Vec<(Vec<Vec<u8>>, String)>>,
}

impl ShardedDataStub {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn with_data(self: Arc<Self>, key: &[u8], value: &'static [u8]) -> Arc<Self> {
        self.data
            .lock()
            .insert(key.to_vec(), Bytes::from_static(value));
        self
    }

    pub(crate) fn immunize_calls(&self) -> Vec<(Vec<Vec<u8>>, String)> {
        self.immunize_calls.lock().clone()
    }

    pub(crate) fn was_immunize_called(&self) -> bool {
        !self.immunize_calls.lock().is_empty()
    }
}

impl ShardedDataCacherNotifier for ShardedDataStub {
    fn register_on_added(&self, _: DataHandler) {}

    fn add_data(&self, key: &[u8], data: Bytes, _: &str) -> bool {
        self.data.lock().insert(key.to_vec(), data).is_none()
    }

    fn search_first_data(&self, key: &[u8]) -> Option<Bytes> {
        self.data.lock().get(key).cloned()
    }

    fn remove_set_of_data_from_pool(&self, keys: &[Vec<u8>], _: &str) {
        let mut data = self.data.lock();
        for key in keys {
            data.remove(key);
        }
    }

    fn immunize_set_of_data_against_eviction(&self, keys: &[Vec<u8>], cache_id: &str) {
        self.immunize_calls
            .lock()
            .push((keys.to_vec(), cache_id.to_string()));
    }

    fn clear_shard_store(&self, _: &str) {}
}

#[derive(Default)]
pub(crate) struct MiniBlockCacherStub {
    handlers: Mutex<Vec<(HandlerId, MiniBlockHandler)>>,
    next_handler_id: Mutex<HandlerId>,
}

impl MiniBlockCacherStub {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub(crate) fn registered_handlers(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Simulates an add by calling every registered handler.
    pub(crate) fn notify(&self, hash: &[u8], mini_block: &MiniBlock) {
        let handlers = self.handlers.lock().clone();
        for (_, handler) in handlers {
            handler(hash, mini_block);
        }
    }
}

impl MiniBlockCacher for MiniBlockCacherStub {
    fn register_handler(&self, handler: MiniBlockHandler) -> HandlerId {
        let mut next_handler_id = self.next_handler_id.lock();
        let id = *next_handler_id;
        *next_handler_id += 1;
        self.handlers.lock().push((id, handler));
        id
    }

    fn unregister_handler(&self, id: HandlerId) {
        self.handlers.lock().retain(|(handler_id, _)| *handler_id != id);
    }

    fn add(&self, _: &[u8], _: u64, _: Arc<MiniBlock>) -> bool {
        false
    }

    fn remove(&self, _: &[u8]) {}

    fn remove_by_nonce_and_shard(&self, _: u64, _: ShardId) {}

    fn get(&self, _: &[u8]) -> Option<Arc<MiniBlock>> {
        None
    }

    fn get_by_nonce_and_shard(
        &self,
        nonce: u64,
        shard_id: ShardId,
    ) -> Result<(Vec<Arc<MiniBlock>>, Vec<Vec<u8>>)> {
        Err(PoolError::MiniBlocksNotFound { nonce, shard_id })
    }

    fn nonces(&self, _: ShardId) -> Vec<u64> {
        vec![]
    }

    fn clear(&self) {}

    fn len(&self) -> usize {
        0
    }

    fn max_size(&self) -> usize {
        100
    }
}

#[derive(Default, Clone)]
pub(crate) struct PoolsHolderStub {
    pub(crate) transactions: Option<Arc<dyn ShardedDataCacherNotifier>>,
    pub(crate) reward_transactions: Option<Arc<dyn ShardedDataCacherNotifier>>,
    pub(crate) unsigned_transactions: Option<Arc<dyn ShardedDataCacherNotifier>>,
    pub(crate) mini_blocks: Option<Arc<dyn MiniBlockCacher>>,
}

impl PoolsHolderStub {
    /// Every pool present and backed by a fresh stub.
    pub(crate) fn full() -> Self {
        Self {
            transactions: Some(ShardedDataStub::new()),
            reward_transactions: Some(ShardedDataStub::new()),
            unsigned_transactions: Some(ShardedDataStub::new()),
            mini_blocks: Some(MiniBlockCacherStub::new()),
        }
    }
}

impl PoolsHolder for PoolsHolderStub {
    fn transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        self.transactions.clone()
    }

    fn reward_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        self.reward_transactions.clone()
    }

    fn unsigned_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        self.unsigned_transactions.clone()
    }

    fn mini_blocks(&self) -> Option<Arc<dyn MiniBlockCacher>> {
        self.mini_blocks.clone()
    }
}
