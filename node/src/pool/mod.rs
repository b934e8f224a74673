//! # Data pools
//!
//! Transactions and mini-blocks received from the network wait here until block processing
//! consumes them. There is one sharded pool per transaction category and one mini-block cache.
//!
//! Each category pool is split into partitions ("cache ids") named after the sender/receiver
//! shard pair the data travels on, see [`crate::sharding::shard_cacher_identifier`].
//! Partitions are capacity bounded. Entries marked immune are never chosen for eviction,
//! they leave the pool only when removed explicitly.

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;

use crate::block::MiniBlock;
use crate::sharding::ShardId;

pub mod holder;
pub(crate) mod immunity_cache;
pub mod mini_blocks;
pub mod sharded_data;

#[cfg(test)]
pub(crate) mod stubs;

pub use holder::DataPool;
pub use mini_blocks::MiniBlocksPool;
pub use sharded_data::{ShardStoreStats, ShardedDataPool};

pub type Result<T> = std::result::Result<T, PoolError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PoolError {
    #[error("Invalid capacity for pool '{0}': capacity must be greater than zero")]
    InvalidCapacity(String),
    #[error("No mini-blocks found for nonce {nonce} and shard {shard_id}")]
    MiniBlocksNotFound { nonce: u64, shard_id: ShardId },
}

/// Called after a value is added to a category pool.
pub type DataHandler = Arc<dyn Fn(&[u8], &Bytes) + Send + Sync>;

/// Called after a mini-block is added to the mini-block cache.
pub type MiniBlockHandler = Arc<dyn Fn(&[u8], &MiniBlock) + Send + Sync>;

/// Identifies a registered [`MiniBlockHandler`] so it can be unregistered.
pub type HandlerId = u64;

/// Transaction pool of one category, partitioned by cache id.
pub trait ShardedDataCacherNotifier: Send + Sync {
    fn register_on_added(&self, handler: DataHandler);

    /// Returns `true` if the value was stored.
    fn add_data(&self, key: &[u8], data: Bytes, cache_id: &str) -> bool;

    /// Looks the key up in every partition.
    fn search_first_data(&self, key: &[u8]) -> Option<Bytes>;

    fn remove_set_of_data_from_pool(&self, keys: &[Vec<u8>], cache_id: &str);

    /// Protects the keys from eviction in the given partition, including keys not added yet.
    fn immunize_set_of_data_against_eviction(&self, keys: &[Vec<u8>], cache_id: &str);

    fn clear_shard_store(&self, cache_id: &str);
}

/// Capacity bounded cache of mini-blocks keyed by their hash.
pub trait MiniBlockCacher: Send + Sync {
    fn register_handler(&self, handler: MiniBlockHandler) -> HandlerId;

    /// Unknown ids are ignored.
    fn unregister_handler(&self, id: HandlerId);

    /// `nonce` is the nonce of the header that referenced the mini-block.
    /// Returns `true` if the mini-block was not present before.
    fn add(&self, hash: &[u8], nonce: u64, mini_block: Arc<MiniBlock>) -> bool;

    fn remove(&self, hash: &[u8]);

    fn remove_by_nonce_and_shard(&self, nonce: u64, shard_id: ShardId);

    fn get(&self, hash: &[u8]) -> Option<Arc<MiniBlock>>;

    /// Mini-blocks sent by `shard_id` under header `nonce`, together with their hashes.
    fn get_by_nonce_and_shard(
        &self,
        nonce: u64,
        shard_id: ShardId,
    ) -> Result<(Vec<Arc<MiniBlock>>, Vec<Vec<u8>>)>;

    /// Known header nonces for the sender shard, ascending.
    fn nonces(&self, shard_id: ShardId) -> Vec<u64>;

    fn clear(&self);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn max_size(&self) -> usize;
}

/// Gives access to all data pools of a node.
///
/// Every accessor may return `None` when the pool is not configured.
pub trait PoolsHolder: Send + Sync {
    fn transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>>;

    fn reward_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>>;

    fn unsigned_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>>;

    fn mini_blocks(&self) -> Option<Arc<dyn MiniBlockCacher>>;
}
