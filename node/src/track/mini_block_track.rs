use std::any::Any;
use std::sync::Arc;

use parking_lot::RwLock;
use thiserror::Error;

use crate::block::{BlockType, MiniBlock};
use crate::pool::{HandlerId, MiniBlockCacher, PoolsHolder, ShardedDataCacherNotifier};
use crate::sharding::{shard_cacher_identifier, ShardCoordinator};
use crate::track::CrossShardFilter;
use crate::utilities::to_hex;

pub type Result<T> = std::result::Result<T, TrackError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TrackError {
    #[error("nil pools holder")]
    NilPoolsHolder,
    #[error("nil transaction pool")]
    NilTransactionPool,
    #[error("nil reward transaction data pool")]
    NilRewardTxDataPool,
    #[error("nil unsigned transactions data pool")]
    NilUnsignedTxDataPool,
    #[error("nil mini-block pool")]
    NilMiniBlockPool,
    #[error("nil shard coordinator")]
    NilShardCoordinator,
}

/// Immunizes the transactions of incoming cross-shard mini-blocks against pool eviction.
pub struct MiniBlockTrack {
    shard_coordinator: Arc<dyn ShardCoordinator>,
    mini_blocks_pool: Arc<dyn MiniBlockCacher>,
    /// Replaceable after construction, see [`MiniBlockTrack::set_block_transactions_pool`]
    block_transactions_pool: RwLock<Arc<dyn ShardedDataCacherNotifier>>,
    reward_transactions_pool: Arc<dyn ShardedDataCacherNotifier>,
    unsigned_transactions_pool: Arc<dyn ShardedDataCacherNotifier>,
    cross_shard_filter: CrossShardFilter,
    handler_id: HandlerId,
}

impl std::fmt::Debug for MiniBlockTrack {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MiniBlockTrack")
            .field("self_id", &self.shard_coordinator.self_id())
            .field("cross_shard_filter", &self.cross_shard_filter)
            .finish_non_exhaustive()
    }
}

impl MiniBlockTrack {
    /// Creates the tracker and registers it with the mini-block pool.
    ///
    /// Dependencies are checked in order and the first missing one is reported.
    pub fn new(
        pools: Option<&dyn PoolsHolder>,
        shard_coordinator: Option<Arc<dyn ShardCoordinator>>,
    ) -> Result<Arc<Self>> {
        Self::with_filter(pools, shard_coordinator, CrossShardFilter::default())
    }

    pub fn with_filter(
        pools: Option<&dyn PoolsHolder>,
        shard_coordinator: Option<Arc<dyn ShardCoordinator>>,
        cross_shard_filter: CrossShardFilter,
    ) -> Result<Arc<Self>> {
        let pools = pools.ok_or(TrackError::NilPoolsHolder)?;
        let block_transactions_pool = pools
            .transactions()
            .ok_or(TrackError::NilTransactionPool)?;
        let reward_transactions_pool = pools
            .reward_transactions()
            .ok_or(TrackError::NilRewardTxDataPool)?;
        let unsigned_transactions_pool = pools
            .unsigned_transactions()
            .ok_or(TrackError::NilUnsignedTxDataPool)?;
        let mini_blocks_pool = pools.mini_blocks().ok_or(TrackError::NilMiniBlockPool)?;
        let shard_coordinator = shard_coordinator.ok_or(TrackError::NilShardCoordinator)?;

        //The pool owns the handler, it must not keep the tracker alive
        let tracker = Arc::new_cyclic(|weak_tracker: &std::sync::Weak<Self>| {
            let weak_tracker = weak_tracker.clone();
            let handler_id = mini_blocks_pool.register_handler(Arc::new(
                move |key: &[u8], mini_block: &MiniBlock| {
                    if let Some(tracker) = weak_tracker.upgrade() {
                        tracker.received_mini_block(key, Some(mini_block as &dyn Any));
                    }
                },
            ));
            Self {
                shard_coordinator,
                mini_blocks_pool,
                block_transactions_pool: RwLock::new(block_transactions_pool),
                reward_transactions_pool,
                unsigned_transactions_pool,
                cross_shard_filter,
                handler_id,
            }
        });

        log::debug!(
            "Mini-block tracker registered for shard {} with filter {:?}",
            tracker.shard_coordinator.self_id(),
            tracker.cross_shard_filter
        );
        Ok(tracker)
    }

    /// Handles a mini-block cache notification.
    ///
    /// Does nothing unless `key` is not empty, `value` is a [`MiniBlock`] (or `Arc<MiniBlock>`)
    /// accepted by the cross-shard filter, and its category has a pool.
    pub fn received_mini_block(&self, key: &[u8], value: Option<&dyn Any>) {
        if key.is_empty() {
            return;
        }

        let Some(mini_block) = value.and_then(as_mini_block) else {
            log::trace!("Value received for {} is not a mini-block", to_hex(key));
            return;
        };

        log::trace!("Received mini-block {}: {}", to_hex(key), mini_block);

        if !self.is_cross_shard_destination_me(mini_block) {
            return;
        }

        let Some(transactions_pool) = self.get_transaction_pool(mini_block.block_type) else {
            return;
        };

        let cache_id =
            shard_cacher_identifier(mini_block.sender_shard_id, mini_block.receiver_shard_id);
        transactions_pool.immunize_set_of_data_against_eviction(&mini_block.tx_hashes, &cache_id);
    }

    /// Pool holding the transactions of the given mini-block category.
    pub fn get_transaction_pool(
        &self,
        block_type: BlockType,
    ) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        match block_type {
            BlockType::TxBlock => Some(self.block_transactions_pool.read().clone()),
            BlockType::RewardsBlock => Some(self.reward_transactions_pool.clone()),
            BlockType::SmartContractResultBlock => Some(self.unsigned_transactions_pool.clone()),
            BlockType::StateBlock
            | BlockType::PeerBlock
            | BlockType::InvalidBlock
            | BlockType::ReceiptBlock => None,
        }
    }

    /// Replaces the ordinary transactions pool for all following notifications.
    pub fn set_block_transactions_pool(&self, pool: Arc<dyn ShardedDataCacherNotifier>) {
        *self.block_transactions_pool.write() = pool;
    }

    /// Transaction hashes of the mini-block that its category pool doesn't hold yet, in order.
    pub fn missing_transactions(&self, mini_block: &MiniBlock) -> Vec<Vec<u8>> {
        let Some(transactions_pool) = self.get_transaction_pool(mini_block.block_type) else {
            return vec![];
        };
        mini_block
            .tx_hashes
            .iter()
            .filter(|hash| transactions_pool.search_first_data(hash).is_none())
            .cloned()
            .collect()
    }

    pub fn mini_blocks_pool(&self) -> Arc<dyn MiniBlockCacher> {
        self.mini_blocks_pool.clone()
    }

    fn is_cross_shard_destination_me(&self, mini_block: &MiniBlock) -> bool {
        self.cross_shard_filter.accepts(
            mini_block.sender_shard_id,
            mini_block.receiver_shard_id,
            self.shard_coordinator.self_id(),
        )
    }
}

impl Drop for MiniBlockTrack {
    fn drop(&mut self) {
        self.mini_blocks_pool.unregister_handler(self.handler_id);
    }
}

fn as_mini_block(value: &dyn Any) -> Option<&MiniBlock> {
    value
        .downcast_ref::<MiniBlock>()
        .or_else(|| {
            value
                .downcast_ref::<Arc<MiniBlock>>()
                .map(|mini_block| &**mini_block)
        })
}
