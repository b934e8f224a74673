use std::num::NonZeroUsize;
use std::sync::Arc;

use crate::config::PoolsConfiguration;
use crate::pool::{
    MiniBlockCacher, MiniBlocksPool, PoolError, PoolsHolder, Result, ShardedDataCacherNotifier,
    ShardedDataPool,
};

/// All in-memory pools of a node, built from configuration.
pub struct DataPool {
    transactions: Arc<ShardedDataPool>,
    reward_transactions: Arc<ShardedDataPool>,
    unsigned_transactions: Arc<ShardedDataPool>,
    mini_blocks: Arc<MiniBlocksPool>,
}

impl std::fmt::Debug for DataPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DataPool").finish_non_exhaustive()
    }
}

impl DataPool {
    pub fn new(config: &PoolsConfiguration) -> Result<Self> {
        let transactions = ShardedDataPool::new(
            "transactions",
            capacity("transactions", config.transactions_capacity)?,
        );
        let reward_transactions = ShardedDataPool::new(
            "reward_transactions",
            capacity(
                "reward_transactions",
                config.reward_transactions_capacity,
            )?,
        );
        let unsigned_transactions = ShardedDataPool::new(
            "unsigned_transactions",
            capacity(
                "unsigned_transactions",
                config.unsigned_transactions_capacity,
            )?,
        );
        let mini_blocks =
            MiniBlocksPool::new(capacity("mini_blocks", config.mini_blocks_capacity)?);

        Ok(Self {
            transactions: Arc::new(transactions),
            reward_transactions: Arc::new(reward_transactions),
            unsigned_transactions: Arc::new(unsigned_transactions),
            mini_blocks: Arc::new(mini_blocks),
        })
    }

    pub fn transactions_pool(&self) -> Arc<ShardedDataPool> {
        self.transactions.clone()
    }

    pub fn reward_transactions_pool(&self) -> Arc<ShardedDataPool> {
        self.reward_transactions.clone()
    }

    pub fn unsigned_transactions_pool(&self) -> Arc<ShardedDataPool> {
        self.unsigned_transactions.clone()
    }

    pub fn mini_blocks_pool(&self) -> Arc<MiniBlocksPool> {
        self.mini_blocks.clone()
    }
}

fn capacity(pool: &str, capacity: usize) -> Result<NonZeroUsize> {
    NonZeroUsize::new(capacity).ok_or_else(|| PoolError::InvalidCapacity(pool.to_string()))
}

impl PoolsHolder for DataPool {
    fn transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        Some(self.transactions.clone() as Arc<dyn ShardedDataCacherNotifier>)
    }

    fn reward_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        Some(self.reward_transactions.clone() as Arc<dyn ShardedDataCacherNotifier>)
    }

    fn unsigned_transactions(&self) -> Option<Arc<dyn ShardedDataCacherNotifier>> {
        Some(self.unsigned_transactions.clone() as Arc<dyn ShardedDataCacherNotifier>)
    }

    fn mini_blocks(&self) -> Option<Arc<dyn MiniBlockCacher>> {
        Some(self.mini_blocks.clone() as Arc<dyn MiniBlockCacher>)
    }
}
