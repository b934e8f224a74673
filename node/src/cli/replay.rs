use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use clap::Parser;
use serde::{Deserialize, Serialize};

use crate::block::{BlockType, MiniBlock};
use crate::cli::DEFAULT_CONFIG_FILE;
use crate::config::Configuration;
use crate::logging::pretty_json;
use crate::pool::{DataPool, ShardStoreStats};
use crate::sharding::{MultiShardCoordinator, ShardCoordinator, ShardId};
use crate::track::MiniBlockTrack;
use crate::utilities::encoding::decode;
use crate::utilities::{from_hex, to_hex};

/// Replays recorded mini-blocks and transactions through the node pools.
///
/// Input file format:
///
/// ```json
/// {
///   "mini_blocks": [
///     { "nonce": 7, "sender_shard_id": 1, "receiver_shard_id": 0,
///       "block_type": "TxBlock", "tx_hashes": ["aa01", "aa02"] }
///   ],
///   "transactions": [
///     { "hash": "aa01", "data": "ff", "cache_id": "1_0", "block_type": "TxBlock" }
///   ]
/// }
/// ```
#[derive(Debug, Clone, Parser)]
pub struct ReplayCmd {
    #[clap(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    #[clap(long)]
    pub input: PathBuf,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReplayInput {
    #[serde(default)]
    pub mini_blocks: Vec<RecordedMiniBlock>,
    #[serde(default)]
    pub transactions: Vec<RecordedTransaction>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedMiniBlock {
    pub nonce: u64,
    pub sender_shard_id: ShardId,
    pub receiver_shard_id: ShardId,
    pub block_type: BlockType,
    pub tx_hashes: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecordedTransaction {
    pub hash: String,
    #[serde(default)]
    pub data: String,
    pub cache_id: String,
    #[serde(default)]
    pub block_type: BlockType,
}

impl TryFrom<&RecordedMiniBlock> for MiniBlock {
    type Error = anyhow::Error;

    fn try_from(recorded: &RecordedMiniBlock) -> Result<Self, Self::Error> {
        let tx_hashes = recorded
            .tx_hashes
            .iter()
            .map(from_hex)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(MiniBlock::new(
            recorded.sender_shard_id,
            recorded.receiver_shard_id,
            recorded.block_type,
            tx_hashes,
        ))
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ReplayReport {
    pub self_shard_id: ShardId,
    pub mini_blocks_added: usize,
    pub mini_blocks_in_pool: usize,
    pub transactions_added: usize,
    pub transactions: Vec<ShardStoreStats>,
    pub reward_transactions: Vec<ShardStoreStats>,
    pub unsigned_transactions: Vec<ShardStoreStats>,
    pub missing: Vec<MissingTransactions>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MissingTransactions {
    pub mini_block: String,
    pub tx_hashes: Vec<String>,
}

impl ReplayCmd {
    pub fn execute(self) -> anyhow::Result<()> {
        let configuration = Configuration::try_load(&self.config)?;
        crate::logging::init_with_config(&configuration.logging);

        let input: ReplayInput = decode(&std::fs::read(&self.input)?)?;
        let report = replay(&configuration, &input)?;

        println!("{}", serde_json::to_string_pretty(&report)?);
        Ok(())
    }
}

/// Mini-blocks go first so the tracker immunizes before the transactions arrive.
pub fn replay(configuration: &Configuration, input: &ReplayInput) -> anyhow::Result<ReplayReport> {
    let coordinator = MultiShardCoordinator::new(
        configuration.node.number_of_shards,
        configuration.node.shard_id,
    )?;
    let self_shard_id = coordinator.self_id();
    let data_pool = DataPool::new(&configuration.pools)?;
    let tracker = MiniBlockTrack::with_filter(
        Some(&data_pool),
        Some(Arc::new(coordinator)),
        configuration.tracker.cross_shard_filter,
    )?;
    let mini_blocks_pool = tracker.mini_blocks_pool();

    let mut report = ReplayReport {
        self_shard_id,
        ..ReplayReport::default()
    };

    let mut mini_blocks = Vec::with_capacity(input.mini_blocks.len());
    for recorded in &input.mini_blocks {
        let mini_block = Arc::new(MiniBlock::try_from(recorded)?);
        let hash = mini_block.hash_with_default_hasher()?;
        if mini_blocks_pool.add(&hash, recorded.nonce, mini_block.clone()) {
            log::debug!("Added mini-block {}: {}", to_hex(hash), mini_block);
            report.mini_blocks_added += 1;
        } else {
            log::debug!("Mini-block {} already in pool", to_hex(hash));
        }
        mini_blocks.push((hash, mini_block));
    }

    for recorded in &input.transactions {
        let Some(pool) = tracker.get_transaction_pool(recorded.block_type) else {
            log::warn!(
                "No pool for transaction {} of {}",
                recorded.hash,
                recorded.block_type
            );
            continue;
        };
        let hash = from_hex(&recorded.hash)?;
        let data = Bytes::from(from_hex(&recorded.data)?);
        if pool.add_data(&hash, data, &recorded.cache_id) {
            report.transactions_added += 1;
        }
    }

    report.mini_blocks_in_pool = mini_blocks_pool.len();
    report.transactions = data_pool.transactions_pool().stats();
    report.reward_transactions = data_pool.reward_transactions_pool().stats();
    report.unsigned_transactions = data_pool.unsigned_transactions_pool().stats();
    report.missing = mini_blocks
        .iter()
        .filter_map(|(hash, mini_block)| {
            let missing = tracker.missing_transactions(mini_block);
            if missing.is_empty() {
                return None;
            }
            Some(MissingTransactions {
                mini_block: to_hex(hash),
                tx_hashes: missing.iter().map(to_hex).collect(),
            })
        })
        .collect();

    log::debug!("Replay report: {}", pretty_json(&report));
    log::info!(
        "Replayed {} mini-blocks and {} transactions",
        report.mini_blocks_added,
        report.transactions_added
    );
    Ok(report)
}
