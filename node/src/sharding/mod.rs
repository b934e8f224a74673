//! Shard ids, shard assignment and the identifiers used to name cross-shard data partitions.

use thiserror::Error;

pub mod coordinator;

pub use coordinator::{MultiShardCoordinator, ShardCoordinator};

pub type ShardId = u32;

/// Shard id of the metachain.
pub const METACHAIN_SHARD_ID: ShardId = u32::MAX;
/// Receiver shard id of data broadcast to every shard.
pub const ALL_SHARDS_ID: ShardId = 0xFFFF_FFF0;

pub type Result<T> = std::result::Result<T, ShardingError>;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ShardingError {
    #[error("Invalid number of shards: {0}")]
    InvalidNumberOfShards(u32),
    #[error("Invalid shard id {shard_id} for {number_of_shards} shards")]
    InvalidShardId {
        shard_id: ShardId,
        number_of_shards: u32,
    },
}

/// Identifier of the pool partition that holds data sent from `sender` to `destination`.
///
/// Intra-shard data lives under `"<shard>"`, cross-shard data under `"<sender>_<destination>"`.
pub fn shard_cacher_identifier(sender: ShardId, destination: ShardId) -> String {
    if sender == destination {
        return format!("{sender}");
    }
    format!("{sender}_{destination}")
}

/// Topic suffix used by the shard pair, independent of direction.
pub fn communication_identifier_between_shards(shard1: ShardId, shard2: ShardId) -> String {
    if shard1 == ALL_SHARDS_ID || shard2 == ALL_SHARDS_ID {
        return shard_id_to_string(ALL_SHARDS_ID);
    }
    if shard1 == shard2 {
        return shard_id_to_string(shard1);
    }
    if shard1 < shard2 {
        return format!("{}{}", shard_id_to_string(shard1), shard_id_to_string(shard2));
    }
    format!("{}{}", shard_id_to_string(shard2), shard_id_to_string(shard1))
}

pub fn shard_id_to_string(shard_id: ShardId) -> String {
    match shard_id {
        METACHAIN_SHARD_ID => "_META".to_string(),
        ALL_SHARDS_ID => "_ALL".to_string(),
        id => format!("_{id}"),
    }
}
