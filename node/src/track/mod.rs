//! # Mini-block tracking
//!
//! Mini-blocks sent to this shard by other shards arrive before the transactions they
//! reference. Until block processing has fetched and executed those transactions, the
//! category pools must not evict them, even under memory pressure.
//!
//! [`MiniBlockTrack`] listens to the mini-block cache. For every relevant mini-block it asks the
//! matching category pool to make the referenced transaction hashes immune to eviction in the
//! partition of the sender/receiver shard pair. Lifting the immunity is left to the pool owner.
//!
//! Irrelevant or malformed notifications are ignored. They come from the network and are
//! expected.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::sharding::{ShardId, ALL_SHARDS_ID};

pub mod mini_block_track;

pub use mini_block_track::{MiniBlockTrack, TrackError};

/// Decides which mini-blocks count as cross-shard mini-blocks destined to the local shard.
///
/// Mini-blocks sent by the local shard itself are never accepted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossShardFilter {
    /// Receiver must be the local shard.
    #[default]
    DestinationMe,
    /// Receiver is the local shard or every shard.
    DestinationMeOrAll,
    /// Any receiver.
    AnyInbound,
}

impl CrossShardFilter {
    pub fn accepts(&self, sender: ShardId, receiver: ShardId, self_id: ShardId) -> bool {
        if sender == self_id {
            return false;
        }
        match self {
            CrossShardFilter::DestinationMe => receiver == self_id,
            CrossShardFilter::DestinationMeOrAll => {
                receiver == self_id || receiver == ALL_SHARDS_ID
            }
            CrossShardFilter::AnyInbound => true,
        }
    }
}

impl Display for CrossShardFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            CrossShardFilter::DestinationMe => "destination_me",
            CrossShardFilter::DestinationMeOrAll => "destination_me_or_all",
            CrossShardFilter::AnyInbound => "any_inbound",
        };
        write!(f, "{name}")
    }
}

impl FromStr for CrossShardFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "destination_me" => Ok(CrossShardFilter::DestinationMe),
            "destination_me_or_all" => Ok(CrossShardFilter::DestinationMeOrAll),
            "any_inbound" => Ok(CrossShardFilter::AnyInbound),
            _ => Err(format!("Unknown cross shard filter: {s}")),
        }
    }
}
