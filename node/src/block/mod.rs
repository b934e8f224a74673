//! # Blocks
//!
//! A shard block body is split into mini-blocks. Each mini-block carries the hashes of
//! transactions of a single category travelling from a sender shard to a receiver shard.
//!
//! Mini-blocks produced by other shards reach this node before the transactions they
//! reference. The node must request those transactions and keep them in its pools until
//! block processing consumes them. See [`crate::track`] for how that is guaranteed.

pub mod types;

pub use types::mini_block::{BlockType, MiniBlock};
