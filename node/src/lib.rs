//! Shard node data pools and the mini-block tracker that keeps cross-shard transactions
//! from being evicted before block processing uses them.

pub mod block;
pub mod cli;
pub mod config;
pub mod logging;
pub mod pool;
pub mod sharding;
pub mod track;
pub mod utilities;
