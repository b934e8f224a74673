use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::utilities::encoding::encode;
use crate::utilities::hash::{blake2_256, HashType};

/// Category of the transaction references carried by a mini-block.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Deserialize, Serialize)]
#[repr(u8)]
pub enum BlockType {
    /// Ordinary, signed user transactions.
    #[default]
    TxBlock = 0,
    StateBlock = 30,
    /// Validator/consensus metadata, not transactions.
    PeerBlock = 60,
    /// Unsigned transactions produced by smart contract execution.
    SmartContractResultBlock = 90,
    InvalidBlock = 120,
    ReceiptBlock = 150,
    RewardsBlock = 255,
}

impl Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BlockType::TxBlock => "TxBlock",
            BlockType::StateBlock => "StateBlock",
            BlockType::PeerBlock => "PeerBlock",
            BlockType::SmartContractResultBlock => "SmartContractResultBlock",
            BlockType::InvalidBlock => "InvalidBlock",
            BlockType::ReceiptBlock => "ReceiptBlock",
            BlockType::RewardsBlock => "RewardsBlock",
        };
        write!(f, "{name}")
    }
}

/// A block body subunit: one category of transaction references sent from one shard to another.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct MiniBlock {
    pub tx_hashes: Vec<Vec<u8>>,
    pub receiver_shard_id: u32,
    pub sender_shard_id: u32,
    pub block_type: BlockType,
}

impl MiniBlock {
    pub fn new(
        sender_shard_id: u32,
        receiver_shard_id: u32,
        block_type: BlockType,
        tx_hashes: Vec<Vec<u8>>,
    ) -> Self {
        Self {
            tx_hashes,
            receiver_shard_id,
            sender_shard_id,
            block_type,
        }
    }

    pub fn hash_with_default_hasher(&self) -> anyhow::Result<HashType> {
        let bytes = encode(self)?;
        Ok(blake2_256(&bytes))
    }
}

impl Display for MiniBlock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MiniBlock(sender: {}, receiver: {}, type: {}, txs: {})",
            self.sender_shard_id,
            self.receiver_shard_id,
            self.block_type,
            self.tx_hashes.len()
        )
    }
}
