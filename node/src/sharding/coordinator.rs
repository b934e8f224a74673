use crate::sharding::{
    communication_identifier_between_shards, Result, ShardId, ShardingError, METACHAIN_SHARD_ID,
};

/// Answers which shard this node belongs to and which shard owns an entity.
pub trait ShardCoordinator: Send + Sync {
    fn number_of_shards(&self) -> u32;

    fn self_id(&self) -> ShardId;

    /// Shard owning the given address.
    fn compute_id(&self, address: &[u8]) -> ShardId;

    fn same_shard(&self, first_address: &[u8], second_address: &[u8]) -> bool {
        self.compute_id(first_address) == self.compute_id(second_address)
    }

    fn communication_identifier(&self, destination: ShardId) -> String {
        communication_identifier_between_shards(self.self_id(), destination)
    }
}

/// Assigns addresses to shards by their trailing bytes.
#[derive(Debug, Clone)]
pub struct MultiShardCoordinator {
    number_of_shards: u32,
    self_id: ShardId,
    mask_high: u32,
    mask_low: u32,
}

impl MultiShardCoordinator {
    pub fn new(number_of_shards: u32, self_id: ShardId) -> Result<Self> {
        if number_of_shards == 0 {
            return Err(ShardingError::InvalidNumberOfShards(number_of_shards));
        }
        if self_id >= number_of_shards && self_id != METACHAIN_SHARD_ID {
            return Err(ShardingError::InvalidShardId {
                shard_id: self_id,
                number_of_shards,
            });
        }

        let (mask_high, mask_low) = Self::masks(number_of_shards);
        Ok(Self {
            number_of_shards,
            self_id,
            mask_high,
            mask_low,
        })
    }

    //High mask covers the next power of two, low mask the previous one
    fn masks(number_of_shards: u32) -> (u32, u32) {
        if number_of_shards == 1 {
            return (0, 0);
        }
        let bits = u32::BITS - (number_of_shards - 1).leading_zeros();
        let mask_high = ((1u64 << bits) - 1) as u32;
        let mask_low = ((1u64 << (bits - 1)) - 1) as u32;
        (mask_high, mask_low)
    }

    fn bytes_needed(&self) -> usize {
        match self.number_of_shards {
            0..=256 => 1,
            257..=65536 => 2,
            65537..=16777216 => 3,
            _ => 4,
        }
    }
}

impl ShardCoordinator for MultiShardCoordinator {
    fn number_of_shards(&self) -> u32 {
        self.number_of_shards
    }

    fn self_id(&self) -> ShardId {
        self.self_id
    }

    fn compute_id(&self, address: &[u8]) -> ShardId {
        let start = address.len().saturating_sub(self.bytes_needed());
        let addr = address[start..]
            .iter()
            .fold(0u32, |acc, byte| (acc << 8) + u32::from(*byte));

        let shard = addr & self.mask_high;
        if shard > self.number_of_shards - 1 {
            return addr & self.mask_low;
        }
        shard
    }
}

#[cfg(test)]
mod test {
    use assert_matches::assert_matches;

    use super::*;

    #[test]
    fn test_new_rejects_zero_shards() {
        assert_matches!(
            MultiShardCoordinator::new(0, 0),
            Err(ShardingError::InvalidNumberOfShards(0))
        );
    }

    #[test]
    fn test_new_rejects_self_id_out_of_range() {
        assert_matches!(
            MultiShardCoordinator::new(2, 2),
            Err(ShardingError::InvalidShardId {
                shard_id: 2,
                number_of_shards: 2
            })
        );
    }

    #[test]
    fn test_new_accepts_metachain() {
        let coordinator = MultiShardCoordinator::new(3, METACHAIN_SHARD_ID).unwrap();
        assert_eq!(coordinator.self_id(), METACHAIN_SHARD_ID);
    }

    #[test]
    fn test_masks() {
        assert_eq!(MultiShardCoordinator::masks(1), (0, 0));
        assert_eq!(MultiShardCoordinator::masks(2), (1, 0));
        assert_eq!(MultiShardCoordinator::masks(3), (3, 1));
        assert_eq!(MultiShardCoordinator::masks(4), (3, 1));
        assert_eq!(MultiShardCoordinator::masks(5), (7, 3));
    }

    #[test]
    fn test_compute_id_single_shard() {
        let coordinator = MultiShardCoordinator::new(1, 0).unwrap();
        assert_eq!(coordinator.compute_id(&[0xff, 0xff]), 0);
    }

    #[test]
    fn test_compute_id_uses_last_byte() {
        let coordinator = MultiShardCoordinator::new(2, 0).unwrap();
        assert_eq!(coordinator.compute_id(&[7, 0]), 0);
        assert_eq!(coordinator.compute_id(&[7, 1]), 1);
        assert_eq!(coordinator.compute_id(&[7, 2]), 0);
        assert_eq!(coordinator.compute_id(&[7, 3]), 1);
    }

    #[test]
    fn test_compute_id_falls_back_to_low_mask() {
        let coordinator = MultiShardCoordinator::new(3, 0).unwrap();
        assert_eq!(coordinator.compute_id(&[2]), 2);
        //3 & 0b11 == 3 is not a shard, 3 & 0b1 == 1
        assert_eq!(coordinator.compute_id(&[3]), 1);
    }

    #[test]
    fn test_same_shard() {
        let coordinator = MultiShardCoordinator::new(2, 0).unwrap();
        assert!(coordinator.same_shard(&[1, 2], &[9, 4]));
        assert!(!coordinator.same_shard(&[1, 2], &[9, 5]));
    }

    #[test]
    fn test_communication_identifier() {
        let coordinator = MultiShardCoordinator::new(3, 1).unwrap();
        assert_eq!(coordinator.communication_identifier(0), "_0_1");
        assert_eq!(coordinator.communication_identifier(1), "_1");
        assert_eq!(
            coordinator.communication_identifier(METACHAIN_SHARD_ID),
            "_1_META"
        );
    }
}
