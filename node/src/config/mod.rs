//! # Node configuration
//!
//! Loaded from a TOML file:
//!
//! ```toml
//! [node]
//! shard_id = 0
//! number_of_shards = 3
//!
//! [pools]
//! transactions_capacity = 100000
//! reward_transactions_capacity = 25000
//! unsigned_transactions_capacity = 50000
//! mini_blocks_capacity = 300
//!
//! [tracker]
//! cross_shard_filter = "destination_me"
//!
//! [logging]
//! directives = "info"
//! ```

use std::io::Write;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::track::CrossShardFilter;

//pool settings, capacities are per partition
pub const DEFAULT_TRANSACTIONS_CAPACITY: usize = 100_000;
pub const DEFAULT_REWARD_TRANSACTIONS_CAPACITY: usize = 25_000;
pub const DEFAULT_UNSIGNED_TRANSACTIONS_CAPACITY: usize = 50_000;
pub const DEFAULT_MINI_BLOCKS_CAPACITY: usize = 300;

//sharding settings
pub const DEFAULT_NUMBER_OF_SHARDS: u32 = 3;

pub const DEFAULT_LOG_DIRECTIVES: &str = "info";

#[derive(Error, Debug)]
pub enum ConfigurationError {
    #[error("ParsingFailed: {0}")]
    ParsingFailed(#[from] config::ConfigError),
    #[error("TomlError: {0}")]
    TomlError(#[from] toml::ser::Error),
    #[error("IoError: {0}")]
    IoError(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, ConfigurationError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub node: NodeConfiguration,
    pub pools: PoolsConfiguration,
    pub tracker: TrackerConfiguration,
    pub logging: LoggingConfiguration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeConfiguration {
    /// Shard this node belongs to. The metachain is `4294967295`.
    pub shard_id: u32,
    pub number_of_shards: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolsConfiguration {
    pub transactions_capacity: usize,
    pub reward_transactions_capacity: usize,
    pub unsigned_transactions_capacity: usize,
    pub mini_blocks_capacity: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackerConfiguration {
    pub cross_shard_filter: CrossShardFilter,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfiguration {
    /// `RUST_LOG` style directives, the environment variable takes precedence.
    pub directives: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            node: NodeConfiguration {
                shard_id: 0,
                number_of_shards: DEFAULT_NUMBER_OF_SHARDS,
            },
            pools: PoolsConfiguration::default(),
            tracker: TrackerConfiguration {
                cross_shard_filter: CrossShardFilter::default(),
            },
            logging: LoggingConfiguration {
                directives: DEFAULT_LOG_DIRECTIVES.to_string(),
            },
        }
    }
}

impl Default for PoolsConfiguration {
    fn default() -> Self {
        Self {
            transactions_capacity: DEFAULT_TRANSACTIONS_CAPACITY,
            reward_transactions_capacity: DEFAULT_REWARD_TRANSACTIONS_CAPACITY,
            unsigned_transactions_capacity: DEFAULT_UNSIGNED_TRANSACTIONS_CAPACITY,
            mini_blocks_capacity: DEFAULT_MINI_BLOCKS_CAPACITY,
        }
    }
}

impl Configuration {
    pub fn try_load<I: Into<PathBuf>>(path: I) -> Result<Configuration> {
        let path = path.into();
        let config = config::Config::builder()
            .add_source(config::File::from(path))
            .build()?;

        config.try_deserialize().map_err(|err| err.into())
    }

    pub fn try_write<I: Into<PathBuf>>(&self, path: I) -> Result<()> {
        let config = toml::to_string(&self)?;

        let config = format!("#This file is generated by shard-node cli\n{config}",);

        let mut file = std::fs::File::create(path.into())?;
        file.write_all(config.as_bytes())?;

        Ok(())
    }
}
