use std::path::PathBuf;

use anyhow::bail;
use clap::Parser;

use crate::cli::DEFAULT_CONFIG_FILE;
use crate::config::{
    Configuration, LoggingConfiguration, NodeConfiguration, PoolsConfiguration,
    TrackerConfiguration, DEFAULT_LOG_DIRECTIVES, DEFAULT_MINI_BLOCKS_CAPACITY,
    DEFAULT_NUMBER_OF_SHARDS, DEFAULT_REWARD_TRANSACTIONS_CAPACITY,
    DEFAULT_TRANSACTIONS_CAPACITY, DEFAULT_UNSIGNED_TRANSACTIONS_CAPACITY,
};
use crate::sharding::MultiShardCoordinator;
use crate::track::CrossShardFilter;

#[derive(Debug, Clone, Parser)]
pub struct InitCmd {
    #[clap(long, default_value = DEFAULT_CONFIG_FILE)]
    pub config: PathBuf,
    #[clap(long, default_value_t = 0)]
    pub shard_id: u32,
    #[clap(long, default_value_t = DEFAULT_NUMBER_OF_SHARDS)]
    pub number_of_shards: u32,
    #[clap(long, default_value_t = DEFAULT_TRANSACTIONS_CAPACITY)]
    pub transactions_capacity: usize,
    #[clap(long, default_value_t = DEFAULT_REWARD_TRANSACTIONS_CAPACITY)]
    pub reward_transactions_capacity: usize,
    #[clap(long, default_value_t = DEFAULT_UNSIGNED_TRANSACTIONS_CAPACITY)]
    pub unsigned_transactions_capacity: usize,
    #[clap(long, default_value_t = DEFAULT_MINI_BLOCKS_CAPACITY)]
    pub mini_blocks_capacity: usize,
    #[clap(long, default_value_t = CrossShardFilter::DestinationMe)]
    pub cross_shard_filter: CrossShardFilter,
    #[clap(long, default_value = DEFAULT_LOG_DIRECTIVES)]
    pub log_directives: String,
}

impl InitCmd {
    pub fn execute(self) -> anyhow::Result<()> {
        crate::logging::init();

        if self.config.exists() {
            bail!("Configuration file already exists: {:?}", self.config);
        }
        MultiShardCoordinator::new(self.number_of_shards, self.shard_id)?;

        let configuration = Configuration {
            node: NodeConfiguration {
                shard_id: self.shard_id,
                number_of_shards: self.number_of_shards,
            },
            pools: PoolsConfiguration {
                transactions_capacity: self.transactions_capacity,
                reward_transactions_capacity: self.reward_transactions_capacity,
                unsigned_transactions_capacity: self.unsigned_transactions_capacity,
                mini_blocks_capacity: self.mini_blocks_capacity,
            },
            tracker: TrackerConfiguration {
                cross_shard_filter: self.cross_shard_filter,
            },
            logging: LoggingConfiguration {
                directives: self.log_directives,
            },
        };
        //Fails early on capacities the node would refuse to start with
        crate::pool::DataPool::new(&configuration.pools)?;

        println!("Creating shard node configuration in: {:?}", self.config);
        configuration.try_write(&self.config)?;
        Ok(())
    }
}
