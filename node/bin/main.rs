use clap::Parser;

use shard_node::cli::Cli;

fn main() -> anyhow::Result<()> {
    Cli::parse().execute()
}
