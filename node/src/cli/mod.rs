use clap::Parser;

pub mod init;
pub mod replay;

pub const DEFAULT_CONFIG_FILE: &str = "shard-node.toml";

#[derive(Parser, Debug, Clone)]
#[command()]
pub struct Cli {
    #[command(subcommand)]
    pub subcommand: Subcommand,
}

#[derive(Clone, Debug, clap::Subcommand)]
pub enum Subcommand {
    Init(init::InitCmd),
    Replay(replay::ReplayCmd),
}

impl Cli {
    pub fn execute(self) -> anyhow::Result<()> {
        match self.subcommand {
            Subcommand::Init(init) => init.execute(),
            Subcommand::Replay(replay) => replay.execute(),
        }
    }
}
