mod cli;
mod logging;

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(version, about)]
pub struct Args {
    /// Config file to read instead of `$XDG_CONFIG_HOME/mailmigrate/config.toml`
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    action: Action,
}

#[derive(Subcommand)]
pub enum Action {
    /// Print the synchronization command line that migrates USER
    SyncCommand { user: String },
    /// Report mailbox names the destination would mangle
    ///
    /// FILE holds captured LIST and LSUB response lines. A line ending in `{n}` is followed by
    /// the literal it announces.
    CheckNames {
        file: PathBuf,
        /// Hierarchy separator of the source server
        #[arg(short, long, default_value_t = '/')]
        separator: char,
    },
}

fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(match &args.action {
        Action::SyncCommand { user } => Some(user.as_str()),
        Action::CheckNames { .. } => None,
    });

    cli::run(&args)
}
