mod check_names;
mod sync_command;

use anyhow::Result;
use mailmigrate::config::Config;

use crate::{
    Action, Args,
    cli::{check_names::check_names, sync_command::print_sync_command},
};

pub fn run(args: &Args) -> Result<()> {
    match &args.action {
        Action::SyncCommand { user } => {
            let config = Config::load_from_file(args.config.as_deref())?;
            print_sync_command(&config, user)
        }
        Action::CheckNames { file, separator } => check_names(file, *separator),
    }
}
