use anyhow::{Context as _, Result};
use log::{info, warn};
use mailmigrate::{config::Config, sync_command::SyncCommand};

pub fn print_sync_command(config: &Config, user: &str) -> Result<()> {
    let command = SyncCommand::for_user(config, user)
        .with_context(|| format!("sync command for {user} should be buildable"))?;
    if command.dry_run() {
        info!("dry run, the destination will not be modified");
    } else {
        warn!("destination folders missing on the source will be deleted");
    }
    println!("{command}");

    Ok(())
}
