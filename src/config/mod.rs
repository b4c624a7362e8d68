mod endpoint;
mod migration;

use std::{env, fs::create_dir_all, path::PathBuf};

use anyhow::{Context as _, Result};

pub use endpoint::{DestinationConfig, SourceConfig};
pub use migration::{Config, SyncConfig};

fn config_home() -> Result<PathBuf> {
    let mut config_dir = if let Some(config_home) = env::var_os("XDG_CONFIG_HOME") {
        PathBuf::from(config_home)
    } else {
        let mut config_home = PathBuf::from(env::var_os("HOME").context("HOME should be set")?);
        config_home.push(".config");
        config_home
    };
    config_dir.push(env!("CARGO_PKG_NAME"));
    if !config_dir.exists() {
        create_dir_all(&config_dir).with_context(|| {
            format!("config dir {} should be creatable", config_dir.display())
        })?;
    }

    Ok(config_dir)
}
