use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use anyhow::{Context as _, Result};
use derive_getters::Getters;
use serde::Deserialize;

use crate::config::{
    config_home,
    endpoint::{DestinationConfig, SourceConfig},
};

const DEFAULT_MAX_MESSAGE_SIZE: u64 = 25 * 1024 * 1024;
const DEFAULT_BIG_MESSAGE_THRESHOLD: u64 = DEFAULT_MAX_MESSAGE_SIZE;

fn default_exclude() -> Vec<String> {
    [
        "^Shared Folders",
        "^mail/",
        "^Junk$",
        "^junk$",
        "^JUNK$",
        "^Spam$",
        "^spam$",
        "^SPAM$",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_executable() -> PathBuf {
    PathBuf::from("imapsync")
}

fn default_pid_dir() -> PathBuf {
    std::env::temp_dir()
}

fn default_true() -> bool {
    true
}

fn default_max_message_size() -> u64 {
    DEFAULT_MAX_MESSAGE_SIZE
}

fn default_big_message_threshold() -> u64 {
    DEFAULT_BIG_MESSAGE_THRESHOLD
}

/// How the external synchronization executable is driven.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct SyncConfig {
    #[serde(default = "default_executable")]
    executable: PathBuf,
    #[serde(default = "default_pid_dir")]
    pid_dir: PathBuf,
    #[serde(default = "default_true")]
    dry_run: bool,
    #[serde(default = "default_max_message_size")]
    max_message_size: u64,
    #[serde(default = "default_exclude")]
    exclude: Vec<String>,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            executable: default_executable(),
            pid_dir: default_pid_dir(),
            dry_run: default_true(),
            max_message_size: default_max_message_size(),
            exclude: default_exclude(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Getters)]
pub struct Config {
    source: SourceConfig,
    destination: DestinationConfig,
    #[serde(default)]
    sync: SyncConfig,
    #[serde(default = "default_big_message_threshold")]
    big_message_threshold: u64,
}

impl Config {
    pub fn load_from_file(file: Option<&Path>) -> Result<Self> {
        let config_file = match file {
            Some(file) => file.to_path_buf(),
            None => default_location()?,
        };
        let contents = read_to_string(&config_file)
            .with_context(|| format!("config file {} should be readable", config_file.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("config file {} should be parseable", config_file.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }
}

fn default_location() -> Result<PathBuf> {
    let mut config_file = config_home()?;
    config_file.push("config.toml");

    Ok(config_file)
}
