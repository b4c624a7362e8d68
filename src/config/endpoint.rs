use std::path::PathBuf;

use derive_getters::Getters;
use serde::Deserialize;

const IMAPS_PORT: u16 = 993;

fn imaps_port() -> u16 {
    IMAPS_PORT
}

fn hierarchy_separator() -> char {
    '/'
}

/// The server mailboxes are migrated away from. Logged into with an admin account on behalf of
/// each user.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct SourceConfig {
    host: String,
    #[serde(default = "imaps_port")]
    port: u16,
    admin_user: String,
    pass_file: PathBuf,
    #[serde(default = "hierarchy_separator")]
    separator: char,
}

/// The server mailboxes are migrated to. Users are addressed as `user@domain`.
#[derive(Debug, Clone, Deserialize, Getters)]
pub struct DestinationConfig {
    host: String,
    #[serde(default = "imaps_port")]
    port: u16,
    domain: String,
    pass_file: PathBuf,
}

impl DestinationConfig {
    pub fn address_of(&self, user: &str) -> String {
        format!("{user}@{}", self.domain)
    }
}
