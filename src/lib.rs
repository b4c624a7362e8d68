pub mod config;
pub mod inspect;
pub mod parser;
pub mod session;
pub mod sync_command;
pub mod validation;
