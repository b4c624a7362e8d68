#[cfg(test)]
pub mod mock_session;

use std::fmt::{Display, Formatter, Result};

use derive_getters::Getters;
use thiserror::Error;

use crate::parser::{MailboxName, ResponseFragment};

/// The IMAP commands the inspection workflow needs from a connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Read-only `SELECT`.
    Examine(MailboxName),
    GetQuotaRoot(MailboxName),
    List,
    Lsub,
    SearchLarger(u64),
    FetchHeaders(Vec<u32>),
}

fn write_quoted(f: &mut Formatter<'_>, mailbox: &MailboxName) -> Result {
    write!(f, "\"")?;
    for c in mailbox.as_str().chars() {
        if c == '"' || c == '\\' {
            write!(f, "\\")?;
        }
        write!(f, "{c}")?;
    }
    write!(f, "\"")
}

impl Display for Command {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Command::Examine(mailbox) => {
                write!(f, "EXAMINE ")?;
                write_quoted(f, mailbox)
            }
            Command::GetQuotaRoot(mailbox) => {
                write!(f, "GETQUOTAROOT ")?;
                write_quoted(f, mailbox)
            }
            Command::List => write!(f, r#"LIST "" "*""#),
            Command::Lsub => write!(f, r#"LSUB "" "*""#),
            Command::SearchLarger(bytes) => write!(f, "SEARCH LARGER {bytes}"),
            Command::FetchHeaders(sequence_numbers) => {
                let sequence_set = sequence_numbers
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",");
                write!(f, "FETCH {sequence_set} RFC822.HEADER")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    No,
    Bad,
}

/// Outcome of one command: the tagged status and the untagged data that came before it.
///
/// Fragments carry the data after the response keyword, e.g. `INBOX (STORAGE 10 20)` for a
/// `* QUOTA INBOX (STORAGE 10 20)` line.
#[derive(Debug, Clone, PartialEq, Eq, Getters)]
pub struct CommandResponse {
    status: Status,
    fragments: Vec<ResponseFragment>,
}

impl CommandResponse {
    pub fn new(status: Status, fragments: Vec<ResponseFragment>) -> Self {
        Self { status, fragments }
    }

    pub fn ok(fragments: Vec<ResponseFragment>) -> Self {
        Self::new(Status::Ok, fragments)
    }

    pub fn no() -> Self {
        Self::new(Status::No, Vec::new())
    }

    pub fn is_ok(&self) -> bool {
        self.status == Status::Ok
    }

    pub fn into_fragments(self) -> Vec<ResponseFragment> {
        self.fragments
    }
}

#[derive(Debug, Error)]
#[error("sending {command} failed: {reason}")]
pub struct TransportError {
    command: String,
    reason: String,
}

impl TransportError {
    pub fn new(command: &Command, reason: impl Into<String>) -> Self {
        Self {
            command: command.to_string(),
            reason: reason.into(),
        }
    }
}

/// An authenticated IMAP connection, owned by the caller and lent to each operation.
pub trait Session {
    fn send(
        &mut self,
        command: &Command,
    ) -> impl Future<Output = std::result::Result<CommandResponse, TransportError>>;
}

#[cfg(test)]
mod tests {
    use rstest::*;

    use super::*;

    #[rstest]
    #[case(Command::Examine(MailboxName::from("Trash/Sent Messages")), r#"EXAMINE "Trash/Sent Messages""#)]
    #[case(Command::Examine(MailboxName::from(r#"foo "quote""#)), r#"EXAMINE "foo \"quote\"""#)]
    #[case(Command::GetQuotaRoot(MailboxName::from("INBOX")), r#"GETQUOTAROOT "INBOX""#)]
    #[case(Command::List, r#"LIST "" "*""#)]
    #[case(Command::Lsub, r#"LSUB "" "*""#)]
    #[case(Command::SearchLarger(1_048_576), "SEARCH LARGER 1048576")]
    #[case(Command::FetchHeaders(vec![3, 5, 8]), "FETCH 3,5,8 RFC822.HEADER")]
    fn test_command_displays_imap_syntax(#[case] command: Command, #[case] expected: &str) {
        assert_eq!(expected, command.to_string());
    }
}
