use std::collections::BTreeMap;

use derive_getters::Getters;
use log::{debug, info, warn};
use serde::Serialize;
use thiserror::Error;

use crate::{
    config::Config,
    parser::{
        HeaderMap, MailboxListError, MailboxName, MalformedHeaderBlock, MalformedQuotaResponse,
        MalformedSearchResponse, QuotaReading, ResponseFragment, parse_headers,
        parse_mailbox_list, parse_quota, parse_search,
    },
    session::{Command, Session, Status, TransportError},
    validation::{NamingPolicy, ValidationReport},
};

const QUOTA_ROOT_MAILBOX: &str = "INBOX";

#[derive(Debug, Error)]
pub enum InspectError {
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("server answered {command} with {status:?}")]
    Refused { command: String, status: Status },
    #[error(transparent)]
    Quota(#[from] MalformedQuotaResponse),
    #[error(transparent)]
    MailboxList(#[from] MailboxListError),
    #[error(transparent)]
    Search(#[from] MalformedSearchResponse),
}

/// Everything an operator needs to judge one user's mailbox store.
#[derive(Debug, Clone, PartialEq, Getters, Serialize)]
pub struct UserReport {
    quota: QuotaReading,
    mailboxes: Vec<MailboxName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    problems: Option<ValidationReport>,
}

/// Headers of oversized messages per mailbox, and the mailboxes that could not be scanned.
#[derive(Debug, Default, Getters)]
pub struct BigMessageScan {
    found: BTreeMap<MailboxName, Vec<Result<HeaderMap, MalformedHeaderBlock>>>,
    failures: BTreeMap<MailboxName, InspectError>,
}

async fn send_expecting_ok<S: Session>(
    session: &mut S,
    command: Command,
) -> Result<Vec<ResponseFragment>, InspectError> {
    debug!("{command}");
    let response = session.send(&command).await?;
    if response.is_ok() {
        Ok(response.into_fragments())
    } else {
        Err(InspectError::Refused {
            command: command.to_string(),
            status: *response.status(),
        })
    }
}

fn lines(fragments: &[ResponseFragment]) -> Vec<String> {
    fragments.iter().map(ToString::to_string).collect()
}

/// Storage used and allowed on the user's INBOX quota root.
pub async fn quota_stat<S: Session>(session: &mut S) -> Result<QuotaReading, InspectError> {
    let fragments = send_expecting_ok(
        session,
        Command::GetQuotaRoot(MailboxName::from(QUOTA_ROOT_MAILBOX)),
    )
    .await?;

    Ok(parse_quota(&lines(&fragments))?)
}

/// Whether the server lets the mailbox be opened read-only.
pub async fn is_selectable<S: Session>(
    session: &mut S,
    mailbox: &MailboxName,
) -> Result<bool, TransportError> {
    let response = session.send(&Command::Examine(mailbox.clone())).await?;

    Ok(response.is_ok())
}

/// All listed or subscribed mailboxes that can actually be opened, sorted by name.
pub async fn mailbox_list<S: Session>(session: &mut S) -> Result<Vec<MailboxName>, InspectError> {
    let listed = send_expecting_ok(session, Command::List).await?;
    let subscribed = send_expecting_ok(session, Command::Lsub).await?;
    let mailboxes = parse_mailbox_list(listed.iter().chain(&subscribed))?;

    let mut selectable = Vec::with_capacity(mailboxes.len());
    for mailbox in mailboxes {
        if is_selectable(session, &mailbox).await? {
            selectable.push(mailbox);
        } else {
            debug!("skipping mailbox {mailbox:?} which cannot be selected");
        }
    }

    Ok(selectable)
}

pub async fn user_stat<S: Session>(
    session: &mut S,
    policy: &NamingPolicy,
) -> Result<UserReport, InspectError> {
    let quota = quota_stat(session).await?;
    let mailboxes = mailbox_list(session).await?;
    let problems = policy.validate(&mailboxes);
    if let Some(problems) = &problems {
        info!("mailbox names need attention:\n{problems}");
    }

    Ok(UserReport {
        quota,
        mailboxes,
        problems,
    })
}

async fn scan_mailbox<S: Session>(
    session: &mut S,
    mailbox: &MailboxName,
    lower_bound: u64,
) -> Result<Vec<Result<HeaderMap, MalformedHeaderBlock>>, InspectError> {
    send_expecting_ok(session, Command::Examine(mailbox.clone())).await?;
    let hits = send_expecting_ok(session, Command::SearchLarger(lower_bound)).await?;
    let sequence_numbers = parse_search(&lines(&hits))?;
    if sequence_numbers.is_empty() {
        return Ok(Vec::new());
    }
    let fetched = send_expecting_ok(session, Command::FetchHeaders(sequence_numbers)).await?;

    Ok(parse_headers(&fetched))
}

/// Collects the headers of every message larger than `lower_bound` bytes.
///
/// A mailbox that fails is recorded in the failures and the scan moves on.
pub async fn big_messages<S: Session>(
    session: &mut S,
    mailboxes: &[MailboxName],
    lower_bound: u64,
) -> BigMessageScan {
    let mut scan = BigMessageScan::default();
    for mailbox in mailboxes {
        match scan_mailbox(session, mailbox, lower_bound).await {
            Ok(headers) if headers.is_empty() => {}
            Ok(headers) => {
                scan.found.insert(mailbox.clone(), headers);
            }
            Err(error) => {
                warn!("error processing mailbox {mailbox:?}: {error}");
                scan.failures.insert(mailbox.clone(), error);
            }
        }
    }

    scan
}

/// [`big_messages`] with the configured threshold as lower bound.
pub async fn big_messages_for<S: Session>(
    config: &Config,
    session: &mut S,
    mailboxes: &[MailboxName],
) -> BigMessageScan {
    big_messages(session, mailboxes, config.big_message_threshold()).await
}
