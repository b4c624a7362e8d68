use std::{fs::read_to_string, path::Path};

use anyhow::{Context as _, Result};
use log::{debug, info};
use mailmigrate::{
    parser::{MailboxName, ResponseFragment, parse_mailbox_list},
    validation::{NamingPolicy, ValidationReport},
};
use serde::Serialize;

#[derive(Serialize)]
struct NameCheck {
    mailboxes: Vec<MailboxName>,
    #[serde(skip_serializing_if = "Option::is_none")]
    problems: Option<ValidationReport>,
}

fn literal_length(line: &str) -> Option<usize> {
    let (_, length) = line.strip_suffix('}')?.rsplit_once('{')?;
    length.parse().ok()
}

/// Rebuilds transport fragments from a capture with one response line per text line.
fn captured_fragments(contents: &str) -> Vec<ResponseFragment> {
    let mut lines = contents.lines();
    let mut fragments = Vec::new();
    while let Some(line) = lines.next() {
        match literal_length(line) {
            Some(length) => {
                let body = lines.next().unwrap_or_default();
                let body: Vec<u8> = body.bytes().take(length).collect();
                fragments.push(ResponseFragment::literal(line, body));
            }
            None => fragments.push(ResponseFragment::line(line)),
        }
    }

    fragments
}

pub fn check_names(file: &Path, separator: char) -> Result<()> {
    let contents = read_to_string(file)
        .with_context(|| format!("capture {} should be readable", file.display()))?;
    let fragments = captured_fragments(&contents);
    debug!("read {} response fragments", fragments.len());

    let mailboxes = parse_mailbox_list(&fragments)
        .with_context(|| format!("capture {} should hold LIST or LSUB lines", file.display()))?;
    let problems = NamingPolicy::with_separator(separator).validate(&mailboxes);
    if problems.is_none() {
        info!("all {} mailbox names are fine", mailboxes.len());
    }
    let check = NameCheck {
        mailboxes: mailboxes.into_iter().collect(),
        problems,
    };
    print!("{}", toml::to_string(&check)?);

    Ok(())
}
