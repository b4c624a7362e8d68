use std::{
    borrow::{Borrow, Cow},
    collections::BTreeSet,
    fmt::{Display, Formatter},
};

use log::trace;
use nom::{
    IResult,
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, none_of, one_of, space0},
    combinator::{all_consuming, map, recognize},
    multi::many0,
    sequence::{delimited, preceded, terminated, tuple},
};
use serde::Serialize;
use thiserror::Error;

use super::{QUOTED_SPECIALS, ResponseFragment, atom, is_text_char, quoted};

/// A mailbox path exactly as the server names it, without protocol quoting.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct MailboxName(String);

impl MailboxName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for MailboxName {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for MailboxName {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for MailboxName {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl AsRef<str> for MailboxName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Borrow<str> for MailboxName {
    fn borrow(&self) -> &str {
        &self.0
    }
}

pub type MailboxNameSet = BTreeSet<MailboxName>;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MailboxListError {
    /// A text entry that is neither a LIST line nor the empty entry.
    #[error("cannot parse mailbox list entry {entry:?}")]
    Malformed { entry: String },
    /// An entry of a shape a LIST response never has.
    #[error("unrecognized mailbox list entry {entry:?}")]
    Unrecognized { entry: String },
}

#[derive(Debug, PartialEq)]
struct ListEntry<'a> {
    attributes: Vec<&'a str>,
    separator: char,
    name: Cow<'a, str>,
}

fn mailbox_attribute(input: &str) -> IResult<&str, &str> {
    recognize(preceded(char('\\'), atom))(input)
}

fn mailbox_attributes(input: &str) -> IResult<&str, Vec<&str>> {
    delimited(
        terminated(char('('), space0),
        many0(terminated(mailbox_attribute, space0)),
        char(')'),
    )(input)
}

fn separator(input: &str) -> IResult<&str, char> {
    delimited(
        char('"'),
        alt((preceded(char('\\'), one_of(QUOTED_SPECIALS)), none_of(QUOTED_SPECIALS))),
        char('"'),
    )(input)
}

/// A quoted name loses its quotes and escapes, anything else is kept as sent.
fn canonical_name(raw: &str) -> Cow<'_, str> {
    match all_consuming(terminated(quoted, space0))(raw) {
        Ok((_, unquoted)) => Cow::Owned(unquoted),
        Err(_) => Cow::Borrowed(raw),
    }
}

fn list_entry(input: &str) -> IResult<&str, ListEntry<'_>> {
    map(
        tuple((
            preceded(space0, mailbox_attributes),
            preceded(space0, separator),
            preceded(space0, take_while1(is_text_char)),
        )),
        |(attributes, separator, name)| ListEntry {
            attributes,
            separator,
            name: canonical_name(name),
        },
    )(input)
}

fn mailbox_name(fragment: &ResponseFragment) -> Result<MailboxName, MailboxListError> {
    match fragment {
        ResponseFragment::Literal { header, body } => String::from_utf8(body.clone())
            .map(MailboxName::from)
            .map_err(|_| {
                trace!("literal after {header:?} is not valid UTF-8");
                MailboxListError::Unrecognized {
                    entry: fragment.to_string(),
                }
            }),
        ResponseFragment::Line(line) => match list_entry(line) {
            Ok((_, entry)) => {
                trace!(
                    "mailbox {:?} separator {:?} attributes {:?}",
                    entry.name, entry.separator, entry.attributes
                );
                Ok(MailboxName::from(entry.name.into_owned()))
            }
            Err(_) if line.is_empty() => Ok(MailboxName::default()),
            Err(_) => Err(MailboxListError::Malformed {
                entry: line.clone(),
            }),
        },
    }
}

/// Collapses the entries of one or more `LIST`/`LSUB` responses into the set of mailbox names.
///
/// Either every entry is understood or the whole call fails with the first offending entry.
pub fn parse_mailbox_list<'a, I>(fragments: I) -> Result<MailboxNameSet, MailboxListError>
where
    I: IntoIterator<Item = &'a ResponseFragment>,
{
    fragments.into_iter().map(mailbox_name).collect()
}
