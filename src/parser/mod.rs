mod header;
mod mailbox_list;
mod quota;
mod search;

use std::fmt::{Display, Formatter, Result};

use nom::{
    IResult,
    bytes::complete::{escaped_transform, take_while1},
    character::complete::{char, digit1, one_of},
    combinator::{map, map_res, opt},
    sequence::delimited,
};

pub use header::HeaderMap;
pub use header::MalformedHeaderBlock;
pub use header::parse_headers;
pub use mailbox_list::MailboxListError;
pub use mailbox_list::MailboxName;
pub use mailbox_list::MailboxNameSet;
pub use mailbox_list::parse_mailbox_list;
pub use quota::MalformedQuotaResponse;
pub use quota::QuotaReading;
pub use quota::parse_quota;
pub use search::MalformedSearchResponse;
pub use search::parse_search;

/// One piece of an untagged IMAP response as handed over by the transport.
///
/// The transport decides the shape once: a plain line, or a line announcing a `{n}` literal
/// together with the raw bytes that followed it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResponseFragment {
    Line(String),
    Literal { header: String, body: Vec<u8> },
}

impl ResponseFragment {
    pub fn line(text: impl Into<String>) -> Self {
        Self::Line(text.into())
    }

    pub fn literal(header: impl Into<String>, body: impl Into<Vec<u8>>) -> Self {
        Self::Literal {
            header: header.into(),
            body: body.into(),
        }
    }

    /// The bare `)` closing a FETCH item that carried a literal.
    pub fn is_delimiter(&self) -> bool {
        matches!(self, Self::Line(line) if line.trim() == ")")
    }
}

impl Display for ResponseFragment {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            Self::Line(line) => write!(f, "{line}"),
            Self::Literal { header, body } => {
                write!(f, "{header} {}", String::from_utf8_lossy(body))
            }
        }
    }
}

fn is_list_wildcard(input: char) -> bool {
    input == '%' || input == '*'
}

const QUOTED_SPECIALS: &str = "\"\\";
fn is_quoted_special(input: char) -> bool {
    QUOTED_SPECIALS.contains(input)
}

fn is_resp_special(input: char) -> bool {
    input == ']'
}

// technically CTL is missing here
fn is_atom_special(input: char) -> bool {
    input == '('
        || input == ')'
        || input == '{'
        || input == ' '
        || input == '\t'
        || is_list_wildcard(input)
        || is_quoted_special(input)
        || is_resp_special(input)
}

fn is_atom_char(input: char) -> bool {
    !is_atom_special(input)
}

fn is_text_char(input: char) -> bool {
    input != '\n' && input != '\r'
}

fn is_quoted_char(input: char) -> bool {
    is_text_char(input) && !is_quoted_special(input)
}

fn atom(input: &str) -> IResult<&str, &str> {
    take_while1(is_atom_char)(input)
}

/// A quoted string with its escapes resolved.
fn quoted(input: &str) -> IResult<&str, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(
                take_while1(is_quoted_char),
                '\\',
                one_of(QUOTED_SPECIALS),
            )),
            Option::unwrap_or_default,
        ),
        char('"'),
    )(input)
}

fn number(input: &str) -> IResult<&str, u64> {
    map_res(digit1, str::parse::<u64>)(input)
}
