use std::collections::{HashMap, hash_map::Entry};

use derive_getters::Getters;
use log::{trace, warn};
use nom::{
    IResult,
    bytes::complete::take_while1,
    character::complete::char,
    combinator::rest,
    sequence::separated_pair,
};
use thiserror::Error;

use super::ResponseFragment;

/// The header fields of one message, names exactly as transmitted.
///
/// Every occurrence is kept, but the mapping view (`get`, `iter`, `len`) answers with the last
/// value seen for a name.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct HeaderMap {
    fields: Vec<(String, String)>,
}

impl HeaderMap {
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.fields.push((name.into(), value.into()));
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_all(name).next_back()
    }

    pub fn get_all<'a>(&'a self, name: &str) -> impl DoubleEndedIterator<Item = &'a str> {
        self.fields
            .iter()
            .filter(move |(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.fields.iter().any(|(field, _)| field == name)
    }

    /// Distinct field names in order of first appearance, each with its last value.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        let mut position_of: HashMap<&str, usize> = HashMap::new();
        let mut latest: Vec<(&str, &str)> = Vec::new();
        for (name, value) in &self.fields {
            match position_of.entry(name.as_str()) {
                Entry::Occupied(seen) => latest[*seen.get()].1 = value.as_str(),
                Entry::Vacant(unseen) => {
                    unseen.insert(latest.len());
                    latest.push((name.as_str(), value.as_str()));
                }
            }
        }

        latest.into_iter()
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[derive(Debug, Error, PartialEq, Eq, Getters)]
#[error("malformed header block in {fetch:?} at line {line:?}")]
pub struct MalformedHeaderBlock {
    fetch: String,
    line: String,
}

fn is_field_name_char(input: char) -> bool {
    input.is_ascii_graphic() && input != ':'
}

fn header_field(input: &str) -> IResult<&str, (&str, &str)> {
    separated_pair(take_while1(is_field_name_char), char(':'), rest)(input)
}

fn unfolded(raw_value: &str) -> String {
    raw_value.trim_start().trim_end_matches(['\r', '\n']).to_string()
}

/// Unfolds a header section. On failure the offending line is returned.
fn parse_header_block(block: &str) -> Result<HeaderMap, String> {
    let mut headers = HeaderMap::default();
    let mut current: Option<(&str, String)> = None;

    for line in block.split_inclusive('\n') {
        if line.trim_end_matches(['\r', '\n']).is_empty() {
            break;
        }
        if line.starts_with([' ', '\t']) {
            let Some((_, value)) = current.as_mut() else {
                return Err(line.trim_end_matches(['\r', '\n']).to_string());
            };
            value.push_str(line);
            continue;
        }
        let (_, (name, raw_value)) =
            header_field(line).map_err(|_| line.trim_end_matches(['\r', '\n']).to_string())?;
        if let Some((name, value)) = current.replace((name, raw_value.to_string())) {
            headers.insert(name, unfolded(&value));
        }
    }
    if let Some((name, value)) = current {
        headers.insert(name, unfolded(&value));
    }

    Ok(headers)
}

/// Turns the fragments of a `FETCH ... RFC822.HEADER` response into one header map per message.
///
/// A malformed block only fails its own slot; the other messages are still parsed.
pub fn parse_headers(fragments: &[ResponseFragment]) -> Vec<Result<HeaderMap, MalformedHeaderBlock>> {
    fragments
        .iter()
        .filter(|fragment| !fragment.is_delimiter())
        .map(|fragment| match fragment {
            ResponseFragment::Literal { header, body } => {
                let headers = parse_header_block(&String::from_utf8_lossy(body)).map_err(|line| {
                    warn!("cannot parse header block of {header}");
                    MalformedHeaderBlock {
                        fetch: header.clone(),
                        line,
                    }
                })?;
                trace!("{header}: {} header fields", headers.len());
                Ok(headers)
            }
            ResponseFragment::Line(line) => Err(MalformedHeaderBlock {
                fetch: line.clone(),
                line: line.clone(),
            }),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assertables::*;
    use rstest::*;

    use super::*;

    const HEADER: &str = concat!(
        "Return-Path: <user@dom.tld>\r\n",
        "Received: from murder (server.sub.dom.tld [192.168.122.1])\r\n",
        "\t by server05.mail.dom.tld (Cyrus v2.3.7) with LMTPSA\r\n",
        "\t Thu, 26 May 2011 12:20:56 -0700\r\n",
        "X-Sieve: CMU Sieve 2.3\r\n",
        "Received: from server.sub.dom.tld (server.sub.dom.tld\r\n",
        " [192.168.132.34]) by server.dom.tld (Horde Framework) with HTTP; Thu, 26\r\n",
        " May 2011 12:20:55 -0700\r\n",
        "Message-ID: <20110526122055.97746emge2ucfk7r@server.dom.tld>\r\n",
        "Subject: Test Email\r\n",
        "Content-Type: text/plain;\r\n",
        " charset=ISO-8859-1;\r\n",
        " format=\"flowed\"\r\n",
        "X-Empty:\r\n",
        "\r\n",
    );

    #[fixture]
    fn fetched() -> Vec<ResponseFragment> {
        vec![
            ResponseFragment::literal("121 (RFC822.HEADER {1563}", HEADER),
            ResponseFragment::line(")"),
        ]
    }

    #[rstest]
    fn test_parse_headers_skips_delimiters(fetched: Vec<ResponseFragment>) {
        let parsed = parse_headers(&fetched);
        assert_eq!(1, parsed.len());
    }

    #[rstest]
    fn test_parse_headers_unfolds_continuation_lines(fetched: Vec<ResponseFragment>) {
        let headers = assert_ok!(parse_headers(&fetched).remove(0));

        assert_eq!(
            Some(
                "from server.sub.dom.tld (server.sub.dom.tld\r\n [192.168.132.34]) by server.dom.tld (Horde Framework) with HTTP; Thu, 26\r\n May 2011 12:20:55 -0700"
            ),
            headers.get("Received")
        );
        assert_eq!(
            Some("text/plain;\r\n charset=ISO-8859-1;\r\n format=\"flowed\""),
            headers.get("Content-Type")
        );
        assert_eq!(Some("<user@dom.tld>"), headers.get("Return-Path"));
        assert_eq!(Some(""), headers.get("X-Empty"));
        assert_none!(headers.get("content-type"));
    }

    #[rstest]
    fn test_header_map_keeps_last_value_and_all_occurrences(fetched: Vec<ResponseFragment>) {
        let headers = assert_ok!(parse_headers(&fetched).remove(0));

        let received: Vec<_> = headers.get_all("Received").collect();
        assert_eq!(2, received.len());
        assert_starts_with!(received[0], "from murder");
        assert_eq!(
            vec![
                "Return-Path",
                "Received",
                "X-Sieve",
                "Message-ID",
                "Subject",
                "Content-Type",
                "X-Empty"
            ],
            headers.iter().map(|(name, _)| name).collect::<Vec<_>>()
        );
        assert_eq!(7, headers.len());
    }

    #[rstest]
    fn test_header_map_iter_reports_latest_value_in_first_seen_order() {
        let mut headers = HeaderMap::default();
        headers.insert("Received", "first");
        headers.insert("Subject", "hello");
        headers.insert("Received", "second");
        headers.insert("Received", "third");

        assert_eq!(
            vec![("Received", "third"), ("Subject", "hello")],
            headers.iter().collect::<Vec<_>>()
        );
        assert_eq!(2, headers.len());
        assert!(headers.contains_key("Subject"));
    }

    #[rstest]
    fn test_parse_headers_isolates_malformed_block() {
        let fragments = vec![
            ResponseFragment::literal("1 (RFC822.HEADER {20}", "Subject: one\r\n\r\n"),
            ResponseFragment::line(")"),
            ResponseFragment::literal("2 (RFC822.HEADER {30}", "Subject: two\r\nnot a header\r\n\r\n"),
            ResponseFragment::line(")"),
            ResponseFragment::literal("3 (RFC822.HEADER {20}", "Subject: three\r\n"),
            ResponseFragment::line(")"),
        ];

        let parsed = parse_headers(&fragments);

        assert_eq!(3, parsed.len());
        assert_eq!(Some("one"), assert_ok!(&parsed[0]).get("Subject"));
        let error = assert_err!(&parsed[1]);
        assert_eq!("not a header", error.line());
        assert_eq!("2 (RFC822.HEADER {30}", error.fetch());
        assert_eq!(Some("three"), assert_ok!(&parsed[2]).get("Subject"));
    }

    #[rstest]
    #[case("\tleading continuation\r\n", "\tleading continuation")]
    #[case(": no name\r\n", ": no name")]
    #[case("Bad Name: value\r\n", "Bad Name: value")]
    fn test_parse_header_block_rejects(#[case] block: &str, #[case] offending: &str) {
        assert_eq!(Err(offending.to_string()), parse_header_block(block));
    }

    #[rstest]
    fn test_parse_header_block_unfolds_empty_first_line() {
        let headers = assert_ok!(parse_header_block("Subject:\r\n\tfolded\r\n"));
        assert_eq!(Some("folded"), headers.get("Subject"));
    }

    #[rstest]
    fn test_parse_headers_stops_at_body() {
        let fragments = vec![ResponseFragment::literal(
            "5 (RFC822.HEADER {40}",
            "From: a@b\nTo: c@d\n\nbody: text\n",
        )];

        let headers = assert_ok!(parse_headers(&fragments).remove(0));
        assert_eq!(2, headers.len());
        assert_none!(headers.get("body"));
    }

    #[rstest]
    fn test_parse_headers_rejects_stray_line() {
        let fragments = vec![ResponseFragment::line("* 3 FETCH (FLAGS (\\Seen))")];

        let parsed = parse_headers(&fragments);
        assert_err!(&parsed[0]);
    }
}
