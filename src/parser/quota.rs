use std::borrow::Cow;

use derive_getters::Getters;
use log::{debug, trace};
use nom::{
    IResult,
    branch::alt,
    character::complete::{char, multispace0},
    combinator::map,
    multi::many0,
    sequence::{preceded, tuple},
};
use serde::Serialize;
use thiserror::Error;

use super::{atom, number, quoted};

/// Storage consumed and allowed for a quota root, in the units the server reports.
///
/// `(0, 0)` means the server has no quota configured for the root.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Getters, Serialize)]
pub struct QuotaReading {
    used: u64,
    limit: u64,
}

impl QuotaReading {
    pub fn new(used: u64, limit: u64) -> Self {
        Self { used, limit }
    }

    #[expect(clippy::cast_precision_loss)]
    pub fn usage_ratio(&self) -> Option<f64> {
        if self.limit == 0 {
            None
        } else {
            Some(self.used as f64 / self.limit as f64)
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq, Getters)]
#[error("malformed quota response {line:?}")]
pub struct MalformedQuotaResponse {
    line: String,
}

#[derive(Debug, PartialEq)]
struct QuotaResource<'a> {
    name: &'a str,
    used: u64,
    limit: u64,
}

#[derive(Debug, PartialEq)]
struct QuotaRoot<'a> {
    name: Cow<'a, str>,
    resources: Vec<QuotaResource<'a>>,
}

fn root_name(input: &str) -> IResult<&str, Cow<'_, str>> {
    alt((map(quoted, Cow::Owned), map(atom, Cow::Borrowed)))(input)
}

fn quota_resource(input: &str) -> IResult<&str, QuotaResource<'_>> {
    map(
        tuple((
            preceded(multispace0, atom),
            preceded(multispace0, number),
            preceded(multispace0, number),
        )),
        |(name, used, limit)| QuotaResource { name, used, limit },
    )(input)
}

fn quota_root(input: &str) -> IResult<&str, QuotaRoot<'_>> {
    map(
        tuple((
            preceded(multispace0, root_name),
            preceded(multispace0, char('(')),
            many0(quota_resource),
            preceded(multispace0, char(')')),
        )),
        |(name, _, resources, _)| QuotaRoot { name, resources },
    )(input)
}

/// Reads the untagged lines of a `GETQUOTAROOT` response.
///
/// The first line names the quota root and is not needed. The second line has the form
/// `ROOT (RESOURCE USED LIMIT ...)`; only the first resource is reported.
pub fn parse_quota<S: AsRef<str>>(lines: &[S]) -> Result<QuotaReading, MalformedQuotaResponse> {
    let Some(line) = lines.get(1) else {
        debug!("no QUOTA data in response, assuming no quota is configured");
        return Ok(QuotaReading::default());
    };
    let line = line.as_ref();
    let (rest, root) = quota_root(line).map_err(|_| MalformedQuotaResponse {
        line: line.to_string(),
    })?;
    trace!("{root:?}");
    if !rest.trim().is_empty() {
        trace!("ignoring trailing quota data {rest:?}");
    }

    Ok(root
        .resources
        .first()
        .map_or_else(QuotaReading::default, |resource| {
            debug!(
                "quota root {} {} {}/{}",
                root.name, resource.name, resource.used, resource.limit
            );
            QuotaReading::new(resource.used, resource.limit)
        }))
}
