use std::{
    collections::BTreeMap,
    fmt::{Display, Formatter, Result},
};

use serde::{Serialize, Serializer, ser::SerializeMap as _};

use crate::{parser::MailboxName, validation::ProblemKind};

/// Mailboxes violating the naming policy, grouped by problem.
///
/// Never holds an empty category; a clean mailbox list has no report at all.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationReport {
    problems: BTreeMap<ProblemKind, Vec<MailboxName>>,
}

impl ValidationReport {
    pub(super) fn from_findings(
        findings: impl IntoIterator<Item = (ProblemKind, Vec<MailboxName>)>,
    ) -> Option<Self> {
        let problems: BTreeMap<_, _> = findings
            .into_iter()
            .filter(|(_, mailboxes)| !mailboxes.is_empty())
            .collect();
        if problems.is_empty() {
            None
        } else {
            Some(Self { problems })
        }
    }

    pub fn get(&self, kind: ProblemKind) -> Option<&[MailboxName]> {
        self.problems.get(&kind).map(Vec::as_slice)
    }

    pub fn kinds(&self) -> impl Iterator<Item = ProblemKind> + '_ {
        self.problems.keys().copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ProblemKind, &[MailboxName])> {
        self.problems
            .iter()
            .map(|(kind, mailboxes)| (*kind, mailboxes.as_slice()))
    }
}

impl Display for ValidationReport {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        for (kind, mailboxes) in self.iter() {
            writeln!(f, "{kind}:")?;
            for mailbox in mailboxes {
                writeln!(f, "  {mailbox:?}")?;
            }
        }
        Ok(())
    }
}

impl Serialize for ValidationReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.problems.len()))?;
        for (kind, mailboxes) in self.iter() {
            map.serialize_entry(&kind.to_string(), mailboxes)?;
        }
        map.end()
    }
}
