mod problem_kind;
mod report;

use std::collections::HashMap;

use enumflags2::BitFlags;
use log::trace;

use crate::parser::MailboxName;

pub use problem_kind::ProblemKind;
pub use report::ValidationReport;

/// Naming rules a destination mailbox store enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NamingPolicy {
    separator: char,
}

impl Default for NamingPolicy {
    fn default() -> Self {
        Self { separator: '/' }
    }
}

impl NamingPolicy {
    pub fn with_separator(separator: char) -> Self {
        Self { separator }
    }

    pub fn separator(&self) -> char {
        self.separator
    }

    /// Whitespace problems of a single name. Case collisions depend on the whole set.
    ///
    /// Consecutive spaces only count as [`ProblemKind::MultipleSpaces`] inside the name.
    pub fn problems_of(&self, name: &str) -> BitFlags<ProblemKind> {
        let mut problems = BitFlags::empty();
        if name.is_empty() {
            return problems;
        }

        let separator_then_space = format!("{} ", self.separator);
        let space_then_separator = format!(" {}", self.separator);

        if name.starts_with(' ') || name.contains(&separator_then_space) {
            problems |= ProblemKind::LeadingSpace;
        }
        if name.ends_with(' ') || name.contains(&space_then_separator) {
            problems |= ProblemKind::TrailingSpace;
        }
        // a run of spaces at either end is already a leading or trailing problem
        if name.trim_matches(' ').contains("  ") {
            problems |= ProblemKind::MultipleSpaces;
        }

        problems
    }

    /// Checks every name against the policy. `None` means nothing needs attention.
    pub fn validate<'a, I>(&self, names: I) -> Option<ValidationReport>
    where
        I: IntoIterator<Item = &'a MailboxName>,
    {
        let mut leading_space = Vec::new();
        let mut trailing_space = Vec::new();
        let mut multiple_spaces = Vec::new();
        let mut case_groups: Vec<Vec<MailboxName>> = Vec::new();
        let mut group_of_folded: HashMap<String, usize> = HashMap::new();

        for name in names.into_iter().filter(|name| !name.is_empty()) {
            let problems = self.problems_of(name.as_str());
            if !problems.is_empty() {
                trace!("{name:?}: {problems:?}");
            }
            if problems.contains(ProblemKind::LeadingSpace) {
                leading_space.push(name.clone());
            }
            if problems.contains(ProblemKind::TrailingSpace) {
                trailing_space.push(name.clone());
            }
            if problems.contains(ProblemKind::MultipleSpaces) {
                multiple_spaces.push(name.clone());
            }

            let group = *group_of_folded
                .entry(name.as_str().to_lowercase())
                .or_insert_with(|| {
                    case_groups.push(Vec::new());
                    case_groups.len() - 1
                });
            case_groups[group].push(name.clone());
        }

        let case_collision = case_groups
            .into_iter()
            .filter(|group| group.len() > 1)
            .flatten()
            .collect();

        ValidationReport::from_findings([
            (ProblemKind::LeadingSpace, leading_space),
            (ProblemKind::TrailingSpace, trailing_space),
            (ProblemKind::MultipleSpaces, multiple_spaces),
            (ProblemKind::CaseCollision, case_collision),
        ])
    }
}

/// [`NamingPolicy::validate`] with `/` as hierarchy separator.
pub fn validate<'a, I>(names: I) -> Option<ValidationReport>
where
    I: IntoIterator<Item = &'a MailboxName>,
{
    NamingPolicy::default().validate(names)
}
