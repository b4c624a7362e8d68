use std::fmt::{Display, Formatter, Result};

use enumflags2::bitflags;

#[bitflags]
#[repr(u8)]
#[derive(Copy, Clone, Debug, Eq, Hash, PartialEq, Ord, PartialOrd)]
// Declaration order is the order categories appear in a report.
pub enum ProblemKind {
    LeadingSpace,
    TrailingSpace,
    MultipleSpaces,
    CaseCollision,
}

impl Display for ProblemKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> Result {
        match self {
            ProblemKind::LeadingSpace => write!(f, "leading space"),
            ProblemKind::TrailingSpace => write!(f, "trailing space"),
            ProblemKind::MultipleSpaces => write!(f, "multiple spaces"),
            ProblemKind::CaseCollision => write!(f, "case collision"),
        }
    }
}
