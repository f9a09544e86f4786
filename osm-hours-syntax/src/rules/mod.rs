pub mod day;
pub mod time;

use std::fmt::Display;
use std::sync::Arc;

// OpeningHoursExpression

/// A whole parsed expression: the primary rule list, the fallback groups
/// introduced by `||`, and the non-fatal findings collected while parsing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OpeningHoursExpression {
    pub rules: Vec<RuleSequence>,
    pub fallback_groups: Vec<Vec<RuleSequence>>,
    pub warnings: Vec<Warning>,
}

// RuleSequence

/// A single rule: a day-level selector, a time-of-day schedule and a
/// modifier. `group` ties together rules that were split from one
/// comma-separated expression (0 = not grouped).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RuleSequence {
    pub day_selector: day::DaySelector,
    pub time_selector: time::TimeSelector,
    pub kind: RuleKind,
    pub comment: Option<Arc<str>>,
    pub group: u32,
}

impl RuleSequence {
    /// A rule with no selector dimensions and no time ranges applies to
    /// every instant; it only expresses its modifier.
    pub fn is_universal(&self) -> bool {
        self.day_selector.is_empty() && self.time_selector.time.is_empty()
    }
}

// RuleKind

#[derive(Copy, Clone, Debug, Default, Hash, Eq, Ord, PartialEq, PartialOrd)]
pub enum RuleKind {
    #[default]
    Open,
    Closed,
    Unknown,
}

impl RuleKind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for RuleKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// Warning

/// Non-fatal finding about an input that still parsed successfully.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub enum Warning {
    AbbreviatedTimeFormat,
    EmptyComment,
    RedundantTwentyFourSeven,
    OverlappingTimeRanges,
}

impl Display for Warning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AbbreviatedTimeFormat => {
                write!(f, "Abbreviated time format: use HH:MM instead of H")
            }
            Self::EmptyComment => write!(f, "Empty comment"),
            Self::RedundantTwentyFourSeven => {
                write!(f, "Redundant 24/7: additional rules override parts of 24/7")
            }
            Self::OverlappingTimeRanges => write!(f, "Overlapping time ranges detected"),
        }
    }
}
