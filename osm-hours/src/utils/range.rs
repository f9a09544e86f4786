use std::ops::{Range, RangeInclusive};
use std::sync::Arc;

use chrono::NaiveDateTime;

/// A contiguous span of time during which the state and comment are
/// constant. Produced by [`crate::OpeningHours::open_intervals`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DateTimeRange {
    pub range: Range<NaiveDateTime>,
    /// The span is "unknown" rather than plainly open.
    pub unknown: bool,
    pub comment: Option<Arc<str>>,
}

/// Inclusive range membership with wrap-around semantics: when the start
/// comes after the end the range crosses its domain boundary (`Nov-Feb`,
/// `Sa-Mo`).
pub(crate) trait WrappingRange<T> {
    fn wrapping_contains(&self, value: &T) -> bool;
}

impl<T: PartialOrd> WrappingRange<T> for RangeInclusive<T> {
    fn wrapping_contains(&self, value: &T) -> bool {
        if self.start() <= self.end() {
            self.start() <= value && value <= self.end()
        } else {
            self.start() <= value || value <= self.end()
        }
    }
}
