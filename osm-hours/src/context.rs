use std::fmt::Debug;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::solar::Coordinates;

/// A pure predicate answering "is this date a holiday?". The same date must
/// always produce the same answer; the engine may query it repeatedly.
pub type HolidayPredicate = Arc<dyn Fn(NaiveDate) -> bool + Send + Sync>;

/// Evaluation context attached to a parsed expression: the holiday oracles
/// and the coordinates used to resolve sunrise / sunset / dawn / dusk.
///
/// Everything is optional. Rules using `PH` or `SH` simply never match
/// without the corresponding oracle, and variable times fall back to the
/// documented default minutes without coordinates.
#[derive(Clone, Default)]
pub struct Context {
    pub(crate) public_holidays: Option<HolidayPredicate>,
    pub(crate) school_holidays: Option<HolidayPredicate>,
    pub(crate) coords: Option<Coordinates>,
}

impl Context {
    /// Attach a public-holiday oracle.
    ///
    /// ```
    /// use chrono::{Datelike, NaiveDate};
    /// use osm_hours::Context;
    ///
    /// let ctx = Context::default()
    ///     .with_public_holidays(|date: NaiveDate| date.month() == 1 && date.day() == 1);
    /// ```
    pub fn with_public_holidays(
        self,
        is_holiday: impl Fn(NaiveDate) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self { public_holidays: Some(Arc::new(is_holiday)), ..self }
    }

    /// Attach a school-holiday oracle.
    pub fn with_school_holidays(
        self,
        is_school_holiday: impl Fn(NaiveDate) -> bool + Send + Sync + 'static,
    ) -> Self {
        Self { school_holidays: Some(Arc::new(is_school_holiday)), ..self }
    }

    /// Attach coordinates for solar-event resolution.
    pub fn with_coords(self, coords: Coordinates) -> Self {
        Self { coords: Some(coords), ..self }
    }

    pub(crate) fn is_public_holiday(&self, date: NaiveDate) -> bool {
        self.public_holidays
            .as_ref()
            .map(|oracle| oracle(date))
            .unwrap_or(false)
    }

    pub(crate) fn is_school_holiday(&self, date: NaiveDate) -> bool {
        self.school_holidays
            .as_ref()
            .map(|oracle| oracle(date))
            .unwrap_or(false)
    }
}

impl Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("public_holidays", &self.public_holidays.is_some())
            .field("school_holidays", &self.school_holidays.is_some())
            .field("coords", &self.coords)
            .finish()
    }
}
