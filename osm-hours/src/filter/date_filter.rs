//! Date-level selector evaluation: does a rule claim a given date, before
//! any time-of-day concern?

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};

use osm_hours_syntax::rules::day as ds;
use osm_hours_syntax::rules::RuleSequence;

use crate::context::Context;
use crate::utils::dates::{easter_sunday, nth_weekday_from_end, nth_weekday_of_month};
use crate::utils::range::WrappingRange;

/// Behaviour of a single selector dimension over dates.
pub trait DateFilter {
    fn filter(&self, date: NaiveDate) -> bool;
}

impl DateFilter for ds::YearRange {
    fn filter(&self, date: NaiveDate) -> bool {
        let Ok(year) = u16::try_from(date.year()) else {
            return false;
        };

        self.range.contains(&year) && (year - self.range.start()) % self.step == 0
    }
}

impl DateFilter for ds::MonthdayRange {
    fn filter(&self, date: NaiveDate) -> bool {
        let month = date.month() as u8;
        let day = date.day() as u8;
        let month_start = *self.months.start() as u8;
        let month_end = *self.months.end() as u8;

        match &self.days {
            None => (month_start..=month_end).wrapping_contains(&month),
            Some(days) => {
                let day_start = *days.range.start();
                let day_end = *days.range.end();

                if month_start == month_end {
                    month == month_start
                        && day >= day_start
                        && day <= day_end
                        && (days.step <= 1 || (day - day_start) % days.step == 0)
                } else {
                    let in_middle = {
                        if month_start < month_end {
                            month > month_start && month < month_end
                        } else {
                            month > month_start || month < month_end
                        }
                    };

                    in_middle
                        || (month == month_start && day >= day_start)
                        || (month == month_end && day <= day_end)
                }
            }
        }
    }
}

impl DateFilter for ds::WeekRange {
    fn filter(&self, date: NaiveDate) -> bool {
        let week = date.iso_week().week() as u8;

        if *self.range.start() == *self.range.end() {
            return week == *self.range.start();
        }

        self.range.contains(&week) && (week - self.range.start()) % self.step == 0
    }
}

impl DateFilter for ds::EasterSelector {
    fn filter(&self, date: NaiveDate) -> bool {
        let easter = easter_sunday(date.year());

        match self.until {
            Some(until) => {
                let start = easter + Duration::days(self.offset.into());
                let end = easter + Duration::days(until.into());
                date >= start && date <= end
            }
            None => date == easter + Duration::days(self.offset.into()),
        }
    }
}

/// Outcome of the ordinal-weekday dimension. When constraints exist they
/// replace the plain weekday bitmap.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum OrdinalState {
    NoConstraints,
    Matched,
    Failed,
}

pub(crate) fn ordinal_state(rule: &RuleSequence, date: NaiveDate) -> OrdinalState {
    let constraints = &rule.day_selector.nth_weekday;

    if constraints.is_empty() {
        return OrdinalState::NoConstraints;
    }

    let weekday = date.weekday();
    let from_start = nth_weekday_of_month(date);
    let from_end = nth_weekday_from_end(date);

    for constraint in constraints {
        if constraint.weekday != weekday {
            continue;
        }

        let matched = {
            if constraint.nth_from > 0 {
                if constraint.nth_to == 0 {
                    from_start == constraint.nth_from
                } else {
                    from_start >= constraint.nth_from && from_start <= constraint.nth_to
                }
            } else if constraint.nth_to == 0 {
                from_end == -constraint.nth_from
            } else {
                from_end >= -constraint.nth_to && from_end <= -constraint.nth_from
            }
        };

        if matched {
            return OrdinalState::Matched;
        }
    }

    OrdinalState::Failed
}

/// All date dimensions of a rule except the ordinal and bitmap weekday
/// checks: year, easter, school holidays, public holidays, month/day and
/// ISO week, with the holiday override semantics.
///
/// `all_rules` is the primary rule list of the same expression; it is needed
/// to keep ordinary rules from matching on dates that a `PH +N day` rule is
/// meant to claim.
pub(crate) fn date_dimensions_match(
    rule: &RuleSequence,
    date: NaiveDate,
    ctx: &Context,
    all_rules: &[RuleSequence],
) -> bool {
    let day = &rule.day_selector;

    if let Some(year) = &day.year {
        if !year.filter(date) {
            return false;
        }
    }

    if let Some(easter) = &day.easter {
        if !easter.filter(date) {
            return false;
        }
    }

    if day.school_holiday {
        // SH rules require a configured oracle answering yes.
        if ctx.school_holidays.is_none() || !ctx.is_school_holiday(date) {
            return false;
        }
    } else if ctx.school_holidays.is_some() && ctx.is_school_holiday(date) {
        // SH rules override ordinary rules on school holidays.
        return false;
    }

    if let Some(offset) = day.public_holiday {
        let Some(is_holiday) = ctx.public_holidays.as_ref() else {
            return false;
        };

        if offset == 0 {
            if !is_holiday(date) {
                return false;
            }
        } else {
            // Offset rules trigger near the holiday, never on it.
            let shifted = date - Duration::days(offset.into());

            if !is_holiday(shifted) || is_holiday(date) {
                return false;
            }
        }
    } else if let Some(is_holiday) = ctx.public_holidays.as_ref() {
        if is_holiday(date) {
            return false;
        }

        if is_offset_holiday_day(date, is_holiday, all_rules) {
            return false;
        }
    }

    if let Some(monthday) = &day.monthday {
        if !monthday.filter(date) {
            return false;
        }
    }

    if !day.week.is_empty() && !day.week.iter().any(|week| week.filter(date)) {
        return false;
    }

    true
}

/// A date claimed by some `PH ±N day` rule of the expression must not be
/// claimed by ordinary weekday rules.
fn is_offset_holiday_day(
    date: NaiveDate,
    is_holiday: &crate::context::HolidayPredicate,
    rules: &[RuleSequence],
) -> bool {
    rules.iter().any(|rule| match rule.day_selector.public_holiday {
        Some(offset) if offset != 0 => {
            is_holiday(date - Duration::days(offset.into())) && !is_holiday(date)
        }
        _ => false,
    })
}

/// Whether a rule's selector claims a whole day, regardless of its time
/// ranges. Time-only rules claim nothing; holiday and easter selectors
/// claim their dates outright.
pub(crate) fn selector_owns_day(rule: &RuleSequence, t: NaiveDateTime, ctx: &Context) -> bool {
    let day = &rule.day_selector;

    if day.is_empty() {
        return false;
    }

    let date = t.date();

    if let Some(year) = &day.year {
        if !year.filter(date) {
            return false;
        }
    }

    if let Some(easter) = &day.easter {
        return easter.filter(date);
    }

    if day.school_holiday {
        return ctx.school_holidays.is_some() && ctx.is_school_holiday(date);
    }

    if day.public_holiday.is_some() {
        return ctx.public_holidays.is_some() && ctx.is_public_holiday(date);
    }

    if let Some(monthday) = &day.monthday {
        if !monthday.filter(date) {
            return false;
        }
    }

    if !day.week.is_empty() && !day.week.iter().any(|week| week.filter(date)) {
        return false;
    }

    if !day.nth_weekday.is_empty() {
        return ordinal_state(rule, date) == OrdinalState::Matched;
    }

    if let Some(set) = day.weekday {
        return set.contains(date.weekday());
    }

    true
}
