//! Time-of-day evaluation for a rule whose date selector already matched.
//! Handles variable endpoints, extended hours (`25:00`), midnight-spanning
//! ranges and periodic open/closed slots.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike};

use osm_hours_syntax::rules::time::{Time, TimeSpan};
use osm_hours_syntax::rules::RuleSequence;

use crate::context::Context;
use crate::solar;

/// Resolve an endpoint to a minute of day. Fixed times keep their raw value
/// (possibly beyond 1440 for extended hours); variable times resolve against
/// the solar oracle and wrap their offset into `0..1440`.
pub(crate) fn resolve_time(time: &Time, date: NaiveDate, ctx: &Context) -> i32 {
    match time {
        Time::Fixed(fixed) => fixed.mins_from_midnight() as i32,
        Time::Variable(variable) => {
            let base = solar::event_minutes(variable.event, date, ctx.coords);
            (base + i32::from(variable.offset)).rem_euclid(24 * 60)
        }
    }
}

/// Fixed start and end minutes of a span, when both endpoints are fixed.
pub(crate) fn fixed_bounds(span: &TimeSpan) -> Option<(i32, i32)> {
    match (&span.range.start, &span.range.end) {
        (Time::Fixed(start), Time::Fixed(end)) => Some((
            start.mins_from_midnight() as i32,
            end.mins_from_midnight() as i32,
        )),
        _ => None,
    }
}

/// Check the rule's schedule against the instant's minute of day.
///
/// `constraint_matched` reports that an ordinal weekday constraint already
/// claimed the day; the plain weekday bitmap is then ignored.
pub(crate) fn time_matches(
    rule: &RuleSequence,
    t: NaiveDateTime,
    ctx: &Context,
    constraint_matched: bool,
) -> bool {
    let minute = (t.hour() * 60 + t.minute()) as i32;
    let date = t.date();
    let weekday = t.weekday().num_days_from_sunday() as u8;
    let prev_weekday = (weekday + 6) % 7;

    for span in &rule.time_selector.time {
        let start = resolve_time(&span.range.start, date, ctx);
        let mut end = resolve_time(&span.range.end, date, ctx);

        let mut spans_midnight = end <= start;

        // Extended hours: 25:00 means 01:00 the next day.
        if end > 24 * 60 {
            end -= 24 * 60;
            spans_midnight = true;
        }

        if spans_midnight {
            match rule.day_selector.weekday {
                Some(set) if !constraint_matched => {
                    // Open either late on a listed day, or in the small
                    // hours of the day after a listed day.
                    if set.contains_index(weekday) && minute >= start {
                        return true;
                    }

                    if set.contains_index(prev_weekday) && minute < end {
                        return true;
                    }
                }
                _ => {
                    if minute >= start || minute < end {
                        return true;
                    }
                }
            }
        } else {
            if !constraint_matched {
                if let Some(set) = rule.day_selector.weekday {
                    if !set.contains_index(weekday) {
                        continue;
                    }
                }
            }

            if minute >= start && minute < end {
                match span.repeats {
                    Some(interval) => {
                        // Even slots are open, odd slots are closed gaps.
                        let slot = (minute - start) / i32::from(interval);

                        if slot % 2 == 0 {
                            return true;
                        }
                    }
                    None => return true,
                }
            }
        }
    }

    false
}
