//! Canonical re-serialisation. The output is a single deterministic form:
//! `HH:MM` times, two-letter weekday abbreviations, `Mo-Fr` style ranges for
//! runs of four or more days, `24/7` for "always open" and `off` for
//! "always closed". It is not meant to reproduce the user's lexical input,
//! only to parse back to a semantically equal value.

use std::fmt::{self, Display, Formatter};

use crate::extended_time::ExtendedTime;
use crate::rules::day::{DaySelector, EasterSelector, MonthdayRange, WeekdaySet, YearRange};
use crate::rules::time::{Time, TimeSpan};
use crate::rules::{OpeningHoursExpression, RuleKind, RuleSequence};

impl Display for OpeningHoursExpression {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.fallback_groups.is_empty() && self.rules.len() == 1 {
            let rule = &self.rules[0];

            if rule.is_universal() && rule.comment.is_none() {
                match rule.kind {
                    RuleKind::Open => return write!(f, "24/7"),
                    RuleKind::Closed => return write!(f, "off"),
                    RuleKind::Unknown => {}
                }
            }

            if rule.kind == RuleKind::Open && rule.comment.is_none() && is_whole_day(rule) {
                return write!(f, "24/7");
            }
        }

        write_rules_seq(f, &self.rules)?;

        for group in &self.fallback_groups {
            write!(f, " || ")?;
            write_rules_seq(f, group)?;
        }

        Ok(())
    }
}

/// `00:00-24:00` with no day constraint is just a wordy `24/7`.
fn is_whole_day(rule: &RuleSequence) -> bool {
    rule.day_selector.is_empty()
        && matches!(
            rule.time_selector.time.as_slice(),
            [TimeSpan {
                range: std::ops::Range {
                    start: Time::Fixed(start),
                    end: Time::Fixed(end),
                },
                open_end: false,
                repeats: None,
            }] if start.mins_from_midnight() == 0 && end.mins_from_midnight() == 24 * 60
        )
}

fn write_rules_seq(f: &mut Formatter<'_>, seq: &[RuleSequence]) -> fmt::Result {
    for (idx, rule) in seq.iter().enumerate() {
        if idx > 0 {
            // Comma-grouped rules keep their comma so the grouping survives
            // a round trip.
            if rule.group > 0 && rule.group == seq[idx - 1].group {
                write!(f, ", ")?;
            } else {
                write!(f, "; ")?;
            }
        }

        write!(f, "{rule}")?;
    }

    Ok(())
}

impl Display for RuleSequence {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();

        write_day_selector(&self.day_selector, &mut parts);

        if !self.time_selector.time.is_empty() {
            let times: Vec<String> = self
                .time_selector
                .time
                .iter()
                .map(|span| span.to_string())
                .collect();

            parts.push(times.join(","));
        }

        match self.kind {
            RuleKind::Open => {}
            RuleKind::Closed => parts.push("off".to_string()),
            RuleKind::Unknown => parts.push("unknown".to_string()),
        }

        if let Some(comment) = &self.comment {
            parts.push(format!("\"{}\"", comment));
        }

        write!(f, "{}", parts.join(" "))
    }
}

fn write_day_selector(day: &DaySelector, parts: &mut Vec<String>) {
    if let Some(year) = &day.year {
        parts.push(format_year(year));
    }

    if !day.week.is_empty() {
        let weeks: Vec<String> = day
            .week
            .iter()
            .map(|week| {
                let mut out = format!("{:02}", week.range.start());

                if week.range.end() != week.range.start() {
                    out.push_str(&format!("-{:02}", week.range.end()));
                }

                if week.step > 1 {
                    out.push_str(&format!("/{}", week.step));
                }

                out
            })
            .collect();

        parts.push(format!("week {}", weeks.join(",")));
    }

    if let Some(monthday) = &day.monthday {
        parts.push(format_monthday(monthday));
    }

    if let Some(easter) = &day.easter {
        parts.push(format_easter(easter));
    }

    if !day.nth_weekday.is_empty() {
        let constraints: Vec<String> = day
            .nth_weekday
            .iter()
            .map(|nth| {
                let name = weekday_name(nth.weekday);

                if nth.nth_to != 0 {
                    format!("{}[{}-{}]", name, nth.nth_from, nth.nth_to)
                } else {
                    format!("{}[{}]", name, nth.nth_from)
                }
            })
            .collect();

        parts.push(constraints.join(","));
    } else if let Some(set) = day.weekday {
        if !set.is_empty() {
            parts.push(format_weekday_runs(set));
        }
    }

    if let Some(offset) = day.public_holiday {
        let mut out = "PH".to_string();

        if offset != 0 {
            out.push_str(&format_day_offset(offset));
        }

        parts.push(out);
    }

    if day.school_holiday {
        parts.push("SH".to_string());
    }
}

fn format_year(year: &YearRange) -> String {
    let mut out = year.range.start().to_string();

    if *year.range.end() == 9999 {
        out.push('+');
    } else if year.range.end() != year.range.start() {
        out.push_str(&format!("-{}", year.range.end()));

        if year.step > 1 {
            out.push_str(&format!("/{}", year.step));
        }
    }

    out
}

fn format_monthday(monthday: &MonthdayRange) -> String {
    let start = *monthday.months.start();
    let end = *monthday.months.end();
    let mut out = start.name().to_string();

    if let Some(days) = &monthday.days {
        out.push_str(&format!(" {:02}", days.range.start()));

        if start == end && days.range.end() > days.range.start() {
            out.push_str(&format!("-{:02}", days.range.end()));
        }

        if days.step > 1 {
            out.push_str(&format!("/{}", days.step));
        }
    }

    if end != start {
        out.push_str(&format!("-{}", end.name()));

        if let Some(days) = &monthday.days {
            out.push_str(&format!(" {:02}", days.range.end()));
        }
    }

    out
}

fn format_easter(easter: &EasterSelector) -> String {
    match easter.until {
        Some(until) => format!(
            "easter{}-easter{}",
            format_day_offset(easter.offset),
            format_day_offset(until)
        ),
        None if easter.offset != 0 => format!("easter{}", format_day_offset(easter.offset)),
        None => "easter".to_string(),
    }
}

fn format_day_offset(offset: i32) -> String {
    let unit = if offset.abs() == 1 { "day" } else { "days" };
    format!(" {:+} {}", offset, unit)
}

fn weekday_name(day: chrono::Weekday) -> &'static str {
    ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"][day.num_days_from_sunday() as usize]
}

/// Fold the bitmap into day runs, scanning from Monday. Runs of three days
/// are enumerated, anything longer becomes a range.
fn format_weekday_runs(set: WeekdaySet) -> String {
    const NAMES: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

    if (0..7).all(|idx| set.contains_index(idx)) {
        return "Mo-Su".to_string();
    }

    let mut parts: Vec<String> = Vec::new();

    for scan in 0..7u8 {
        let day = (1 + scan) % 7;

        if !set.contains_index(day) {
            continue;
        }

        // Skip days in the middle of a run; the run is emitted once, from
        // its first day.
        if set.contains_index((day + 6) % 7) {
            continue;
        }

        let mut count = 1;

        while count < 7 && set.contains_index((day + count) % 7) {
            count += 1;
        }

        let end = (day + count - 1) % 7;

        match count {
            1 => parts.push(NAMES[day as usize].to_string()),
            3 => {
                for offset in 0..count {
                    parts.push(NAMES[((day + offset) % 7) as usize].to_string());
                }
            }
            _ => parts.push(format!("{}-{}", NAMES[day as usize], NAMES[end as usize])),
        }
    }

    parts.join(",")
}

impl Display for TimeSpan {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        if self.open_end {
            return write!(f, "{}+", format_time(&self.range.start));
        }

        write!(
            f,
            "{}-{}",
            format_time(&self.range.start),
            format_time(&self.range.end)
        )?;

        if let Some(repeats) = self.repeats {
            let interval = ExtendedTime::from_mins_from_midnight(repeats)
                .expect("interval minutes out of range");
            write!(f, "/{}", interval)?;
        }

        Ok(())
    }
}

fn format_time(time: &Time) -> String {
    match time {
        Time::Fixed(fixed) => fixed.to_string(),
        Time::Variable(variable) => {
            if variable.offset == 0 {
                variable.event.as_str().to_string()
            } else {
                let abs = variable.offset.unsigned_abs();
                let sign = if variable.offset < 0 { '-' } else { '+' };

                format!(
                    "({}{}{:02}:{:02})",
                    variable.event.as_str(),
                    sign,
                    abs / 60,
                    abs % 60
                )
            }
        }
    }
}
