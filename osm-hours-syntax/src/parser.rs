use std::sync::Arc;

use pest::iterators::Pair;
use pest::Parser;

use crate::error::{Error, Result};
use crate::extended_time::ExtendedTime;
use crate::normalize::normalize;
use crate::rules as rl;
use crate::rules::day as ds;
use crate::rules::time as ts;
use crate::rules::Warning;

#[derive(Parser)]
#[grammar = "grammar.pest"]
struct OHParser;

/// How a rule was joined to its predecessor. Only used while collecting the
/// parsed expression; the surviving trace is the `group` tag on each rule.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum RuleOperator {
    Normal,
    Additional,
    Fallback,
}

/// Parse a raw opening hours expression.
///
/// The input is normalised first (see [`crate::normalize::normalize`]), so
/// tolerated spellings such as `10.00`, `10am` or en dashes are accepted.
pub fn parse(raw_oh: &str) -> Result<rl::OpeningHoursExpression> {
    let trimmed = raw_oh.trim();

    if trimmed.is_empty() {
        return Err(Error::Empty);
    }

    let (normalized, warnings) = normalize(trimmed);

    if let Some(expr) = parse_shortcut(&normalized, &warnings) {
        return Ok(expr);
    }

    let opening_hours_pair = OHParser::parse(Rule::input_opening_hours, &normalized)
        .map_err(Error::from)?
        .next()
        .expect("grammar error: no opening_hours found");

    build_opening_hours(opening_hours_pair, warnings)
}

/// Whole-string shortcuts, handled before the grammar runs.
fn parse_shortcut(normalized: &str, warnings: &[Warning]) -> Option<rl::OpeningHoursExpression> {
    let lower = normalized.trim().to_lowercase();

    let universal = |kind: rl::RuleKind, comment: Option<Arc<str>>| {
        Some(rl::OpeningHoursExpression {
            rules: vec![rl::RuleSequence { kind, comment, ..Default::default() }],
            fallback_groups: Vec::new(),
            warnings: warnings.to_vec(),
        })
    };

    match lower.as_str() {
        "24/7" | "open" => return universal(rl::RuleKind::Open, None),
        "off" | "closed" => return universal(rl::RuleKind::Closed, None),
        _ => {}
    }

    const CLOSED_PREFIXES: [&str; 6] = [
        "24/7 closed",
        "24/7 off",
        "open closed",
        "open off",
        "00:00-24:00 closed",
        "00:00-24:00 off",
    ];

    if CLOSED_PREFIXES.iter().any(|prefix| lower.starts_with(prefix)) {
        return universal(rl::RuleKind::Closed, extract_quoted_comment(normalized));
    }

    None
}

fn extract_quoted_comment(s: &str) -> Option<Arc<str>> {
    let first = s.find('"')?;
    let last = s.rfind('"')?;

    if last > first + 1 {
        Some(Arc::from(&s[first + 1..last]))
    } else {
        None
    }
}

fn unexpected_token<T>(token: Rule, parent: Rule) -> T {
    unreachable!("grammar error: found `{token:?}` inside of `{parent:?}`")
}

// ---
// --- Whole expression
// ---

fn build_opening_hours(
    pair: Pair<Rule>,
    mut warnings: Vec<Warning>,
) -> Result<rl::OpeningHoursExpression> {
    assert_eq!(pair.as_rule(), Rule::opening_hours);

    let mut segments: Vec<(RuleOperator, Vec<rl::RuleSequence>)> = Vec::new();
    let mut operator = RuleOperator::Normal;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::rule_sequence => {
                segments.push((operator, build_rule_sequence(pair, &mut warnings)?));
            }
            Rule::any_rule_separator => operator = build_any_rule_separator(pair),
            other => unexpected_token(other, Rule::opening_hours),
        }
    }

    // Partition into the primary section and one section per `||`.
    let mut sections: Vec<Vec<(RuleOperator, Vec<rl::RuleSequence>)>> = vec![Vec::new()];

    for (operator, rules) in segments {
        if operator == RuleOperator::Fallback {
            sections.push(Vec::new());
        }

        // Stray separators produce empty sequences; they are tolerated.
        if rules.is_empty() {
            continue;
        }

        sections
            .last_mut()
            .expect("sections cannot be empty")
            .push((operator, rules));
    }

    // Maximal chains joined by commas share a fresh positive group id.
    let mut group_counter = 0;
    let mut built_sections: Vec<Vec<rl::RuleSequence>> = Vec::new();

    for mut units in sections {
        let mut flat = Vec::new();
        let mut start = 0;

        while start < units.len() {
            let mut end = start + 1;

            while end < units.len() && units[end].0 == RuleOperator::Additional {
                end += 1;
            }

            let group = {
                if end - start > 1 {
                    group_counter += 1;
                    group_counter
                } else {
                    0
                }
            };

            for (_, rules) in &mut units[start..end] {
                for mut rule in rules.drain(..) {
                    rule.group = group;
                    flat.push(rule);
                }
            }

            start = end;
        }

        built_sections.push(flat);
    }

    let mut sections = built_sections.into_iter();
    let rules = sections.next().expect("sections cannot be empty");

    if rules.is_empty() {
        return Err(Error::Syntax {
            position: None,
            detail: "expression contains no rules".to_string(),
        });
    }

    let fallback_groups: Vec<_> = sections.filter(|group| !group.is_empty()).collect();

    if rules.len() > 1 && rules[0].is_universal() && rules[0].kind == rl::RuleKind::Open {
        warnings.push(Warning::RedundantTwentyFourSeven);
    }

    Ok(rl::OpeningHoursExpression { rules, fallback_groups, warnings })
}

fn build_any_rule_separator(pair: Pair<Rule>) -> RuleOperator {
    assert_eq!(pair.as_rule(), Rule::any_rule_separator);

    match pair
        .into_inner()
        .next()
        .expect("empty rule separator")
        .as_rule()
    {
        Rule::normal_rule_separator => RuleOperator::Normal,
        Rule::additional_rule_separator => RuleOperator::Additional,
        Rule::fallback_rule_separator => RuleOperator::Fallback,
        other => unexpected_token(other, Rule::any_rule_separator),
    }
}

// ---
// --- Rule sequence
// ---

fn build_rule_sequence(
    pair: Pair<Rule>,
    warnings: &mut Vec<Warning>,
) -> Result<Vec<rl::RuleSequence>> {
    assert_eq!(pair.as_rule(), Rule::rule_sequence);

    if pair.as_str().trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut pairs = pair.into_inner();

    let (day_variants, time_selector) = build_selector_sequence(
        pairs.next().expect("grammar error: empty rule sequence"),
    )?;

    let (kind, comment) = pairs
        .next()
        .map(|pair| build_rules_modifier(pair, warnings))
        .unwrap_or((rl::RuleKind::Open, None));

    if has_overlapping_ranges(&time_selector) {
        warnings.push(Warning::OverlappingTimeRanges);
    }

    Ok(day_variants
        .into_iter()
        .map(|day_selector| rl::RuleSequence {
            day_selector,
            time_selector: time_selector.clone(),
            kind,
            comment: comment.clone(),
            group: 0,
        })
        .collect())
}

/// Overlap of two fixed ranges within a single rule, `[s, e)` semantics.
fn has_overlapping_ranges(time_selector: &ts::TimeSelector) -> bool {
    let fixed: Vec<(u16, u16)> = time_selector
        .time
        .iter()
        .filter_map(|span| match (&span.range.start, &span.range.end) {
            (ts::Time::Fixed(start), ts::Time::Fixed(end)) => {
                Some((start.mins_from_midnight(), end.mins_from_midnight()))
            }
            _ => None,
        })
        .collect();

    fixed.iter().enumerate().any(|(idx, &(start_a, end_a))| {
        fixed[idx + 1..]
            .iter()
            .any(|&(start_b, end_b)| start_a < end_b && start_b < end_a)
    })
}

// ---
// --- Rule modifier
// ---

fn build_rules_modifier(
    pair: Pair<Rule>,
    warnings: &mut Vec<Warning>,
) -> (rl::RuleKind, Option<Arc<str>>) {
    assert_eq!(pair.as_rule(), Rule::rules_modifier);
    let mut pairs = pair.into_inner();

    let kind = {
        if pairs.peek().expect("empty rules_modifier").as_rule() == Rule::rules_modifier_enum {
            build_rules_modifier_enum(pairs.next().unwrap())
        } else {
            rl::RuleKind::Open
        }
    };

    let comment = pairs.next().map(|pair| build_comment(pair, warnings));
    (kind, comment.flatten())
}

fn build_rules_modifier_enum(pair: Pair<Rule>) -> rl::RuleKind {
    assert_eq!(pair.as_rule(), Rule::rules_modifier_enum);

    let pair = pair
        .into_inner()
        .next()
        .expect("grammar error: empty rules modifier enum");

    match pair.as_rule() {
        Rule::rules_modifier_enum_closed => rl::RuleKind::Closed,
        Rule::rules_modifier_enum_open => rl::RuleKind::Open,
        Rule::rules_modifier_enum_unknown => rl::RuleKind::Unknown,
        other => unexpected_token(other, Rule::rules_modifier_enum),
    }
}

fn build_comment(pair: Pair<Rule>, warnings: &mut Vec<Warning>) -> Option<Arc<str>> {
    assert_eq!(pair.as_rule(), Rule::comment);

    let inner = pair
        .into_inner()
        .next()
        .expect("empty comment")
        .as_str();

    if inner.is_empty() {
        warnings.push(Warning::EmptyComment);
        None
    } else {
        Some(Arc::from(inner))
    }
}

// ---
// --- Selectors
// ---

#[allow(clippy::type_complexity)]
fn build_selector_sequence(
    pair: Pair<Rule>,
) -> Result<(Vec<ds::DaySelector>, ts::TimeSelector)> {
    assert_eq!(pair.as_rule(), Rule::selector_sequence);
    let mut pairs = pair.into_inner();

    let first = pairs.next().expect("grammar error: empty selector sequence");

    if first.as_rule() == Rule::always_open {
        return Ok((vec![ds::DaySelector::default()], ts::TimeSelector::default()));
    }

    let (years, weeks, monthdays, easter) = build_wide_range_selectors(first)?;

    let (weekday, nth_weekday, public_holiday, school_holiday, time) = {
        if let Some(pair) = pairs.next() {
            build_small_range_selectors(pair)?
        } else {
            Default::default()
        }
    };

    // A comma list of years or month ranges duplicates the rule, one copy
    // per listed range; week lists stay a disjunction on a single rule.
    let year_choices: Vec<Option<ds::YearRange>> = {
        if years.is_empty() {
            vec![None]
        } else {
            years.into_iter().map(Some).collect()
        }
    };

    let monthday_choices: Vec<Option<ds::MonthdayRange>> = {
        if monthdays.is_empty() {
            vec![None]
        } else {
            monthdays.into_iter().map(Some).collect()
        }
    };

    let mut variants = Vec::new();

    for year in &year_choices {
        for monthday in &monthday_choices {
            variants.push(ds::DaySelector {
                year: year.clone(),
                monthday: monthday.clone(),
                week: weeks.clone(),
                weekday,
                nth_weekday: nth_weekday.clone(),
                easter,
                public_holiday,
                school_holiday,
            });
        }
    }

    Ok((variants, ts::TimeSelector::new(time)))
}

#[allow(clippy::type_complexity)]
fn build_wide_range_selectors(
    pair: Pair<Rule>,
) -> Result<(
    Vec<ds::YearRange>,
    Vec<ds::WeekRange>,
    Vec<ds::MonthdayRange>,
    Option<ds::EasterSelector>,
)> {
    assert_eq!(pair.as_rule(), Rule::wide_range_selectors);

    let mut year_selector = Vec::new();
    let mut week_selector = Vec::new();
    let mut monthday_selector = Vec::new();
    let mut easter = None;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::year_selector => {
                year_selector = pair
                    .into_inner()
                    .map(build_year_range)
                    .collect::<Result<_>>()?
            }
            Rule::week_selector => week_selector = build_week_selector(pair)?,
            Rule::monthday_selector => {
                monthday_selector = pair
                    .into_inner()
                    .map(build_monthday_range)
                    .collect::<Result<_>>()?
            }
            Rule::easter_selector => easter = Some(build_easter_selector(pair)?),
            other => unexpected_token(other, Rule::wide_range_selectors),
        }
    }

    Ok((year_selector, week_selector, monthday_selector, easter))
}

#[allow(clippy::type_complexity)]
fn build_small_range_selectors(
    pair: Pair<Rule>,
) -> Result<(
    Option<ds::WeekdaySet>,
    Vec<ds::NthWeekday>,
    Option<i32>,
    bool,
    Vec<ts::TimeSpan>,
)> {
    assert_eq!(pair.as_rule(), Rule::small_range_selectors);

    let mut weekday = None;
    let mut nth_weekday = Vec::new();
    let mut public_holiday = None;
    let mut school_holiday = false;
    let mut time = Vec::new();

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::weekday_selector => {
                (weekday, nth_weekday, public_holiday, school_holiday) =
                    build_weekday_selector(pair)?;
            }
            Rule::time_selector => {
                time = pair
                    .into_inner()
                    .map(build_timespan)
                    .collect::<Result<_>>()?
            }
            other => unexpected_token(other, Rule::small_range_selectors),
        }
    }

    Ok((weekday, nth_weekday, public_holiday, school_holiday, time))
}

// ---
// --- WeekDay selector
// ---

#[allow(clippy::type_complexity)]
fn build_weekday_selector(
    pair: Pair<Rule>,
) -> Result<(Option<ds::WeekdaySet>, Vec<ds::NthWeekday>, Option<i32>, bool)> {
    assert_eq!(pair.as_rule(), Rule::weekday_selector);

    let mut weekday = None;
    let mut nth_weekday = Vec::new();
    let mut public_holiday = None;
    let mut school_holiday = false;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::weekday_sequence => {
                let set = weekday.get_or_insert(ds::WeekdaySet::EMPTY);

                for range in pair.into_inner() {
                    build_weekday_range(range, set, &mut nth_weekday)?;
                }
            }
            Rule::holiday_sequence => {
                for holiday in pair.into_inner() {
                    build_holiday(holiday, &mut public_holiday, &mut school_holiday)?;
                }
            }
            other => unexpected_token(other, Rule::weekday_selector),
        }
    }

    Ok((weekday, nth_weekday, public_holiday, school_holiday))
}

fn build_weekday_range(
    pair: Pair<Rule>,
    set: &mut ds::WeekdaySet,
    nth_weekday: &mut Vec<ds::NthWeekday>,
) -> Result<()> {
    assert_eq!(pair.as_rule(), Rule::weekday_range);
    let mut pairs = pair.into_inner();

    let start = build_wday(pairs.next().expect("empty weekday range"));

    let end = {
        if pairs.peek().map(|x| x.as_rule()) == Some(Rule::wday) {
            build_wday(pairs.next().unwrap())
        } else {
            start
        }
    };

    let entries: Vec<_> = pairs.map(build_nth_entry).collect::<Result<_>>()?;

    if entries.is_empty() {
        set.insert_range(start, end);
        return Ok(());
    }

    // Ordinal constraints replace the bitmap for the listed days.
    let mut day = start;
    loop {
        for &(nth_from, nth_to) in &entries {
            nth_weekday.push(ds::NthWeekday { weekday: day, nth_from, nth_to });
        }

        if day == end {
            break;
        }

        day = day.succ();
    }

    Ok(())
}

fn build_nth_entry(pair: Pair<Rule>) -> Result<(i8, i8)> {
    assert_eq!(pair.as_rule(), Rule::nth_entry);

    let mut values: Vec<i8> = Vec::new();
    let mut sign = 1i8;

    for pair in pair.into_inner() {
        match pair.as_rule() {
            Rule::nth_minus => sign = -1,
            Rule::nth => {
                let digit: i8 = pair.as_str().parse().expect("invalid nth format");
                values.push(sign * digit);
                sign = 1;
            }
            other => unexpected_token(other, Rule::nth_entry),
        }
    }

    Ok(match values.as_slice() {
        [from] => (*from, 0),
        [from, to, ..] => (*from, *to),
        [] => unreachable!("grammar error: empty nth entry"),
    })
}

fn build_holiday(
    pair: Pair<Rule>,
    public_holiday: &mut Option<i32>,
    school_holiday: &mut bool,
) -> Result<()> {
    assert_eq!(pair.as_rule(), Rule::holiday);
    let mut pairs = pair.into_inner();

    match pairs.next().expect("empty holiday").as_rule() {
        Rule::public_holiday => {
            let offset = pairs.next().map(build_day_offset).transpose()?.unwrap_or(0);
            *public_holiday = Some(offset);
        }
        Rule::school_holiday => *school_holiday = true,
        other => unexpected_token(other, Rule::holiday),
    }

    Ok(())
}

fn build_wday(pair: Pair<Rule>) -> ds::Weekday {
    assert_eq!(pair.as_rule(), Rule::wday);
    weekday_from_name(pair.as_str()).expect("grammar error: unknown weekday name")
}

/// Case-insensitive weekday lookup over English and German names, full and
/// abbreviated.
fn weekday_from_name(name: &str) -> Option<ds::Weekday> {
    Some(match name.to_lowercase().as_str() {
        "su" | "sun" | "sunday" | "so" | "sonntag" => ds::Weekday::Sun,
        "mo" | "mon" | "monday" | "montag" => ds::Weekday::Mon,
        "tu" | "tue" | "tuesday" | "di" | "dienstag" => ds::Weekday::Tue,
        "we" | "wed" | "wednesday" | "mi" | "mittwoch" => ds::Weekday::Wed,
        "th" | "thu" | "thursday" | "do" | "donnerstag" => ds::Weekday::Thu,
        "fr" | "fri" | "friday" | "freitag" => ds::Weekday::Fri,
        "sa" | "sat" | "saturday" | "samstag" => ds::Weekday::Sat,
        _ => return None,
    })
}

// ---
// --- Week selector
// ---

fn build_week_selector(pair: Pair<Rule>) -> Result<Vec<ds::WeekRange>> {
    assert_eq!(pair.as_rule(), Rule::week_selector);

    pair.into_inner()
        .filter(|pair| pair.as_rule() == Rule::week)
        .map(build_week)
        .collect()
}

fn build_week(pair: Pair<Rule>) -> Result<ds::WeekRange> {
    assert_eq!(pair.as_rule(), Rule::week);
    let mut pairs = pair.into_inner();

    let start = build_weeknum(pairs.next().expect("empty weeknum range"))?;

    let end = {
        if pairs.peek().map(|x| x.as_rule()) == Some(Rule::weeknum) {
            build_weeknum(pairs.next().unwrap())?
        } else {
            start
        }
    };

    let step = pairs
        .next()
        .map(|pair| build_positive_number(pair, "a week interval in 1..=53"))
        .transpose()?
        .unwrap_or(1)
        .max(1) as u8;

    Ok(ds::WeekRange { range: start..=end, step })
}

fn build_weeknum(pair: Pair<Rule>) -> Result<u8> {
    assert_eq!(pair.as_rule(), Rule::weeknum);
    let weeknum: u8 = pair.as_str().parse().expect("invalid weeknum format");

    if !(1..=53).contains(&weeknum) {
        return Err(Error::OutOfRange {
            value: pair.as_str().to_string(),
            expected: "a week number in 1..=53",
        });
    }

    Ok(weeknum)
}

// ---
// --- Month selector
// ---

fn build_monthday_range(pair: Pair<Rule>) -> Result<ds::MonthdayRange> {
    assert_eq!(pair.as_rule(), Rule::monthday_range);
    let mut pairs = pair.into_inner();

    let month_start = build_month(pairs.next().expect("empty monthday range"));

    let Some(next) = pairs.next() else {
        return Ok(ds::MonthdayRange { months: month_start..=month_start, days: None });
    };

    match next.as_rule() {
        Rule::month => Ok(ds::MonthdayRange {
            months: month_start..=build_month(next),
            days: None,
        }),
        Rule::daynum => {
            let day_start = build_daynum(next);

            match pairs.next() {
                None => Ok(ds::MonthdayRange {
                    months: month_start..=month_start,
                    days: Some(ds::DayRange { range: day_start..=day_start, step: 1 }),
                }),
                Some(pair) if pair.as_rule() == Rule::daynum => {
                    let day_end = build_daynum(pair);

                    let step = pairs
                        .next()
                        .map(|pair| build_positive_number(pair, "a day interval in 1..=31"))
                        .transpose()?
                        .unwrap_or(1)
                        .max(1) as u8;

                    Ok(ds::MonthdayRange {
                        months: month_start..=month_start,
                        days: Some(ds::DayRange { range: day_start..=day_end, step }),
                    })
                }
                Some(pair) => {
                    // Cross-month day range; a year wedged into the middle
                    // (`Jan 01-2024 Jun 30`) is tolerated and ignored.
                    let month_pair = {
                        if pair.as_rule() == Rule::year {
                            pairs.next().expect("missing month after year")
                        } else {
                            pair
                        }
                    };

                    let month_end = build_month(month_pair);
                    let day_end = build_daynum(pairs.next().expect("missing day of month"));

                    Ok(ds::MonthdayRange {
                        months: month_start..=month_end,
                        days: Some(ds::DayRange { range: day_start..=day_end, step: 1 }),
                    })
                }
            }
        }
        other => unexpected_token(other, Rule::monthday_range),
    }
}

fn build_month(pair: Pair<Rule>) -> ds::Month {
    assert_eq!(pair.as_rule(), Rule::month);
    ds::Month::from_name(pair.as_str()).expect("grammar error: unknown month name")
}

fn build_daynum(pair: Pair<Rule>) -> u8 {
    assert_eq!(pair.as_rule(), Rule::daynum);
    let daynum: u8 = pair.as_str().parse().expect("invalid day of month format");

    if daynum == 0 {
        #[cfg(feature = "log")]
        log::warn!("Found day number 0 in opening hours: specify the 1st or 31st instead.");
        return 1;
    }

    if daynum > 31 {
        #[cfg(feature = "log")]
        log::warn!("Found day number {daynum} in opening hours");
        return 31;
    }

    daynum
}

// ---
// --- Year selector
// ---

fn build_year_range(pair: Pair<Rule>) -> Result<ds::YearRange> {
    assert_eq!(pair.as_rule(), Rule::year_range);
    let mut pairs = pair.into_inner();

    let start = build_year(pairs.next().expect("empty year range"));

    let end = pairs.next().map(|pair| match pair.as_rule() {
        Rule::year => build_year(pair),
        Rule::year_range_plus => 9999,
        other => unexpected_token(other, Rule::year_range),
    });

    let step = pairs
        .next()
        .map(|pair| build_positive_number(pair, "a year interval"))
        .transpose()?
        .unwrap_or(1)
        .max(1) as u16;

    Ok(ds::YearRange { range: start..=end.unwrap_or(start), step })
}

fn build_year(pair: Pair<Rule>) -> u16 {
    assert_eq!(pair.as_rule(), Rule::year);
    pair.as_str().parse().expect("invalid year format")
}

// ---
// --- Easter selector
// ---

fn build_easter_selector(pair: Pair<Rule>) -> Result<ds::EasterSelector> {
    assert_eq!(pair.as_rule(), Rule::easter_selector);

    let offsets: Vec<i32> = pair
        .into_inner()
        .filter(|pair| pair.as_rule() == Rule::day_offset)
        .map(build_day_offset)
        .collect::<Result<_>>()?;

    Ok(match offsets.as_slice() {
        [] => ds::EasterSelector { offset: 0, until: None },
        [offset] => ds::EasterSelector { offset: *offset, until: None },
        [offset, until, ..] => ds::EasterSelector { offset: *offset, until: Some(*until) },
    })
}

fn build_day_offset(pair: Pair<Rule>) -> Result<i32> {
    assert_eq!(pair.as_rule(), Rule::day_offset);
    let mut pairs = pair.into_inner();

    let sign = build_plus_or_minus(pairs.next().expect("empty day offset"));
    let value = build_positive_number(pairs.next().expect("missing day offset value"), "a day offset")?;

    let value = i32::try_from(value).map_err(|_| Error::OutOfRange {
        value: value.to_string(),
        expected: "a day offset fitting a 32 bit integer",
    })?;

    Ok(match sign {
        PlusOrMinus::Plus => value,
        PlusOrMinus::Minus => -value,
    })
}

// ---
// --- Time selector
// ---

fn build_timespan(pair: Pair<Rule>) -> Result<ts::TimeSpan> {
    assert_eq!(pair.as_rule(), Rule::timespan);
    let mut pairs = pair.into_inner();

    let start = build_time(pairs.next().expect("empty timespan"))?;

    let mut end = None;
    let mut open_end = false;
    let mut repeats = None;

    for pair in pairs {
        match pair.as_rule() {
            Rule::extended_time => end = Some(build_extended_time(pair)?),
            Rule::timespan_plus => open_end = true,
            Rule::hour_minutes => repeats = Some(build_interval(pair)?),
            other => unexpected_token(other, Rule::timespan),
        }
    }

    let end = match (end, open_end) {
        // `17:00+` and `14:00-17:00+` both stay open until end of day.
        (_, true) => ts::Time::Fixed(ExtendedTime::MIDNIGHT_24),
        (Some(end), false) => end,
        // A bare time is a point, encoded as a one-minute range.
        (None, false) => point_end(start)?,
    };

    // A zero-length interval means no periodic slots at all.
    let repeats = repeats.filter(|&minutes| minutes > 0);

    Ok(ts::TimeSpan { range: start..end, open_end, repeats })
}

fn point_end(start: ts::Time) -> Result<ts::Time> {
    Ok(match start {
        ts::Time::Fixed(time) => {
            if time.hour() > 24 {
                return Err(Error::OutOfRange {
                    value: format!("{time}"),
                    expected: "a point in time with hours in 0..=24",
                });
            }

            ts::Time::Fixed(
                time.add_minutes(1)
                    .ok_or(Error::Internal("point in time overflows"))?,
            )
        }
        ts::Time::Variable(variable) => ts::Time::Variable(ts::VariableTime {
            event: variable.event,
            offset: variable.offset + 1,
        }),
    })
}

fn build_time(pair: Pair<Rule>) -> Result<ts::Time> {
    assert_eq!(pair.as_rule(), Rule::time);
    let inner = pair.into_inner().next().expect("empty time");

    Ok(match inner.as_rule() {
        Rule::hour_minutes => ts::Time::Fixed(build_hour_minutes(inner)?),
        Rule::variable_time => ts::Time::Variable(build_variable_time(inner)?),
        other => unexpected_token(other, Rule::time),
    })
}

fn build_extended_time(pair: Pair<Rule>) -> Result<ts::Time> {
    assert_eq!(pair.as_rule(), Rule::extended_time);
    let inner = pair.into_inner().next().expect("empty extended time");

    Ok(match inner.as_rule() {
        Rule::extended_hour_minutes => ts::Time::Fixed(build_extended_hour_minutes(inner)?),
        Rule::variable_time => ts::Time::Variable(build_variable_time(inner)?),
        other => unexpected_token(other, Rule::extended_time),
    })
}

fn build_variable_time(pair: Pair<Rule>) -> Result<ts::VariableTime> {
    assert_eq!(pair.as_rule(), Rule::variable_time);
    let mut pairs = pair.into_inner();

    let event = build_event(pairs.next().expect("empty variable time"));

    let offset = match pairs.next() {
        None => 0,
        Some(pair) => {
            let sign = {
                if pair.as_rule() == Rule::plus {
                    PlusOrMinus::Plus
                } else {
                    build_plus_or_minus(pair)
                }
            };

            let mins = build_hour_minutes(pairs.next().expect("missing offset value"))?
                .mins_from_midnight() as i16;

            match sign {
                PlusOrMinus::Plus => mins,
                PlusOrMinus::Minus => -mins,
            }
        }
    };

    Ok(ts::VariableTime { event, offset })
}

fn build_event(pair: Pair<Rule>) -> ts::TimeEvent {
    assert_eq!(pair.as_rule(), Rule::event);

    match pair.as_str().to_lowercase().as_str() {
        "dawn" => ts::TimeEvent::Dawn,
        "sunrise" => ts::TimeEvent::Sunrise,
        "sunset" => ts::TimeEvent::Sunset,
        "dusk" => ts::TimeEvent::Dusk,
        _ => unreachable!("grammar error: unknown time event"),
    }
}

// ---
// --- Basic elements
// ---

fn parse_hour_minutes(pair: Pair<Rule>) -> Result<ExtendedTime> {
    let text = pair.as_str();

    let (hour, minutes) = text
        .split_once(':')
        .expect("invalid hour:minutes format");

    let hour: u8 = hour.parse().expect("invalid hour");
    let minutes: u8 = minutes.parse().expect("invalid minutes");

    if hour > 26 {
        return Err(Error::OutOfRange {
            value: text.to_string(),
            expected: "hours in 0..=26",
        });
    }

    ExtendedTime::new(hour, minutes).ok_or(Error::OutOfRange {
        value: text.to_string(),
        expected: "minutes in 0..=59",
    })
}

fn build_hour_minutes(pair: Pair<Rule>) -> Result<ExtendedTime> {
    assert_eq!(pair.as_rule(), Rule::hour_minutes);
    parse_hour_minutes(pair)
}

fn build_extended_hour_minutes(pair: Pair<Rule>) -> Result<ExtendedTime> {
    assert_eq!(pair.as_rule(), Rule::extended_hour_minutes);
    parse_hour_minutes(pair)
}

/// Periodic interval suffix (`/01:30`); a zero length disables it.
fn build_interval(pair: Pair<Rule>) -> Result<u16> {
    Ok(build_hour_minutes(pair)?.mins_from_midnight())
}

fn build_positive_number(pair: Pair<Rule>, expected: &'static str) -> Result<u64> {
    assert_eq!(pair.as_rule(), Rule::positive_number);

    pair.as_str().parse().map_err(|_| Error::OutOfRange {
        value: pair.as_str().to_string(),
        expected,
    })
}

fn build_plus_or_minus(pair: Pair<Rule>) -> PlusOrMinus {
    assert_eq!(pair.as_rule(), Rule::plus_or_minus);
    let pair = pair.into_inner().next().expect("empty plus or minus");

    match pair.as_rule() {
        Rule::plus => PlusOrMinus::Plus,
        Rule::minus => PlusOrMinus::Minus,
        other => unexpected_token(other, Rule::plus_or_minus),
    }
}

enum PlusOrMinus {
    Plus,
    Minus,
}
