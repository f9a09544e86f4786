use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use osm_hours_syntax::rules::day::Month;
use osm_hours_syntax::rules::{OpeningHoursExpression, RuleKind, RuleSequence, Warning};

use crate::context::Context;
use crate::error::ParserError;
use crate::filter::date_filter::{
    date_dimensions_match, ordinal_state, selector_owns_day, OrdinalState,
};
use crate::filter::time_filter::{fixed_bounds, resolve_time, time_matches};
use crate::utils::range::DateTimeRange;

/// How far `next_change` looks ahead. Ordinal constraints such as "the 4th
/// Wednesday" may put the next transition almost five weeks away.
const NEXT_CHANGE_HORIZON_DAYS: i64 = 35;

// OpeningHours

/// A parsed opening hours expression and its evaluation context.
///
/// The parsed rules are immutable and shared behind an `Arc`, so this is
/// safe and cheap to clone. All queries are pure: the same instant and
/// context always produce the same answer, and nothing is cached or locked.
#[derive(Clone, Debug)]
pub struct OpeningHours {
    /// Rules describing opening hours
    expr: Arc<OpeningHoursExpression>,
    /// Evaluation context
    pub(crate) ctx: Context,
}

impl OpeningHours {
    /// Parse a raw opening hours expression.
    ///
    /// ```
    /// use osm_hours::OpeningHours;
    ///
    /// assert!(OpeningHours::parse("24/7 open").is_ok());
    /// assert!(OpeningHours::parse("not a valid expression").is_err());
    /// ```
    pub fn parse(raw_oh: &str) -> Result<Self, ParserError> {
        let expr = Arc::new(osm_hours_syntax::parse(raw_oh)?);
        Ok(Self { expr, ctx: Context::default() })
    }

    /// Set a new evaluation context for this expression.
    ///
    /// ```
    /// use osm_hours::{Context, OpeningHours};
    ///
    /// let oh = OpeningHours::parse("PH off")
    ///     .unwrap()
    ///     .with_context(Context::default().with_public_holidays(|_| false));
    /// ```
    pub fn with_context(self, ctx: Context) -> Self {
        Self { expr: self.expr, ctx }
    }

    /// The warnings collected while parsing.
    pub fn warnings(&self) -> &[Warning] {
        &self.expr.warnings
    }

    // --
    // -- Core rule resolution
    // --

    /// Full match of a rule against an instant: date dimensions, ordinal
    /// constraints, then weekday and time-of-day.
    fn rule_matches(&self, rule: &RuleSequence, t: NaiveDateTime) -> bool {
        let date = t.date();

        if !date_dimensions_match(rule, date, &self.ctx, &self.expr.rules) {
            return false;
        }

        let ordinal = ordinal_state(rule, date);

        if ordinal == OrdinalState::Failed {
            return false;
        }

        let constraint_matched = ordinal == OrdinalState::Matched;

        if rule.time_selector.time.is_empty() {
            if constraint_matched {
                return true;
            }

            return match rule.day_selector.weekday {
                Some(set) => set.contains(t.weekday()),
                None => true,
            };
        }

        time_matches(rule, t, &self.ctx, constraint_matched)
    }

    /// Two rules with the same structural selector partition a day between
    /// them instead of overriding each other.
    fn has_same_selector(a: &RuleSequence, b: &RuleSequence) -> bool {
        let months = |rule: &RuleSequence| {
            rule.day_selector
                .monthday
                .as_ref()
                .map(|monthday| monthday.months.clone())
        };

        if let (Some(set_a), Some(set_b)) = (a.day_selector.weekday, b.day_selector.weekday) {
            if set_a == set_b && months(a) == months(b) {
                return true;
            }
        }

        if a.day_selector.weekday.is_none()
            && b.day_selector.weekday.is_none()
            && a.day_selector.monthday == b.day_selector.monthday
        {
            return true;
        }

        false
    }

    /// `Su-Tu 11:00-01:00, We-Th 11:00-03:00`: Wednesday's small hours run
    /// until 03:00, borrowed from the sibling rule that covers Wednesday.
    fn extended_midnight_continuation(&self, t: NaiveDateTime) -> bool {
        let minute = (t.hour() * 60 + t.minute()) as i32;
        let weekday = t.weekday().num_days_from_sunday() as u8;
        let prev_weekday = (weekday + 6) % 7;

        let mut groups: BTreeMap<u32, Vec<&RuleSequence>> = BTreeMap::new();

        for rule in &self.expr.rules {
            if rule.group > 0 {
                groups.entry(rule.group).or_default().push(rule);
            }
        }

        let fold = |end: i32| if end > 24 * 60 { end - 24 * 60 } else { end };

        for rules in groups.values() {
            // A rule of the group whose first range spans midnight out of
            // yesterday.
            let prev_end = rules.iter().find_map(|rule| {
                let set = rule.day_selector.weekday?;

                if !set.contains_index(prev_weekday) {
                    return None;
                }

                let (start, end) = fixed_bounds(rule.time_selector.time.first()?)?;
                let end = fold(end);

                if end <= start {
                    Some(end)
                } else {
                    None
                }
            });

            let Some(prev_end) = prev_end else {
                continue;
            };

            // A sibling covering today with a later closing minute.
            for rule in rules {
                let Some(set) = rule.day_selector.weekday else {
                    continue;
                };

                if !set.contains_index(weekday) {
                    continue;
                }

                let Some(span) = rule.time_selector.time.first() else {
                    continue;
                };

                let Some((_, end)) = fixed_bounds(span) else {
                    continue;
                };

                let end = fold(end);

                if end > prev_end && minute < end {
                    return true;
                }
            }
        }

        false
    }

    /// Resolve the fallback groups in declaration order. A group whose
    /// first match (scanning in reverse) is unknown passes to the next
    /// group; the first definite match wins.
    fn fallback_resolution(&self, t: NaiveDateTime) -> FallbackResolution {
        let mut saw_unknown = false;

        for group in &self.expr.fallback_groups {
            for rule in group.iter().rev() {
                if self.rule_matches(rule, t) {
                    if rule.kind == RuleKind::Unknown {
                        saw_unknown = true;
                        break;
                    }

                    return FallbackResolution::Definite(rule.kind == RuleKind::Open);
                }
            }
        }

        if saw_unknown {
            FallbackResolution::Unknown
        } else {
            FallbackResolution::NoMatch
        }
    }

    fn comment_from_fallback(&self, t: NaiveDateTime) -> Option<Arc<str>> {
        for group in &self.expr.fallback_groups {
            for rule in group.iter().rev() {
                if self.rule_matches(rule, t) {
                    return rule.comment.clone();
                }
            }
        }

        None
    }

    // --
    // -- Pointwise queries
    // --

    /// Check if this is open at a given time.
    ///
    /// ```
    /// use chrono::NaiveDateTime;
    /// use osm_hours::OpeningHours;
    ///
    /// let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();
    /// let date = NaiveDateTime::parse_from_str("2024-01-15 10:00", "%Y-%m-%d %H:%M").unwrap();
    /// assert!(oh.is_open(date));
    /// ```
    pub fn is_open(&self, t: NaiveDateTime) -> bool {
        if self.extended_midnight_continuation(t) {
            return true;
        }

        // Comma-grouped rules that claimed the day without matching the
        // time; none of their siblings may conclude "open" anymore.
        let mut selector_matched_groups: HashSet<u32> = HashSet::new();
        let mut overriding_rule: Option<&RuleSequence> = None;

        for rule in self.expr.rules.iter().rev() {
            if self.rule_matches(rule, t) {
                if rule.kind == RuleKind::Unknown {
                    return self.fallback_resolution(t).is_open();
                }

                if let Some(overriding) = overriding_rule {
                    // A later rule with a more specific selector claimed the
                    // whole day; rules sharing the selector still compose.
                    if !Self::has_same_selector(overriding, rule) {
                        return false;
                    }
                }

                return rule.kind == RuleKind::Open;
            }

            // A later "open" rule whose selector claims the day shadows
            // earlier rules even outside its own time ranges.
            if rule.kind == RuleKind::Open
                && !rule.time_selector.time.is_empty()
                && selector_owns_day(rule, t, &self.ctx)
            {
                if rule.group > 0 {
                    selector_matched_groups.insert(rule.group);
                    continue;
                }

                if overriding_rule.is_none() {
                    overriding_rule = Some(rule);
                }
            }
        }

        if overriding_rule.is_some() || !selector_matched_groups.is_empty() {
            return false;
        }

        if !self.expr.fallback_groups.is_empty() {
            return self.fallback_resolution(t).is_open();
        }

        false
    }

    /// Check if the state is unknown at a given time. A primary rule in the
    /// unknown state stays unknown when the fallback groups also resolve to
    /// unknown, but a fallback group that fails to match entirely reads as
    /// plainly closed.
    pub fn is_unknown(&self, t: NaiveDateTime) -> bool {
        for rule in self.expr.rules.iter().rev() {
            if self.rule_matches(rule, t) {
                if rule.kind == RuleKind::Unknown {
                    if self.expr.fallback_groups.is_empty() {
                        return true;
                    }

                    return self.fallback_resolution(t) == FallbackResolution::Unknown;
                }

                return false;
            }
        }

        false
    }

    /// `"open"`, `"closed"` or `"unknown"` at a given time.
    pub fn state_string(&self, t: NaiveDateTime) -> &'static str {
        if self.is_unknown(t) {
            "unknown"
        } else if self.is_open(t) {
            "open"
        } else {
            "closed"
        }
    }

    /// The comment attached to the rule matching at a given time, if any.
    pub fn comment(&self, t: NaiveDateTime) -> Arc<str> {
        self.comment_at(t).unwrap_or_else(|| Arc::from(""))
    }

    fn comment_at(&self, t: NaiveDateTime) -> Option<Arc<str>> {
        for rule in self.expr.rules.iter().rev() {
            if self.rule_matches(rule, t) {
                return rule.comment.clone();
            }
        }

        self.comment_from_fallback(t)
    }

    /// Index into the primary rule list of the rule matching at a given
    /// time; later rules take precedence.
    pub fn matching_rule(&self, t: NaiveDateTime) -> Option<usize> {
        (0..self.expr.rules.len())
            .rev()
            .find(|&idx| self.rule_matches(&self.expr.rules[idx], t))
    }

    // --
    // -- Transitions
    // --

    /// A single universal rule never changes state.
    fn is_constant(&self) -> bool {
        self.expr.fallback_groups.is_empty()
            && self.expr.rules.len() == 1
            && self.expr.rules[0].is_universal()
    }

    /// Candidate transition minutes for one day: range starts and ends of
    /// rules scheduled today, ends inherited from yesterday's
    /// midnight-spanning ranges, and midnight itself for day-only rules.
    /// Minutes above 1440 denote extended hours spilling into the next day.
    fn day_transitions(&self, date: NaiveDate, after_minute: i32) -> BTreeSet<i32> {
        let mut transitions = BTreeSet::new();
        let weekday = date.weekday().num_days_from_sunday() as u8;
        let prev_weekday = (weekday + 6) % 7;

        for rule in &self.expr.rules {
            if rule.time_selector.time.is_empty() {
                if !rule.day_selector.is_empty() && 0 > after_minute {
                    transitions.insert(0);
                }

                continue;
            }

            // Ordinal-weekday rules have an empty bitmap; their candidates
            // are emitted every day and verified against the actual state.
            let weekday_set = rule
                .day_selector
                .weekday
                .filter(|_| rule.day_selector.nth_weekday.is_empty());

            match weekday_set {
                Some(set) => {
                    if set.contains_index(weekday) {
                        for span in &rule.time_selector.time {
                            let start = resolve_time(&span.range.start, date, &self.ctx);
                            let end = resolve_time(&span.range.end, date, &self.ctx);

                            if start > after_minute {
                                transitions.insert(start);
                            }

                            // Midnight-spanning ends belong to the next day.
                            if end > start && end > after_minute {
                                transitions.insert(end);
                            }
                        }
                    }

                    if set.contains_index(prev_weekday) {
                        for span in &rule.time_selector.time {
                            let start = resolve_time(&span.range.start, date, &self.ctx);
                            let end = resolve_time(&span.range.end, date, &self.ctx);

                            if end <= start && end > after_minute {
                                transitions.insert(end);
                            }
                        }
                    }
                }
                None => {
                    for span in &rule.time_selector.time {
                        let start = resolve_time(&span.range.start, date, &self.ctx);
                        let end = resolve_time(&span.range.end, date, &self.ctx);

                        if start > after_minute {
                            transitions.insert(start);
                        }

                        if end > after_minute {
                            transitions.insert(end);
                        }
                    }
                }
            }
        }

        transitions
    }

    /// Get the next time where the open state flips.
    ///
    /// ```
    /// use chrono::NaiveDateTime;
    /// use osm_hours::OpeningHours;
    ///
    /// let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();
    /// let date = NaiveDateTime::parse_from_str("2024-01-15 10:00", "%Y-%m-%d %H:%M").unwrap();
    /// let next = NaiveDateTime::parse_from_str("2024-01-15 17:00", "%Y-%m-%d %H:%M").unwrap();
    /// assert_eq!(oh.next_change(date), Some(next));
    /// ```
    pub fn next_change(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        self.next_change_impl(t, None)
    }

    /// Same as [`OpeningHours::next_change`] but giving up past `maxdate`.
    pub fn next_change_before(
        &self,
        t: NaiveDateTime,
        maxdate: NaiveDateTime,
    ) -> Option<NaiveDateTime> {
        self.next_change_impl(t, Some(maxdate))
    }

    fn next_change_impl(
        &self,
        t: NaiveDateTime,
        maxdate: Option<NaiveDateTime>,
    ) -> Option<NaiveDateTime> {
        if self.is_constant() {
            return None;
        }

        let current_state = self.is_open(t);

        let horizon = match maxdate {
            None => NEXT_CHANGE_HORIZON_DAYS + 1,
            Some(maxdate) => ((maxdate - t).num_days() + 2).min(365),
        };

        let mut date = t.date();

        for day in 0..horizon {
            if day > 0 {
                date = date.succ_opt()?;

                if let Some(maxdate) = maxdate {
                    if date > maxdate.date() {
                        break;
                    }
                }
            }

            let after_minute = {
                if day == 0 {
                    (t.hour() * 60 + t.minute()) as i32
                } else {
                    -1
                }
            };

            for minute in self.day_transitions(date, after_minute) {
                let check = datetime_from_day_minute(date, minute)?;

                if let Some(maxdate) = maxdate {
                    if check > maxdate {
                        return None;
                    }
                }

                if self.is_open(check) != current_state {
                    return Some(check);
                }
            }
        }

        None
    }

    /// Next boundary of state, unknown flag or comment. Falls back to a
    /// minute scan when the transition is caused by a comment or modifier
    /// change alone, which the candidate enumeration cannot see.
    fn next_change_detailed(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        if self.is_constant() {
            return None;
        }

        let at = |t: NaiveDateTime| (self.is_open(t), self.is_unknown(t), self.comment_at(t));
        let current = at(t);

        if let Some(next) = self.next_change(t) {
            if at(next) != current {
                return Some(next);
            }
        }

        let mut check = t + Duration::minutes(1);
        let scan_end = t + Duration::days(NEXT_CHANGE_HORIZON_DAYS);

        while check < scan_end {
            if at(check) != current {
                return Some(check);
            }

            check += Duration::minutes(1);
        }

        None
    }

    // --
    // -- Range queries
    // --

    /// Ordered open and unknown intervals within `from..to`, with constant
    /// state and comment inside each interval.
    pub fn open_intervals(&self, from: NaiveDateTime, to: NaiveDateTime) -> Vec<DateTimeRange> {
        if from >= to {
            return Vec::new();
        }

        let mut intervals = Vec::new();
        let mut current = from;

        while current < to {
            if self.is_open(current) || self.is_unknown(current) {
                let unknown = self.is_unknown(current);
                let comment = self.comment_at(current);

                let end = match self.next_change_detailed(current) {
                    Some(next) if next < to => next,
                    _ => to,
                };

                intervals.push(DateTimeRange { range: current..end, unknown, comment });
                current = end;
            } else {
                match self.next_change_detailed(current) {
                    Some(next) if next < to => current = next,
                    _ => break,
                }
            }
        }

        intervals
    }

    /// Total open and unknown durations within `from..to`, at minute
    /// granularity.
    pub fn open_duration(&self, from: NaiveDateTime, to: NaiveDateTime) -> (Duration, Duration) {
        let mut open = Duration::zero();
        let mut unknown = Duration::zero();
        let mut current = from;

        while current < to {
            if self.is_open(current) {
                open = open + Duration::minutes(1);
            } else if self.is_unknown(current) {
                unknown = unknown + Duration::minutes(1);
            }

            current += Duration::minutes(1);
        }

        (open, unknown)
    }

    // --
    // -- Whole-value queries
    // --

    /// Semantic equality: both expressions answer the same state, unknown
    /// flag and comment over a reference week sampled every 15 minutes.
    /// Only meaningful for week-stable expressions.
    pub fn is_equal_to(&self, other: &Self) -> bool {
        // A known Monday, so the samples cover each weekday once.
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        let end = start + Duration::days(7);

        let mut current = start;

        while current < end {
            if self.is_open(current) != other.is_open(current)
                || self.is_unknown(current) != other.is_unknown(current)
                || self.comment(current) != other.comment(current)
            {
                return false;
            }

            current += Duration::minutes(15);
        }

        true
    }

    /// Whether the answers only depend on weekday and time of day.
    pub fn is_week_stable(&self) -> bool {
        let all_rules = self
            .expr
            .rules
            .iter()
            .chain(self.expr.fallback_groups.iter().flatten());

        for rule in all_rules {
            let day = &rule.day_selector;

            if let Some(monthday) = &day.monthday {
                let full_year = *monthday.months.start() == Month::January
                    && *monthday.months.end() == Month::December
                    && monthday.days.is_none();

                if !full_year {
                    return false;
                }
            }

            if day.year.is_some()
                || !day.week.is_empty()
                || !day.nth_weekday.is_empty()
                || day.public_holiday.is_some()
                || day.school_holiday
                || day.easter.is_some()
            {
                return false;
            }
        }

        true
    }

    /// Cursor over state transitions, starting at `seed`.
    pub fn iter_transitions(&self, seed: NaiveDateTime) -> TransitionIterator<'_> {
        TransitionIterator { opening_hours: self, current: seed }
    }
}

impl FromStr for OpeningHours {
    type Err = ParserError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl Display for OpeningHours {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.expr)
    }
}

/// Answer of the fallback groups at an instant.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum FallbackResolution {
    Definite(bool),
    Unknown,
    NoMatch,
}

impl FallbackResolution {
    fn is_open(self) -> bool {
        self == Self::Definite(true)
    }
}

/// Minutes beyond 1440 spill into the following day.
fn datetime_from_day_minute(date: NaiveDate, minute: i32) -> Option<NaiveDateTime> {
    let (date, minute) = {
        if minute >= 24 * 60 {
            (date.succ_opt()?, minute - 24 * 60)
        } else {
            (date, minute)
        }
    };

    let time = NaiveTime::from_hms_opt(minute as u32 / 60, minute as u32 % 60, 0)?;
    Some(NaiveDateTime::new(date, time))
}

// TransitionIterator

/// Cursor over the state transitions of an [`OpeningHours`]. Unlike a plain
/// iterator it can be repositioned, and exposes the state at its current
/// instant.
pub struct TransitionIterator<'a> {
    opening_hours: &'a OpeningHours,
    current: NaiveDateTime,
}

impl TransitionIterator<'_> {
    /// The instant the cursor is at.
    pub fn date(&self) -> NaiveDateTime {
        self.current
    }

    /// Reposition the cursor.
    pub fn set_date(&mut self, t: NaiveDateTime) {
        self.current = t;
    }

    pub fn is_open(&self) -> bool {
        self.opening_hours.is_open(self.current)
    }

    pub fn state_string(&self) -> &'static str {
        self.opening_hours.state_string(self.current)
    }

    pub fn comment(&self) -> Arc<str> {
        self.opening_hours.comment(self.current)
    }

    /// Move to the next state change and return it; the cursor stays put
    /// when there is none.
    pub fn advance(&mut self) -> Option<NaiveDateTime> {
        let next = self.opening_hours.next_change(self.current)?;
        self.current = next;
        Some(next)
    }
}
