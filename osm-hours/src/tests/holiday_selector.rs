use chrono::{Datelike, NaiveDate};

use crate::{datetime, Context, OpeningHours};

/// 2024-01-01 as the only public holiday.
fn new_year_only() -> Context {
    Context::default().with_public_holidays(|date: NaiveDate| {
        date == NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    })
}

/// July and August as school holidays.
fn summer_school_break() -> Context {
    Context::default().with_school_holidays(|date: NaiveDate| date.month() == 7 || date.month() == 8)
}

#[test]
fn ph_off_overrides_weekday_rules() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; PH off")
        .unwrap()
        .with_context(new_year_only());

    // 2024-01-01 is a Monday and a holiday.
    assert!(!oh.is_open(datetime!("2024-01-01 12:00")));
    assert!(oh.is_open(datetime!("2024-01-02 12:00")));
}

#[test]
fn ph_rules_without_oracle_never_match() {
    let oh = OpeningHours::parse("PH 10:00-16:00").unwrap();

    assert!(!oh.is_open(datetime!("2024-01-01 12:00")));

    // Plain rules are unaffected by the missing oracle.
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; PH off").unwrap();
    assert!(oh.is_open(datetime!("2024-01-01 12:00")));
}

#[test]
fn ph_open_rule() {
    let oh = OpeningHours::parse("PH 10:00-16:00")
        .unwrap()
        .with_context(new_year_only());

    assert!(oh.is_open(datetime!("2024-01-01 12:00")));
    assert!(!oh.is_open(datetime!("2024-01-01 09:00")));
    assert!(!oh.is_open(datetime!("2024-01-02 12:00")));
}

#[test]
fn ph_offset_claims_the_neighbouring_day() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; PH +1 day 10:00-14:00")
        .unwrap()
        .with_context(new_year_only());

    // 2024-01-02 is the day after the holiday: only the offset rule runs.
    assert!(oh.is_open(datetime!("2024-01-02 11:00")));
    assert!(!oh.is_open(datetime!("2024-01-02 09:30")));
    assert!(!oh.is_open(datetime!("2024-01-02 15:00")));

    // The offset rule never triggers on the holiday itself.
    assert!(!oh.is_open(datetime!("2024-01-01 11:00")));

    // Two days later the ordinary rule applies again.
    assert!(oh.is_open(datetime!("2024-01-03 09:30")));
}

#[test]
fn ph_in_weekday_list() {
    // A weekday list with `PH` narrows the holiday rule to those days.
    // New Year 2023 fell on a Sunday.
    let oh = OpeningHours::parse("Mo-Su 10:00-16:00; Su,PH off")
        .unwrap()
        .with_context(Context::default().with_public_holidays(|date: NaiveDate| {
            date == NaiveDate::from_ymd_opt(2023, 1, 1).unwrap()
        }));

    assert!(!oh.is_open(datetime!("2023-01-01 12:00")));
    assert!(oh.is_open(datetime!("2023-01-08 12:00")));
    assert!(oh.is_open(datetime!("2023-01-02 12:00")));
}

#[test]
fn sh_rules_require_the_oracle() {
    let oh = OpeningHours::parse("SH 10:00-16:00").unwrap();
    assert!(!oh.is_open(datetime!("2024-07-15 12:00")));

    let oh = oh.with_context(summer_school_break());
    assert!(oh.is_open(datetime!("2024-07-15 12:00")));
    assert!(!oh.is_open(datetime!("2024-03-11 12:00")));
}

#[test]
fn sh_rules_override_ordinary_rules() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; SH 10:00-16:00")
        .unwrap()
        .with_context(summer_school_break());

    // 2024-07-15 is a Monday inside the school break.
    assert!(!oh.is_open(datetime!("2024-07-15 09:30")));
    assert!(oh.is_open(datetime!("2024-07-15 10:30")));

    // Outside the break the ordinary rule applies.
    assert!(oh.is_open(datetime!("2024-03-11 09:30")));
}
