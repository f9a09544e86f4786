use crate::{datetime, OpeningHours};

#[test]
fn simple_weekday_rule() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();

    // 2024-01-15 is a Monday, 2024-01-20 a Saturday.
    assert!(oh.is_open(datetime!("2024-01-15 10:00")));
    assert!(!oh.is_open(datetime!("2024-01-20 10:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 08:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 18:00")));
}

#[test]
fn universal_rules() {
    let always = OpeningHours::parse("24/7").unwrap();
    assert!(always.is_open(datetime!("2024-01-15 03:00")));
    assert!(always.is_open(datetime!("2024-06-30 23:59")));

    let never = OpeningHours::parse("off").unwrap();
    assert!(!never.is_open(datetime!("2024-01-15 03:00")));
    assert!(!never.is_unknown(datetime!("2024-01-15 03:00")));
}

#[test]
fn later_rule_overrides_earlier_day() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; We 12:00-18:00").unwrap();

    // 2024-01-17 is a Wednesday: the later rule owns the whole day.
    assert!(!oh.is_open(datetime!("2024-01-17 10:00")));
    assert!(oh.is_open(datetime!("2024-01-17 13:00")));
    assert!(oh.is_open(datetime!("2024-01-17 17:30")));
    assert!(!oh.is_open(datetime!("2024-01-17 18:00")));

    // Other weekdays still follow the base rule.
    assert!(oh.is_open(datetime!("2024-01-15 10:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 17:30")));
}

#[test]
fn off_rule_only_applies_inside_its_window() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; Mo 15:00-16:00 off").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 10:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 15:30")));
    assert!(oh.is_open(datetime!("2024-01-15 16:30")));
}

#[test]
fn day_rule_without_times_covers_whole_day() {
    let oh = OpeningHours::parse("Mo-We; Tu off").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 03:00")));
    assert!(!oh.is_open(datetime!("2024-01-16 12:00")));
    assert!(oh.is_open(datetime!("2024-01-17 23:00")));
    assert!(!oh.is_open(datetime!("2024-01-18 12:00")));
}

#[test]
fn comma_grouped_rules_do_not_override_each_other() {
    let oh = OpeningHours::parse("Mo-Fr 10:00-16:00, We 12:00-18:00").unwrap();

    // Wednesday morning is covered by the first sibling of the group.
    assert!(oh.is_open(datetime!("2024-01-17 11:00")));
    assert!(oh.is_open(datetime!("2024-01-17 17:00")));
    assert!(!oh.is_open(datetime!("2024-01-17 09:00")));
    assert!(!oh.is_open(datetime!("2024-01-17 18:30")));
}

#[test]
fn extended_midnight_continuation() {
    let oh = OpeningHours::parse("Su-Tu 11:00-01:00, We-Th 11:00-03:00").unwrap();

    // 2024-01-17 is a Wednesday; Tuesday's night extends to 03:00 because
    // Wednesday belongs to the We-Th sibling.
    assert!(oh.is_open(datetime!("2024-01-17 02:00")));
    assert!(!oh.is_open(datetime!("2024-01-17 03:30")));
    assert!(oh.is_open(datetime!("2024-01-17 12:00")));

    // Tuesday's own small hours still follow the Su-Tu range.
    assert!(oh.is_open(datetime!("2024-01-16 00:30")));
}

#[test]
fn state_string() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();
    assert_eq!(oh.state_string(datetime!("2024-01-15 10:00")), "open");
    assert_eq!(oh.state_string(datetime!("2024-01-15 18:00")), "closed");

    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00 unknown").unwrap();
    assert_eq!(oh.state_string(datetime!("2024-01-15 10:00")), "unknown");
    assert_eq!(oh.state_string(datetime!("2024-01-15 18:00")), "closed");
}

#[test]
fn comments() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00 \"by appointment\"").unwrap();

    assert_eq!(&*oh.comment(datetime!("2024-01-15 10:00")), "by appointment");
    assert_eq!(&*oh.comment(datetime!("2024-01-20 10:00")), "");
}

#[test]
fn matching_rule_index() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00; We 12:00-18:00").unwrap();

    assert_eq!(oh.matching_rule(datetime!("2024-01-15 10:00")), Some(0));
    assert_eq!(oh.matching_rule(datetime!("2024-01-17 13:00")), Some(1));
    assert_eq!(oh.matching_rule(datetime!("2024-01-20 10:00")), None);

    // The later rule wins when both match.
    let oh = OpeningHours::parse("Mo 09:00-17:00; Mo 10:00-12:00").unwrap();
    assert_eq!(oh.matching_rule(datetime!("2024-01-15 11:00")), Some(1));
}

#[test]
fn warnings_are_reachable() {
    let oh = OpeningHours::parse("10-12").unwrap();
    assert_eq!(oh.warnings(), &[crate::Warning::AbbreviatedTimeFormat]);
}
