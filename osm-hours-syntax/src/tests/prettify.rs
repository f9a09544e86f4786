use crate::parser::parse;

fn prettify(input: &str) -> String {
    parse(input).unwrap().to_string()
}

#[test]
fn canonical_special_forms() {
    assert_eq!(prettify("24/7"), "24/7");
    assert_eq!(prettify("open"), "24/7");
    assert_eq!(prettify("off"), "off");
    assert_eq!(prettify("closed"), "off");
    assert_eq!(prettify("00:00-24:00"), "24/7");
}

#[test]
fn canonical_times_and_days() {
    assert_eq!(prettify("mo-fr 9:00-17:00"), "Mo-Fr 09:00-17:00");
    assert_eq!(prettify("Montag-Freitag 09:00-17:00"), "Mo-Fr 09:00-17:00");
    assert_eq!(prettify("Mo,Tu,We,Th,Fr 09:00-17:00"), "Mo-Fr 09:00-17:00");
}

#[test]
fn three_day_runs_are_enumerated() {
    assert_eq!(prettify("Mo-We 10:00-12:00"), "Mo,Tu,We 10:00-12:00");
    assert_eq!(prettify("Sa-Mo 10:00-12:00"), "Sa,Su,Mo 10:00-12:00");
}

#[test]
fn short_runs_keep_the_range_form() {
    assert_eq!(prettify("Sa-Su 10:00-12:00"), "Sa-Su 10:00-12:00");
}

#[test]
fn modifiers_and_comments() {
    assert_eq!(prettify("Mo 10:00-12:00 closed"), "Mo 10:00-12:00 off");
    assert_eq!(prettify("Mo 10:00-12:00 unknown"), "Mo 10:00-12:00 unknown");
    assert_eq!(
        prettify("Mo 10:00-12:00 \"by appointment\""),
        "Mo 10:00-12:00 \"by appointment\""
    );
}

#[test]
fn rule_separators_survive() {
    assert_eq!(
        prettify("Mo-Fr 09:00-17:00;We 12:00-18:00"),
        "Mo-Fr 09:00-17:00; We 12:00-18:00"
    );

    assert_eq!(
        prettify("Su-Tu 11:00-01:00, We-Th 11:00-03:00"),
        "Su,Mo,Tu 11:00-01:00, We-Th 11:00-03:00"
    );

    assert_eq!(
        prettify("Mo-Fr 09:00-17:00 unknown || Mo-Fr 10:00-16:00"),
        "Mo-Fr 09:00-17:00 unknown || Mo-Fr 10:00-16:00"
    );
}

#[test]
fn wide_selectors_survive() {
    assert_eq!(prettify("2020-2030/2 Sa 10:00-14:00"), "2020-2030/2 Sa 10:00-14:00");
    assert_eq!(prettify("2020+ Sa 10:00-14:00"), "2020+ Sa 10:00-14:00");
    assert_eq!(prettify("week 01-53/2 Sa 10:00-14:00"), "week 01-53/2 Sa 10:00-14:00");
    assert_eq!(prettify("Jan 01-15 10:00-18:00"), "Jan 01-15 10:00-18:00");
    assert_eq!(prettify("Dec 24-Jan 02 off"), "Dec 24-Jan 02 off");
    assert_eq!(prettify("Nov-Feb 10:00-16:00"), "Nov-Feb 10:00-16:00");
    assert_eq!(
        prettify("easter -2 days-easter +1 day off"),
        "easter -2 days-easter +1 day off"
    );
    assert_eq!(prettify("PH +1 day off"), "PH +1 day off");
}

#[test]
fn times_survive() {
    assert_eq!(prettify("17:00+"), "17:00+");
    assert_eq!(prettify("Fr-Sa 20:00-26:00"), "Fr-Sa 20:00-26:00");
    assert_eq!(prettify("10:00-16:00/01:30"), "10:00-16:00/01:30");
    assert_eq!(prettify("sunrise-sunset"), "sunrise-sunset");
    assert_eq!(
        prettify("(sunrise+01:00)-(sunset-01:00)"),
        "(sunrise+01:00)-(sunset-01:00)"
    );
}

#[test]
fn prettified_output_reparses() {
    for input in [
        "Mo-Fr 09:00-17:00; We 12:00-18:00",
        "Su-Tu 11:00-01:00, We-Th 11:00-03:00",
        "week 01-53/2 Sa 10:00-14:00",
        "Mo-Fr 09:00-17:00 unknown || Mo-Fr 10:00-16:00",
        "easter -2 days-easter +1 day off",
        "Jan 01-15 10:00-18:00",
        "PH +1 day off",
        "We[4,5] 10:00-12:00",
        "17:00+",
    ] {
        let first = parse(input).unwrap();
        let second = parse(&first.to_string()).unwrap();

        assert_eq!(first.rules, second.rules, "for input {input:?}");
        assert_eq!(
            first.fallback_groups, second.fallback_groups,
            "for input {input:?}"
        );
    }
}
