use crate::OpeningHours;

fn oh(input: &str) -> OpeningHours {
    OpeningHours::parse(input).unwrap()
}

#[test]
fn equivalent_spellings_compare_equal() {
    assert!(oh("Mo-Fr 09:00-17:00").is_equal_to(&oh("Mo,Tu,We,Th,Fr 09:00-17:00")));
    assert!(oh("Mo-Fr 09:00-17:00").is_equal_to(&oh("Montag-Freitag 09:00-17:00")));
    assert!(oh("Mo-Fr 9am-5pm").is_equal_to(&oh("Mo-Fr 09:00-17:00")));
    assert!(oh("24/7").is_equal_to(&oh("00:00-24:00")));
}

#[test]
fn different_schedules_compare_unequal() {
    assert!(!oh("Mo-Fr 09:00-17:00").is_equal_to(&oh("Mo-Fr 09:00-18:00")));
    assert!(!oh("Mo-Fr 09:00-17:00").is_equal_to(&oh("Mo-Sa 09:00-17:00")));
    assert!(!oh("Mo 10:00-12:00").is_equal_to(&oh("Mo 10:00-12:00 unknown")));
    assert!(!oh("Mo 10:00-12:00 \"a\"").is_equal_to(&oh("Mo 10:00-12:00 \"b\"")));
}

#[test]
fn prettified_form_is_semantically_equal() {
    for input in [
        "Mo-Fr 09:00-17:00; We 12:00-18:00",
        "Su-Tu 11:00-01:00, We-Th 11:00-03:00",
        "Mo-Fr 09:00-17:00 unknown || Mo-Fr 10:00-16:00",
        "22:00-02:00",
        "Sa-Mo 10:00-12:00",
        "17:00+",
    ] {
        let parsed = oh(input);
        let reparsed = oh(&parsed.to_string());

        assert!(parsed.is_equal_to(&reparsed), "prettify changed {input:?}");
    }
}

#[test]
fn week_stability() {
    assert!(oh("Mo-Fr 09:00-17:00").is_week_stable());
    assert!(oh("24/7").is_week_stable());
    assert!(oh("Jan-Dec 10:00-12:00").is_week_stable());
    assert!(oh("22:00-02:00").is_week_stable());

    assert!(!oh("2024 Mo-Fr 09:00-17:00").is_week_stable());
    assert!(!oh("week 01-53/2 Sa 10:00-14:00").is_week_stable());
    assert!(!oh("Jan 10:00-12:00").is_week_stable());
    assert!(!oh("We[4] 10:00-12:00").is_week_stable());
    assert!(!oh("PH off").is_week_stable());
    assert!(!oh("SH 10:00-16:00").is_week_stable());
    assert!(!oh("easter 10:00-14:00").is_week_stable());

    // Fallback rules count too.
    assert!(!oh("Mo-Fr 09:00-17:00 unknown || PH 10:00-14:00").is_week_stable());
}
