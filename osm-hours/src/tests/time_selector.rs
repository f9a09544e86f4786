use crate::{datetime, OpeningHours};

#[test]
fn range_is_start_inclusive_end_exclusive() {
    let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 09:00")));
    assert!(oh.is_open(datetime!("2024-01-15 16:59")));
    assert!(!oh.is_open(datetime!("2024-01-15 17:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 08:59")));
}

#[test]
fn midnight_spanning_range() {
    let oh = OpeningHours::parse("22:00-02:00").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 23:00")));
    assert!(oh.is_open(datetime!("2024-01-16 01:30")));
    assert!(!oh.is_open(datetime!("2024-01-16 02:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 21:00")));
}

#[test]
fn midnight_spanning_with_weekdays() {
    let oh = OpeningHours::parse("Fr-Sa 20:00-02:00").unwrap();

    // Friday and Saturday nights, spilling into the following days.
    assert!(oh.is_open(datetime!("2024-01-19 23:00")));
    assert!(oh.is_open(datetime!("2024-01-20 01:00")));
    assert!(oh.is_open(datetime!("2024-01-21 01:00")));
    assert!(!oh.is_open(datetime!("2024-01-22 01:00")));
    assert!(!oh.is_open(datetime!("2024-01-18 23:00")));
}

#[test]
fn extended_hours_reach_the_next_day() {
    let oh = OpeningHours::parse("Fr-Sa 20:00-26:00").unwrap();

    assert!(oh.is_open(datetime!("2024-01-19 23:00")));
    assert!(oh.is_open(datetime!("2024-01-20 01:59")));
    assert!(!oh.is_open(datetime!("2024-01-20 02:00")));
    assert!(oh.is_open(datetime!("2024-01-21 01:00")));
}

#[test]
fn open_ended_range() {
    let oh = OpeningHours::parse("17:00+").unwrap();

    assert!(!oh.is_open(datetime!("2024-01-15 16:59")));
    assert!(oh.is_open(datetime!("2024-01-15 17:00")));
    assert!(oh.is_open(datetime!("2024-01-15 23:59")));

    let oh = OpeningHours::parse("14:00-17:00+").unwrap();
    assert!(oh.is_open(datetime!("2024-01-15 14:00")));
    assert!(oh.is_open(datetime!("2024-01-15 20:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 13:00")));
}

#[test]
fn point_in_time() {
    let oh = OpeningHours::parse("10:00").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 10:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 10:01")));
    assert!(!oh.is_open(datetime!("2024-01-15 09:59")));
}

#[test]
fn periodic_interval_alternates_slots() {
    let oh = OpeningHours::parse("10:00-16:00/01:30").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 10:30")));
    assert!(!oh.is_open(datetime!("2024-01-15 12:00")));
    assert!(oh.is_open(datetime!("2024-01-15 13:30")));
    assert!(!oh.is_open(datetime!("2024-01-15 15:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 16:30")));
}

#[test]
fn multiple_ranges_in_one_rule() {
    let oh = OpeningHours::parse("Mo-Fr 08:00-12:00,14:00-18:00").unwrap();

    assert!(oh.is_open(datetime!("2024-01-15 09:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 13:00")));
    assert!(oh.is_open(datetime!("2024-01-15 15:00")));
    assert!(!oh.is_open(datetime!("2024-01-15 18:30")));
}

#[test]
fn variable_times_use_documented_defaults() {
    // Without coordinates: sunrise 06:00, sunset 18:00.
    let oh = OpeningHours::parse("sunrise-sunset").unwrap();

    assert!(oh.is_open(datetime!("2024-06-21 12:00")));
    assert!(!oh.is_open(datetime!("2024-06-21 05:00")));
    assert!(!oh.is_open(datetime!("2024-06-21 19:00")));

    // Dawn 05:30, dusk 18:30.
    let oh = OpeningHours::parse("dawn-dusk").unwrap();
    assert!(oh.is_open(datetime!("2024-06-21 05:30")));
    assert!(oh.is_open(datetime!("2024-06-21 18:00")));
    assert!(!oh.is_open(datetime!("2024-06-21 18:30")));
}

#[test]
fn variable_times_with_offsets() {
    let oh = OpeningHours::parse("(sunrise+01:00)-(sunset-01:00)").unwrap();

    assert!(!oh.is_open(datetime!("2024-06-21 06:30")));
    assert!(oh.is_open(datetime!("2024-06-21 07:00")));
    assert!(oh.is_open(datetime!("2024-06-21 16:59")));
    assert!(!oh.is_open(datetime!("2024-06-21 17:00")));
}

#[test]
fn variable_times_with_coordinates() {
    use crate::{Context, Coordinates};

    // Berlin in June: the sun is up well before 06:00 UTC.
    let oh = OpeningHours::parse("sunrise-sunset")
        .unwrap()
        .with_context(Context::default().with_coords(Coordinates::new(52.52, 13.405).unwrap()));

    assert!(oh.is_open(datetime!("2024-06-21 05:00")));
    assert!(oh.is_open(datetime!("2024-06-21 15:00")));
    assert!(!oh.is_open(datetime!("2024-06-21 23:00")));
    assert!(!oh.is_open(datetime!("2024-06-21 02:00")));
}
