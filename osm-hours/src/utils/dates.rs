use chrono::{Datelike, Months, NaiveDate};

pub(crate) fn count_days_in_month(date: NaiveDate) -> u8 {
    let Some(date_next_month) = date.checked_add_months(Months::new(1)) else {
        // December of last supported year
        return 31;
    };

    let first_this_month = date
        .with_day(1)
        .expect("first of the month should always exist");

    let first_next_month = date_next_month
        .with_day(1)
        .expect("first of the month should always exist");

    (first_next_month - first_this_month)
        .num_days()
        .try_into()
        .expect("time not monotonic while comparing dates")
}

/// Which occurrence of its weekday this date is within the month (1 = first).
pub(crate) fn nth_weekday_of_month(date: NaiveDate) -> i8 {
    ((date.day() as i8 - 1) / 7) + 1
}

/// Occurrence counted from the end of the month (1 = last).
pub(crate) fn nth_weekday_from_end(date: NaiveDate) -> i8 {
    ((count_days_in_month(date) as i8 - date.day() as i8) / 7) + 1
}

/// Easter Sunday for a Gregorian year, by the anonymous Gregorian algorithm.
pub(crate) fn easter_sunday(year: i32) -> NaiveDate {
    let a = year % 19;
    let b = year / 100;
    let c = year % 100;
    let d = b / 4;
    let e = b % 4;
    let f = (b + 8) / 25;
    let g = (b - f + 1) / 3;
    let h = (19 * a + b - d - g + 15) % 30;
    let i = c / 4;
    let k = c % 4;
    let l = (32 + 2 * e + 2 * i - h - k) % 7;
    let m = (a + 11 * h + 22 * l) / 451;
    let month = (h + l - 7 * m + 114) / 31;
    let day = (h + l - 7 * m + 114) % 31 + 1;

    NaiveDate::from_ymd_opt(year, month as u32, day as u32).expect("easter date out of range")
}
