use std::convert::TryInto;
use std::fmt;

use chrono::{NaiveTime, Timelike};

/// A minute-of-day time which may legally exceed 24:00, as ranges such as
/// `Fr 20:00-26:00` encode "until 02:00 the next day".
#[derive(Clone, Copy, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct ExtendedTime {
    hour: u8,
    minute: u8,
}

impl fmt::Debug for ExtendedTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "{}:{:02}", self.hour, self.minute)
    }
}

impl fmt::Display for ExtendedTime {
    fn fmt(&self, f: &mut fmt::Formatter) -> std::result::Result<(), fmt::Error> {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl ExtendedTime {
    pub const MIDNIGHT_00: Self = Self { hour: 0, minute: 0 };
    pub const MIDNIGHT_24: Self = Self { hour: 24, minute: 0 };

    #[inline]
    pub fn new(hour: u8, minute: u8) -> Option<Self> {
        if minute >= 60 {
            return None;
        }

        Some(Self { hour, minute })
    }

    #[inline]
    pub fn hour(self) -> u8 {
        self.hour
    }

    #[inline]
    pub fn minute(self) -> u8 {
        self.minute
    }

    #[inline]
    pub fn add_minutes(self, minutes: i16) -> Option<Self> {
        let as_minutes = i16::try_from(self.mins_from_midnight()).ok()? + minutes;
        Self::from_mins_from_midnight(as_minutes.try_into().ok()?)
    }

    #[inline]
    pub fn from_mins_from_midnight(minute: u16) -> Option<Self> {
        let hour = (minute / 60).try_into().ok()?;
        let minute = (minute % 60) as u8;
        Some(Self { hour, minute })
    }

    #[inline]
    pub fn mins_from_midnight(self) -> u16 {
        u16::from(self.minute) + 60 * u16::from(self.hour)
    }
}

impl TryInto<NaiveTime> for ExtendedTime {
    type Error = ();

    #[inline]
    fn try_into(self) -> std::result::Result<NaiveTime, Self::Error> {
        NaiveTime::from_hms_opt(self.hour.into(), self.minute.into(), 0).ok_or(())
    }
}

impl From<NaiveTime> for ExtendedTime {
    #[inline]
    fn from(time: NaiveTime) -> ExtendedTime {
        Self {
            hour: time.hour().try_into().expect("invalid NaiveTime"),
            minute: time.minute().try_into().expect("invalid NaiveTime"),
        }
    }
}
