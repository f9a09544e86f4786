use std::ops::Range;

use crate::extended_time::ExtendedTime;

// TimeSelector

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TimeSelector {
    pub time: Vec<TimeSpan>,
}

impl TimeSelector {
    #[inline]
    pub fn new(time: Vec<TimeSpan>) -> Self {
        Self { time }
    }
}

// TimeSpan

/// A single schedule entry. `open_end` marks the `+` suffix ("at least
/// until end, possibly longer"); its effective end is already fixed to
/// 24:00 by the parser. `repeats` alternates open and closed slots of the
/// given size (in minutes) within the range.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TimeSpan {
    pub range: Range<Time>,
    pub open_end: bool,
    pub repeats: Option<u16>,
}

impl TimeSpan {
    #[inline]
    pub fn fixed_range(start: ExtendedTime, end: ExtendedTime) -> Self {
        Self {
            range: Time::Fixed(start)..Time::Fixed(end),
            open_end: false,
            repeats: None,
        }
    }
}

// Time

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Time {
    Fixed(ExtendedTime),
    Variable(VariableTime),
}

// VariableTime

/// A solar event with a signed offset in minutes, resolved at evaluation
/// time against the configured coordinates (or documented defaults).
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct VariableTime {
    pub event: TimeEvent,
    pub offset: i16,
}

// TimeEvent

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum TimeEvent {
    Dawn,
    Sunrise,
    Sunset,
    Dusk,
}

impl TimeEvent {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Dawn => "dawn",
            Self::Sunrise => "sunrise",
            Self::Sunset => "sunset",
            Self::Dusk => "dusk",
        }
    }
}
