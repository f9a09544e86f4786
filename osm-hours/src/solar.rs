//! Solar-time oracle. Resolves sunrise, sunset, civil dawn and civil dusk to
//! a minute of day in UTC, from a simplified declination / hour-angle model.
//!
//! Contract: polar day yields 0 for sunrise and 1440 for sunset; polar night
//! yields noon (720) for both. Civil dawn and dusk are sunrise − 30 and
//! sunset + 30 minutes. Without coordinates, fixed defaults apply
//! (06:00 / 18:00 / 05:30 / 18:30).

use std::f64::consts::PI;

use chrono::{Datelike, NaiveDate};

use osm_hours_syntax::rules::time::TimeEvent;

pub(crate) const DEFAULT_SUNRISE: i32 = 6 * 60;
pub(crate) const DEFAULT_SUNSET: i32 = 18 * 60;
pub(crate) const DEFAULT_DAWN: i32 = 5 * 60 + 30;
pub(crate) const DEFAULT_DUSK: i32 = 18 * 60 + 30;

// Coordinates

/// A validated pair of geographic coordinates.
///
/// See https://en.wikipedia.org/wiki/Geographic_coordinate_system
#[derive(Clone, Copy, Debug, PartialEq, PartialOrd)]
pub struct Coordinates {
    lat: f64,
    lon: f64,
}

impl Coordinates {
    /// Validate a pair of latitude / longitude.
    ///
    /// Return `None` if values are out of range (`abs(lat) > 90` or
    /// `abs(lon) > 180`).
    pub fn new(lat: f64, lon: f64) -> Option<Self> {
        if lat.abs() > 90.0 || lon.abs() > 180.0 {
            return None;
        }

        Some(Self { lat, lon })
    }

    /// Get latitude component.
    pub fn lat(&self) -> f64 {
        self.lat
    }

    /// Get longitude component.
    pub fn lon(&self) -> f64 {
        self.lon
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}

// Event resolution

/// Minute of day for a solar event, before any user offset is applied.
pub(crate) fn event_minutes(event: TimeEvent, date: NaiveDate, coords: Option<Coordinates>) -> i32 {
    let Some(coords) = coords else {
        return match event {
            TimeEvent::Sunrise => DEFAULT_SUNRISE,
            TimeEvent::Sunset => DEFAULT_SUNSET,
            TimeEvent::Dawn => DEFAULT_DAWN,
            TimeEvent::Dusk => DEFAULT_DUSK,
        };
    };

    match event {
        TimeEvent::Sunrise => sunrise_minutes(date, coords.lat, coords.lon),
        TimeEvent::Sunset => sunset_minutes(date, coords.lat, coords.lon),
        TimeEvent::Dawn => (sunrise_minutes(date, coords.lat, coords.lon) - 30).rem_euclid(1440),
        TimeEvent::Dusk => (sunset_minutes(date, coords.lat, coords.lon) + 30).rem_euclid(1440),
    }
}

/// Solar declination in degrees: δ = 23.45° · sin(2π · (284 + N) / 365).
fn declination(day_of_year: f64) -> f64 {
    23.45 * (2.0 * PI * (284.0 + day_of_year) / 365.0).sin()
}

/// Equation of time in minutes, accounting for the elliptical orbit.
fn equation_of_time(day_of_year: f64) -> f64 {
    let b = 2.0 * PI * (day_of_year - 81.0) / 365.0;
    9.87 * (2.0 * b).sin() - 7.53 * b.cos() - 1.5 * b.sin()
}

/// Minutes from midnight UTC for sunrise.
fn sunrise_minutes(date: NaiveDate, lat: f64, lon: f64) -> i32 {
    let day_of_year = date.ordinal() as f64;

    let lat_rad = lat * PI / 180.0;
    let dec_rad = declination(day_of_year) * PI / 180.0;

    let cos_hour_angle = -lat_rad.tan() * dec_rad.tan();

    if cos_hour_angle < -1.0 {
        // Sun never sets (midnight sun)
        return 0;
    }
    if cos_hour_angle > 1.0 {
        // Sun never rises (polar night), noon as fallback
        return 720;
    }

    let hour_angle = cos_hour_angle.acos() * 180.0 / PI;

    // Solar noon at this longitude, 4 minutes earlier per degree east.
    let solar_noon = 12.0 * 60.0 - lon * 4.0 - equation_of_time(day_of_year);

    let day_length_minutes = 2.0 * hour_angle * 4.0;
    let minutes = (solar_noon - day_length_minutes / 2.0) as i32;

    minutes.rem_euclid(1440)
}

/// Minutes from midnight UTC for sunset.
fn sunset_minutes(date: NaiveDate, lat: f64, lon: f64) -> i32 {
    let day_of_year = date.ordinal() as f64;

    let lat_rad = lat * PI / 180.0;
    let dec_rad = declination(day_of_year) * PI / 180.0;

    let cos_hour_angle = -lat_rad.tan() * dec_rad.tan();

    if cos_hour_angle < -1.0 {
        // Sun never sets (midnight sun)
        return 1440;
    }
    if cos_hour_angle > 1.0 {
        // Sun never rises (polar night), noon as fallback
        return 720;
    }

    let hour_angle = cos_hour_angle.acos() * 180.0 / PI;
    let solar_noon = 12.0 * 60.0 - lon * 4.0 - equation_of_time(day_of_year);

    let day_length_minutes = 2.0 * hour_angle * 4.0;
    let minutes = (solar_noon + day_length_minutes / 2.0) as i32;

    minutes.rem_euclid(1440)
}
