//! Evaluate [OpenStreetMap `opening_hours`] expressions.
//!
//! The companion crate `osm-hours-syntax` parses the raw expression; this
//! crate answers queries against the parsed value: open / closed / unknown
//! state at an instant, comments, next state change, open intervals and
//! cumulative durations.
//!
//! ```
//! use chrono::NaiveDateTime;
//! use osm_hours::OpeningHours;
//!
//! let oh = OpeningHours::parse("Mo-Fr 09:00-17:00").unwrap();
//! let date = NaiveDateTime::parse_from_str("2024-01-15 10:00", "%Y-%m-%d %H:%M").unwrap();
//! assert!(oh.is_open(date));
//! ```
//!
//! [OpenStreetMap `opening_hours`]: https://wiki.openstreetmap.org/wiki/Key:opening_hours

pub mod context;
pub mod error;
pub mod filter;
pub mod opening_hours;
pub mod solar;

mod utils;

#[cfg(test)]
mod tests;

// Public re-exports
pub use crate::context::{Context, HolidayPredicate};
pub use crate::error::ParserError;
pub use crate::opening_hours::{OpeningHours, TransitionIterator};
pub use crate::solar::Coordinates;
pub use crate::utils::range::DateTimeRange;
pub use osm_hours_syntax::rules::{RuleKind, Warning};
