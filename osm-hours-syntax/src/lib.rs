//! Parsing component of the [osm-hours] crate.
//!
//!
//! Usage
//! -----
//!
//! Add this to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! osm-hours-syntax = "0.1"
//! ```
//!
//! And then a basic usage would look like that:
//!
//! ```rust
//! use osm_hours_syntax::parse;
//!
//! // Opens until 18pm during the week and until 12pm the week-end.
//! const OH: &str = "Mo-Fr 10:00-18:00; Sa-Su 10:00-12:00";
//!
//! fn main() {
//!     let expr = parse(&OH).unwrap();
//!     eprintln!("{:?}", expr);
//! }
//! ```
//!
//!
//!
//! [osm-hours]: https://crates.io/crates/osm-hours
//!     "Root Package"

#[macro_use]
extern crate pest_derive;

pub mod error;
pub mod extended_time;
pub mod normalize;
pub mod rules;

mod display;
mod parser;

#[cfg(test)]
mod tests;

pub use crate::error::{Error, Result};
pub use crate::parser::parse;
pub use crate::rules::{OpeningHoursExpression, RuleKind, Warning};
