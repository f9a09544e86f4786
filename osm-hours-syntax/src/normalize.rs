//! Lexical normalisation pass applied once before the grammar runs. It only
//! rewrites tolerated spellings into their canonical form and never changes
//! the meaning of an expression.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::rules::day::Month;
use crate::rules::Warning;

static TO_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+to\s+").unwrap());
static THROUGH_SEPARATOR: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\s+through\s+").unwrap());
static DOTTED_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(\d{1,2})\.(\d{2})\b").unwrap());
static SHORT_TIME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(\d{1,2})-(\d{1,2})$").unwrap());

static AM_PM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)(\d{1,2})(?::(\d{2}))?\s*([ap])\.?m\.?").unwrap());

/// Rewrite `raw` into the canonical lexical form understood by the grammar.
///
/// Quoted comments are preserved byte for byte: only the segments outside of
/// `"…"` pairs are transformed.
pub fn normalize(raw: &str) -> (String, Vec<Warning>) {
    let mut warnings = Vec::new();
    let mut out = String::with_capacity(raw.len());

    for (idx, segment) in raw.split('"').enumerate() {
        if idx > 0 {
            out.push('"');
        }

        if idx % 2 == 0 {
            out.push_str(&normalize_segment(segment, &mut warnings));
        } else {
            out.push_str(segment);
        }
    }

    (out, warnings)
}

fn normalize_segment(segment: &str, warnings: &mut Vec<Warning>) -> String {
    // U+2013, U+2014 and U+2212 all mean a plain dash here.
    let folded = segment.replace(['\u{2013}', '\u{2014}', '\u{2212}'], "-");

    let folded = TO_SEPARATOR.replace_all(&folded, "-");
    let folded = THROUGH_SEPARATOR.replace_all(&folded, "-");

    // `10.00` → `10:00`, before abbreviated times are expanded.
    let folded = DOTTED_TIME.replace_all(&folded, "$1:$2");

    let folded = expand_short_times(&folded, warnings);

    AM_PM
        .replace_all(&folded, |caps: &Captures| {
            let mut hour: u32 = caps[1].parse().expect("invalid am/pm hour");

            let minute: u32 = caps
                .get(2)
                .map(|m| m.as_str().parse().expect("invalid am/pm minute"))
                .unwrap_or(0);

            if caps[3].eq_ignore_ascii_case("p") {
                if hour != 12 {
                    hour += 12;
                }
            } else if hour == 12 {
                hour = 0;
            }

            format!("{}:{:02}", hour, minute)
        })
        .into_owned()
}

/// Expand bare `H-H` tokens into `HH:00-HH:00`, except after `week` (week
/// ranges) and after month names (day ranges such as `Jan 01-15`).
fn expand_short_times(s: &str, warnings: &mut Vec<Warning>) -> String {
    let mut out = Vec::new();
    let mut prev: Option<&str> = None;

    for token in s.split_whitespace() {
        let prev_is_range_head = prev
            .map(|p| p.eq_ignore_ascii_case("week") || Month::from_name(p).is_some())
            .unwrap_or(false);

        let expanded = match SHORT_TIME.captures(token) {
            Some(caps) if !prev_is_range_head => {
                let start: u8 = caps[1].parse().expect("invalid abbreviated hour");
                let end: u8 = caps[2].parse().expect("invalid abbreviated hour");

                if start <= 24 && end <= 24 {
                    if !warnings.contains(&Warning::AbbreviatedTimeFormat) {
                        warnings.push(Warning::AbbreviatedTimeFormat);
                    }

                    Some(format!("{}:00-{}:00", start, end))
                } else {
                    None
                }
            }
            _ => None,
        };

        out.push(expanded.unwrap_or_else(|| token.to_string()));
        prev = Some(token);
    }

    let mut joined = out.join(" ");

    // Keep the boundary spaces so segments rejoin cleanly around comments.
    if s.starts_with(char::is_whitespace) {
        joined.insert(0, ' ');
    }
    if s.ends_with(char::is_whitespace) {
        joined.push(' ');
    }

    joined
}
