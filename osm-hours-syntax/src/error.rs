use std::fmt;

use crate::parser::Rule;

pub type Result<T> = std::result::Result<T, Error>;

/// Fatal parse failure. No partial value is ever produced; non-fatal
/// findings are accumulated as [`crate::rules::Warning`] instead.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    /// Input was empty or whitespace-only.
    Empty,
    /// Input does not conform to the grammar.
    Syntax {
        /// Byte offset into the normalised input, when known.
        position: Option<usize>,
        detail: String,
    },
    /// A numeric component is outside of its legal domain.
    OutOfRange {
        value: String,
        expected: &'static str,
    },
    /// A state that the grammar should make impossible.
    Internal(&'static str),
}

impl From<pest::error::Error<Rule>> for Error {
    fn from(pest_err: pest::error::Error<Rule>) -> Self {
        let position = match pest_err.location {
            pest::error::InputLocation::Pos(pos) => Some(pos),
            pest::error::InputLocation::Span((start, _)) => Some(start),
        };

        Self::Syntax { position, detail: pest_err.variant.message().to_string() }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => write!(f, "empty opening hours"),
            Self::Syntax { position: Some(pos), detail } => {
                write!(f, "syntax error at offset {}: {}", pos, detail)
            }
            Self::Syntax { position: None, detail } => write!(f, "syntax error: {}", detail),
            Self::OutOfRange { value, expected } => {
                write!(f, "{} is out of range: expected {}", value, expected)
            }
            Self::Internal(desc) => write!(f, "internal parser error: {}", desc),
        }
    }
}

impl std::error::Error for Error {}
