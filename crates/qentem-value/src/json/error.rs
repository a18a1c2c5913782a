use std::fmt;

/// Failure parsing a JSON document. Unlike path lookup and template
/// rendering, JSON parsing is a hard boundary with the outside world — a
/// malformed document is a caller error, not something to paper over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonError {
    UnexpectedEnd,
    UnexpectedToken { offset: usize },
    InvalidNumber { offset: usize },
    InvalidEscape { offset: usize },
    TrailingData { offset: usize },
}

impl fmt::Display for JsonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedEnd => write!(f, "unexpected end of input"),
            Self::UnexpectedToken { offset } => write!(f, "unexpected token at byte {offset}"),
            Self::InvalidNumber { offset } => write!(f, "invalid number at byte {offset}"),
            Self::InvalidEscape { offset } => write!(f, "invalid escape sequence at byte {offset}"),
            Self::TrailingData { offset } => write!(f, "trailing data after document at byte {offset}"),
        }
    }
}

impl std::error::Error for JsonError {}
