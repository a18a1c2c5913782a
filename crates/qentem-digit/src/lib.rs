//! `Digit`: bidirectional conversion between textual numerals and Qentem's
//! numeric variants (`UInt64`, `Int64`, `Real64`).
//!
//! Parsing (`StringToNumber`) picks the narrowest variant that fits a plain
//! integer literal and falls back to `Real64` once a fractional part,
//! exponent, or overflow is involved. The slow path for exact decimal text
//! reaches for [`qentem_bigint::BigUInt`] rather than doing inexact
//! floating-point accumulation.

mod error;
mod format;
mod parse;

pub use error::DigitError;
pub use format::{format_integer, format_real, format_unsigned, RealFormat};
pub use parse::{parse_hex, parse_number, Number};
