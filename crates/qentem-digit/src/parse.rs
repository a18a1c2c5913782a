//! `StringToNumber`: decimal and hexadecimal numeral parsing.

use qentem_bigint::{BigUInt, DIGIT_LIMBS};

use crate::DigitError;

/// The three numeric variants a textual numeral can resolve to.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Number {
    UInt(u64),
    Int(i64),
    Real(f64),
}

/// Exact powers of ten representable without rounding error in an `f64`
/// (`10^22` is the largest such power). Used by the fast path.
const POW10: [f64; 23] = [
    1e0, 1e1, 1e2, 1e3, 1e4, 1e5, 1e6, 1e7, 1e8, 1e9, 1e10, 1e11, 1e12, 1e13, 1e14, 1e15, 1e16, 1e17, 1e18, 1e19,
    1e20, 1e21, 1e22,
];

/// Parses a numeral at the start of `input`, returning the resolved number
/// and the number of bytes consumed.
///
/// Grammar: optional sign, digits, optional `.digits`, optional
/// `e|E[+-]?digits`. A bare sign, a `.`/`e` with nothing after it, or a
/// leading zero followed by more digits (other than `0.` or `0` alone) are
/// failures. Out-of-range exponents are failures too — this function never
/// returns `inf`/`nan`.
pub fn parse_number(input: &[u8]) -> Result<(Number, usize), DigitError> {
    let mut i = 0usize;
    let negative = match input.first() {
        Some(b'+') => {
            i += 1;
            false
        }
        Some(b'-') => {
            i += 1;
            true
        }
        _ => false,
    };

    let int_start = i;
    while i < input.len() && input[i].is_ascii_digit() {
        i += 1;
    }
    let int_digits = &input[int_start..i];
    if int_digits.is_empty() {
        return Err(DigitError::Malformed);
    }
    if int_digits.len() > 1 && int_digits[0] == b'0' {
        return Err(DigitError::Malformed);
    }

    let mut frac_digits: &[u8] = &[];
    if i < input.len() && input[i] == b'.' {
        i += 1;
        let frac_start = i;
        while i < input.len() && input[i].is_ascii_digit() {
            i += 1;
        }
        if i == frac_start {
            return Err(DigitError::Malformed);
        }
        frac_digits = &input[frac_start..i];
    }

    let mut explicit_exp: i64 = 0;
    let mut has_exp = false;
    if i < input.len() && (input[i] == b'e' || input[i] == b'E') {
        has_exp = true;
        let mut j = i + 1;
        let exp_negative = match input.get(j) {
            Some(b'+') => {
                j += 1;
                false
            }
            Some(b'-') => {
                j += 1;
                true
            }
            _ => false,
        };
        let exp_digit_start = j;
        while j < input.len() && input[j].is_ascii_digit() {
            j += 1;
        }
        if j == exp_digit_start {
            return Err(DigitError::Malformed);
        }
        let mut value: i64 = 0;
        for &byte in &input[exp_digit_start..j] {
            value = (value * 10 + i64::from(byte - b'0')).min(100_000);
        }
        explicit_exp = if exp_negative { -value } else { value };
        i = j;
    }

    let consumed = i;

    if frac_digits.is_empty() && !has_exp {
        if let Some(value) = parse_digits_u64(int_digits) {
            if !negative {
                return Ok((Number::UInt(value), consumed));
            }
            if value <= i64::MAX as u64 + 1 {
                let signed = if value == i64::MAX as u64 + 1 { i64::MIN } else { -(value as i64) };
                return Ok((Number::Int(signed), consumed));
            }
        }
    }

    let mut digits = Vec::with_capacity(int_digits.len() + frac_digits.len());
    digits.extend_from_slice(int_digits);
    digits.extend_from_slice(frac_digits);
    let effective_exp = explicit_exp - frac_digits.len() as i64;

    let value = digits_to_f64(&digits, effective_exp)?;
    Ok((Number::Real(if negative { -value } else { value }), consumed))
}

/// Parses a `0x`/`0X`-prefixed hexadecimal integer, returning its value and
/// bytes consumed. Separate from [`parse_number`] per the engine's grammar
/// — hex literals only appear where a caller explicitly expects one.
pub fn parse_hex(input: &[u8]) -> Result<(u64, usize), DigitError> {
    if input.len() < 3 || input[0] != b'0' || (input[1] != b'x' && input[1] != b'X') {
        return Err(DigitError::Malformed);
    }
    let mut i = 2;
    let start = i;
    let mut value: u64 = 0;
    while i < input.len() {
        let Some(digit) = (input[i] as char).to_digit(16) else { break };
        value = value.checked_mul(16).and_then(|v| v.checked_add(u64::from(digit))).ok_or(DigitError::Malformed)?;
        i += 1;
    }
    if i == start {
        return Err(DigitError::Malformed);
    }
    Ok((value, i))
}

fn parse_digits_u64(digits: &[u8]) -> Option<u64> {
    let mut value: u64 = 0;
    for &byte in digits {
        value = value.checked_mul(10)?.checked_add(u64::from(byte - b'0'))?;
    }
    Some(value)
}

fn trim_leading_zeros(digits: &[u8]) -> &[u8] {
    let mut start = 0;
    while start + 1 < digits.len() && digits[start] == b'0' {
        start += 1;
    }
    if digits.iter().all(|&d| d == b'0') { &[] } else { &digits[start..] }
}

/// Converts `digits * 10^effective_exp` (an unsigned decimal) into the
/// nearest `f64`, using a fast path for the common case and falling back to
/// the exact `BigUInt`-based slow path otherwise.
fn digits_to_f64(digits: &[u8], effective_exp: i64) -> Result<f64, DigitError> {
    let trimmed = trim_leading_zeros(digits);
    if trimmed.is_empty() {
        return Ok(0.0);
    }

    let leading_exp = effective_exp + trimmed.len() as i64 - 1;
    if leading_exp > 309 || leading_exp < -380 {
        return Err(DigitError::ExponentOutOfRange);
    }

    let value = if trimmed.len() <= 15 {
        if let Some(mantissa) = parse_digits_u64(trimmed) {
            fast_path(mantissa, effective_exp).unwrap_or_else(|| slow_path(trimmed, effective_exp))
        } else {
            slow_path(trimmed, effective_exp)
        }
    } else {
        slow_path(trimmed, effective_exp)
    };

    if value.is_infinite() || value == 0.0 {
        return Err(DigitError::ExponentOutOfRange);
    }
    Ok(value)
}

/// Clinger's fast path: exact when `mantissa` fits in 53 bits and
/// `10^|effective_exp|` is itself exactly representable in `f64`.
fn fast_path(mantissa: u64, effective_exp: i64) -> Option<f64> {
    if !(-22..=22).contains(&effective_exp) {
        return None;
    }
    let power = POW10[effective_exp.unsigned_abs() as usize];
    Some(if effective_exp >= 0 { mantissa as f64 * power } else { mantissa as f64 / power })
}

fn slow_path(digits: &[u8], effective_exp: i64) -> f64 {
    let mut significand: BigUInt<DIGIT_LIMBS> = BigUInt::ZERO;
    for &byte in digits {
        significand.mul_small(10);
        significand.add_small(u64::from(byte - b'0'));
    }

    if effective_exp >= 0 {
        for _ in 0..effective_exp {
            significand.mul_small(10);
        }
        round_to_f64(significand, 0, false)
    } else {
        let n = (-effective_exp) as u32;
        let shift_amount = 4 * n + 64;
        significand.shl(shift_amount);
        let mut sticky = false;
        for _ in 0..n {
            if significand.div_small(10) != 0 {
                sticky = true;
            }
        }
        round_to_f64(significand, -i64::from(shift_amount), sticky)
    }
}

/// Normalizes `value * 2^binary_exp` (possibly already truncated, with
/// `sticky` tracking whether that truncation discarded any nonzero bits)
/// into the nearest `f64`, rounding ties to even.
fn round_to_f64(mut value: BigUInt<DIGIT_LIMBS>, mut binary_exp: i64, mut sticky: bool) -> f64 {
    if value.is_zero() {
        return 0.0;
    }

    const MANTISSA_BITS: u32 = 53;
    let bit_len = value.bit_length();
    if bit_len > MANTISSA_BITS {
        let shift = bit_len - MANTISSA_BITS;
        let round_bit = value.bit(shift - 1);
        sticky |= value.any_low_bits_set(shift - 1);
        value.shr(shift);
        binary_exp += i64::from(shift);

        if round_bit && (sticky || value.low_u64() & 1 == 1) {
            value.add_small(1);
            if value.bit_length() > MANTISSA_BITS {
                value.shr(1);
                binary_exp += 1;
            }
        }
    }

    let mantissa = value.low_u64();
    let exp2 = binary_exp.clamp(-1100, 1100) as i32;
    mantissa as f64 * 2f64.powi(exp2)
}
