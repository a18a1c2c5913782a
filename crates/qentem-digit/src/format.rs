//! `NumberToString`: real/integer-to-text conversion.

/// Notation rules for [`format_real`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RealFormat {
    /// Scientific notation when the magnitude is very small or very large,
    /// otherwise fixed with trailing fractional zeros trimmed.
    Default,
    /// Always `integer.precision-fractional-digits`, zero-padded, never
    /// scientific, never trimmed.
    Fixed,
    /// Like `Fixed`, but trailing fractional zeros (and a bare trailing
    /// point) are trimmed away afterward.
    SemiFixed,
}

/// Formats an unsigned integer in decimal. Trivial, kept alongside the real
/// formatter so callers have one place to reach for any `NumberToString`
/// conversion.
#[must_use]
pub fn format_unsigned(value: u64) -> String {
    value.to_string()
}

/// Formats a signed integer in decimal.
#[must_use]
pub fn format_integer(value: i64) -> String {
    value.to_string()
}

/// Formats `value` per `notation`. For `Fixed`/`SemiFixed`, `precision` is
/// the number of digits after the decimal point. For `Default`, `precision`
/// is instead the cap on significant digits, and also the exponent at or
/// above which the result switches to scientific notation (the switch also
/// happens below `1e-4`, regardless of `precision`).
#[must_use]
pub fn format_real(value: f64, notation: RealFormat, precision: usize) -> String {
    if value.is_nan() {
        return "nan".to_string();
    }
    if value.is_infinite() {
        return if value.is_sign_negative() { "-inf".to_string() } else { "inf".to_string() };
    }

    let negative = value.is_sign_negative() && value != 0.0;
    let magnitude = value.abs();

    if magnitude == 0.0 {
        return match notation {
            RealFormat::Default | RealFormat::SemiFixed => if negative { "-0" } else { "0" }.to_string(),
            RealFormat::Fixed => {
                let body = if precision == 0 { "0".to_string() } else { format!("0.{}", "0".repeat(precision)) };
                if negative { format!("-{body}") } else { body }
            }
        };
    }

    match notation {
        RealFormat::Default => format_default(magnitude, negative, precision),
        RealFormat::Fixed => format_fixed(magnitude, negative, precision, false),
        RealFormat::SemiFixed => format_fixed(magnitude, negative, precision, true),
    }
}

/// Exact decimal digit string and base-10 exponent for `magnitude`, using
/// Rust's own correctly-rounded float formatter as the digit source. `guard`
/// extra digits beyond `sig` give [`round_to_significant`] the headroom it
/// needs to decide ties.
fn exact_digits(magnitude: f64, sig: usize) -> (Vec<u8>, i32) {
    let guard = sig + 3;
    let rendered = format!("{magnitude:.*e}", guard.saturating_sub(1));
    let (mantissa, exp_part) = rendered.split_once('e').expect("std always emits an exponent in {:e}");
    let exp10: i32 = exp_part.parse().expect("std exponent is always a valid integer");
    let digits: Vec<u8> = mantissa.bytes().filter(|&b| b != b'.').map(|b| b - b'0').collect();
    (digits, exp10)
}

/// Rounds `digits` (most significant first, representing `0.d0 d1 d2... *
/// 10^(exp10+1)`) to `sig` significant digits, round-half-to-even, returning
/// the rounded digits (length `sig`, or `sig+1` if rounding carried a new
/// leading digit) and the possibly-incremented exponent.
fn round_to_significant(digits: &[u8], exp10: i32, sig: usize) -> (Vec<u8>, i32) {
    if sig == 0 {
        let round_up = digits.first().is_some_and(|&d| d > 5 || (d == 5 && digits[1..].iter().any(|&d| d != 0)));
        return if round_up { (vec![1], exp10 + 1) } else { (vec![], exp10) };
    }
    if digits.len() <= sig {
        let mut kept = digits.to_vec();
        kept.resize(sig, 0);
        return (kept, exp10);
    }

    let mut kept: Vec<u8> = digits[..sig].to_vec();
    let next = digits[sig];
    let tail_nonzero = digits[sig + 1..].iter().any(|&d| d != 0);
    let round_up = next > 5 || (next == 5 && (tail_nonzero || kept[sig - 1] % 2 == 1));

    let mut exp10 = exp10;
    if round_up {
        let mut index = sig;
        loop {
            if index == 0 {
                kept.insert(0, 1);
                kept.pop();
                exp10 += 1;
                break;
            }
            index -= 1;
            if kept[index] == 9 {
                kept[index] = 0;
            } else {
                kept[index] += 1;
                break;
            }
        }
    }
    (kept, exp10)
}

fn format_default(magnitude: f64, negative: bool, precision: usize) -> String {
    let (digits, exp10) = exact_digits(magnitude, precision);
    let (digits, exp10) = round_to_significant(&digits, exp10, precision);
    let digits = trim_trailing_zeros(&digits);
    let digits: &[u8] = if digits.is_empty() { &[0] } else { digits };

    let scientific = exp10 < -4 || exp10 >= precision as i32;
    let body = if scientific { write_scientific(digits, exp10) } else { write_fixed_trimmed(digits, exp10) };
    if negative { format!("-{body}") } else { body }
}

fn format_fixed(magnitude: f64, negative: bool, precision: usize, trim: bool) -> String {
    let leading_exp = magnitude.abs().log10().floor() as i32;
    let sig = (leading_exp + 1).max(0) as usize + precision + 2;
    let (digits, exp10) = exact_digits(magnitude, sig.max(1));
    let (digits, exp10) = round_to_significant(&digits, exp10, sig.max(1));

    let body = write_fixed_from_digits(&digits, exp10, precision);
    let body = if trim { trim_fixed_string(&body) } else { body };
    if negative { format!("-{body}") } else { body }
}

/// Renders `digits` (value `0.d0d1... * 10^(exp10+1)`) as a fixed-point
/// string with exactly `precision` fractional digits, zero-padded.
fn write_fixed_from_digits(digits: &[u8], exp10: i32, precision: usize) -> String {
    if digits.is_empty() {
        return if precision == 0 { "0".to_string() } else { format!("0.{}", "0".repeat(precision)) };
    }

    let point = exp10 + 1;
    let mut out = String::new();
    if point <= 0 {
        out.push('0');
    } else {
        for index in 0..point as usize {
            out.push((b'0' + digits.get(index).copied().unwrap_or(0)) as char);
        }
    }
    if precision > 0 {
        out.push('.');
        let start = point.max(0) as usize;
        for offset in 0..precision {
            let index = start + offset;
            let digit = if point < 0 && offset < (-point) as usize {
                0
            } else {
                digits.get(index).copied().unwrap_or(0)
            };
            out.push((b'0' + digit) as char);
        }
    }
    out
}

fn write_fixed_trimmed(digits: &[u8], exp10: i32) -> String {
    let point = exp10 + 1;
    if point <= 0 {
        let zeros = (-point) as usize;
        let mut out = String::from("0.");
        out.push_str(&"0".repeat(zeros));
        for &digit in digits {
            out.push((b'0' + digit) as char);
        }
        out
    } else if (point as usize) >= digits.len() {
        let mut out = String::new();
        for &digit in digits {
            out.push((b'0' + digit) as char);
        }
        out.push_str(&"0".repeat(point as usize - digits.len()));
        out
    } else {
        let mut out = String::new();
        for &digit in &digits[..point as usize] {
            out.push((b'0' + digit) as char);
        }
        out.push('.');
        for &digit in &digits[point as usize..] {
            out.push((b'0' + digit) as char);
        }
        out
    }
}

fn write_scientific(digits: &[u8], exp10: i32) -> String {
    let mut out = String::new();
    out.push((b'0' + digits[0]) as char);
    if digits.len() > 1 {
        out.push('.');
        for &digit in &digits[1..] {
            out.push((b'0' + digit) as char);
        }
    }
    out.push('e');
    if exp10 >= 0 {
        out.push('+');
    }
    out.push_str(&exp10.to_string());
    out
}

fn trim_trailing_zeros(digits: &[u8]) -> &[u8] {
    let mut end = digits.len();
    while end > 1 && digits[end - 1] == 0 {
        end -= 1;
    }
    &digits[..end]
}

fn trim_fixed_string(value: &str) -> String {
    if !value.contains('.') {
        return value.to_string();
    }
    let trimmed = value.trim_end_matches('0');
    trimmed.trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==== integers ====

    #[test]
    fn formats_plain_integers() {
        assert_eq!(format_unsigned(42), "42");
        assert_eq!(format_integer(-7), "-7");
    }

    // ==== default notation ====

    #[test]
    fn default_trims_trailing_zeros() {
        assert_eq!(format_real(1.5, RealFormat::Default, 17), "1.5");
        assert_eq!(format_real(2.0, RealFormat::Default, 17), "2");
    }

    #[test]
    fn default_uses_scientific_for_tiny_magnitudes() {
        let text = format_real(0.000012, RealFormat::Default, 6);
        assert!(text.starts_with("1.2e-5"), "got {text}");
    }

    #[test]
    fn default_handles_negative_zero() {
        assert_eq!(format_real(-0.0, RealFormat::Default, 6), "-0");
        assert_eq!(format_real(0.0, RealFormat::Default, 6), "0");
    }

    #[test]
    fn default_handles_nan_and_infinity() {
        assert_eq!(format_real(f64::NAN, RealFormat::Default, 6), "nan");
        assert_eq!(format_real(f64::INFINITY, RealFormat::Default, 6), "inf");
        assert_eq!(format_real(f64::NEG_INFINITY, RealFormat::Default, 6), "-inf");
    }

    #[test]
    fn default_caps_significant_digits_at_precision() {
        assert_eq!(format_real(3.141_592_653_589_793, RealFormat::Default, 6), "3.14159");
    }

    #[test]
    fn default_switches_to_scientific_at_ten_to_the_precision() {
        assert_eq!(format_real(123.456, RealFormat::Default, 2), "1.2e+2");
        assert_eq!(format_real(99.0, RealFormat::Default, 3), "99");
    }

    // ==== fixed notation ====

    #[test]
    fn fixed_pads_with_zeros() {
        assert_eq!(format_real(1.5, RealFormat::Fixed, 4), "1.5000");
        assert_eq!(format_real(1.0, RealFormat::Fixed, 2), "1.00");
    }

    #[test]
    fn fixed_zero_precision_drops_the_point() {
        assert_eq!(format_real(3.7, RealFormat::Fixed, 0), "4");
    }

    #[test]
    fn fixed_rounds_half_to_even() {
        assert_eq!(format_real(0.125, RealFormat::Fixed, 2), "0.12");
        assert_eq!(format_real(0.375, RealFormat::Fixed, 2), "0.38");
    }

    // ==== semi-fixed notation ====

    #[test]
    fn semi_fixed_trims_trailing_zeros_and_bare_point() {
        assert_eq!(format_real(1.5000, RealFormat::SemiFixed, 4), "1.5");
        assert_eq!(format_real(1.0, RealFormat::SemiFixed, 4), "1");
    }

    #[test]
    fn semi_fixed_keeps_significant_trailing_digits() {
        assert_eq!(format_real(1.2050, RealFormat::SemiFixed, 4), "1.205");
    }
}
