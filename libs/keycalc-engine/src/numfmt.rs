//! Display number formatting and operand parsing
//!
//! Results are rounded to 12 decimal places to hide binary floating-point
//! noise (`0.1 + 0.2` shows `0.3`). Very small and very large magnitudes
//! switch to scientific notation with 6 fractional digits.
//!
//! | Value | Display |
//! |-------|---------|
//! | `2.0` | `2` |
//! | `0.1 + 0.2` | `0.3` |
//! | `0.00000000001234` | `1.234000e-11` |
//! | `0.0000000001234` | `1.23e-10` |
//! | `123456789012345.0` | `1.234568e+14` |
//! | `NaN`, `inf` | `Error` |

use std::sync::LazyLock;

use regex::Regex;

/// Text shown on the display while an error window is open
pub const ERROR_TEXT: &str = "Error";

/// Magnitudes below this (and non-zero) are shown in scientific notation
pub const SMALL_THRESHOLD: f64 = 1e-10;

/// Magnitudes above this are shown in scientific notation
pub const LARGE_THRESHOLD: f64 = 1e12;

/// Fractional digits used in scientific notation
pub const EXPONENT_DIGITS: usize = 6;

const ROUNDING_SCALE: f64 = 1e12;

/// Below this magnitude the shortest form uses an exponent (`1e-7`)
const PLAIN_NOTATION_MIN: f64 = 1e-6;

/// Enough fractional digits to print any `f64` mantissa exactly
const EXACT_DIGITS: usize = 767;

/// Leading numeric literal: optional sign, digits with optional fraction,
/// optional exponent (only when followed by digits).
static OPERAND_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*[+-]?(?:Infinity|(?:\d+\.?\d*|\.\d+)(?:[eE][+-]?\d+)?)")
        .expect("operand prefix pattern is valid")
});

/// Format a computed value for the display
pub fn format_result(value: f64) -> String {
    if !value.is_finite() {
        return ERROR_TEXT.to_string();
    }

    let magnitude = value.abs();
    if (magnitude < SMALL_THRESHOLD && value != 0.0) || magnitude > LARGE_THRESHOLD {
        return to_exponential(value, EXPONENT_DIGITS);
    }

    let rounded = round_half_up(value * ROUNDING_SCALE) / ROUNDING_SCALE;
    if rounded == 0.0 {
        // Also folds negative zero
        return "0".to_string();
    }
    if rounded.abs() < PLAIN_NOTATION_MIN {
        return format!("{:e}", rounded);
    }
    rounded.to_string()
}

/// Scientific notation with a fixed number of fractional digits and an
/// explicitly signed exponent: `1.234568e+14`, `1.234000e-11`.
///
/// The mantissa is rounded from the exact binary value with ties away from
/// zero, so `12345625000000` gives `1.234563e+13`.
pub fn to_exponential(value: f64, digits: usize) -> String {
    let exact = format!("{:.*e}", EXACT_DIGITS, value.abs());
    let Some((mantissa, exponent)) = exact.split_once('e') else {
        return exact;
    };
    let mut exponent: i32 = exponent.parse().unwrap_or(0);

    let all_digits: Vec<u8> = mantissa.bytes().filter(u8::is_ascii_digit).collect();
    let round_up = all_digits.get(digits + 1).is_some_and(|d| *d >= b'5');
    let mut kept = all_digits;
    kept.truncate(digits + 1);

    if round_up {
        let mut carry = true;
        for d in kept.iter_mut().rev() {
            if *d == b'9' {
                *d = b'0';
            } else {
                *d += 1;
                carry = false;
                break;
            }
        }
        if carry {
            // 9.99..9 rolled over to 10.00..0
            kept.insert(0, b'1');
            kept.pop();
            exponent += 1;
        }
    }

    let mut out = String::with_capacity(digits + 8);
    if value < 0.0 {
        out.push('-');
    }
    out.push(char::from(kept[0]));
    if digits > 0 {
        out.push('.');
        out.extend(kept[1..].iter().map(|d| char::from(*d)));
    }
    out.push('e');
    if exponent >= 0 {
        out.push('+');
    }
    out.push_str(&exponent.to_string());
    out
}

/// Read the numeric value of an operand string
///
/// Only the leading numeric literal counts, so `"5*("` reads as `5`. Text
/// without a numeric prefix (`"("`, `"-"`, `"Error"`) reads as NaN.
pub fn parse_operand(text: &str) -> f64 {
    OPERAND_PREFIX
        .find(text)
        .and_then(|m| m.as_str().trim_start().parse::<f64>().ok())
        .unwrap_or(f64::NAN)
}

/// Round to the nearest integer, ties toward positive infinity
fn round_half_up(x: f64) -> f64 {
    let r = x.round();
    if x - r == 0.5 {
        r + 1.0
    } else {
        r
    }
}
