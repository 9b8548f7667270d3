use rust_decimal::{Decimal, RoundingStrategy};
use std::fmt;
use std::str::FromStr;

use crate::utils::normalize::is_decimal_literal;

/// Fractional digits accepted by the exchange for amounts and prices
pub const DEFAULT_DECIMALS: u32 = 8;

/// An amount as supplied by a caller: a number, or text that may hold one.
#[derive(Debug, Clone, PartialEq)]
pub enum Amount {
    Number(f64),
    Decimal(Decimal),
    Text(String),
}

impl Amount {
    /// Render with at most `decimals` fractional digits, see [`format_decimal`].
    pub fn to_decimal_string(&self, decimals: u32) -> String {
        format_decimal(self.clone(), decimals)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{}", n),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<f64> for Amount {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<f32> for Amount {
    fn from(value: f32) -> Self {
        Self::Number(f64::from(value))
    }
}

impl From<i32> for Amount {
    fn from(value: i32) -> Self {
        Self::Decimal(Decimal::from(value))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        Self::Decimal(Decimal::from(value))
    }
}

impl From<u32> for Amount {
    fn from(value: u32) -> Self {
        Self::Decimal(Decimal::from(value))
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Self::Decimal(Decimal::from(value))
    }
}

impl From<Decimal> for Amount {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for Amount {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Amount {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

/// Exponent magnitude beyond which a literal is not expanded digit by digit.
const MAX_EXPONENT: i64 = 4096;

fn round_decimal(decimal: Decimal, decimals: u32) -> String {
    let mut rounded = decimal.round_dp_with_strategy(decimals, RoundingStrategy::MidpointAwayFromZero);
    rounded.rescale(decimals);
    rounded.to_string()
}

fn format_text(text: &str, decimals: u32) -> String {
    let literal = text.trim();
    if !is_decimal_literal(literal) {
        return text.to_string();
    }

    Decimal::from_str(literal)
        .or_else(|_| Decimal::from_scientific(literal))
        .ok()
        .map(|decimal| round_decimal(decimal, decimals))
        .or_else(|| round_literal(literal, decimals))
        .unwrap_or_else(|| text.to_string())
}

/// Round a decimal literal outside the `Decimal` range on its digits.
///
/// `literal` must already match the decimal literal syntax. Returns `None`
/// only for exponents too large to expand.
fn round_literal(literal: &str, decimals: u32) -> Option<String> {
    let (negative, unsigned) = match literal.as_bytes().first() {
        Some(b'-') => (true, &literal[1..]),
        Some(b'+') => (false, &literal[1..]),
        _ => (false, literal),
    };

    let (mantissa, exponent) = match unsigned.find(['e', 'E']) {
        Some(at) => (&unsigned[..at], unsigned[at + 1..].parse::<i64>().ok()?),
        None => (unsigned, 0),
    };
    if exponent.abs() > MAX_EXPONENT {
        if exponent < 0 {
            return Some(round_decimal(Decimal::ZERO, decimals));
        }
        return None;
    }

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let mut digits: Vec<u8> = int_part.bytes().chain(frac_part.bytes()).map(|b| b - b'0').collect();

    // position of the decimal point within `digits`
    let mut point = int_part.len() as i64 + exponent;
    if point < 0 {
        let mut padded = vec![0; point.unsigned_abs() as usize];
        padded.append(&mut digits);
        digits = padded;
        point = 0;
    }
    let point = point as usize;
    let scale = decimals as usize;
    if digits.len() < point + scale {
        digits.resize(point + scale, 0);
    }

    let round_up = digits.get(point + scale).is_some_and(|&d| d >= 5);
    digits.truncate(point + scale);
    if round_up {
        let mut carry = true;
        for digit in digits.iter_mut().rev() {
            if *digit == 9 {
                *digit = 0;
            } else {
                *digit += 1;
                carry = false;
                break;
            }
        }
        if carry {
            digits.insert(0, 1);
        }
    }

    let int_len = digits.len() - scale;
    let int_digits = &digits[..int_len];
    let leading_zeros = int_digits.iter().take_while(|&&d| d == 0).count();
    let int_digits = &int_digits[leading_zeros.min(int_len.saturating_sub(1))..];

    let mut out = String::with_capacity(digits.len() + 2);
    if negative && digits.iter().any(|&d| d != 0) {
        out.push('-');
    }
    if int_digits.is_empty() {
        out.push('0');
    }
    out.extend(int_digits.iter().map(|&d| char::from(b'0' + d)));
    if scale > 0 {
        out.push('.');
        out.extend(digits[int_len..].iter().map(|&d| char::from(b'0' + d)));
    }
    Some(out)
}

/// Format `value` as a fixed-point string with exactly `decimals` fractional digits.
///
/// Rounds half away from zero. Input that does not parse as a number is
/// returned unchanged.
pub fn format_decimal(value: impl Into<Amount>, decimals: u32) -> String {
    match value.into() {
        Amount::Decimal(decimal) => round_decimal(decimal, decimals),
        Amount::Number(n) if n.is_finite() => format_text(&n.to_string(), decimals),
        Amount::Number(n) => n.to_string(),
        Amount::Text(text) => format_text(&text, decimals),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pads_to_eight_decimals() {
        assert_eq!(format_decimal(1, DEFAULT_DECIMALS), "1.00000000");
        assert_eq!(format_decimal(650.3232, DEFAULT_DECIMALS), "650.32320000");
        assert_eq!(format_decimal("0.5", DEFAULT_DECIMALS), "0.50000000");
    }

    #[test]
    fn test_rounds_excess_precision() {
        assert_eq!(format_decimal(0.123_456_789, DEFAULT_DECIMALS), "0.12345679");
        assert_eq!(format_decimal("1.000000004", DEFAULT_DECIMALS), "1.00000000");
        assert_eq!(format_decimal("2.5", 0), "3");
        assert_eq!(format_decimal("-1.25", 1), "-1.3");
    }

    #[test]
    fn test_never_exceeds_requested_precision() {
        for value in [0.1, 1.0 / 3.0, 123_456.789_012_345, 1e-12, 42.0] {
            let formatted = format_decimal(value, DEFAULT_DECIMALS);
            let fraction = formatted.split('.').nth(1).unwrap_or("");
            assert!(fraction.len() <= 8, "{} -> {}", value, formatted);
        }
    }

    #[test]
    fn test_non_numeric_passes_through() {
        assert_eq!(format_decimal("not-a-number", DEFAULT_DECIMALS), "not-a-number");
        assert_eq!(format_decimal("", DEFAULT_DECIMALS), "");
        assert_eq!(format_decimal(f64::NAN, DEFAULT_DECIMALS), "NaN");
    }

    #[test]
    fn test_scientific_text_is_accepted() {
        assert_eq!(format_decimal("1e-3", 4), "0.0010");
    }

    #[test]
    fn test_numbers_beyond_decimal_range_are_rounded() {
        assert_eq!(
            format_decimal("123456789012345678901234567890.123456789", DEFAULT_DECIMALS),
            "123456789012345678901234567890.12345679"
        );
        assert_eq!(
            format_decimal("-123456789012345678901234567890.1234567891", DEFAULT_DECIMALS),
            "-123456789012345678901234567890.12345679"
        );
        assert_eq!(
            format_decimal("999999999999999999999999999999.999999999", DEFAULT_DECIMALS),
            "1000000000000000000000000000000.00000000"
        );
        assert_eq!(format_decimal("1.5e30", 2), "1500000000000000000000000000000.00");
        assert_eq!(
            format_decimal(1e30, 2),
            "1000000000000000000000000000000.00"
        );
    }

    #[test]
    fn test_tiny_scientific_text_matches_float() {
        assert_eq!(format_decimal("1e-30", DEFAULT_DECIMALS), "0.00000000");
        assert_eq!(
            format_decimal("1e-30", DEFAULT_DECIMALS),
            format_decimal(1e-30_f64, DEFAULT_DECIMALS)
        );
        assert_eq!(format_decimal("5e-9", DEFAULT_DECIMALS), "0.00000001");
        assert_eq!(format_decimal("1e-99999", 2), "0.00");
    }

    #[test]
    fn test_amount_helper() {
        let amount = Amount::from(Decimal::new(15, 1));
        assert_eq!(amount.to_decimal_string(2), "1.50");
    }
}
