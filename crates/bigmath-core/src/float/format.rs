//! Conversion to and from positional text in radix 2..=36.

use std::fmt;

use num_bigint::{BigInt, BigUint};

use crate::error::{check_precision, MathError};

use super::{shift_amount, BigFloat, RoundingMode};

fn check_radix(radix: u32) -> Result<(), MathError> {
    if (2..=36).contains(&radix) {
        Ok(())
    } else {
        Err(MathError::Argument(format!("radix must be in 2..=36, got {radix}")))
    }
}

/// Digits needed after the point to show `bits` fractional bits in `radix`.
fn fraction_digits(bits: i64, radix: u32) -> usize {
    if radix == 2 {
        return shift_amount(bits);
    }
    let digits = (bits as f64 * 2f64.ln() / f64::from(radix).ln()).ceil();
    digits as usize + 1
}

impl BigFloat {
    /// Positional representation in `radix`.
    ///
    /// Radix 2 is an exact dump of every stored bit. Other radixes print
    /// `⌈exponent · log_radix 2⌉ + 1` fractional digits, truncated.
    pub fn to_string_radix(&self, radix: u32) -> Result<String, MathError> {
        check_radix(radix)?;
        Ok(self.format_radix(radix))
    }

    fn format_radix(&self, radix: u32) -> String {
        let sign = if self.is_negative() { "-" } else { "" };
        if self.exponent <= 0 {
            let whole = self.magnitude() << shift_amount(-self.exponent);
            return format!("{sign}{}", whole.to_str_radix(radix));
        }

        let magnitude = self.magnitude();
        let shift = shift_amount(self.exponent);
        let whole = magnitude >> shift;
        let fraction = magnitude - (&whole << shift);
        let digits = fraction_digits(self.exponent, radix);
        let scaled = if radix == 2 {
            fraction
        } else {
            (fraction * BigUint::from(radix).pow(digits as u32)) >> shift
        };
        let fraction = scaled.to_str_radix(radix);
        format!(
            "{sign}{}.{fraction:0>digits$}",
            whole.to_str_radix(radix)
        )
    }

    /// Parse positional text such as `-3.243f6a` in `radix`.
    ///
    /// The result is rounded to `precision` fractional bits; for a radix that
    /// is a power of two and enough precision, the conversion is exact.
    pub fn parse_radix(text: &str, radix: u32, precision: i64) -> Result<BigFloat, MathError> {
        check_radix(radix)?;
        check_precision(precision)?;
        let text = text.trim();
        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };
        let (whole, fraction) = body.split_once('.').unwrap_or((body, ""));
        let valid = |part: &str| part.chars().all(|c| c.is_digit(radix));
        if (whole.is_empty() && fraction.is_empty()) || !valid(whole) || !valid(fraction) {
            return Err(MathError::Format(format!("not a radix-{radix} number: {text:?}")));
        }

        let digits = format!("{whole}{fraction}");
        let mantissa = BigUint::parse_bytes(digits.as_bytes(), radix)
            .ok_or_else(|| MathError::Format(format!("not a radix-{radix} number: {text:?}")))?;
        let mantissa = BigInt::from(mantissa);
        let mantissa = if negative { -mantissa } else { mantissa };

        let fraction_len = fraction.len() as u32;
        let value = if fraction_len == 0 {
            BigFloat::new(mantissa, 0)
        } else if radix.is_power_of_two() {
            let bits_per_digit = i64::from(radix.trailing_zeros());
            BigFloat::new(mantissa, bits_per_digit * i64::from(fraction_len))
        } else {
            let denominator = BigFloat::from(BigInt::from(radix).pow(fraction_len));
            return BigFloat::new(mantissa, 0).divide(&denominator, precision);
        };
        Ok(value.round(precision, RoundingMode::Nearest))
    }
}

impl fmt::Display for BigFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.format_radix(10))
    }
}

impl std::str::FromStr for BigFloat {
    type Err = MathError;

    /// Parse decimal text. Fractions are kept to four bits per digit.
    fn from_str(text: &str) -> Result<Self, Self::Err> {
        let fraction_len = text.split_once('.').map_or(0, |(_, f)| f.len()) as i64;
        Self::parse_radix(text, 10, 4 * fraction_len + 8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn binary_dump_is_exact() {
        let x = BigFloat::new(0b1011, 3); // 1.011
        assert_eq!(x.to_string_radix(2).unwrap(), "1.011");
        let y = BigFloat::new(-1, 4);
        assert_eq!(y.to_string_radix(2).unwrap(), "-0.0001");
    }

    #[test]
    fn decimal_digits() {
        assert_eq!(BigFloat::new(13, 2).to_string(), "3.25");
        assert_eq!(BigFloat::from(-42).to_string(), "-42");
        assert_eq!(BigFloat::new(3, -4).to_string(), "48");
        assert_eq!(BigFloat::new(1, 1).to_string_radix(16).unwrap(), "0.80");
    }

    #[test]
    fn invalid_radix() {
        assert!(matches!(BigFloat::one().to_string_radix(1), Err(MathError::Argument(_))));
        assert!(matches!(BigFloat::one().to_string_radix(37), Err(MathError::Argument(_))));
        assert!(BigFloat::parse_radix("1", 40, 8).is_err());
    }

    #[test]
    fn parse_power_of_two_radix_is_exact() {
        let x = BigFloat::parse_radix("-3.243f", 16, 64).unwrap();
        assert_eq!(x, BigFloat::new(-0x3243f, 16));
        let y = BigFloat::parse_radix("101.01", 2, 10).unwrap();
        assert_eq!(y, BigFloat::new(0b10101, 2));
    }

    #[test]
    fn parse_decimal_rounds() {
        let x = BigFloat::parse_radix("0.1", 10, 20).unwrap();
        assert_eq!(x.exponent(), 20);
        // round(2^20 / 10) = 104858
        assert_eq!(x.mantissa(), &BigInt::from(104_858));
        assert_eq!(BigFloat::parse_radix("+12", 10, 0).unwrap(), BigFloat::from(12));
        assert_eq!(BigFloat::parse_radix(".5", 10, 4).unwrap(), BigFloat::new(1, 1));
    }

    #[test]
    fn parse_rejects_garbage() {
        for text in ["", ".", "1.2.3", "12a", "--1", "1e5"] {
            assert!(
                matches!(BigFloat::parse_radix(text, 10, 8), Err(MathError::Format(_))),
                "{text:?}"
            );
        }
    }

    #[test]
    fn from_str_decimal() {
        let x: BigFloat = "2.5".parse().unwrap();
        assert_eq!(x, BigFloat::new(5, 1));
    }

    #[test]
    fn decimal_text_round_trip() {
        let x = BigFloat::new(0x1234_5678, 24);
        let text = x.to_string();
        let back = BigFloat::parse_radix(&text, 10, 24).unwrap();
        assert_eq!(back, x);
    }
}
