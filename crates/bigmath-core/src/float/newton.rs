//! Newton iterations: reciprocal, reciprocal square root, square root and
//! division.
//!
//! Both iterations run on a normalised copy of the operand and double (or
//! triple) the working precision together with the number of certified bits,
//! so the expensive full-precision products only happen in the last rounds.

use num_bigint::{BigInt, BigUint};
use num_integer::Integer;
use num_traits::ToPrimitive;

use crate::error::{check_precision, MathError};

use super::{shift_amount, BigFloat, RoundingMode};

/// Seeds for `1/a`, `a ∈ [k/16, (k+1)/16)`, `k = 8..=15`, in eighths.
const INVERSE_SEEDS: [i64; 8] = [15, 13, 12, 11, 10, 9, 9, 8];

/// Integer value of the top `count` bits of `magnitude`, which has `len` bits.
fn top_bits(magnitude: &BigUint, len: i64, count: i64) -> u32 {
    let top = if len >= count {
        magnitude >> shift_amount(len - count)
    } else {
        magnitude << shift_amount(count - len)
    };
    top.to_u32().unwrap_or(0)
}

/// Seed for `1/√a`, `a ∈ [k/16, (k+1)/16)`, `k = 4..=15`, in sixteenths.
/// Relative error of every seed is below 0.08.
fn inverse_sqrt_seed(sixteenths: u32) -> i64 {
    match sixteenths {
        0..=4 => 30,
        5 => 27,
        6 => 25,
        7 => 23,
        8 | 9 => 21,
        10 | 11 => 19,
        12 | 13 => 18,
        _ => 17,
    }
}

impl BigFloat {
    /// `1/self` with `precision` fractional bits.
    pub fn inverse(&self, precision: i64) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        if self.is_zero() {
            return Err(MathError::domain("inverse of zero"));
        }
        let len = self.bit_len();
        if self.valuable_bits() == 1 {
            return Ok(BigFloat::new(self.signum(), len - 1 - self.exponent));
        }

        // |self| = a · 2^(len - exponent) with a ∈ [1/2, 1).
        let shift = self.exponent - len;
        let target = precision + shift + 2;
        let a = BigFloat::new(BigInt::from(self.magnitude().clone()), len);
        let seed = INVERSE_SEEDS[(top_bits(self.magnitude(), len, 4) - 8) as usize];
        let two = BigFloat::from(2);

        let mut x = BigFloat::new(seed, 3);
        let mut bits = 2;
        while bits < target {
            let work = (2 * bits + 4).min(target + 4);
            let ax = &a.round(work + 2, RoundingMode::Truncate) * &x;
            x = (&x * &(&two - &ax)).round(work, RoundingMode::Nearest);
            bits = (2 * bits - 1).min(target + 1);
        }

        let x = x.mul_pow2(shift);
        let x = if self.is_negative() { x.negate() } else { x };
        Ok(x.round(precision, RoundingMode::Nearest))
    }

    /// `1/√self` with `precision` fractional bits.
    pub fn inverse_sqrt(&self, precision: i64) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        if self.signum() <= 0 {
            return Err(MathError::domain("inverse square root of a non-positive value"));
        }
        let len = self.bit_len();
        let exponent = self.exponent;
        let log2 = len - 1 - exponent;
        if self.valuable_bits() == 1 && log2.is_even() {
            return Ok(BigFloat::new(1, log2 / 2));
        }

        // self = a · 2^(2s) with a ∈ [1/4, 1).
        let normalised = if (len - exponent).is_even() { len } else { len + 1 };
        let s = (normalised - exponent) / 2;
        let a = BigFloat::new(self.mantissa.clone(), normalised);
        let sixteenths = top_bits(self.magnitude(), len, 4 - (normalised - len));
        // x is scaled by 2^-s afterwards
        let target = (precision - s + 3).max(3);
        let one = BigFloat::one();
        let three_quarters = BigFloat::new(3, 2);

        let mut x = BigFloat::new(inverse_sqrt_seed(sixteenths), 4);
        let mut bits = 3;
        while bits < target {
            let work = (3 * bits + 4).min(target + 4);
            let ar = a.round(work + 2, RoundingMode::Truncate);
            let e = (&(&(&x * &x) * &ar) - &one).round(work + 2, RoundingMode::Nearest);
            // x' = x - (x/2)(e - 3e²/4)
            let inner = &e - &(&(&e * &e) * &three_quarters);
            let correction = (&x * &inner).mul_pow2(-1);
            x = (&x - &correction).round(work, RoundingMode::Nearest);
            bits = (3 * bits - 3).min(target + 1);
        }

        Ok(x.mul_pow2(-s).round(precision, RoundingMode::Nearest))
    }

    /// `√self` with `precision` fractional bits, computed as `self · (1/√self)`.
    pub fn sqrt(&self, precision: i64) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        if self.signum() <= 0 {
            return Err(MathError::domain("square root of a non-positive value"));
        }
        let guard = self.whole_bits().max(0) + 2;
        let inverse = self.inverse_sqrt(precision + guard)?;
        Ok((self * &inverse).round(precision, RoundingMode::Nearest))
    }

    /// `self / divisor` with `precision` fractional bits.
    pub fn divide(&self, divisor: &BigFloat, precision: i64) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        let guard = self.whole_bits().max(0) + 2;
        let inverse = divisor.inverse(precision + guard)?;
        Ok((self * &inverse).round(precision, RoundingMode::Nearest))
    }
}
