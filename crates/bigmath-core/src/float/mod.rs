//! Arbitrary-precision binary floating-point numbers.
//!
//! A [`BigFloat`] is `mantissa · 2^(-exponent)`: the exponent counts the bits
//! after the binary point. Values are immutable; every operation returns a
//! new instance. Addition, subtraction and multiplication are exact, and
//! rounding is always explicit via [`BigFloat::round`].

mod arith;
mod exp;
mod format;
pub(crate) mod ln;
mod newton;
mod round;

use std::cmp::Ordering;

use num_bigint::{BigInt, BigUint, Sign};
use num_traits::{Signed, ToPrimitive, Zero};

pub use round::RoundingMode;

/// Immutable arbitrary-precision binary float.
///
/// Equality and ordering compare numeric values, so `0b10 · 2^-1` equals
/// `1 · 2^0` even though the representations differ.
///
/// # Example
/// ```
/// use bigmath_core::BigFloat;
///
/// let x = BigFloat::new(3, 1); // 1.5
/// let y = BigFloat::from(2);
/// assert_eq!(&x * &y, BigFloat::from(3));
/// ```
#[derive(Clone, Debug)]
pub struct BigFloat {
    mantissa: BigInt,
    exponent: i64,
}

impl BigFloat {
    /// Create `mantissa · 2^(-exponent)`.
    #[must_use]
    pub fn new(mantissa: impl Into<BigInt>, exponent: i64) -> Self {
        Self {
            mantissa: mantissa.into(),
            exponent,
        }
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::new(BigInt::zero(), 0)
    }

    #[must_use]
    pub fn one() -> Self {
        Self::new(1, 0)
    }

    /// The signed integer mantissa.
    #[must_use]
    pub fn mantissa(&self) -> &BigInt {
        &self.mantissa
    }

    /// Number of bits after the binary point (may be negative).
    #[must_use]
    pub fn exponent(&self) -> i64 {
        self.exponent
    }

    /// `-1`, `0` or `1`.
    #[must_use]
    pub fn signum(&self) -> i32 {
        match self.mantissa.sign() {
            Sign::Minus => -1,
            Sign::NoSign => 0,
            Sign::Plus => 1,
        }
    }

    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.mantissa.is_zero()
    }

    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.mantissa.is_negative()
    }

    /// Bit length of the mantissa magnitude.
    #[must_use]
    pub fn bit_len(&self) -> i64 {
        self.mantissa.bits() as i64
    }

    /// Mantissa bit length excluding trailing zero bits.
    #[must_use]
    pub fn valuable_bits(&self) -> i64 {
        match self.mantissa.trailing_zeros() {
            Some(zeros) => self.bit_len() - zeros as i64,
            None => 0,
        }
    }

    /// Number of bits before the binary point.
    #[must_use]
    pub fn whole_bits(&self) -> i64 {
        self.bit_len() - self.exponent
    }

    /// `floor(log2(|self|))`, or `None` for zero.
    #[must_use]
    pub fn floor_log2(&self) -> Option<i64> {
        if self.is_zero() {
            None
        } else {
            Some(self.bit_len() - self.exponent - 1)
        }
    }

    #[must_use]
    pub fn negate(&self) -> Self {
        Self::new(-&self.mantissa, self.exponent)
    }

    #[must_use]
    pub fn abs(&self) -> Self {
        Self::new(self.mantissa.abs(), self.exponent)
    }

    /// Multiply by `2^power`. Exact.
    #[must_use]
    pub fn mul_pow2(&self, power: i64) -> Self {
        Self::new(self.mantissa.clone(), self.exponent - power)
    }

    /// Integer part, rounded toward zero.
    #[must_use]
    pub fn trunc(&self) -> BigInt {
        if self.exponent <= 0 {
            return &self.mantissa << shift_amount(-self.exponent);
        }
        let magnitude = self.magnitude() >> shift_amount(self.exponent);
        BigInt::from_biguint(self.mantissa.sign(), magnitude)
    }

    /// Nearest `f64`, computed from the top 64 mantissa bits.
    #[must_use]
    pub fn to_f64(&self) -> f64 {
        let bits = self.bit_len();
        let (top, scale) = if bits > 64 {
            (self.magnitude() >> shift_amount(bits - 64), bits - 64 - self.exponent)
        } else {
            (self.magnitude().clone(), -self.exponent)
        };
        let top = top.to_f64().unwrap_or(0.0);
        let scale = scale.clamp(i64::from(i32::MIN), i64::from(i32::MAX)) as i32;
        let value = top * 2f64.powi(scale);
        if self.is_negative() {
            -value
        } else {
            value
        }
    }

    pub(crate) fn magnitude(&self) -> &BigUint {
        self.mantissa.magnitude()
    }
}

/// Convert a non-negative bit distance into a shift amount.
pub(crate) fn shift_amount(bits: i64) -> usize {
    usize::try_from(bits).unwrap_or(0)
}

/// Number of bits needed to represent `|value|`; zero for zero.
#[must_use]
pub fn bit_length(value: i64) -> i64 {
    i64::from(64 - value.unsigned_abs().leading_zeros())
}

impl Default for BigFloat {
    fn default() -> Self {
        Self::zero()
    }
}

macro_rules! impl_from_int {
    ($($t:ty),*) => {
        $(
            impl From<$t> for BigFloat {
                fn from(value: $t) -> Self {
                    Self::new(BigInt::from(value), 0)
                }
            }
        )*
    };
}

impl_from_int!(i32, i64, u32, u64);

impl From<BigInt> for BigFloat {
    fn from(value: BigInt) -> Self {
        Self::new(value, 0)
    }
}

impl PartialEq for BigFloat {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for BigFloat {}

impl PartialOrd for BigFloat {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for BigFloat {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.signum().cmp(&other.signum()) {
            Ordering::Equal => {}
            unequal => return unequal,
        }
        match self.exponent.cmp(&other.exponent) {
            Ordering::Equal => self.mantissa.cmp(&other.mantissa),
            Ordering::Less => {
                let aligned = &self.mantissa << shift_amount(other.exponent - self.exponent);
                aligned.cmp(&other.mantissa)
            }
            Ordering::Greater => {
                let aligned = &other.mantissa << shift_amount(self.exponent - other.exponent);
                self.mantissa.cmp(&aligned)
            }
        }
    }
}
