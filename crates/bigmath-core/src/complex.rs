//! Complex numbers over [`BigFloat`].

use std::fmt;
use std::ops::{Add, Mul, Sub};

use crate::error::MathError;
use crate::float::{BigFloat, RoundingMode};

/// Immutable complex number with [`BigFloat`] parts.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexNumber {
    re: BigFloat,
    im: BigFloat,
}

impl ComplexNumber {
    #[must_use]
    pub fn new(re: BigFloat, im: BigFloat) -> Self {
        Self { re, im }
    }

    #[must_use]
    pub fn from_real(re: BigFloat) -> Self {
        Self::new(re, BigFloat::zero())
    }

    #[must_use]
    pub fn from_i64(re: i64, im: i64) -> Self {
        Self::new(BigFloat::from(re), BigFloat::from(im))
    }

    #[must_use]
    pub fn zero() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn one() -> Self {
        Self::from_real(BigFloat::one())
    }

    #[must_use]
    pub fn real(&self) -> &BigFloat {
        &self.re
    }

    #[must_use]
    pub fn imaginary(&self) -> &BigFloat {
        &self.im
    }

    #[must_use]
    pub fn conjugate(&self) -> Self {
        Self::new(self.re.clone(), self.im.negate())
    }

    /// Multiply both parts by `2^power`. Exact.
    #[must_use]
    pub fn mul_pow2(&self, power: i64) -> Self {
        Self::new(self.re.mul_pow2(power), self.im.mul_pow2(power))
    }

    #[must_use]
    pub fn mul_real(&self, factor: &BigFloat) -> Self {
        Self::new(&self.re * factor, &self.im * factor)
    }

    /// Round both parts to `precision` fractional bits, to nearest.
    #[must_use]
    pub fn round(&self, precision: i64) -> Self {
        Self::new(
            self.re.round(precision, RoundingMode::Nearest),
            self.im.round(precision, RoundingMode::Nearest),
        )
    }

    /// `re² + im²`. Exact.
    #[must_use]
    pub fn norm_squared(&self) -> BigFloat {
        &(&self.re * &self.re) + &(&self.im * &self.im)
    }

    /// `|self|` with `precision` fractional bits.
    pub fn abs(&self, precision: i64) -> Result<BigFloat, MathError> {
        let norm = self.norm_squared();
        if norm.is_zero() {
            return Ok(BigFloat::zero());
        }
        norm.sqrt(precision)
    }

    /// `1/self` with `precision` fractional bits.
    pub fn inverse(&self, precision: i64) -> Result<Self, MathError> {
        let norm = self.norm_squared();
        if norm.is_zero() {
            return Err(MathError::domain("inverse of complex zero"));
        }
        let scale = norm.inverse(precision + 2 * self.magnitude_bits() + 2)?;
        Ok(self.conjugate().mul_real(&scale).round(precision))
    }

    /// `self / divisor` with `precision` fractional bits.
    pub fn divide(&self, divisor: &ComplexNumber, precision: i64) -> Result<Self, MathError> {
        let norm = divisor.norm_squared();
        if norm.is_zero() {
            return Err(MathError::domain("division by complex zero"));
        }
        let numerator = self * &divisor.conjugate();
        let guard = numerator.magnitude_bits() + 2;
        let scale = norm.inverse(precision + guard)?;
        Ok(numerator.mul_real(&scale).round(precision))
    }

    /// The principal root of unity of twice the order: if `self = e^(iθ)`
    /// with `θ ∈ (0, π)`, returns `e^(iθ/2)`.
    ///
    /// `cos(θ/2) = √((1 + cos θ)/2)`, `sin(θ/2) = sin θ / (2 cos(θ/2))`.
    pub fn half_angle(&self, precision: i64) -> Result<Self, MathError> {
        let half = (&BigFloat::one() + &self.re).mul_pow2(-1);
        let re = half.sqrt(precision)?;
        let im = self.im.mul_pow2(-1).divide(&re, precision)?;
        Ok(Self::new(re, im))
    }

    /// Bits before the binary point of the larger part, at least zero.
    fn magnitude_bits(&self) -> i64 {
        self.re.whole_bits().max(self.im.whole_bits()).max(0)
    }
}

impl Add<&ComplexNumber> for &ComplexNumber {
    type Output = ComplexNumber;

    fn add(self, rhs: &ComplexNumber) -> ComplexNumber {
        ComplexNumber::new(&self.re + &rhs.re, &self.im + &rhs.im)
    }
}

impl Sub<&ComplexNumber> for &ComplexNumber {
    type Output = ComplexNumber;

    fn sub(self, rhs: &ComplexNumber) -> ComplexNumber {
        ComplexNumber::new(&self.re - &rhs.re, &self.im - &rhs.im)
    }
}

impl Mul<&ComplexNumber> for &ComplexNumber {
    type Output = ComplexNumber;

    /// Exact product.
    fn mul(self, rhs: &ComplexNumber) -> ComplexNumber {
        let re = &(&self.re * &rhs.re) - &(&self.im * &rhs.im);
        let im = &(&self.re * &rhs.im) + &(&self.im * &rhs.re);
        ComplexNumber::new(re, im)
    }
}

impl fmt::Display for ComplexNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({} + {}i)", self.re, self.im)
    }
}
