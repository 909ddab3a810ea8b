//! Exact addition, subtraction and multiplication.

use std::ops::{Add, Mul, Neg, Sub};

use crate::error::MathError;
use crate::execution::Execution;
use crate::fft;

use super::{shift_amount, BigFloat};

impl BigFloat {
    /// Multiply through the FFT engine. Exact, like `*`.
    pub fn mul_fft(&self, other: &BigFloat, execution: Execution) -> Result<BigFloat, MathError> {
        let mantissa = fft::multiply(&self.mantissa, &other.mantissa, execution)?;
        Ok(BigFloat::new(mantissa, self.exponent + other.exponent))
    }

    /// Multiply exactly, routing through the FFT engine when either mantissa
    /// has at least `fft_threshold` bits.
    pub fn mul_adaptive(
        &self,
        other: &BigFloat,
        fft_threshold: Option<u64>,
        execution: Execution,
    ) -> Result<BigFloat, MathError> {
        let bits = self.mantissa.bits().max(other.mantissa.bits());
        match fft_threshold {
            Some(threshold) if bits >= threshold => self.mul_fft(other, execution),
            _ => Ok(self * other),
        }
    }
}

impl Add<&BigFloat> for &BigFloat {
    type Output = BigFloat;

    fn add(self, rhs: &BigFloat) -> BigFloat {
        if self.exponent == rhs.exponent {
            return BigFloat::new(&self.mantissa + &rhs.mantissa, self.exponent);
        }
        if self.exponent > rhs.exponent {
            let aligned = &rhs.mantissa << shift_amount(self.exponent - rhs.exponent);
            BigFloat::new(&self.mantissa + aligned, self.exponent)
        } else {
            let aligned = &self.mantissa << shift_amount(rhs.exponent - self.exponent);
            BigFloat::new(aligned + &rhs.mantissa, rhs.exponent)
        }
    }
}

impl Sub<&BigFloat> for &BigFloat {
    type Output = BigFloat;

    fn sub(self, rhs: &BigFloat) -> BigFloat {
        self + &rhs.negate()
    }
}

impl Mul<&BigFloat> for &BigFloat {
    type Output = BigFloat;

    fn mul(self, rhs: &BigFloat) -> BigFloat {
        BigFloat::new(&self.mantissa * &rhs.mantissa, self.exponent + rhs.exponent)
    }
}

impl Neg for &BigFloat {
    type Output = BigFloat;

    fn neg(self) -> BigFloat {
        self.negate()
    }
}

macro_rules! forward_owned_binop {
    ($trait:ident, $method:ident) => {
        impl $trait<BigFloat> for BigFloat {
            type Output = BigFloat;

            fn $method(self, rhs: BigFloat) -> BigFloat {
                (&self).$method(&rhs)
            }
        }

        impl $trait<&BigFloat> for BigFloat {
            type Output = BigFloat;

            fn $method(self, rhs: &BigFloat) -> BigFloat {
                (&self).$method(rhs)
            }
        }
    };
}

forward_owned_binop!(Add, add);
forward_owned_binop!(Sub, sub);
forward_owned_binop!(Mul, mul);

impl Neg for BigFloat {
    type Output = BigFloat;

    fn neg(self) -> BigFloat {
        self.negate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    #[test]
    fn add_aligns_exponents() {
        // 1.5 + 0.25 = 1.75
        let sum = &BigFloat::new(3, 1) + &BigFloat::new(1, 2);
        assert_eq!(sum, BigFloat::new(7, 2));
        assert_eq!(sum.exponent(), 2);
    }

    #[test]
    fn sub_is_exact() {
        let diff = &BigFloat::new(1, 0) - &BigFloat::new(1, 100);
        assert_eq!(diff.exponent(), 100);
        assert_eq!(diff.mantissa(), &((BigInt::from(1) << 100u32) - 1));
    }

    #[test]
    fn mul_sums_exponents() {
        let product = &BigFloat::new(3, 1) * &BigFloat::new(5, 3);
        assert_eq!(product, BigFloat::new(15, 4));
        assert_eq!(product.exponent(), 4);
    }

    #[test]
    fn owned_operators_forward() {
        let x = BigFloat::from(6);
        let y = BigFloat::from(4);
        assert_eq!(x.clone() + y.clone(), BigFloat::from(10));
        assert_eq!(x.clone() - &y, BigFloat::from(2));
        assert_eq!(x * y, BigFloat::from(24));
        assert_eq!(-BigFloat::from(3), BigFloat::from(-3));
    }

    #[test]
    fn adaptive_multiply_matches_exact() {
        let x = BigFloat::new(BigInt::parse_bytes(b"123456789abcdef0123456789", 16).unwrap(), 40);
        let y = BigFloat::new(-0x7654_3210_i64, 12);
        let exact = &x * &y;
        for threshold in [None, Some(1), Some(1 << 20)] {
            let product = x.mul_adaptive(&y, threshold, Execution::Sequential).unwrap();
            assert_eq!(product, exact);
        }
    }
}
