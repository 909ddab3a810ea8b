//! Gauss–Legendre (Brent–Salamin) iteration for π.

use crate::error::{check_precision, MathError};
use crate::execution::{join, Execution};
use crate::float::{bit_length, BigFloat, RoundingMode};

/// π with `precision` fractional bits via the arithmetic–geometric mean.
///
/// ```text
/// a' = (a + b)/2    b' = √(ab)    t' = t - x(a - a')²    x' = 2x
/// π ≈ (a + b)² / 4t
/// ```
///
/// Under [`Execution::Threaded`] the square root of each round runs
/// alongside the `a`/`t` update.
pub fn gauss_legendre(precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
    check_precision(precision)?;
    let work = precision + bit_length(precision) + 16;

    let mut a = BigFloat::one();
    let mut b = BigFloat::from(2).inverse_sqrt(work)?;
    let mut t = BigFloat::new(1, 2);
    let mut log_x = 0;
    loop {
        let e = &a - &b;
        match e.floor_log2() {
            Some(log) if log >= 8 - work => {}
            _ => break,
        }
        let (next_b, (next_a, next_t)) = join(
            execution,
            || (&a * &b).sqrt(work),
            || {
                let next_a = (&a + &b).mul_pow2(-1).round(work, RoundingMode::Nearest);
                // a - a' = e/2
                let half = e.mul_pow2(-1);
                let next_t = (&t - &(&half * &half).mul_pow2(log_x)).round(work, RoundingMode::Nearest);
                (next_a, next_t)
            },
        );
        a = next_a;
        b = next_b?;
        t = next_t;
        log_x += 1;
    }
    tracing::debug!(precision, rounds = log_x, "gauss-legendre converged");

    let sum = &a + &b;
    let pi = (&(&sum * &sum) * &t.inverse(work)?).mul_pow2(-2);
    Ok(pi.round(precision, RoundingMode::Nearest))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_bigint::BigInt;

    /// Leading 64 fractional bits of π.
    const PI_FRACTION_64: u64 = 0x243F_6A88_85A3_08D3;

    #[test]
    fn pi_to_64_bits() {
        let pi = gauss_legendre(64, Execution::Sequential).unwrap();
        let expected = (BigInt::from(3) << 64u32) + BigInt::from(PI_FRACTION_64);
        let diff = (pi.mantissa() - &expected).magnitude().clone();
        assert_eq!(pi.exponent(), 64);
        assert!(diff <= num_bigint::BigUint::from(1u32));
    }

    #[test]
    fn tiny_precisions() {
        assert_eq!(gauss_legendre(0, Execution::Sequential).unwrap(), BigFloat::from(3));
        assert_eq!(gauss_legendre(2, Execution::Sequential).unwrap(), BigFloat::new(13, 2));
    }

    #[test]
    fn threaded_is_identical() {
        for precision in [10, 100, 700] {
            let sequential = gauss_legendre(precision, Execution::Sequential).unwrap();
            let threaded = gauss_legendre(precision, Execution::Threaded).unwrap();
            assert_eq!(sequential.mantissa(), threaded.mantissa());
        }
    }
}
