//! Natural logarithm.
//!
//! Three regimes, picked from the size of the argument:
//! - close to one: the alternating series of `ln(1 + δ)`;
//! - far from one: `ln(y) ≈ π / (2·AGM(1, 4/y))`, accurate once `y` is large;
//! - in between: rescale by `2^m` into the AGM regime and subtract `m·ln 2`.

use crate::error::{check_precision, MathError};
use crate::execution::{join, Execution};
use crate::provider::ConstantProvider;

use super::{bit_length, BigFloat, RoundingMode};

impl BigFloat {
    /// `ln(self)` with `precision` fractional bits.
    ///
    /// `constants` supplies π and ln 2 for the AGM regimes.
    pub fn ln(
        &self,
        precision: i64,
        execution: Execution,
        constants: &dyn ConstantProvider,
    ) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        if self.signum() <= 0 {
            return Err(MathError::domain("logarithm of a non-positive value"));
        }
        let work = precision + bit_length(precision) + 8;
        let value = ln_positive(self, work, execution, constants)?;
        Ok(value.round(precision, RoundingMode::Nearest))
    }
}

/// Smallest `log2(y)` for which the AGM formula is accurate to `work` bits.
fn agm_threshold(work: i64) -> i64 {
    work / 2 + bit_length(work) + 4
}

fn ln_positive(
    x: &BigFloat,
    work: i64,
    execution: Execution,
    constants: &dyn ConstantProvider,
) -> Result<BigFloat, MathError> {
    let delta = x - &BigFloat::one();
    let Some(log_delta) = delta.floor_log2() else {
        return Ok(BigFloat::zero());
    };
    if log_delta < 0 && -log_delta * bit_length(work) > work {
        return ln_series(&delta, log_delta, work);
    }

    let log_x = x.floor_log2().unwrap_or(0);
    let threshold = agm_threshold(work);
    if log_x <= -threshold {
        let inverse = x.inverse(work - log_x)?;
        return Ok(ln_positive(&inverse, work, execution, constants)?.negate());
    }
    if log_x == threshold {
        return agm_ln(x, work, execution, constants);
    }

    // ln(x) = ln(x · 2^m) - m · ln 2, with x · 2^m just inside the AGM regime.
    let m = threshold - log_x;
    let scaled = x.mul_pow2(m);
    let ln2_precision = work + bit_length(m) + 2;
    let (ln_scaled, ln2) = join(
        execution,
        || agm_ln(&scaled, work, execution, constants),
        || constants.ln2(ln2_precision, execution),
    );
    let correction = &ln2? * &BigFloat::from(m);
    Ok((&ln_scaled? - &correction).round(work, RoundingMode::Nearest))
}

/// `δ - δ²/2 + δ³/3 - …` for `|δ| < 2^(log_delta + 1) ≤ 1/4`.
fn ln_series(delta: &BigFloat, log_delta: i64, work: i64) -> Result<BigFloat, MathError> {
    let precision = work + 8;
    let terms = (work + 2) / (-log_delta - 1) + 1;
    let mut sum = delta.clone();
    let mut power = delta.clone();
    for k in 2..=terms {
        power = (&power * delta).round(precision, RoundingMode::Nearest);
        let term = power.divide(&BigFloat::from(k), precision)?;
        sum = if k % 2 == 0 { &sum - &term } else { &sum + &term };
    }
    Ok(sum.round(work, RoundingMode::Nearest))
}

/// `ln(y) ≈ π / (2·AGM(1, 4/y))`, valid for `y ≥ 2^agm_threshold(work)`.
///
/// π is requested from `constants` while the AGM runs.
pub(crate) fn agm_ln(
    y: &BigFloat,
    work: i64,
    execution: Execution,
    constants: &dyn ConstantProvider,
) -> Result<BigFloat, MathError> {
    let log_y = y.floor_log2().unwrap_or(0).max(0);
    let precision = work + 2 * bit_length(log_y.max(work)) + 8;
    let (pi, inverse_agm) = join(
        execution,
        || constants.pi(precision, execution),
        || inverse_agm(y, log_y, precision),
    );
    let value = (&pi? * &inverse_agm?).mul_pow2(-1);
    Ok(value.round(work, RoundingMode::Nearest))
}

/// `1 / AGM(1, 4/y)` with `precision` fractional bits.
///
/// The means start out as small as `4/y`, so intermediate values carry
/// `log2(y)` extra bits to keep their relative error at `2^-precision`.
fn inverse_agm(y: &BigFloat, log_y: i64, precision: i64) -> Result<BigFloat, MathError> {
    let internal = precision + log_y + 2;
    let mut a = BigFloat::one();
    let mut b = y.inverse(internal)?.mul_pow2(2);
    let mut rounds = 0u32;
    loop {
        match (&a - &b).floor_log2() {
            Some(log) if log >= 8 - precision => {}
            _ => break,
        }
        let next_b = (&a * &b).sqrt(internal)?;
        a = (&a + &b).mul_pow2(-1).round(internal, RoundingMode::Nearest);
        b = next_b;
        rounds += 1;
    }
    tracing::trace!(precision, rounds, "agm converged");
    let mean = (&a + &b).mul_pow2(-1);
    mean.inverse(precision)
}

/// `ln 2 = ln(2^n) / n` with `n` just inside the AGM regime.
pub(crate) fn compute_ln2(
    precision: i64,
    execution: Execution,
    constants: &dyn ConstantProvider,
) -> Result<BigFloat, MathError> {
    check_precision(precision)?;
    let work = precision + bit_length(precision) + 8;
    let n = agm_threshold(work);
    let ln_power = agm_ln(&BigFloat::new(1, -n), work, execution, constants)?;
    ln_power.divide(&BigFloat::from(n), precision)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Uncached;

    fn close(x: &BigFloat, y: &BigFloat, bits: i64) -> bool {
        match (x - y).floor_log2() {
            None => true,
            Some(log) => log < -bits,
        }
    }

    fn parse(text: &str) -> BigFloat {
        BigFloat::parse_radix(text, 10, 400).unwrap()
    }

    const LN2: &str = "0.6931471805599453094172321214581765680755001343602552541206800094933936219696947156058633269964186875";
    const LN10: &str = "2.3025850929940456840179914546843642076011014886287729760333279009675726096773524802359972050895982983";

    #[test]
    fn ln_of_one_is_zero() {
        let value = BigFloat::one().ln(64, Execution::Sequential, &Uncached).unwrap();
        assert!(value.is_zero());
    }

    #[test]
    fn ln2_matches_reference() {
        let value = compute_ln2(200, Execution::Sequential, &Uncached).unwrap();
        assert!(close(&value, &parse(LN2), 199));
    }

    #[test]
    fn ln_moderate_argument() {
        let value = BigFloat::from(10).ln(160, Execution::Sequential, &Uncached).unwrap();
        assert!(close(&value, &parse(LN10), 159));
    }

    #[test]
    fn ln_of_reciprocal_is_negated() {
        let tenth = BigFloat::from(10).inverse(300).unwrap();
        let value = tenth.ln(120, Execution::Sequential, &Uncached).unwrap();
        assert!(close(&value, &parse(LN10).negate(), 118));
    }

    #[test]
    fn ln_near_one_uses_series() {
        // ln(1 + 2^-40) = 2^-40 - 2^-81 + 2^-122/3 - …
        let x = &BigFloat::one() + &BigFloat::new(1, 40);
        let value = x.ln(100, Execution::Sequential, &Uncached).unwrap();
        let expected = &BigFloat::new(1, 40) - &BigFloat::new(1, 81);
        assert!(close(&value, &expected, 99));
    }

    #[test]
    fn ln_of_huge_and_tiny_powers() {
        let ln2 = parse(LN2);
        let huge = BigFloat::new(1, -1000);
        let value = huge.ln(100, Execution::Sequential, &Uncached).unwrap();
        assert!(close(&value, &(&ln2 * &BigFloat::from(1000)), 88));

        let tiny = BigFloat::new(1, 1000);
        let value = tiny.ln(100, Execution::Sequential, &Uncached).unwrap();
        assert!(close(&value, &(&ln2 * &BigFloat::from(-1000)), 88));
    }

    #[test]
    fn threaded_matches_sequential() {
        for x in [BigFloat::from(3), BigFloat::new(5, 7), BigFloat::new(1, -400)] {
            let sequential = x.ln(128, Execution::Sequential, &Uncached).unwrap();
            let threaded = x.ln(128, Execution::Threaded, &Uncached).unwrap();
            assert_eq!(sequential.mantissa(), threaded.mantissa());
            assert_eq!(sequential.exponent(), threaded.exponent());
        }
    }

    #[test]
    fn ln_domain_errors() {
        for x in [BigFloat::zero(), BigFloat::from(-2)] {
            assert!(matches!(
                x.ln(32, Execution::Sequential, &Uncached),
                Err(MathError::Domain(_))
            ));
        }
    }
}
