//! Exponential by Newton iteration on the logarithm.
//!
//! `y' = y · T(x - ln y)` where `T` is the Taylor polynomial of `e^d` with
//! [`TAYLOR_TERMS`] terms. The powers `d²…d¹⁵` come from the fixed product
//! programs in [`EXP_PROGRAMS`]; under [`Execution::Threaded`] each program
//! runs on its own thread and a summation worker adds every power times
//! `1/i!` as soon as it is published.

use num_bigint::BigInt;

use crate::constants::{
    EXP_PRECISION_ADD, EXP_PRECISION_MULTIPLIER, EXP_PROGRAMS, TAYLOR_TERMS,
};
use crate::error::{check_precision, MathError};
use crate::execution::{run_workers, Execution, Task};
use crate::float::{BigFloat, RoundingMode};
use crate::precision::PrecisionChecker;
use crate::provider::ConstantProvider;
use crate::slots::SlotArray;

/// Slot of the finished Taylor sum.
const TOTAL: usize = 0;
/// Slot of `d` itself; slot `i` holds `d^i` for `i ≥ 2`.
const FIRST_POWER: usize = 1;

/// Largest `|round(x / ln 2)|` accepted by [`ExpCalculator::calculate`].
const MAX_BINARY_EXPONENT: i64 = 1 << 40;

/// Taylor evaluator at a fixed working precision.
#[derive(Debug, Clone)]
pub struct ExpCalculator {
    work: i64,
    inverse_factorials: Vec<BigFloat>,
}

impl ExpCalculator {
    /// Prepare `1/i!` for `i < TAYLOR_TERMS` at `work` bits.
    pub fn new(work: i64) -> Result<Self, MathError> {
        check_precision(work)?;
        let mut factorial = BigInt::from(1);
        let mut inverse_factorials = Vec::with_capacity(TAYLOR_TERMS);
        for i in 0..TAYLOR_TERMS {
            if i > 1 {
                factorial *= i;
            }
            inverse_factorials.push(BigFloat::from(factorial.clone()).inverse(work)?);
        }
        Ok(Self {
            work,
            inverse_factorials,
        })
    }

    #[must_use]
    pub fn work(&self) -> i64 {
        self.work
    }

    /// `e^x` truncated to `precision` fractional bits.
    ///
    /// Seeds `y₀ = 2^round(x / ln 2)` and iterates at the working precision
    /// until two successive values agree to `precision` bits, then truncates.
    /// Values below `2^-(precision + 1)` return zero.
    pub fn calculate(
        x: &BigFloat,
        precision: i64,
        execution: Execution,
        constants: &dyn ConstantProvider,
    ) -> Result<BigFloat, MathError> {
        check_precision(precision)?;
        let estimate = (x.to_f64() / std::f64::consts::LN_2).round();
        if !estimate.is_finite() || estimate.abs() > MAX_BINARY_EXPONENT as f64 {
            return Err(MathError::Argument(format!(
                "exponential argument {estimate:e}·ln 2 is out of range"
            )));
        }
        let k = estimate as i64;
        if k < -(precision + 2) {
            return Ok(BigFloat::zero());
        }

        let work = EXP_PRECISION_MULTIPLIER * precision + EXP_PRECISION_ADD + k.max(0);
        let calculator = Self::new(work)?;
        let mut y = BigFloat::new(1, -k);
        let mut checker = PrecisionChecker::new(precision, y.clone());
        loop {
            let d = (x - &y.ln(work, execution, constants)?).round(work, RoundingMode::Nearest);
            let factor = calculator.taylor(&d, execution)?;
            y = (&y * &factor).round(work, RoundingMode::Nearest);
            if checker.check(y.clone()) {
                break;
            }
        }
        tracing::debug!(
            precision,
            iterations = checker.iteration(),
            "exponential converged"
        );
        Ok(y.round(precision, RoundingMode::Truncate))
    }

    /// `Σ d^i / i!` for `i < TAYLOR_TERMS`.
    pub fn taylor(&self, d: &BigFloat, execution: Execution) -> Result<BigFloat, MathError> {
        let d = d.round(self.work, RoundingMode::Nearest);
        match execution {
            Execution::Sequential => Ok(self.taylor_sequential(d)),
            Execution::Threaded => self.taylor_threaded(d),
        }
    }

    fn term(&self, i: usize, power: &BigFloat) -> BigFloat {
        (power * &self.inverse_factorials[i]).round(self.work, RoundingMode::Nearest)
    }

    fn product(&self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        (a * b).round(self.work, RoundingMode::Nearest)
    }

    /// Runs the programs in target order, which respects every dependency.
    fn taylor_sequential(&self, d: BigFloat) -> BigFloat {
        let mut powers: Vec<Option<BigFloat>> = vec![None; TAYLOR_TERMS];
        powers[FIRST_POWER] = Some(d);
        let mut total = BigFloat::one();
        for target in FIRST_POWER..TAYLOR_TERMS {
            if target > FIRST_POWER {
                let value = match recipe(target).map(|(a, b)| (&powers[a], &powers[b])) {
                    Some((Some(a), Some(b))) => self.product(a, b),
                    _ => continue,
                };
                powers[target] = Some(value);
            }
            if let Some(power) = &powers[target] {
                total = &total + &self.term(target, power);
            }
        }
        total
    }

    fn taylor_threaded(&self, d: BigFloat) -> Result<BigFloat, MathError> {
        let slots: SlotArray<BigFloat> = SlotArray::new(TAYLOR_TERMS);
        let slots = &slots;

        let mut tasks: Vec<(&'static str, Task<'_>)> = EXP_PROGRAMS
            .iter()
            .zip(["exp-program-0", "exp-program-1", "exp-program-2", "exp-program-3"])
            .map(|(program, name)| {
                let task: Task<'_> = Box::new(move || -> Result<(), MathError> {
                    for &(a, b) in *program {
                        let left = slots.wait(a)?;
                        let right = slots.wait(b)?;
                        slots.publish(a + b, self.product(&left, &right))?;
                    }
                    Ok(())
                });
                (name, task)
            })
            .collect();

        let summation: Task<'_> = Box::new(move || -> Result<(), MathError> {
            let mut pending: Vec<usize> = (FIRST_POWER..TAYLOR_TERMS).collect();
            let mut done: u32 = 0;
            let mut total = BigFloat::one();
            while !pending.is_empty() {
                for (i, power) in slots.wait_any(&pending)? {
                    total = &total + &self.term(i, &power);
                    done |= 1 << i;
                }
                pending.retain(|&i| done & (1 << i) == 0);
            }
            slots.publish(TOTAL, total)?;
            Ok(())
        });
        tasks.push(("exp-summation", summation));

        let total = run_workers(slots, tasks, || {
            slots.publish(FIRST_POWER, d)?;
            slots.wait(TOTAL)
        })?;
        Ok((*total).clone())
    }
}

/// The `(a, b)` product that produces `d^target`.
fn recipe(target: usize) -> Option<(usize, usize)> {
    EXP_PROGRAMS
        .iter()
        .flat_map(|program| program.iter())
        .find(|(a, b)| a + b == target)
        .copied()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::Uncached;

    const E: &str = "2.7182818284590452353602874713526624977572470936999595749669676277240766303535475945713821785251664274";

    fn close(x: &BigFloat, y: &BigFloat, bits: i64) -> bool {
        (x - y).floor_log2().map_or(true, |log| log < -bits)
    }

    #[test]
    fn every_power_has_a_recipe() {
        for target in 2..TAYLOR_TERMS {
            let (a, b) = recipe(target).unwrap();
            assert!(a < target && b < target);
        }
        assert!(recipe(1).is_none());
    }

    #[test]
    fn taylor_of_zero_is_one() {
        let calculator = ExpCalculator::new(64).unwrap();
        for execution in [Execution::Sequential, Execution::Threaded] {
            let value = calculator.taylor(&BigFloat::zero(), execution).unwrap();
            assert_eq!(value, BigFloat::one());
        }
    }

    #[test]
    fn taylor_threaded_matches_sequential() {
        let calculator = ExpCalculator::new(200).unwrap();
        let d = BigFloat::new(-0x5a5a_5a5a_5a5a_i64, 50);
        let sequential = calculator.taylor(&d, Execution::Sequential).unwrap();
        let threaded = calculator.taylor(&d, Execution::Threaded).unwrap();
        assert_eq!(sequential.mantissa(), threaded.mantissa());
        assert_eq!(sequential.exponent(), threaded.exponent());
    }

    #[test]
    fn e_to_64_bits() {
        let e = ExpCalculator::calculate(&BigFloat::one(), 64, Execution::Sequential, &Uncached)
            .unwrap();
        let reference = BigFloat::parse_radix(E, 10, 200).unwrap();
        assert!(close(&e, &reference, 63));
        // the 65th fractional bit of e is set, so truncation and rounding differ
        assert_eq!(e, BigFloat::new(0x2_B7E1_5162_8AED_2A6A_i128, 64));
        assert_eq!(e, reference.round(64, RoundingMode::Truncate));
    }

    #[test]
    fn threaded_exp_is_identical() {
        let x = BigFloat::new(-7, 2);
        let sequential = ExpCalculator::calculate(&x, 150, Execution::Sequential, &Uncached).unwrap();
        let threaded = ExpCalculator::calculate(&x, 150, Execution::Threaded, &Uncached).unwrap();
        assert_eq!(sequential.mantissa(), threaded.mantissa());
        assert_eq!(sequential.exponent(), threaded.exponent());
    }

    #[test]
    fn exp_of_zero_is_one() {
        let value = ExpCalculator::calculate(&BigFloat::zero(), 80, Execution::Sequential, &Uncached)
            .unwrap();
        assert_eq!(value, BigFloat::one());
    }

    #[test]
    fn large_argument() {
        // e^50 = 5184705528587072464087.45332293348538…
        let value = ExpCalculator::calculate(&BigFloat::from(50), 20, Execution::Sequential, &Uncached)
            .unwrap();
        let reference = BigFloat::parse_radix("5184705528587072464087.4533229334853848", 10, 60).unwrap();
        assert!(close(&value, &reference, 19));
    }

    #[test]
    fn very_negative_argument_underflows_to_zero() {
        let value = ExpCalculator::calculate(&BigFloat::from(-200), 32, Execution::Sequential, &Uncached)
            .unwrap();
        assert!(value.is_zero());
    }

    #[test]
    fn huge_argument_is_rejected() {
        let x = BigFloat::new(1, -2000);
        let result = ExpCalculator::calculate(&x, 16, Execution::Sequential, &Uncached);
        assert!(matches!(result, Err(MathError::Argument(_))));
    }
}
