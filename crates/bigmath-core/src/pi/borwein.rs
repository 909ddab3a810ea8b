//! Borwein's quartically convergent iteration for π.
//!
//! ```text
//! y₀ = √2 - 1                       z₀ = 2y₀²
//! α  = (1 - y⁴)^(1/4)               y' = (1 - α)/(1 + α)
//! z' = z(1 + y')⁴ - 2^(2n+3) · y'((1 + y')² - y')
//! π ≈ 1/z
//! ```
//!
//! Each round splits into three stages. Stage A derives `y'` and the next
//! `β = 1/(1 + α)`; stage B needs `y'` to form `s = (1 + y')²` and
//! `s² · z`; stage C needs `y'` and `s` for the correction term. Under
//! [`Execution::Threaded`] the stages run on their own threads and hand
//! values over through single-assignment slots.

use crate::error::{check_precision, MathError};
use crate::execution::{run_workers, Execution, Task};
use crate::float::{bit_length, BigFloat, RoundingMode};
use crate::precision::PrecisionChecker;
use crate::slots::SlotArray;

const Y: usize = 0;
const S: usize = 1;
const Q: usize = 2;
const CORRECTION: usize = 3;

/// State carried from one round to the next.
struct Round {
    beta: BigFloat,
    z: BigFloat,
}

/// π with `precision` fractional bits.
pub fn borwein(precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
    check_precision(precision)?;
    let work = precision + 2 * bit_length(precision) + 16;
    let one = BigFloat::one();

    let y0 = &BigFloat::from(2).sqrt(work)? - &one;
    let z = (&y0 * &y0).mul_pow2(1).round(work, RoundingMode::Nearest);
    let mut state = Round {
        beta: next_beta(&y0, work)?,
        z,
    };

    let mut checker = PrecisionChecker::new(precision + 4, state.z.inverse(work)?);
    let mut n = 0;
    loop {
        state = match execution {
            Execution::Sequential => round_sequential(&state, n, work)?,
            Execution::Threaded => round_threaded(&state, n, work)?,
        };
        n += 1;
        if checker.check(state.z.inverse(work)?) {
            break;
        }
    }
    tracing::debug!(precision, rounds = n, "borwein converged");
    Ok(checker.previous().round(precision, RoundingMode::Nearest))
}

/// Stage A, first half: `y' = 2β - 1 = (1 - α)/(1 + α)`.
fn next_y(beta: &BigFloat) -> BigFloat {
    &beta.mul_pow2(1) - &BigFloat::one()
}

/// Stage A, second half: `β' = 1 / (1 + (1 - y'⁴)^(1/4))`.
fn next_beta(y: &BigFloat, work: i64) -> Result<BigFloat, MathError> {
    let one = BigFloat::one();
    let y2 = (y * y).round(work, RoundingMode::Nearest);
    let y4 = (&y2 * &y2).round(work, RoundingMode::Nearest);
    let alpha = (&one - &y4).inverse_sqrt(work)?.inverse_sqrt(work)?;
    (&one + &alpha).inverse(work)
}

/// Stage B, first half: `s = (1 + y')²`.
fn square_plus_one(y: &BigFloat, work: i64) -> BigFloat {
    let t = y + &BigFloat::one();
    (&t * &t).round(work, RoundingMode::Nearest)
}

/// Stage B, second half: `s² · z`.
fn scaled_fourth_power(s: &BigFloat, z: &BigFloat, work: i64) -> BigFloat {
    let s2 = (s * s).round(work, RoundingMode::Nearest);
    (&s2 * z).round(work, RoundingMode::Nearest)
}

/// Stage C: `2^(2n+3) · y'(s - y')`.
fn correction(y: &BigFloat, s: &BigFloat, n: i64, work: i64) -> BigFloat {
    ((s - y) * y)
        .mul_pow2(2 * n + 3)
        .round(work, RoundingMode::Nearest)
}

fn round_sequential(state: &Round, n: i64, work: i64) -> Result<Round, MathError> {
    let y = next_y(&state.beta);
    let beta = next_beta(&y, work)?;
    let s = square_plus_one(&y, work);
    let q = scaled_fourth_power(&s, &state.z, work);
    let c = correction(&y, &s, n, work);
    Ok(Round { beta, z: &q - &c })
}

fn round_threaded(state: &Round, n: i64, work: i64) -> Result<Round, MathError> {
    let slots: SlotArray<BigFloat> = SlotArray::new(4);
    let z = &state.z;
    let stage_b: Task<'_> = Box::new(|| -> Result<(), MathError> {
        let y = slots.wait(Y)?;
        let s = slots.publish(S, square_plus_one(&y, work))?;
        slots.publish(Q, scaled_fourth_power(&s, z, work))?;
        Ok(())
    });
    let stage_c: Task<'_> = Box::new(|| -> Result<(), MathError> {
        let y = slots.wait(Y)?;
        let s = slots.wait(S)?;
        slots.publish(CORRECTION, correction(&y, &s, n, work))?;
        Ok(())
    });

    let beta = run_workers(&slots, vec![("borwein-b", stage_b), ("borwein-c", stage_c)], || {
        let y = slots.publish(Y, next_y(&state.beta))?;
        next_beta(&y, work)
    })?;

    let q = slots.wait(Q)?;
    let c = slots.wait(CORRECTION)?;
    Ok(Round {
        beta,
        z: &*q - &*c,
    })
}
