//! Bailey–Borwein–Plouffe series for π, summed in parallel.

use crate::error::{check_precision, MathError};
use crate::execution::execute_tasks;
use crate::float::{bit_length, BigFloat, RoundingMode};

/// π with `precision` fractional bits from
/// `Σ 16^-k (4/(8k+1) - 2/(8k+4) - 1/(8k+5) - 1/(8k+6))`.
///
/// The term range is split into `threads` contiguous chunks summed on a
/// dedicated pool. Partial sums are added exactly, so the result does not
/// depend on `threads`.
pub fn bbp(precision: i64, threads: usize) -> Result<BigFloat, MathError> {
    check_precision(precision)?;
    if threads == 0 {
        return Err(MathError::argument("bbp needs at least one thread"));
    }
    let work = precision + bit_length(precision) + 8;
    // The tail after `terms` terms is below 2^(2 - 4·terms).
    let terms = (work + 2) / 4 + 1;
    let chunk = (terms + threads as i64 - 1) / threads as i64;

    let tasks: Vec<_> = (0..threads as i64)
        .map(|i| (i * chunk, ((i + 1) * chunk).min(terms)))
        .filter(|(start, end)| start < end)
        .map(|(start, end)| move || partial_sum(start, end, work))
        .collect();
    let partials = execute_tasks(tasks, threads)?;

    let total = partials
        .iter()
        .fold(BigFloat::zero(), |sum, partial| &sum + partial);
    Ok(total.round(precision, RoundingMode::Nearest))
}

fn partial_sum(start: i64, end: i64, work: i64) -> Result<BigFloat, MathError> {
    let mut sum = BigFloat::zero();
    for k in start..end {
        sum = &sum + &term(k, work)?;
    }
    Ok(sum)
}

fn term(k: i64, work: i64) -> Result<BigFloat, MathError> {
    let base = 8 * k;
    let reciprocal = |offset: i64| BigFloat::from(base + offset).inverse(work);
    let sum = &(&reciprocal(1)?.mul_pow2(2) - &reciprocal(4)?.mul_pow2(1))
        - &(&reciprocal(5)? + &reciprocal(6)?);
    Ok(sum.mul_pow2(-4 * k))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::execution::Execution;
    use crate::pi::gauss_legendre;

    #[test]
    fn matches_gauss_legendre() {
        let series = bbp(200, 2).unwrap();
        let agm = gauss_legendre(200, Execution::Sequential).unwrap();
        let diff = (&series - &agm).floor_log2();
        assert!(diff.map_or(true, |log| log < -199));
    }

    #[test]
    fn independent_of_thread_count() {
        let single = bbp(300, 1).unwrap();
        for threads in [2, 3, 8] {
            let parallel = bbp(300, threads).unwrap();
            assert_eq!(single.mantissa(), parallel.mantissa());
            assert_eq!(single.exponent(), parallel.exponent());
        }
    }

    #[test]
    fn more_threads_than_terms() {
        let pi = bbp(4, 64).unwrap();
        assert_eq!(pi, BigFloat::new(50, 4)); // 3.125
    }

    #[test]
    fn zero_threads_rejected() {
        assert!(matches!(bbp(10, 0), Err(MathError::Argument(_))));
    }
}
