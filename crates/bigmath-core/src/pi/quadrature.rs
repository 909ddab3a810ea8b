//! Riemann sum of `4/(1 + x²)` over `[0, 1]` on worker threads.

use crate::error::{check_precision, MathError};
use crate::execution::{run_workers, Task};
use crate::float::{BigFloat, RoundingMode};
use crate::slots::SlotArray;

/// Largest precision accepted by [`quadrature`]; the slice count
/// `2^(precision + 1)` has to fit a `u64`.
pub const MAX_QUADRATURE_PRECISION: i64 = 62;

/// π truncated to `precision` fractional bits from the left Riemann sum of
/// `4/(1 + x²)` on `2^(precision + 1)` slices.
///
/// The slices are split into `threads` contiguous ranges, one worker each.
/// Every sample is rounded to `precision + 1` bits, so partial sums are exact
/// and the result does not depend on `threads`. The cost doubles with every
/// bit, and only the last couple of bits are unreliable.
pub fn quadrature(precision: i64, threads: usize) -> Result<BigFloat, MathError> {
    check_precision(precision)?;
    if precision > MAX_QUADRATURE_PRECISION {
        return Err(MathError::argument(format!(
            "quadrature supports at most {MAX_QUADRATURE_PRECISION} bits, got {precision}"
        )));
    }
    if threads == 0 {
        return Err(MathError::argument("quadrature needs at least one thread"));
    }
    let k = precision + 1;
    let slices = 1u64 << k;
    let threads = threads.min(usize::try_from(slices).unwrap_or(usize::MAX));
    let chunk = slices / threads as u64;

    let slots: SlotArray<BigFloat> = SlotArray::new(threads);
    let slots = &slots;
    let tasks: Vec<(&'static str, Task<'_>)> = (0..threads)
        .map(|i| {
            let start = i as u64 * chunk;
            let end = if i + 1 == threads { slices } else { start + chunk };
            let task: Task<'_> = Box::new(move || -> Result<(), MathError> {
                slots.publish(i, partial_sum(start, end, k)?)?;
                Ok(())
            });
            ("pi-quadrature", task)
        })
        .collect();

    let sum = run_workers(slots, tasks, || {
        let mut total = BigFloat::zero();
        for i in 0..threads {
            total = &total + &*slots.wait(i)?;
        }
        Ok(total)
    })?;
    tracing::debug!(precision, threads, slices, "quadrature summed");
    Ok(sum.mul_pow2(2 - k).round(precision, RoundingMode::Truncate))
}

/// `Σ 1/(1 + x²)` for `x = j·2^-k`, `j ∈ [start, end)`.
fn partial_sum(start: u64, end: u64, k: i64) -> Result<BigFloat, MathError> {
    let one = BigFloat::one();
    let mut sum = BigFloat::zero();
    for j in start..end {
        let x = BigFloat::new(j, k);
        sum = &sum + &(&one + &(&x * &x)).inverse(k)?;
    }
    Ok(sum)
}
