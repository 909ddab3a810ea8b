//! Convergence detection for iterative algorithms.

use crate::float::BigFloat;

/// Compares successive iterates and reports when they agree to a target
/// number of fractional bits.
#[derive(Debug, Clone)]
pub struct PrecisionChecker {
    precision: i64,
    previous: BigFloat,
    iteration: u32,
}

impl PrecisionChecker {
    #[must_use]
    pub fn new(precision: i64, first: BigFloat) -> Self {
        Self {
            precision,
            previous: first,
            iteration: 0,
        }
    }

    /// Record `next` and report whether it agrees with the previous iterate.
    ///
    /// Converged when `-floor_log2(next - previous) > precision`, or when the
    /// difference is exactly zero.
    pub fn check(&mut self, next: BigFloat) -> bool {
        let converged = match (&next - &self.previous).floor_log2() {
            None => true,
            Some(log) => -log > self.precision,
        };
        self.previous = next;
        self.iteration += 1;
        tracing::trace!(
            iteration = self.iteration,
            precision = self.precision,
            converged,
            "convergence check"
        );
        converged
    }

    #[must_use]
    pub fn previous(&self) -> &BigFloat {
        &self.previous
    }

    #[must_use]
    pub fn into_previous(self) -> BigFloat {
        self.previous
    }

    /// Number of `check` calls so far.
    #[must_use]
    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    #[must_use]
    pub fn precision(&self) -> i64 {
        self.precision
    }
}
