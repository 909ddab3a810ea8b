//! Source of the constants π and ln 2 used inside other computations.

use crate::error::MathError;
use crate::execution::Execution;
use crate::float::{ln::compute_ln2, BigFloat};
use crate::pi::gauss_legendre;

/// Supplies π and ln 2 to at least the requested number of fractional bits.
///
/// The logarithm and exponential take a provider so callers can plug in a
/// cache; [`Uncached`] recomputes on every request.
pub trait ConstantProvider: Send + Sync {
    fn pi(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError>;

    fn ln2(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError>;
}

/// Computes π with Gauss–Legendre and ln 2 with the AGM on every call.
#[derive(Debug, Clone, Copy, Default)]
pub struct Uncached;

impl ConstantProvider for Uncached {
    fn pi(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
        gauss_legendre(precision, execution)
    }

    fn ln2(&self, precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
        compute_ln2(precision, execution, self)
    }
}

/// Compute ln 2, taking π from `constants`.
pub fn ln2_with(
    precision: i64,
    execution: Execution,
    constants: &dyn ConstantProvider,
) -> Result<BigFloat, MathError> {
    compute_ln2(precision, execution, constants)
}
