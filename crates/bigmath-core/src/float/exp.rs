//! Exponential entry point on [`BigFloat`], backed by [`ExpCalculator`].

use crate::error::MathError;
use crate::exp_calc::ExpCalculator;
use crate::execution::Execution;
use crate::provider::ConstantProvider;

use super::BigFloat;

impl BigFloat {
    /// `e^self` with `precision` fractional bits. See [`ExpCalculator`].
    pub fn exp(
        &self,
        precision: i64,
        execution: Execution,
        constants: &dyn ConstantProvider,
    ) -> Result<BigFloat, MathError> {
        ExpCalculator::calculate(self, precision, execution, constants)
    }
}
