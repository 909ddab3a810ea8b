//! # bigmath-core
//!
//! Arbitrary-precision binary floating-point arithmetic: [`BigFloat`] with
//! exact ring operations and explicit rounding, Newton-iteration reciprocal,
//! square root and logarithm, an FFT multiplier over [`ComplexNumber`]
//! transforms, and sequential or threaded kernels for π and `e^x`.
//!
//! Every threaded kernel performs the same arithmetic as its sequential
//! counterpart and returns bit-identical results.

pub mod complex;
pub mod constants;
pub mod error;
pub mod execution;
pub mod exp_calc;
pub mod fft;
pub mod float;
pub mod pi;
pub mod precision;
pub mod provider;
pub mod slots;

// Re-exports
pub use complex::ComplexNumber;
pub use constants::{DEFAULT_BBP_THREADS, DEFAULT_FFT_THRESHOLD, DEFAULT_PRECISION};
pub use error::{check_precision, MathError};
pub use execution::{execute_tasks, join, Execution};
pub use exp_calc::ExpCalculator;
pub use fft::{FftEngine, FftInstance, RootTable};
pub use float::{bit_length, BigFloat, RoundingMode};
pub use pi::{
    bbp, borwein, gauss_legendre, quadrature, PiAlgorithm, MAX_QUADRATURE_PRECISION,
};
pub use precision::PrecisionChecker;
pub use provider::{ln2_with, ConstantProvider, Uncached};
pub use slots::SlotArray;

/// π with `precision` fractional bits, by the Borwein quartic iteration.
///
/// # Example
/// ```
/// use bigmath_core::{pi, Execution};
///
/// let value = pi(32, Execution::Sequential).unwrap();
/// assert!(value.to_string_radix(16).unwrap().starts_with("3.243f6a8"));
/// ```
pub fn pi(precision: i64, execution: Execution) -> Result<BigFloat, MathError> {
    borwein(precision, execution)
}
