//! # bigmath
//!
//! Precision-aware facade over [`bigmath_core`]: every operation takes an
//! explicit precision or falls back to a configurable default, a runtime
//! switch selects sequential or threaded kernels, and π and ln 2 live in a
//! [`ConstantCache`] that can persist them through a
//! [`bigmath_store::ConstantStore`].

pub mod cache;
pub mod math;
pub mod options;

// Re-exports
pub use bigmath_core::{BigFloat, Execution, MathError, PiAlgorithm, RoundingMode};
pub use cache::{Constant, ConstantCache};
pub use math::BigMath;
pub use options::{ConfigError, Options};
