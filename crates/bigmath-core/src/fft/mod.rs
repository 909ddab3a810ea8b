//! FFT-based big integer multiplication over [`ComplexNumber`] transforms.
//!
//! [`FftEngine`] owns a transform size, a precision and a lazily extended
//! [`RootTable`]; each [`FftInstance`] is the working buffer of one
//! transform. [`multiply`] packs integers into limbs and runs the classic
//! forward / pointwise / inverse pipeline on engines taken from a shared
//! [`EngineCache`].
//!
//! [`ComplexNumber`]: crate::complex::ComplexNumber

mod cache;
mod engine;
mod gray;
mod multiply;
mod roots;

// Re-exports
pub use cache::{EngineCache, EngineKey};
pub use engine::{FftEngine, FftInstance, MAX_LOG2_SIZE};
pub use gray::{GrayCode, GrayStep};
pub use multiply::{multiply, select_params, FftParams};
pub use roots::RootTable;
