//! Algorithms for π.

mod bbp;
mod borwein;
mod gauss_legendre;
mod quadrature;

pub use bbp::bbp;
pub use borwein::borwein;
pub use gauss_legendre::gauss_legendre;
pub use quadrature::{quadrature, MAX_QUADRATURE_PRECISION};

use serde::{Deserialize, Serialize};

use crate::error::MathError;
use crate::execution::Execution;
use crate::float::BigFloat;

/// Which algorithm computes π.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PiAlgorithm {
    /// Gauss–Legendre AGM iteration (quadratic).
    GaussLegendre,
    /// Borwein quartic iteration.
    #[default]
    Borwein,
    /// Bailey–Borwein–Plouffe series on a thread pool.
    Bbp,
    /// Riemann sum split across worker threads; at most
    /// [`MAX_QUADRATURE_PRECISION`] bits.
    Quadrature,
}

impl PiAlgorithm {
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::GaussLegendre => "gauss-legendre",
            Self::Borwein => "borwein",
            Self::Bbp => "bbp",
            Self::Quadrature => "quadrature",
        }
    }

    /// Parse a name as printed by [`PiAlgorithm::name`].
    pub fn from_name(name: &str) -> Result<Self, MathError> {
        match name.trim().to_ascii_lowercase().as_str() {
            "gauss-legendre" | "gauss_legendre" | "agm" => Ok(Self::GaussLegendre),
            "borwein" | "bb4" => Ok(Self::Borwein),
            "bbp" => Ok(Self::Bbp),
            "quadrature" | "riemann" => Ok(Self::Quadrature),
            other => Err(MathError::Argument(format!("unknown pi algorithm: {other}"))),
        }
    }

    /// Compute π with this algorithm. `threads` is the worker count of
    /// [`PiAlgorithm::Bbp`] and [`PiAlgorithm::Quadrature`].
    pub fn compute(
        self,
        precision: i64,
        execution: Execution,
        threads: usize,
    ) -> Result<BigFloat, MathError> {
        match self {
            Self::GaussLegendre => gauss_legendre(precision, execution),
            Self::Borwein => borwein(precision, execution),
            Self::Bbp => bbp(precision, threads),
            Self::Quadrature => quadrature(precision, threads),
        }
    }
}
