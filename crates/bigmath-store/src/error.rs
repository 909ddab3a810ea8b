//! Error type of the constant stores.

use bigmath_core::MathError;

/// Error type for loading and saving persisted constants.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Nothing stored, or not at the requested precision.
    #[error("constant not found")]
    NotFound,

    /// The underlying file could not be read or written.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The stored bytes do not follow the persisted layout.
    #[error("format error: {0}")]
    Format(#[from] MathError),
}

impl StoreError {
    /// `true` when the store simply has nothing suitable.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound)
    }
}
