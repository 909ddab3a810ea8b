//! Error type shared by every numeric operation.

/// Error type for arbitrary-precision calculations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MathError {
    /// The operand lies outside the domain of the operation
    /// (inverse of zero, logarithm or root of a non-positive value).
    #[error("domain error: {0}")]
    Domain(String),

    /// A persisted or textual number could not be decoded.
    #[error("format error: {0}")]
    Format(String),

    /// An argument such as the precision or radix is invalid.
    #[error("invalid argument: {0}")]
    Argument(String),

    /// A worker thread of a parallel computation died before reporting.
    #[error("worker failed: {0}")]
    Worker(String),
}

impl MathError {
    pub(crate) fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub(crate) fn argument(msg: impl Into<String>) -> Self {
        Self::Argument(msg.into())
    }
}

/// Reject negative precisions at public entry points.
pub fn check_precision(precision: i64) -> Result<(), MathError> {
    if precision < 0 {
        return Err(MathError::Argument(format!(
            "precision must be non-negative, got {precision}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn math_error_display() {
        let err = MathError::Domain("ln of zero".into());
        assert_eq!(err.to_string(), "domain error: ln of zero");

        let err = MathError::Argument("bad radix".into());
        assert_eq!(err.to_string(), "invalid argument: bad radix");
    }

    #[test]
    fn negative_precision_rejected() {
        assert!(check_precision(0).is_ok());
        assert!(check_precision(128).is_ok());
        assert!(matches!(check_precision(-1), Err(MathError::Argument(_))));
    }
}
