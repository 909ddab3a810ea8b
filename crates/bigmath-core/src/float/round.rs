//! Explicit rounding to a number of fractional bits.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use super::{shift_amount, BigFloat};

/// Direction used when dropping fractional bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum RoundingMode {
    /// Round to nearest; ties round away from zero.
    #[default]
    Nearest,
    /// Round away from zero whenever a dropped bit is set.
    Up,
    /// Round toward zero.
    Truncate,
}

impl BigFloat {
    /// Keep at most `precision` bits after the binary point.
    ///
    /// Rounding acts on the magnitude and reapplies the sign, so
    /// `round(-x) == -round(x)` for every mode. A no-op when the value
    /// already fits.
    #[must_use]
    pub fn round(&self, precision: i64, mode: RoundingMode) -> BigFloat {
        if self.exponent <= precision {
            return self.clone();
        }
        let shift = self.exponent - precision;
        let magnitude = self.magnitude();
        let mut kept = magnitude >> shift_amount(shift);
        let bump = match mode {
            RoundingMode::Nearest => magnitude.bit((shift - 1) as u64),
            RoundingMode::Up => magnitude
                .trailing_zeros()
                .is_some_and(|zeros| zeros < shift as u64),
            RoundingMode::Truncate => false,
        };
        if bump {
            kept += 1u32;
        }
        BigFloat::new(BigInt::from_biguint(self.mantissa.sign(), kept), precision)
    }
}
