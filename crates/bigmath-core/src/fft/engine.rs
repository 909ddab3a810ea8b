//! Fixed-size complex transform over [`ComplexNumber`] elements.
//!
//! Iterative decimation in frequency: `log2_size` stages over a working copy,
//! every butterfly rounded to the engine precision, then a bit-reversal
//! permutation of the result.

use num_bigint::{BigInt, BigUint};
use num_traits::One;
use rayon::prelude::*;

use crate::complex::ComplexNumber;
use crate::error::MathError;
use crate::execution::Execution;
use crate::float::BigFloat;

use super::gray::GrayCode;
use super::roots::RootTable;

/// Largest supported `log2_size`.
pub const MAX_LOG2_SIZE: u32 = 28;

/// Transform of `2^log2_size` elements at a fixed precision.
///
/// The root table is shared by every [`FftInstance`] of the engine.
pub struct FftEngine {
    log2_size: u32,
    precision: i64,
    roots: RootTable,
}

impl FftEngine {
    pub fn new(log2_size: u32, precision: i64) -> Result<Self, MathError> {
        if log2_size > MAX_LOG2_SIZE {
            return Err(MathError::Argument(format!(
                "transform size 2^{log2_size} exceeds 2^{MAX_LOG2_SIZE}"
            )));
        }
        crate::error::check_precision(precision)?;
        Ok(Self {
            log2_size,
            precision,
            roots: RootTable::new(precision),
        })
    }

    #[must_use]
    pub fn log2_size(&self) -> u32 {
        self.log2_size
    }

    #[must_use]
    pub fn size(&self) -> usize {
        1 << self.log2_size
    }

    #[must_use]
    pub fn precision(&self) -> i64 {
        self.precision
    }

    #[must_use]
    pub fn roots(&self) -> &RootTable {
        &self.roots
    }

    /// Pack big-endian `bytes` into `size()` elements of `width` bits each,
    /// least significant chunk first, zero-padded.
    ///
    /// Element `j` holds `chunk_j · 2^-(width + log2_size)`, so every
    /// element is below `2^-log2_size` and transform outputs stay below one.
    pub fn instance_from_bytes(&self, bytes: &[u8], width: u32) -> Result<FftInstance<'_>, MathError> {
        if width == 0 {
            return Err(MathError::argument("element width must be positive"));
        }
        let value = BigUint::from_bytes_be(bytes);
        let capacity = self.size() as u64 * u64::from(width);
        if value.bits() > capacity {
            return Err(MathError::Argument(format!(
                "{} bits do not fit in {} elements of {width} bits",
                value.bits(),
                self.size()
            )));
        }

        let mask = (BigUint::one() << width) - BigUint::one();
        let scale = i64::from(width) + i64::from(self.log2_size);
        let mut remaining = value;
        let mut elements = Vec::with_capacity(self.size());
        for _ in 0..self.size() {
            let chunk = &remaining & &mask;
            remaining >>= width;
            elements.push(ComplexNumber::from_real(BigFloat::new(BigInt::from(chunk), scale)));
        }
        Ok(FftInstance::new(self, elements))
    }

    /// Wrap already prepared elements; there must be exactly `size()`.
    pub fn instance_from_elements(
        &self,
        elements: Vec<ComplexNumber>,
    ) -> Result<FftInstance<'_>, MathError> {
        if elements.len() != self.size() {
            return Err(MathError::Argument(format!(
                "expected {} elements, got {}",
                self.size(),
                elements.len()
            )));
        }
        Ok(FftInstance::new(self, elements))
    }

    /// Twiddle factor for every index of `stage`, walked in Gray-code order
    /// so that each one costs a single multiplication.
    fn twiddles(&self, stage: u32) -> Result<Vec<ComplexNumber>, MathError> {
        let roots = self.roots.snapshot(stage as usize)?;
        let mut twiddles = vec![ComplexNumber::zero(); 1 << stage];
        let mut w = ComplexNumber::one();
        for step in GrayCode::new(stage) {
            if let Some((bit, set)) = step.toggled {
                let root = if set {
                    roots[bit].clone()
                } else {
                    roots[bit].conjugate()
                };
                w = (&root * &w).round(self.precision);
            }
            twiddles[step.index] = w.clone();
        }
        Ok(twiddles)
    }
}

/// Working buffer of one transform. Owned by the call that created it.
pub struct FftInstance<'e> {
    engine: &'e FftEngine,
    elements: Vec<ComplexNumber>,
    stage: u32,
}

impl<'e> FftInstance<'e> {
    fn new(engine: &'e FftEngine, elements: Vec<ComplexNumber>) -> Self {
        Self {
            engine,
            elements,
            stage: 1,
        }
    }

    #[must_use]
    pub fn elements(&self) -> &[ComplexNumber] {
        &self.elements
    }

    /// Next stage to run, from 1 to `log2_size + 1` (done).
    #[must_use]
    pub fn stage(&self) -> u32 {
        self.stage
    }

    /// Run one stage. Returns `false` once every stage has run.
    pub fn step(&mut self, execution: Execution) -> Result<bool, MathError> {
        let log2_size = self.engine.log2_size;
        if self.stage > log2_size {
            return Ok(false);
        }
        let span = log2_size - self.stage;
        let half = 1usize << span;
        let twiddles = self.engine.twiddles(self.stage)?;
        let precision = self.engine.precision;
        let elements = &self.elements;

        let butterfly = |k: usize| {
            let product = &elements[k | half] * &twiddles[k >> span];
            (&elements[k & !half] + &product).round(precision)
        };
        let next: Vec<ComplexNumber> = if execution.is_threaded() {
            (0..elements.len()).into_par_iter().map(butterfly).collect()
        } else {
            (0..elements.len()).map(butterfly).collect()
        };

        self.elements = next;
        self.stage += 1;
        Ok(true)
    }

    /// Run every remaining stage and return the transform in natural order.
    ///
    /// The inverse conjugates, transforms, then conjugates again and scales
    /// by `2^-log2_size`.
    pub fn transform(mut self, inverse: bool, execution: Execution) -> Result<Vec<ComplexNumber>, MathError> {
        if inverse {
            self.elements = self.elements.iter().map(ComplexNumber::conjugate).collect();
        }
        self.stage = 1;
        while self.step(execution)? {}

        let log2_size = self.engine.log2_size;
        let scale = -i64::from(log2_size);
        let output = (0..self.elements.len())
            .map(|i| {
                let element = &self.elements[reverse_bits(i, log2_size)];
                if inverse {
                    element.mul_pow2(scale).conjugate()
                } else {
                    element.clone()
                }
            })
            .collect();
        Ok(output)
    }
}

fn reverse_bits(index: usize, bits: u32) -> usize {
    if bits == 0 {
        return 0;
    }
    index.reverse_bits() >> (usize::BITS - bits)
}
