//! Integer multiplication through the complex transform.

use std::sync::OnceLock;

use num_bigint::{BigInt, Sign};
use num_traits::Zero;

use crate::complex::ComplexNumber;
use crate::constants::{
    FFT_LARGE_LIMB_BITS, FFT_LARGE_LIMB_THRESHOLD, FFT_MIN_LOG2_SIZE, FFT_SMALL_LIMB_BITS,
};
use crate::error::MathError;
use crate::execution::{join, Execution};
use crate::float::{bit_length, RoundingMode};

use super::cache::{EngineCache, EngineKey};
use super::engine::{FftEngine, MAX_LOG2_SIZE};

/// Transform parameters for one multiplication.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FftParams {
    /// Limb width `l` in bits.
    pub limb_bits: u32,
    /// `k` such that `2n ≤ l·2^k < 4n`, at least the minimum size.
    pub log2_size: u32,
    /// Engine precision, `4k + 2l` plus guard bits.
    pub precision: i64,
}

/// Parameters for operands of at most `max_bits` bits.
#[must_use]
pub fn select_params(max_bits: u64) -> FftParams {
    let limb_bits = if max_bits > FFT_LARGE_LIMB_THRESHOLD {
        FFT_LARGE_LIMB_BITS
    } else {
        FFT_SMALL_LIMB_BITS
    };
    let mut log2_size = FFT_MIN_LOG2_SIZE;
    while (u64::from(limb_bits) << log2_size) < 2 * max_bits {
        log2_size += 1;
    }
    let k = i64::from(log2_size);
    let precision = 4 * k + 2 * i64::from(limb_bits) + 8 + bit_length(k);
    FftParams {
        limb_bits,
        log2_size,
        precision,
    }
}

fn engines() -> &'static EngineCache {
    static ENGINES: OnceLock<EngineCache> = OnceLock::new();
    ENGINES.get_or_init(EngineCache::default)
}

/// Exact product `a · b` computed with the FFT engine.
///
/// Both magnitudes are packed into limbs, transformed (concurrently under
/// [`Execution::Threaded`], once when squaring), multiplied pointwise and
/// transformed back. Each coefficient is rounded to the nearest integer and
/// the carries are resolved by the final integer sum.
pub fn multiply(a: &BigInt, b: &BigInt, execution: Execution) -> Result<BigInt, MathError> {
    if a.is_zero() || b.is_zero() {
        return Ok(BigInt::zero());
    }
    let params = select_params(a.bits().max(b.bits()));
    if params.log2_size > MAX_LOG2_SIZE {
        return Err(MathError::Argument(format!(
            "operands of {} bits are too large for the FFT multiplier",
            a.bits().max(b.bits())
        )));
    }
    let engine = engines().get(EngineKey {
        log2_size: params.log2_size,
        precision: params.precision,
    })?;
    tracing::trace!(
        log2_size = params.log2_size,
        limb_bits = params.limb_bits,
        precision = params.precision,
        "fft multiply"
    );

    let (sign_a, bytes_a) = a.to_bytes_be();
    let (sign_b, bytes_b) = b.to_bytes_be();
    let forward = |bytes: &[u8]| -> Result<Vec<ComplexNumber>, MathError> {
        engine
            .instance_from_bytes(bytes, params.limb_bits)?
            .transform(false, execution)
    };

    let products: Vec<ComplexNumber> = if bytes_a == bytes_b {
        let spectrum = forward(&bytes_a)?;
        spectrum
            .iter()
            .map(|z| (z * z).round(params.precision))
            .collect()
    } else {
        let (spectrum_a, spectrum_b) = join(execution, || forward(&bytes_a), || forward(&bytes_b));
        spectrum_a?
            .iter()
            .zip(spectrum_b?.iter())
            .map(|(x, y)| (x * y).round(params.precision))
            .collect()
    };

    let coefficients = engine
        .instance_from_elements(products)?
        .transform(true, execution)?;
    let magnitude = reassemble(&engine, &coefficients, params.limb_bits);

    Ok(if (sign_a == Sign::Minus) == (sign_b == Sign::Minus) {
        magnitude
    } else {
        -magnitude
    })
}

/// Sum `round(c_j · 2^(2k + 2l)) << (j·l)` over the inverse transform.
fn reassemble(engine: &FftEngine, coefficients: &[ComplexNumber], limb_bits: u32) -> BigInt {
    let scale = 2 * (i64::from(engine.log2_size()) + i64::from(limb_bits));
    let mut result = BigInt::zero();
    for (j, c) in coefficients.iter().enumerate() {
        let coefficient = c
            .real()
            .mul_pow2(scale)
            .round(0, RoundingMode::Nearest)
            .trunc();
        if !coefficient.is_zero() {
            result += coefficient << (j * limb_bits as usize);
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::float::BigFloat;
    use num_traits::One;

    fn pseudo_random(bits: u64, seed: u64) -> BigInt {
        let mut state = seed;
        let mut value = BigInt::zero();
        for _ in 0..bits.div_ceil(32) {
            state = state.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1_442_695_040_888_963_407);
            value = (value << 32) + BigInt::from(state >> 32);
        }
        value
    }

    #[test]
    fn params_follow_size_rule() {
        let small = select_params(1_000);
        assert_eq!(small.limb_bits, 8);
        assert_eq!(small.log2_size, 8); // 8·2^8 = 2048 ≥ 2000
        let large = select_params(200_000);
        assert_eq!(large.limb_bits, 16);
        let room = u64::from(large.limb_bits) << large.log2_size;
        assert!(room >= 400_000 && room < 800_000);
        assert_eq!(select_params(1).log2_size, FFT_MIN_LOG2_SIZE);
        assert!(large.precision > 4 * i64::from(large.log2_size) + 32);
    }

    #[test]
    fn zero_operand() {
        let x = BigInt::from(12_345);
        assert!(multiply(&x, &BigInt::zero(), Execution::Sequential).unwrap().is_zero());
        assert!(multiply(&BigInt::zero(), &x, Execution::Threaded).unwrap().is_zero());
    }

    #[test]
    fn small_products() {
        let cases = [(3, 5), (-7, 9), (255, 255), (-65_535, -65_537)];
        for (a, b) in cases {
            let (a, b) = (BigInt::from(a), BigInt::from(b));
            assert_eq!(multiply(&a, &b, Execution::Sequential).unwrap(), &a * &b);
        }
    }

    #[test]
    fn matches_schoolbook_product() {
        let a = pseudo_random(1_500, 1);
        let b = -pseudo_random(900, 2);
        assert_eq!(multiply(&a, &b, Execution::Sequential).unwrap(), &a * &b);
    }

    #[test]
    fn square_path() {
        let a = pseudo_random(1_200, 3);
        assert_eq!(multiply(&a, &a, Execution::Sequential).unwrap(), &a * &a);
        let all_ones = (BigInt::one() << 1_000) - 1;
        assert_eq!(
            multiply(&all_ones, &all_ones, Execution::Sequential).unwrap(),
            &all_ones * &all_ones
        );
    }

    #[test]
    fn threaded_equals_sequential() {
        let a = pseudo_random(2_000, 4);
        let b = pseudo_random(1_700, 5);
        let sequential = multiply(&a, &b, Execution::Sequential).unwrap();
        let threaded = multiply(&a, &b, Execution::Threaded).unwrap();
        assert_eq!(sequential, threaded);
        assert_eq!(sequential, &a * &b);
    }

    #[test]
    fn float_product() {
        let x = BigFloat::new(pseudo_random(700, 6), 650);
        let y = BigFloat::new(-pseudo_random(500, 7), -20);
        assert_eq!(x.mul_fft(&y, Execution::Sequential).unwrap(), &x * &y);
    }
}
