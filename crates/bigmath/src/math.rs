//! Precision-aware entry points.

use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};

use bigmath_core::{
    bbp, bit_length, check_precision, join, BigFloat, Execution, MathError, RoundingMode,
};

use crate::cache::{Constant, ConstantCache};
use crate::options::{ConfigError, Options};

/// Largest estimated `log2` of a [`BigMath::pow`] result.
const MAX_POW_LOG2: f64 = (1u64 << 40) as f64;

/// Arbitrary-precision math with a default precision, a runtime threading
/// switch and cached constants.
///
/// Every operation takes an explicit precision (bits after the point) or
/// `None` for the current default.
///
/// # Example
/// ```
/// use bigmath::{BigFloat, BigMath};
///
/// let math = BigMath::new();
/// let third = math.divide(&BigFloat::from(1), &BigFloat::from(3), 16).unwrap();
/// assert_eq!(third, BigFloat::new(21845, 16));
/// ```
#[derive(Debug)]
pub struct BigMath {
    default_precision: AtomicI64,
    threaded: AtomicBool,
    fft_threshold: Option<u64>,
    bbp_threads: usize,
    cache: ConstantCache,
}

impl BigMath {
    /// Facade with default options and no persistence.
    #[must_use]
    pub fn new() -> Self {
        Self::with_options(Options::default())
    }

    #[must_use]
    pub fn with_options(options: Options) -> Self {
        let options = options.normalize();
        let cache = ConstantCache::new(options.pi_algorithm, options.bbp_threads);
        Self::with_cache(options, cache)
    }

    /// Facade over an existing cache, e.g. one with persistent stores.
    #[must_use]
    pub fn with_cache(options: Options, cache: ConstantCache) -> Self {
        let options = options.normalize();
        tracing::debug!(?options, "creating facade");
        Self {
            default_precision: AtomicI64::new(options.default_precision),
            threaded: AtomicBool::new(options.execution.is_threaded()),
            fft_threshold: options.fft_threshold,
            bbp_threads: options.bbp_threads,
            cache,
        }
    }

    /// Facade configured from the `BIGMATH_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self::with_options(Options::from_env()?))
    }

    #[must_use]
    pub fn default_precision(&self) -> i64 {
        self.default_precision.load(Ordering::Relaxed)
    }

    pub fn set_default_precision(&self, precision: i64) -> Result<(), MathError> {
        check_precision(precision)?;
        self.default_precision.store(precision, Ordering::Relaxed);
        Ok(())
    }

    #[must_use]
    pub fn is_threaded(&self) -> bool {
        self.threaded.load(Ordering::Relaxed)
    }

    /// Switch between sequential and threaded kernels for later calls.
    pub fn set_threaded(&self, threaded: bool) {
        self.threaded.store(threaded, Ordering::Relaxed);
    }

    #[must_use]
    pub fn execution(&self) -> Execution {
        Execution::from_flag(self.is_threaded())
    }

    #[must_use]
    pub fn fft_threshold(&self) -> Option<u64> {
        self.fft_threshold
    }

    #[must_use]
    pub fn cache(&self) -> &ConstantCache {
        &self.cache
    }

    fn precision(&self, precision: impl Into<Option<i64>>) -> Result<i64, MathError> {
        let precision = precision.into().unwrap_or_else(|| self.default_precision());
        check_precision(precision)?;
        Ok(precision)
    }

    #[must_use]
    pub fn add_exact(&self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        a + b
    }

    pub fn add(
        &self,
        a: &BigFloat,
        b: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        Ok((a + b).round(p, RoundingMode::Nearest))
    }

    #[must_use]
    pub fn subtract_exact(&self, a: &BigFloat, b: &BigFloat) -> BigFloat {
        a - b
    }

    pub fn subtract(
        &self,
        a: &BigFloat,
        b: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        Ok((a - b).round(p, RoundingMode::Nearest))
    }

    /// Exact product, through the FFT engine when an operand reaches the
    /// configured threshold.
    pub fn multiply_exact(&self, a: &BigFloat, b: &BigFloat) -> Result<BigFloat, MathError> {
        a.mul_adaptive(b, self.fft_threshold, self.execution())
    }

    pub fn multiply(
        &self,
        a: &BigFloat,
        b: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        Ok(self.multiply_exact(a, b)?.round(p, RoundingMode::Nearest))
    }

    #[must_use]
    pub fn mul_pow2(&self, a: &BigFloat, power: i64) -> BigFloat {
        a.mul_pow2(power)
    }

    pub fn inverse(
        &self,
        a: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        a.inverse(self.precision(precision)?)
    }

    pub fn divide(
        &self,
        a: &BigFloat,
        b: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        a.divide(b, self.precision(precision)?)
    }

    /// Round to nearest, ties away from zero.
    pub fn round(
        &self,
        a: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        self.round_with(a, precision, RoundingMode::Nearest)
    }

    pub fn round_with(
        &self,
        a: &BigFloat,
        precision: impl Into<Option<i64>>,
        mode: RoundingMode,
    ) -> Result<BigFloat, MathError> {
        Ok(a.round(self.precision(precision)?, mode))
    }

    #[must_use]
    pub fn abs(&self, a: &BigFloat) -> BigFloat {
        a.abs()
    }

    #[must_use]
    pub fn negate(&self, a: &BigFloat) -> BigFloat {
        a.negate()
    }

    #[must_use]
    pub fn sign(&self, a: &BigFloat) -> i32 {
        a.signum()
    }

    /// `floor(log2(|a|))`, or `None` for zero.
    #[must_use]
    pub fn floor_log2(&self, a: &BigFloat) -> Option<i64> {
        a.floor_log2()
    }

    pub fn inverse_sqrt(
        &self,
        a: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        a.inverse_sqrt(self.precision(precision)?)
    }

    pub fn sqrt(
        &self,
        a: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        a.sqrt(self.precision(precision)?)
    }

    /// π truncated to the precision, from the cache when it holds enough bits.
    pub fn pi(&self, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        self.cache.get(Constant::Pi, p, self.execution())
    }

    /// π computed afresh with the configured algorithm; refreshes the cache.
    pub fn recompute_pi(&self, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        self.cache.recompute(Constant::Pi, p, self.execution())
    }

    /// π from the BBP series on the configured number of threads, uncached.
    pub fn pi_bbp(&self, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        bbp(self.precision(precision)?, self.bbp_threads)
    }

    /// ln 2 truncated to the precision, from the cache when it holds enough bits.
    pub fn ln2(&self, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        self.cache.get(Constant::Ln2, p, self.execution())
    }

    /// ln 2 computed afresh; refreshes the cache.
    pub fn recompute_ln2(&self, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        self.cache.recompute(Constant::Ln2, p, self.execution())
    }

    /// Natural logarithm. [`MathError::Domain`] for `a ≤ 0`.
    pub fn ln(&self, a: &BigFloat, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        a.ln(self.precision(precision)?, self.execution(), &self.cache)
    }

    /// Logarithm of `a` to `base`, as `ln(a) / ln(base)`.
    ///
    /// Both logarithms run concurrently under threaded execution. A base
    /// within `2^-precision` of one is a domain error.
    pub fn log(
        &self,
        a: &BigFloat,
        base: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        if a.signum() <= 0 || base.signum() <= 0 {
            return Err(MathError::Domain("logarithm of a non-positive value".into()));
        }
        let base_offset = (base - &BigFloat::one()).floor_log2();
        if base_offset.map_or(true, |log| log < -p) {
            return Err(MathError::Domain("logarithm base too close to one".into()));
        }

        // ln(base) may be as small as 2^offset; ln(a) is below 2^bits.
        let small_base = (-base_offset.unwrap_or(0)).max(0) + 1;
        let ln_a_bits = bit_length(a.floor_log2().unwrap_or(0).abs() + 1);
        let work = p + 2 * small_base + ln_a_bits + 4;

        let execution = self.execution();
        let (ln_a, ln_base) = join(
            execution,
            || a.ln(work, execution, &self.cache),
            || base.ln(work, execution, &self.cache),
        );
        ln_a?.divide(&ln_base?, p)
    }

    /// `e^a` truncated to the precision.
    pub fn exp(&self, a: &BigFloat, precision: impl Into<Option<i64>>) -> Result<BigFloat, MathError> {
        a.exp(self.precision(precision)?, self.execution(), &self.cache)
    }

    /// `base^exponent` as `e^(exponent · ln(base))`. [`MathError::Domain`]
    /// for `base ≤ 0`.
    pub fn pow(
        &self,
        base: &BigFloat,
        exponent: &BigFloat,
        precision: impl Into<Option<i64>>,
    ) -> Result<BigFloat, MathError> {
        let p = self.precision(precision)?;
        if base.signum() <= 0 {
            return Err(MathError::Domain("power of a non-positive base".into()));
        }
        if exponent.is_zero() {
            return Ok(BigFloat::one());
        }

        // log2(base) lies in [floor, floor + 1).
        let floor = base.floor_log2().unwrap_or(0) as f64;
        let e = exponent.to_f64();
        let estimate = (floor * e).max((floor + 1.0) * e).ceil();
        if !estimate.is_finite() || estimate > MAX_POW_LOG2 {
            return Err(MathError::Argument("power result out of range".into()));
        }
        let headroom = estimate.max(0.0) as i64;
        let work = p + headroom + exponent.whole_bits().max(0) + 8;

        let execution = self.execution();
        let ln_base = base.ln(work, execution, &self.cache)?;
        let y = self.multiply_exact(&ln_base, exponent)?.round(work, RoundingMode::Nearest);
        y.exp(p, execution, &self.cache)
    }
}

impl Default for BigMath {
    fn default() -> Self {
        Self::new()
    }
}
