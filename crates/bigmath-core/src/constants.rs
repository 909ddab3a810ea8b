//! Constants for precision defaults, FFT parameters and the exponential.

/// Precision (bits after the point) used when the caller gives none.
pub const DEFAULT_PRECISION: i64 = 64;

/// Default operand size (in bits) from which multiplication goes through the
/// FFT engine, when FFT multiplication is enabled.
pub const DEFAULT_FFT_THRESHOLD: u64 = 50_000;

/// Limb width of the FFT multiplier for ordinary operands.
pub const FFT_SMALL_LIMB_BITS: u32 = 8;

/// Limb width above [`FFT_LARGE_LIMB_THRESHOLD`] bits.
pub const FFT_LARGE_LIMB_BITS: u32 = 16;

/// Operand size (in bits) from which the wide limbs are used.
pub const FFT_LARGE_LIMB_THRESHOLD: u64 = 100_000;

/// Smallest transform used by the FFT multiplier.
pub const FFT_MIN_LOG2_SIZE: u32 = 7;

/// Terms of the Taylor series inside each exponential Newton step.
pub const TAYLOR_TERMS: usize = 16;

/// Working precision of the exponential is
/// `EXP_PRECISION_MULTIPLIER · p + EXP_PRECISION_ADD`.
pub const EXP_PRECISION_MULTIPLIER: i64 = 2;

pub const EXP_PRECISION_ADD: i64 = 20;

/// Default worker count of the BBP series.
pub const DEFAULT_BBP_THREADS: usize = 4;

/// Products computed by each exponential worker, as `(a, b)` pairs meaning
/// `dy^(a+b) = dy^a · dy^b`.
///
/// Together they produce every power from 2 to 15 exactly once.
pub const EXP_PROGRAMS: [&[(usize, usize)]; 4] = [
    &[(1, 1), (2, 2), (4, 4), (8, 4), (12, 2)],
    &[(2, 1), (4, 1), (8, 1), (12, 1)],
    &[(4, 2), (8, 2), (9, 2)],
    &[(4, 3), (8, 7)],
];
