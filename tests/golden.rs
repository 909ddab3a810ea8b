//! Golden file integration tests.
//!
//! Reads tests/testdata/constants_golden.json and checks every route to a
//! constant (each π algorithm, the facade cache, the logarithm and the
//! exponential) against the decimal expansions at several precisions.

use serde::Deserialize;

use bigmath::{BigMath, Options};
use bigmath_core::{
    bbp, borwein, gauss_legendre, ln2_with, BigFloat, Execution, ExpCalculator, PiAlgorithm,
    RoundingMode, Uncached,
};

// ---------------------------------------------------------------------------
// Golden data structures
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
struct GoldenData {
    #[allow(dead_code)]
    description: String,
    precisions: Vec<i64>,
    constants: Vec<GoldenEntry>,
}

#[derive(Deserialize)]
struct GoldenEntry {
    name: String,
    value: String,
}

fn load_golden_data() -> GoldenData {
    let path = concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/tests/testdata/constants_golden.json"
    );
    let data = std::fs::read_to_string(path).expect("failed to read golden file");
    serde_json::from_str(&data).expect("failed to parse golden JSON")
}

fn reference(data: &GoldenData, name: &str, precision: i64) -> BigFloat {
    let entry = data
        .constants
        .iter()
        .find(|entry| entry.name == name)
        .unwrap_or_else(|| panic!("no golden value for {name}"));
    BigFloat::parse_radix(&entry.value, 10, precision + 16).expect("golden value parses")
}

/// The golden value truncated to `precision` fractional bits.
fn truncated(data: &GoldenData, name: &str, precision: i64) -> BigFloat {
    reference(data, name, precision).round(precision, RoundingMode::Truncate)
}

/// Asserts `|actual - expected| < 2^-(precision - 1)`.
fn assert_matches(actual: &BigFloat, expected: &BigFloat, precision: i64, what: &str) {
    let diff = (actual - expected).floor_log2();
    assert!(
        diff.map_or(true, |log| log < -(precision - 1)),
        "{what} at {precision} bits is off: 2^{diff:?}"
    );
}

// ---------------------------------------------------------------------------
// Golden: π by every algorithm
// ---------------------------------------------------------------------------

#[test]
fn golden_pi_algorithms() {
    let data = load_golden_data();
    for &p in &data.precisions {
        let expected = reference(&data, "pi", p);
        for execution in [Execution::Sequential, Execution::Threaded] {
            let gl = gauss_legendre(p, execution).unwrap();
            assert_matches(&gl, &expected, p, "gauss-legendre");
            let bb4 = borwein(p, execution).unwrap();
            assert_matches(&bb4, &expected, p, "borwein");
        }
        assert_matches(&bbp(p, 3).unwrap(), &expected, p, "bbp");
    }
}

#[test]
fn golden_pi_facade() {
    let data = load_golden_data();
    for algorithm in [PiAlgorithm::GaussLegendre, PiAlgorithm::Borwein, PiAlgorithm::Bbp] {
        let math = BigMath::with_options(Options {
            pi_algorithm: algorithm,
            ..Options::default()
        });
        for &p in &data.precisions {
            let expected = truncated(&data, "pi", p);
            assert_eq!(math.pi(p).unwrap(), expected, "{} at {p} bits", algorithm.name());
        }
    }
}

// ---------------------------------------------------------------------------
// Golden: logarithms, exponential and roots through the facade; constants
// and the exponential are truncated
// ---------------------------------------------------------------------------

#[test]
fn golden_facade_functions() {
    let data = load_golden_data();
    let math = BigMath::new();
    for &p in &data.precisions {
        let two = BigFloat::from(2);
        assert_eq!(math.ln2(p).unwrap(), truncated(&data, "ln2", p), "ln2 at {p} bits");
        assert_matches(&math.ln(&two, p).unwrap(), &reference(&data, "ln2", p), p, "ln(2)");
        assert_matches(
            &math.ln(&BigFloat::from(10), p).unwrap(),
            &reference(&data, "ln10", p),
            p,
            "ln(10)",
        );
        assert_matches(&math.sqrt(&two, p).unwrap(), &reference(&data, "sqrt2", p), p, "sqrt(2)");
        assert_eq!(math.exp(&BigFloat::one(), p).unwrap(), truncated(&data, "e", p), "exp(1) at {p} bits");
        assert_eq!(math.exp(&BigFloat::from(3), p).unwrap(), truncated(&data, "exp3", p), "exp(3) at {p} bits");
    }
}

#[test]
fn golden_exp_of_ln() {
    let data = load_golden_data();
    let math = BigMath::new();
    for &p in &data.precisions {
        let ln10 = reference(&data, "ln10", p + 8);
        let ten = math.exp(&ln10, p).unwrap();
        // e^x amplifies the error of x by ten
        assert_matches(&ten, &BigFloat::from(10), p - 4, "exp(ln 10)");
    }
}

// ---------------------------------------------------------------------------
// Threaded and sequential kernels agree bit for bit
// ---------------------------------------------------------------------------

#[test]
fn threaded_matches_sequential() {
    for p in [50, 500, 2000] {
        assert_eq!(
            gauss_legendre(p, Execution::Sequential).unwrap(),
            gauss_legendre(p, Execution::Threaded).unwrap()
        );
        assert_eq!(
            borwein(p, Execution::Sequential).unwrap(),
            borwein(p, Execution::Threaded).unwrap()
        );
        assert_eq!(
            ln2_with(p, Execution::Sequential, &Uncached).unwrap(),
            ln2_with(p, Execution::Threaded, &Uncached).unwrap()
        );
        let x = BigFloat::new(-123_456_789, 20);
        assert_eq!(
            ExpCalculator::calculate(&x, p, Execution::Sequential, &Uncached).unwrap(),
            ExpCalculator::calculate(&x, p, Execution::Threaded, &Uncached).unwrap()
        );
    }
}

#[test]
fn pi_algorithms_agree() {
    for p in [50, 500, 5000] {
        let gl = gauss_legendre(p, Execution::Threaded).unwrap();
        let bb4 = borwein(p, Execution::Threaded).unwrap();
        assert_matches(&gl, &bb4, p, "gauss-legendre vs borwein");
    }
}
