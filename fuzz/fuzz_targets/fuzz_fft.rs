#![no_main]

use libfuzzer_sys::fuzz_target;
use num_bigint::{BigInt, Sign};

use bigmath_core::fft::multiply;
use bigmath_core::Execution;

fuzz_target!(|data: &[u8]| {
    if data.len() < 2 {
        return;
    }
    // First byte splits the rest into two operands, capped for speed
    let data = &data[..data.len().min(4096)];
    let split = 1 + usize::from(data[0]) % (data.len() - 1);
    let a = BigInt::from_bytes_be(Sign::Plus, &data[1..split]);
    let b = BigInt::from_bytes_be(Sign::Minus, &data[split..]);

    let product = multiply(&a, &b, Execution::Sequential).expect("fft multiply");
    assert_eq!(product, &a * &b);
});
