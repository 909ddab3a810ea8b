#![no_main]

use libfuzzer_sys::fuzz_target;

use bigmath_store::{decode, encode, Encoding};

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode or fail cleanly
    let Ok((header, value)) = decode(data, None) else {
        return;
    };
    if !header.is_binary() {
        return;
    }
    let bytes = encode(&value, Encoding::Binary).expect("decoded value re-encodes");
    let (_, again) = decode(&bytes, None).expect("re-encoded value decodes");
    assert_eq!(again, value);
    assert_eq!(again.exponent(), header.precision);
});
