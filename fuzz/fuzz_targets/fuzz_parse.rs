#![no_main]

use libfuzzer_sys::fuzz_target;

use bigmath_core::BigFloat;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }
    let radix = 2 + u32::from(data[0]) % 35;
    let Ok(text) = std::str::from_utf8(&data[1..]) else {
        return;
    };
    // Should not panic
    if let Ok(value) = BigFloat::parse_radix(text, radix, 64) {
        let _ = value.to_string_radix(radix);
    }
});
