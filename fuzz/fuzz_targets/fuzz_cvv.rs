//! Fuzz target for CVV checking.
//!
//! Tests that CVV functions never panic and agree with each other.

#![no_main]

use libfuzzer_sys::fuzz_target;
use card_batch::cvv;

fuzz_target!(|data: &str| {
    let result = cvv::validate_cvv(data);
    assert_eq!(result.is_ok(), cvv::is_valid_cvv(data));

    if let Ok(len) = result {
        assert!(len == 3 || len == 4);
    }
});
