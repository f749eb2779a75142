//! Fuzz target for the Luhn checksum.
//!
//! Checks that luhn functions never panic and that generated check digits
//! always validate.

#![no_main]

use libfuzzer_sys::fuzz_target;
use card_batch::luhn;

fuzz_target!(|data: &[u8]| {
    // Raw bytes may be out of digit range; validate must just say no
    let _ = luhn::validate(data);

    let digits: Vec<u8> = data.iter().map(|&b| b % 10).collect();
    if digits.is_empty() {
        return;
    }

    let text: String = digits.iter().map(|d| char::from(b'0' + d)).collect();
    assert_eq!(luhn::validate(&digits), luhn::passes(&text));

    if digits.len() <= 18 {
        let check = luhn::generate_check_digit(&digits);
        assert!(check <= 9, "Check digit should be 0-9");

        let mut with_check = digits.clone();
        with_check.push(check);
        assert!(luhn::validate(&with_check), "Adding check digit should make valid");
    }
});
