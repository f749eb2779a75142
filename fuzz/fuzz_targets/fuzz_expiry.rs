//! Fuzz target for expiry parsing.
//!
//! Tests that expiry parsing never panics on arbitrary input.

#![no_main]

use libfuzzer_sys::fuzz_target;
use card_batch::expiry::{self, FixedClock, SystemClock};

fuzz_target!(|data: &str| {
    let _ = expiry::check_expiry(data, &SystemClock);

    if let Some(clock) = FixedClock::at_date(2026, 10, 16) {
        let _ = expiry::check_expiry(data, &clock);
    }

    if let Ok(exp) = expiry::parse_expiry(data) {
        assert!((1..=12).contains(&exp.month()));
        let _ = exp.first_moment();
        let _ = exp.to_string();
        assert!(exp.year() >= 100);
    }
});
