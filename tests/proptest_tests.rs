//! Property-based tests using proptest.
//!
//! These check invariants of the checks, the classifier and the batch
//! processor over arbitrary inputs.

use card_batch::issuer::NoLookup;
use card_batch::{
    cvv, detect, expiry, luhn, mask, normalize_number, BatchProcessor, CardBrand, CardRecord,
    FieldValidator, FixedClock, LengthPolicy, RawCardRecord, RecordValidator,
};
use proptest::prelude::*;
use std::sync::Arc;

// =============================================================================
// STRATEGIES
// =============================================================================

/// Generates a random digit string of a given length.
fn digit_string(len: usize) -> impl Strategy<Value = String> {
    proptest::collection::vec(prop::char::range('0', '9'), len)
        .prop_map(|chars| chars.into_iter().collect())
}

/// Generates a random digit string of a length within range.
fn digit_string_range(range: std::ops::RangeInclusive<usize>) -> impl Strategy<Value = String> {
    range.prop_flat_map(digit_string)
}

/// Appends the Luhn check digit to `prefix`.
fn with_check_digit(prefix: &str) -> String {
    let digits: Vec<u8> = prefix.bytes().map(|b| b - b'0').collect();
    format!("{}{}", prefix, luhn::generate_check_digit(&digits))
}

/// Generates a card record with plausible and implausible field values.
fn record_strategy() -> impl Strategy<Value = CardRecord> {
    let number = prop_oneof![
        digit_string_range(11..=18).prop_map(|p| with_check_digit(&p)),
        digit_string_range(0..=20),
        ".{0,24}",
    ];
    let expiry = prop_oneof![
        (1u32..=12, 0u32..=99).prop_map(|(m, y)| format!("{:02}/{:02}", m, y)),
        (1u32..=12, 1990u32..=2099).prop_map(|(m, y)| format!("{:02}/{}", m, y)),
        ".{0,8}",
    ];
    let cvv = prop_oneof![digit_string_range(2..=5), ".{0,5}"];

    ("[a-zA-Z ]{0,12}", number, expiry, cvv)
        .prop_map(|(name, number, expiry, cvv)| CardRecord::new(name, number, expiry, cvv))
}

fn validator(policy: LengthPolicy) -> RecordValidator {
    let clock = Arc::new(FixedClock::at_date(2026, 10, 16).unwrap());
    RecordValidator::new(FieldValidator::new(policy, clock))
}

// =============================================================================
// CHECKSUM PROPERTIES
// =============================================================================

proptest! {
    /// Property: Appending the check digit makes any digit sequence pass.
    #[test]
    fn check_digit_makes_valid(prefix in digit_string_range(1..=18)) {
        let full = with_check_digit(&prefix);
        prop_assert!(luhn::passes(&full), "{} should pass", full);
    }

    /// Property: Changing any single digit breaks the checksum.
    #[test]
    fn single_digit_change_invalidates(
        prefix in digit_string_range(12..=18),
        pos in any::<prop::sample::Index>(),
        delta in 1u8..=9u8,
    ) {
        let full = with_check_digit(&prefix);
        let mut digits: Vec<u8> = full.bytes().map(|b| b - b'0').collect();
        let i = pos.index(digits.len());
        digits[i] = (digits[i] + delta) % 10;
        prop_assert!(!luhn::validate(&digits));
    }

    /// Property: Any string with a non-digit fails the checksum.
    #[test]
    fn non_digit_input_fails(prefix in digit_string_range(0..=10), junk in "[^0-9]") {
        let input = format!("{}{}", prefix, junk);
        prop_assert!(!luhn::passes(&input));
    }
}

// =============================================================================
// NORMALIZATION AND CLASSIFICATION
// =============================================================================

proptest! {
    /// Property: Normalization is idempotent and yields digits only.
    #[test]
    fn normalize_idempotent(input in ".*") {
        let once = normalize_number(&input);
        prop_assert!(once.bytes().all(|b| b.is_ascii_digit()));
        prop_assert_eq!(normalize_number(&once), once);
    }

    /// Property: Classification is total and ignores separators.
    #[test]
    fn classify_total(number in digit_string_range(0..=19)) {
        let grouped: String = number
            .as_bytes()
            .chunks(4)
            .map(|c| std::str::from_utf8(c).unwrap_or_default())
            .collect::<Vec<_>>()
            .join(" ");
        prop_assert_eq!(detect::classify(&number), detect::classify_formatted(&grouped));
    }

    /// Property: A leading 4 is always Visa.
    #[test]
    fn leading_four_is_visa(rest in digit_string_range(0..=18)) {
        prop_assert_eq!(detect::classify(&format!("4{}", rest)), CardBrand::Visa);
    }

    /// Property: 6011 is Discover whatever follows.
    #[test]
    fn discover_6011(rest in digit_string_range(0..=15)) {
        prop_assert_eq!(detect::classify(&format!("6011{}", rest)), CardBrand::Discover);
    }

    /// Property: Masked output never contains more than the last four digits.
    #[test]
    fn mask_hides_number(number in digit_string_range(13..=19)) {
        let masked = mask::mask_number(&number);
        let shown: String = masked.chars().filter(|c| c.is_ascii_digit()).collect();
        prop_assert_eq!(shown, &number[number.len() - 4..]);
    }
}

// =============================================================================
// FIELD CHECK PROPERTIES
// =============================================================================

proptest! {
    /// Property: CVV passes exactly for 3 or 4 ASCII digits.
    #[test]
    fn cvv_rule(input in ".{0,6}") {
        let expected = (input.len() == 3 || input.len() == 4)
            && input.bytes().all(|b| b.is_ascii_digit());
        prop_assert_eq!(cvv::is_valid_cvv(&input), expected);
    }

    /// Property: Two-digit years read as 2000 + YY.
    #[test]
    fn two_digit_year(month in 1u32..=12, year in 0u32..=99) {
        let parsed = expiry::parse_expiry(&format!("{:02}/{:02}", month, year)).unwrap();
        prop_assert_eq!(parsed.month(), month);
        prop_assert_eq!(parsed.year(), 2000 + year as i32);
    }

    /// Property: Expiry parsing never panics.
    #[test]
    fn expiry_never_panics(input in ".*") {
        let clock = FixedClock::at_date(2026, 10, 16).unwrap();
        let _ = expiry::parse_expiry(&input);
        let _ = expiry::check_expiry(&input, &clock);
    }
}

// =============================================================================
// VERDICT AND BATCH PROPERTIES
// =============================================================================

proptest! {
    /// Property: overall validity is exactly the AND of the four checks.
    #[test]
    fn overall_is_and_of_checks(
        record in record_strategy(),
        minimum in any::<bool>(),
    ) {
        let policy = if minimum { LengthPolicy::Minimum } else { LengthPolicy::Strict };
        let verdict = validator(policy).validate(record, &NoLookup);
        let c = verdict.checks();
        prop_assert_eq!(
            verdict.is_valid(),
            c.checksum_ok && c.length_ok && c.expiry_ok && c.cvv_ok
        );
        prop_assert_eq!(verdict.reason().is_none(), verdict.is_valid());
    }

    /// Property: Strict lengths are a subset of minimum lengths.
    #[test]
    fn strict_implies_minimum(record in record_strategy()) {
        let strict = validator(LengthPolicy::Strict).validate(record.clone(), &NoLookup);
        let minimum = validator(LengthPolicy::Minimum).validate(record, &NoLookup);
        prop_assert!(!strict.checks().length_ok || minimum.checks().length_ok);
    }

    /// Property: One verdict per record, in order; valid subset is a stable filter.
    #[test]
    fn batch_order_and_stable_filter(
        records in proptest::collection::vec(record_strategy(), 0..24),
        workers in 0usize..5,
    ) {
        let result = BatchProcessor::new(validator(LengthPolicy::Strict))
            .with_workers(workers)
            .process(&records, &NoLookup);

        prop_assert_eq!(result.len(), records.len());
        let verdicts: Vec<_> = result.verdicts().collect();
        for (verdict, record) in verdicts.iter().zip(&records) {
            prop_assert_eq!(verdict.record(), record);
        }

        let expected: Vec<_> = verdicts.iter().filter(|v| v.is_valid()).map(|v| v.record()).collect();
        let subset: Vec<_> = result.valid_subset().iter().map(|v| v.record()).collect();
        prop_assert_eq!(subset, expected);

        let summary = result.summary();
        prop_assert_eq!(summary.valid + summary.invalid + summary.errored, summary.total);
    }

    /// Property: Raw records without a number error; all others validate.
    #[test]
    fn raw_missing_number(
        records in proptest::collection::vec(
            (proptest::option::of(record_strategy()), any::<bool>()), 0..12),
    ) {
        let raw: Vec<RawCardRecord> = records
            .iter()
            .map(|(record, keep_name)| match record {
                Some(r) => RawCardRecord::from(r.clone()),
                None if *keep_name => RawCardRecord::default().name("x"),
                None => RawCardRecord::default(),
            })
            .collect();

        let result = BatchProcessor::new(validator(LengthPolicy::Strict)).process_raw(&raw, &NoLookup);
        for ((record, _), outcome) in records.iter().zip(result.outcomes()) {
            prop_assert_eq!(record.is_some(), outcome.is_ok());
        }
    }
}
