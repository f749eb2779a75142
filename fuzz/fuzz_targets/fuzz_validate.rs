//! Fuzz target for record validation.
//!
//! Tests that validating arbitrary records never panics and that the
//! verdict is consistent with its checks.

#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use card_batch::issuer::NoLookup;
use card_batch::{BatchProcessor, CardRecord, RawCardRecord, RecordValidator};

#[derive(Debug, Arbitrary)]
struct Input {
    name: Option<String>,
    number: Option<String>,
    expiry: Option<String>,
    cvv: Option<String>,
}

fuzz_target!(|inputs: Vec<Input>| {
    let raw: Vec<RawCardRecord> = inputs
        .into_iter()
        .map(|i| RawCardRecord {
            name: i.name,
            number: i.number,
            expiry: i.expiry,
            cvv: i.cvv,
        })
        .collect();

    let result = BatchProcessor::default().process_raw(&raw, &NoLookup);
    assert_eq!(result.len(), raw.len());

    for verdict in result.verdicts() {
        let c = verdict.checks();
        assert_eq!(
            verdict.is_valid(),
            c.checksum_ok && c.length_ok && c.expiry_ok && c.cvv_ok
        );
    }

    if let Some(first) = raw.first().and_then(|r| r.number.clone()) {
        let record = CardRecord::new("fuzz", first, "12/29", "123");
        let _ = RecordValidator::default().validate(record, &NoLookup);
    }
});
