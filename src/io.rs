//! Reading card batches and persisting the valid subset.
//!
//! Input is a JSON array of objects with `name`, `number`, `expiry` and
//! `cvv` keys. Fields are decoded leniently here: numeric values read as
//! their decimal text, and an entry that is not an object decodes as an
//! empty record. A record without a `number` only fails when it is
//! processed, so one bad entry never rejects the file.

use crate::batch::BatchResult;
use crate::card::{RawCardRecord, UNKNOWN_NAME};
use crate::error::LoadError;
use crate::issuer::estimate_zip;
use crate::validate::{Status, Verdict};
use serde::Serialize;
use serde_json::Value;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

/// Default file name for the valid-card export.
pub const DEFAULT_OUTPUT: &str = "valid_cards.json";

/// Loads a batch from a JSON file.
pub fn load_records<P: AsRef<Path>>(path: P) -> Result<Vec<RawCardRecord>, LoadError> {
    let file = File::open(path)?;
    load_records_from_reader(BufReader::new(file))
}

/// Loads a batch from any reader.
pub fn load_records_from_reader<R: Read>(reader: R) -> Result<Vec<RawCardRecord>, LoadError> {
    let entries: Vec<Value> = serde_json::from_reader(reader)?;
    Ok(decode_entries(entries))
}

/// Loads a batch from a JSON string.
pub fn parse_records(json: &str) -> Result<Vec<RawCardRecord>, LoadError> {
    let entries: Vec<Value> = serde_json::from_str(json)?;
    Ok(decode_entries(entries))
}

fn decode_entries(entries: Vec<Value>) -> Vec<RawCardRecord> {
    entries
        .into_iter()
        .enumerate()
        .map(|(index, entry)| {
            serde_json::from_value(entry).unwrap_or_else(|e| {
                tracing::warn!(index, error = %e, "unreadable record entry");
                RawCardRecord::default()
            })
        })
        .collect()
}

/// One entry of the valid-card export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidCardExport<'a> {
    /// Cardholder name.
    pub name: &'a str,
    /// Digit-only card number.
    pub number: String,
    /// Brand from prefix classification.
    #[serde(rename = "type")]
    pub card_type: &'static str,
    /// Scheme reported by the issuer lookup.
    pub brand: &'a str,
    /// Issuing country.
    pub country: &'a str,
    /// Issuing bank.
    pub bank: &'a str,
    /// Estimated head-office ZIP code of the bank.
    pub zip_code: &'static str,
    /// Expiry as given in the input.
    pub expiry: &'a str,
    /// CVV as given in the input.
    pub cvv: &'a str,
    /// Checksum result.
    pub luhn: bool,
    /// Length result.
    pub length: bool,
    /// Expiry result.
    pub expiry_ok: bool,
    /// CVV result.
    pub cvv_ok: bool,
    /// Always `VALID` in an export.
    pub status: Status,
}

impl<'a> From<&'a Verdict> for ValidCardExport<'a> {
    fn from(verdict: &'a Verdict) -> Self {
        let record = verdict.record();
        let issuer = verdict.issuer();
        let checks = verdict.checks();
        let bank = issuer.bank_name.as_deref();

        Self {
            name: &record.name,
            number: verdict.normalized_number(),
            card_type: verdict.brand().name(),
            brand: issuer.scheme.as_deref().unwrap_or(UNKNOWN_NAME),
            country: issuer.country_name.as_deref().unwrap_or(UNKNOWN_NAME),
            bank: bank.unwrap_or(UNKNOWN_NAME),
            zip_code: estimate_zip(bank.unwrap_or_default()),
            expiry: &record.expiry,
            cvv: &record.cvv,
            luhn: checks.checksum_ok,
            length: checks.length_ok,
            expiry_ok: checks.expiry_ok,
            cvv_ok: checks.cvv_ok,
            status: verdict.status(),
        }
    }
}

/// Builds the export entries for the valid subset, in input order.
pub fn export_valid(result: &BatchResult) -> Vec<ValidCardExport<'_>> {
    result
        .valid_subset()
        .into_iter()
        .map(ValidCardExport::from)
        .collect()
}

/// Writes the valid subset as a pretty JSON array.
///
/// Returns the number of cards written. When no card is valid nothing is
/// written and an existing file at `path` is left untouched.
pub fn write_valid<P: AsRef<Path>>(path: P, result: &BatchResult) -> Result<usize, LoadError> {
    let entries = export_valid(result);
    if entries.is_empty() {
        return Ok(0);
    }

    let mut writer = BufWriter::new(File::create(path)?);
    write_valid_to(&mut writer, &entries)?;
    writer.flush()?;
    Ok(entries.len())
}

/// Serializes export entries to `writer`.
pub fn write_valid_to<W: Write>(writer: W, entries: &[ValidCardExport<'_>]) -> Result<(), LoadError> {
    serde_json::to_writer_pretty(writer, entries)?;
    Ok(())
}
