//! JSON issuer table loader.
//!
//! # Supported Formats
//!
//! ## Array format
//!
//! ```json
//! [
//!   { "bin": "453914", "scheme": "visa", "bank": "Test Bank", "country": "Denmark" },
//!   { "bin": "510000", "bin_end": "519999", "scheme": "mastercard" }
//! ]
//! ```
//!
//! ## Object format (keyed by prefix, binlist-shaped values)
//!
//! ```json
//! {
//!   "453914": {
//!     "scheme": "visa",
//!     "country": { "name": "Denmark" },
//!     "bank": { "name": "Jyske Bank" }
//!   }
//! }
//! ```
//!
//! `bank` and `country` may be plain strings or objects with a `name`.

use super::{BinlistPayload, IssuerInfo, MemoryIssuerDb, NamedField};
use crate::error::LoadError;
use serde::Deserialize;
use std::collections::HashMap;
use std::fs;
use std::io::Read;
use std::path::Path;

/// Builds a `MemoryIssuerDb` from JSON.
pub struct JsonIssuerLoader;

impl JsonIssuerLoader {
    /// Loads a table from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MemoryIssuerDb, LoadError> {
        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Loads a table from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<MemoryIssuerDb, LoadError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::parse(&content)
    }

    /// Loads a table from a JSON string, detecting array or object format.
    pub fn parse(json: &str) -> Result<MemoryIssuerDb, LoadError> {
        let mut db = if json.trim_start().starts_with('[') {
            Self::parse_array(json)?
        } else {
            Self::parse_object(json)?
        };
        db.build_index();
        Ok(db)
    }

    fn parse_array(json: &str) -> Result<MemoryIssuerDb, LoadError> {
        let entries: Vec<JsonIssuerEntry> = serde_json::from_str(json)?;
        let mut db = MemoryIssuerDb::with_capacity(entries.len());

        for entry in entries {
            let bin = entry.bin.clone();
            let bin_end = entry.bin_end.clone();
            let info = entry.into_issuer_info();
            let inserted = match bin_end {
                Some(end) => db.insert_range(&bin, &end, info),
                None => db.insert(&bin, info),
            };
            if !inserted {
                tracing::debug!(bin = %bin, "skipping issuer entry with invalid prefix");
            }
        }

        Ok(db)
    }

    fn parse_object(json: &str) -> Result<MemoryIssuerDb, LoadError> {
        let map: HashMap<String, BinlistPayload> = serde_json::from_str(json)?;
        let mut db = MemoryIssuerDb::with_capacity(map.len());

        for (bin, payload) in map {
            if !db.insert(&bin, IssuerInfo::from(payload)) {
                tracing::debug!(bin = %bin, "skipping issuer entry with invalid prefix");
            }
        }

        Ok(db)
    }
}

/// One element of the array format.
#[derive(Debug, Deserialize)]
struct JsonIssuerEntry {
    #[serde(alias = "iin", alias = "prefix")]
    bin: String,

    #[serde(default, alias = "iin_end", alias = "prefix_end")]
    bin_end: Option<String>,

    #[serde(default, alias = "brand", alias = "network")]
    scheme: Option<String>,

    #[serde(default, alias = "country_name")]
    country: Option<NamedField>,

    #[serde(default, alias = "bank_name", alias = "issuer")]
    bank: Option<NamedField>,
}

impl JsonIssuerEntry {
    fn into_issuer_info(self) -> IssuerInfo {
        IssuerInfo::from(BinlistPayload {
            scheme: self.scheme,
            country: self.country,
            bank: self.bank,
        })
    }
}
