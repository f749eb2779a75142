//! # card_batch
//!
//! Batch validation and issuer enrichment of payment card records.
//!
//! ## Features
//!
//! - Luhn checksum, length, expiry and CVV checks, always all four
//! - Brand classification by prefix
//! - Issuer lookup by six-digit prefix, degrading to "no data" on failure
//! - Order-preserving batch processing on a bounded worker pool
//! - Per-record structured events with masked card numbers
//!
//! ## Quick Start
//!
//! ```rust
//! use card_batch::issuer::NoLookup;
//! use card_batch::{CardBrand, CardRecord, RecordValidator};
//!
//! let validator = RecordValidator::default();
//! let verdict = validator.validate(
//!     CardRecord::new("Jane Doe", "4539 1488 0343 6467", "12/2099", "123"),
//!     &NoLookup,
//! );
//!
//! assert!(verdict.is_valid());
//! assert_eq!(verdict.brand(), CardBrand::Visa);
//! assert!(verdict.issuer().is_empty());
//! ```
//!
//! ## Batch Processing
//!
//! ```rust
//! use card_batch::issuer::{IssuerInfo, MemoryIssuerDb};
//! use card_batch::{io, BatchProcessor, RecordValidator};
//!
//! let records = io::parse_records(r#"[
//!     {"name": "A", "number": "4539148803436467", "expiry": "12/2099", "cvv": "123"},
//!     {"name": "B", "number": "4539148803436468", "expiry": "12/2099", "cvv": "123"},
//!     {"name": "C"}
//! ]"#).unwrap();
//!
//! let mut issuers = MemoryIssuerDb::new();
//! issuers.insert("453914", IssuerInfo::new().scheme("visa").bank_name("Test Bank"));
//!
//! let result = BatchProcessor::new(RecordValidator::default())
//!     .with_workers(4)
//!     .process_raw(&records, &issuers);
//!
//! let summary = result.summary();
//! assert_eq!((summary.valid, summary.invalid, summary.errored), (1, 1, 1));
//! assert_eq!(result.valid_subset()[0].record().name, "A");
//! ```
//!
//! ## Issuer Lookup
//!
//! Anything implementing [`issuer::IssuerLookup`] can enrich verdicts.
//! Lookups receive a [`issuer::LookupContext`] carrying a deadline and a
//! cancel token; a lookup that fails, times out or is cancelled leaves the
//! verdict's issuer empty and never changes its validity.
//!
//! | Source | Type | Feature |
//! |--------|------|---------|
//! | In-memory table | `MemoryIssuerDb` | - |
//! | JSON table | `JsonIssuerLoader` | - |
//! | CSV table | `CsvIssuerLoader` | `issuer-csv` |
//! | binlist.net | `BinlistClient` | `http` |
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `parallel` | Rayon worker pool for batches (default) |
//! | `http` | Blocking binlist.net client |
//! | `issuer-csv` | CSV issuer table loader |
//! | `cli` | `cardbatch` command-line tool |
//!
//! ## Security
//!
//! - `Debug` output and events show masked numbers only
//! - Records are zeroized on drop
//! - No unsafe code (`#![deny(unsafe_code)]`)

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod batch;
pub mod card;
pub mod checks;
pub mod config;
pub mod cvv;
pub mod detect;
pub mod error;
pub mod events;
pub mod expiry;
pub mod io;
pub mod issuer;
pub mod luhn;
pub mod mask;
pub mod report;
pub mod validate;

// Re-export main types at crate root
pub use batch::{process_batch, BatchProcessor, BatchResult, BatchSummary, RecordOutcome};
pub use card::{normalize_number, CardBrand, CardRecord, RawCardRecord};
pub use checks::{FailedCheck, FieldChecks, FieldValidator, LengthPolicy};
pub use config::ValidatorConfig;
pub use error::{ConfigError, CvvError, ExpiryError, LoadError, LookupError, RecordError};
pub use events::{EventSink, MemorySink, NullSink, RecordEvent, TracingSink};
pub use expiry::{Clock, FixedClock, SystemClock};
pub use issuer::{IssuerInfo, IssuerLookup};
pub use validate::{RecordValidator, Status, Verdict};
