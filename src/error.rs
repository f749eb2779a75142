//! Error types for the validation pipeline.
//!
//! Field-level errors (`ExpiryError`, `CvvError`) and lookup errors never abort
//! a record: the pipeline folds them into a failed check or an empty
//! `IssuerInfo`. They exist so the cause of a failure stays inspectable.
//!
//! `RecordError` is the one per-record failure that is reported as such, and
//! `LoadError` / `ConfigError` belong to the outer file boundary.

use thiserror::Error;

/// A record could not be validated at all.
///
/// Distinct from a record that was validated and found invalid.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RecordError {
    /// A required field was absent from the input record.
    #[error("record {index}: missing required field '{field}'")]
    MissingField {
        /// Position of the record in the input batch.
        index: usize,
        /// Name of the missing field.
        field: &'static str,
    },
}

/// Reasons an issuer lookup produced no data.
///
/// Every variant is treated identically by the pipeline: the record's
/// `IssuerInfo` is left empty and validation continues.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The prefix was not exactly six ASCII digits.
    #[error("issuer prefix must be 6 digits, got {0:?}")]
    InvalidPrefix(String),

    /// Network or transport failure.
    #[error("issuer lookup transport error: {0}")]
    Transport(String),

    /// The service answered with a non-success status.
    #[error("issuer lookup returned status {0}")]
    Status(u16),

    /// The response body could not be decoded.
    #[error("issuer lookup returned a malformed payload: {0}")]
    Malformed(String),

    /// The lookup deadline elapsed.
    #[error("issuer lookup timed out")]
    TimedOut,

    /// The lookup was cancelled before completing.
    #[error("issuer lookup cancelled")]
    Cancelled,
}

/// Errors from parsing an expiry string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExpiryError {
    /// The input string is empty.
    #[error("expiry date is empty")]
    Empty,

    /// Not of the form `MM/YY` or `MM/YYYY`.
    #[error("invalid expiry format (expected MM/YY or MM/YYYY)")]
    InvalidFormat,

    /// Month outside 1-12.
    #[error("invalid month {0}: must be 1-12")]
    InvalidMonth(u32),

    /// The year cannot be represented as a calendar date.
    #[error("invalid expiry year {0}")]
    InvalidYear(i32),
}

/// Errors from checking a CVV string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CvvError {
    /// The input string is empty.
    #[error("CVV is empty")]
    Empty,

    /// A non-digit character was found.
    #[error("invalid character '{character}' in CVV at position {position}")]
    InvalidCharacter {
        /// Position in the input (0-indexed).
        position: usize,
        /// The offending character.
        character: char,
    },

    /// Not 3 or 4 digits long.
    #[error("CVV must be 3 or 4 digits, got {0}")]
    InvalidLength(usize),
}

/// Errors reading a batch or writing the valid subset.
#[derive(Debug, Error)]
pub enum LoadError {
    /// Failed to read or write a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The input was not a JSON array of card objects.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A CSV issuer table could not be parsed.
    #[error("CSV error: {0}")]
    Csv(String),

    /// The issuer table did not have a usable layout.
    #[error("invalid issuer table: {0}")]
    InvalidTable(String),
}

/// Errors loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the config file.
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON for `ValidatorConfig`.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
