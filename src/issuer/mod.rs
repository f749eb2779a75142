//! Issuer (BIN) lookup.
//!
//! The pipeline asks an [`IssuerLookup`] for metadata about the six-digit
//! issuer prefix of each card. Lookups are pluggable:
//!
//! - `MemoryIssuerDb` - in-memory table of exact prefixes and prefix ranges
//! - `JsonIssuerLoader` - builds a `MemoryIssuerDb` from JSON
//! - `CsvIssuerLoader` - builds a `MemoryIssuerDb` from CSV (requires `issuer-csv`)
//! - `BinlistClient` - queries binlist.net over HTTP (requires `http`)
//! - `NoLookup` - never has data
//!
//! A miss is `Ok(IssuerInfo::default())`, not an error. Every error is
//! degraded to an empty `IssuerInfo` by the caller.
//!
//! # Example
//!
//! ```
//! use card_batch::issuer::{IssuerInfo, IssuerLookup, LookupContext, MemoryIssuerDb};
//!
//! let mut db = MemoryIssuerDb::new();
//! db.insert("453914", IssuerInfo::new().scheme("visa").bank_name("Test Bank"));
//!
//! let info = db.lookup("453914", &LookupContext::unbounded()).unwrap();
//! assert_eq!(info.bank_name.as_deref(), Some("Test Bank"));
//!
//! let miss = db.lookup("999999", &LookupContext::unbounded()).unwrap();
//! assert!(miss.is_empty());
//! ```

mod json;
mod memory;

#[cfg(feature = "issuer-csv")]
mod csv;

#[cfg(feature = "http")]
mod http;

pub use json::JsonIssuerLoader;
pub use memory::{MemoryIssuerDb, MemoryIssuerDbBuilder, PrefixRange};

#[cfg(feature = "issuer-csv")]
pub use self::csv::CsvIssuerLoader;

#[cfg(feature = "http")]
pub use http::{BinlistClient, DEFAULT_LOOKUP_URL};

use crate::card::ISSUER_PREFIX_LEN;
use crate::error::LookupError;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Source of issuer metadata for a six-digit prefix.
///
/// Implementations must be safe to call from several threads at once and
/// must not keep per-record state.
pub trait IssuerLookup: Send + Sync {
    /// Looks up issuer metadata for `prefix`.
    ///
    /// `prefix` is six ASCII digits. Implementations that block should give
    /// up once `ctx` reports a timeout or cancellation.
    fn lookup(&self, prefix: &str, ctx: &LookupContext) -> Result<IssuerInfo, LookupError>;
}

impl<T: IssuerLookup + ?Sized> IssuerLookup for Arc<T> {
    fn lookup(&self, prefix: &str, ctx: &LookupContext) -> Result<IssuerInfo, LookupError> {
        (**self).lookup(prefix, ctx)
    }
}

impl<T: IssuerLookup + ?Sized> IssuerLookup for &T {
    fn lookup(&self, prefix: &str, ctx: &LookupContext) -> Result<IssuerInfo, LookupError> {
        (**self).lookup(prefix, ctx)
    }
}

/// Lookup that never has data.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLookup;

impl IssuerLookup for NoLookup {
    fn lookup(&self, _prefix: &str, _ctx: &LookupContext) -> Result<IssuerInfo, LookupError> {
        Ok(IssuerInfo::default())
    }
}

/// Issuer metadata for a card prefix.
///
/// Every field is optional; an all-`None` value means no information.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssuerInfo {
    /// Card network as reported by the issuer source (e.g. "visa").
    #[serde(default)]
    pub scheme: Option<String>,

    /// Issuing country name.
    #[serde(default)]
    pub country_name: Option<String>,

    /// Issuing bank name.
    #[serde(default)]
    pub bank_name: Option<String>,
}

impl IssuerInfo {
    /// Creates an empty IssuerInfo.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder method to set the scheme.
    pub fn scheme(mut self, scheme: impl Into<String>) -> Self {
        self.scheme = Some(scheme.into());
        self
    }

    /// Builder method to set the country name.
    pub fn country_name(mut self, country: impl Into<String>) -> Self {
        self.country_name = Some(country.into());
        self
    }

    /// Builder method to set the bank name.
    pub fn bank_name(mut self, bank: impl Into<String>) -> Self {
        self.bank_name = Some(bank.into());
        self
    }

    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.scheme.is_none() && self.country_name.is_none() && self.bank_name.is_none()
    }
}

/// Returns true if `prefix` is exactly six ASCII digits.
#[inline]
pub fn is_valid_prefix(prefix: &str) -> bool {
    prefix.len() == ISSUER_PREFIX_LEN && prefix.bytes().all(|b| b.is_ascii_digit())
}

/// Shared flag that cancels in-flight lookups.
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    /// Creates a token that is not cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancels every lookup holding a clone of this token.
    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    /// Returns true once `cancel` has been called.
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Deadline and cancellation state passed to each lookup.
#[derive(Debug, Clone, Default)]
pub struct LookupContext {
    deadline: Option<Instant>,
    cancel: CancelToken,
}

impl LookupContext {
    /// Context with no deadline and a fresh cancel token.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Context with no deadline that observes `cancel`.
    pub fn with_cancel(cancel: CancelToken) -> Self {
        Self {
            deadline: None,
            cancel,
        }
    }

    /// Context whose deadline is `timeout` from now.
    pub fn with_timeout(timeout: Duration, cancel: CancelToken) -> Self {
        Self {
            deadline: Instant::now().checked_add(timeout),
            cancel,
        }
    }

    /// Returns the deadline, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Returns the time left before the deadline, if there is one.
    pub fn remaining(&self) -> Option<Duration> {
        self.deadline
            .map(|d| d.saturating_duration_since(Instant::now()))
    }

    /// Fails with `Cancelled` or `TimedOut` if the lookup should stop.
    pub fn check(&self) -> Result<(), LookupError> {
        if self.cancel.is_cancelled() {
            return Err(LookupError::Cancelled);
        }
        match self.deadline {
            Some(d) if Instant::now() >= d => Err(LookupError::TimedOut),
            _ => Ok(()),
        }
    }
}

/// Head-office ZIP codes of well-known US issuers.
const BANK_ZIP_MAP: &[(&str, &str)] = &[
    ("JPMorgan Chase", "10001"),
    ("Bank of America", "28202"),
    ("Wells Fargo", "94104"),
    ("Citi", "10013"),
    ("Capital One", "22314"),
    ("American Express", "10285"),
    ("Discover", "60015"),
    ("US Bank", "55107"),
    ("PNC Bank", "15222"),
    ("TD Bank", "07030"),
    ("BB&T", "27601"),
    ("SunTrust", "30303"),
    ("Barclays", "10019"),
    ("HSBC", "10018"),
    ("Synchrony", "75038"),
    ("Fifth Third Bank", "45263"),
    ("KeyBank", "44114"),
    ("Regions", "35203"),
    ("Ally Bank", "48116"),
    ("Chime", "94103"),
];

/// ZIP returned by [`estimate_zip`] for unlisted banks.
pub const UNKNOWN_ZIP: &str = "Unknown";

/// Estimates a ZIP code from the issuing bank's name.
///
/// ```
/// use card_batch::issuer::estimate_zip;
///
/// assert_eq!(estimate_zip("Wells Fargo"), "94104");
/// assert_eq!(estimate_zip("Test Bank"), "Unknown");
/// ```
pub fn estimate_zip(bank_name: &str) -> &'static str {
    BANK_ZIP_MAP
        .iter()
        .find(|(bank, _)| *bank == bank_name)
        .map(|(_, zip)| *zip)
        .unwrap_or(UNKNOWN_ZIP)
}

/// The binlist.net response shape, also accepted by the JSON loader.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct BinlistPayload {
    #[serde(default)]
    pub scheme: Option<String>,
    #[serde(default)]
    pub country: Option<NamedField>,
    #[serde(default)]
    pub bank: Option<NamedField>,
}

/// A field that is either a bare string or an object with a `name`.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum NamedField {
    Plain(String),
    Nested {
        #[serde(default)]
        name: Option<String>,
    },
}

impl NamedField {
    pub(crate) fn into_name(self) -> Option<String> {
        match self {
            Self::Plain(s) => Some(s),
            Self::Nested { name } => name,
        }
        .filter(|s| !s.trim().is_empty())
    }
}

impl From<BinlistPayload> for IssuerInfo {
    fn from(payload: BinlistPayload) -> Self {
        Self {
            scheme: payload.scheme.filter(|s| !s.trim().is_empty()),
            country_name: payload.country.and_then(NamedField::into_name),
            bank_name: payload.bank.and_then(NamedField::into_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issuer_info_builder() {
        let info = IssuerInfo::new()
            .scheme("visa")
            .country_name("Denmark")
            .bank_name("Jyske Bank");

        assert_eq!(info.scheme.as_deref(), Some("visa"));
        assert_eq!(info.country_name.as_deref(), Some("Denmark"));
        assert_eq!(info.bank_name.as_deref(), Some("Jyske Bank"));
        assert!(!info.is_empty());
        assert!(IssuerInfo::default().is_empty());
    }

    #[test]
    fn test_valid_prefix() {
        assert!(is_valid_prefix("453914"));
        assert!(!is_valid_prefix("45391"));
        assert!(!is_valid_prefix("4539144"));
        assert!(!is_valid_prefix("4539a4"));
    }

    #[test]
    fn test_binlist_payload() {
        let json = r#"{
            "number": {"length": 16, "luhn": true},
            "scheme": "visa",
            "type": "debit",
            "country": {"numeric": "208", "alpha2": "DK", "name": "Denmark"},
            "bank": {"name": "Jyske Bank", "url": "www.jyskebank.dk"}
        }"#;
        let payload: BinlistPayload = serde_json::from_str(json).unwrap();
        let info = IssuerInfo::from(payload);
        assert_eq!(info.scheme.as_deref(), Some("visa"));
        assert_eq!(info.country_name.as_deref(), Some("Denmark"));
        assert_eq!(info.bank_name.as_deref(), Some("Jyske Bank"));
    }

    #[test]
    fn test_binlist_payload_missing_bank() {
        let payload: BinlistPayload =
            serde_json::from_str(r#"{"scheme": "mastercard", "bank": {}}"#).unwrap();
        let info = IssuerInfo::from(payload);
        assert_eq!(info.scheme.as_deref(), Some("mastercard"));
        assert!(info.bank_name.is_none());
        assert!(info.country_name.is_none());
    }

    #[test]
    fn test_context_cancel() {
        let token = CancelToken::new();
        let ctx = LookupContext::with_timeout(Duration::from_secs(60), token.clone());
        assert!(ctx.check().is_ok());
        token.cancel();
        assert_eq!(ctx.check(), Err(LookupError::Cancelled));
    }

    #[test]
    fn test_context_deadline() {
        let ctx = LookupContext::with_timeout(Duration::ZERO, CancelToken::new());
        assert_eq!(ctx.check(), Err(LookupError::TimedOut));
        assert_eq!(ctx.remaining(), Some(Duration::ZERO));

        let open = LookupContext::unbounded();
        assert!(open.check().is_ok());
        assert!(open.remaining().is_none());
    }

    #[test]
    fn test_no_lookup() {
        let info = NoLookup.lookup("453914", &LookupContext::unbounded()).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn test_estimate_zip() {
        assert_eq!(estimate_zip("Chime"), "94103");
        assert_eq!(estimate_zip("chime"), UNKNOWN_ZIP);
    }
}
