//! Per-record validation and enrichment.
//!
//! [`RecordValidator::validate`] turns one `CardRecord` into one `Verdict`:
//!
//! 1. Normalize the number (strip everything but digits)
//! 2. Look up the six-digit issuer prefix, degrading any failure to an
//!    empty `IssuerInfo`
//! 3. Classify the brand by prefix
//! 4. Run all four field checks
//! 5. `overall_valid` is the AND of the four checks
//!
//! Nothing in this path returns an error or panics for a complete record.
//! Lookup failures never change `overall_valid`.

use crate::card::{CardRecord, RawCardRecord};
use crate::checks::{FailedCheck, FieldChecks, FieldValidator};
use crate::detect::classify;
use crate::error::{LookupError, RecordError};
use crate::issuer::{is_valid_prefix, CancelToken, IssuerInfo, IssuerLookup, LookupContext};
use crate::CardBrand;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// Outcome label for one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    /// All four checks passed.
    Valid,
    /// At least one check failed.
    Invalid,
    /// The record could not be validated (e.g. missing number).
    Error,
}

impl Status {
    /// Returns the label shown in reports and events.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Valid => "VALID",
            Self::Invalid => "INVALID",
            Self::Error => "ERROR",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// The full validation outcome for one record.
///
/// Immutable once produced.
#[derive(Debug, Clone, Serialize)]
pub struct Verdict {
    record: CardRecord,
    brand: CardBrand,
    issuer: IssuerInfo,
    checks: FieldChecks,
    overall_valid: bool,
    status: Status,
    #[serde(skip)]
    lookup_error: Option<LookupError>,
}

impl Verdict {
    /// The record this verdict is about.
    pub fn record(&self) -> &CardRecord {
        &self.record
    }

    /// Brand from prefix classification.
    pub fn brand(&self) -> CardBrand {
        self.brand
    }

    /// Issuer metadata; empty when the lookup missed or failed.
    pub fn issuer(&self) -> &IssuerInfo {
        &self.issuer
    }

    /// Individual check results.
    pub fn checks(&self) -> FieldChecks {
        self.checks
    }

    /// True only if every check passed.
    pub fn is_valid(&self) -> bool {
        self.overall_valid
    }

    /// `Valid` or `Invalid`, mirroring [`Verdict::is_valid`].
    pub fn status(&self) -> Status {
        self.status
    }

    /// Why the lookup produced no data, if it failed.
    pub fn lookup_error(&self) -> Option<&LookupError> {
        self.lookup_error.as_ref()
    }

    /// The first failed check, or `None` for a valid record.
    pub fn reason(&self) -> Option<FailedCheck> {
        self.checks.first_failure()
    }

    /// Digit-only card number.
    pub fn normalized_number(&self) -> String {
        self.record.normalized_number()
    }
}

/// Validates single records against the field rules and an issuer lookup.
#[derive(Debug, Clone, Default)]
pub struct RecordValidator {
    fields: FieldValidator,
    lookup_timeout: Option<Duration>,
    cancel: CancelToken,
}

impl RecordValidator {
    /// Creates a validator with no lookup deadline.
    pub fn new(fields: FieldValidator) -> Self {
        Self {
            fields,
            lookup_timeout: None,
            cancel: CancelToken::new(),
        }
    }

    /// Sets the per-record lookup deadline.
    pub fn with_lookup_timeout(mut self, timeout: Duration) -> Self {
        self.lookup_timeout = Some(timeout);
        self
    }

    /// Shares a cancel token with every lookup this validator issues.
    pub fn with_cancel_token(mut self, cancel: CancelToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Returns the cancel token passed to lookups.
    pub fn cancel_token(&self) -> &CancelToken {
        &self.cancel
    }

    /// Returns the field validator.
    pub fn fields(&self) -> &FieldValidator {
        &self.fields
    }

    /// Validates one record.
    ///
    /// # Example
    ///
    /// ```
    /// use card_batch::issuer::NoLookup;
    /// use card_batch::{CardBrand, CardRecord, RecordValidator};
    ///
    /// let validator = RecordValidator::default();
    /// let verdict = validator.validate(
    ///     CardRecord::new("Jane", "4539 1488 0343 6467", "12/2099", "123"),
    ///     &NoLookup,
    /// );
    /// assert!(verdict.is_valid());
    /// assert_eq!(verdict.brand(), CardBrand::Visa);
    /// ```
    pub fn validate<L: IssuerLookup + ?Sized>(&self, record: CardRecord, lookup: &L) -> Verdict {
        let normalized = record.normalized_number();

        let (issuer, lookup_error) = match self.lookup_issuer(&normalized, lookup) {
            Ok(info) => (info, None),
            Err(e) => (IssuerInfo::default(), Some(e)),
        };

        let brand = classify(&normalized);
        let checks = self.fields.check(&record, &normalized);
        let overall_valid = checks.all_passed();

        Verdict {
            record,
            brand,
            issuer,
            checks,
            overall_valid,
            status: if overall_valid {
                Status::Valid
            } else {
                Status::Invalid
            },
            lookup_error,
        }
    }

    /// Validates a decoded record, reporting a missing number as an error.
    pub fn validate_raw<L: IssuerLookup + ?Sized>(
        &self,
        raw: RawCardRecord,
        index: usize,
        lookup: &L,
    ) -> Result<Verdict, RecordError> {
        let record = raw.into_record(index)?;
        Ok(self.validate(record, lookup))
    }

    fn lookup_issuer<L: IssuerLookup + ?Sized>(
        &self,
        normalized: &str,
        lookup: &L,
    ) -> Result<IssuerInfo, LookupError> {
        let prefix = normalized.get(..6).unwrap_or(normalized);
        if !is_valid_prefix(prefix) {
            return Err(LookupError::InvalidPrefix(prefix.to_string()));
        }

        let ctx = match self.lookup_timeout {
            Some(t) => LookupContext::with_timeout(t, self.cancel.clone()),
            None => LookupContext::with_cancel(self.cancel.clone()),
        };

        let info = lookup.lookup(prefix, &ctx)?;
        // Data that arrives after the deadline is discarded.
        ctx.check()?;
        Ok(info)
    }
}
