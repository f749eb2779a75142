//! Structured per-record events.
//!
//! The pipeline never writes logs itself. After each record the batch
//! processor hands a [`RecordEvent`] to an injected [`EventSink`]. Card
//! numbers in events are always masked.

use crate::checks::FieldChecks;
use crate::error::RecordError;
use crate::mask::mask_number;
use crate::validate::{Status, Verdict};
use crate::CardBrand;
use std::sync::Mutex;

/// What happened to one record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEvent {
    /// Position in the input batch.
    pub index: usize,
    /// Cardholder name, if the record had one.
    pub name: Option<String>,
    /// Masked card number.
    pub masked_number: Option<String>,
    /// Classified brand.
    pub brand: Option<CardBrand>,
    /// Issuer scheme from the lookup.
    pub scheme: Option<String>,
    /// Issuing bank from the lookup.
    pub bank: Option<String>,
    /// Field check results; absent for records that could not be validated.
    pub checks: Option<FieldChecks>,
    /// Outcome label.
    pub status: Status,
    /// Why the issuer lookup produced nothing, if it failed.
    pub lookup_error: Option<String>,
    /// Why the record could not be validated, for `Status::Error`.
    pub error: Option<String>,
}

impl RecordEvent {
    /// Builds the event for a validated record.
    pub fn from_verdict(index: usize, verdict: &Verdict) -> Self {
        let record = verdict.record();
        Self {
            index,
            name: Some(record.name.clone()),
            masked_number: Some(mask_number(&record.number)),
            brand: Some(verdict.brand()),
            scheme: verdict.issuer().scheme.clone(),
            bank: verdict.issuer().bank_name.clone(),
            checks: Some(verdict.checks()),
            status: verdict.status(),
            lookup_error: verdict.lookup_error().map(ToString::to_string),
            error: None,
        }
    }

    /// Builds the event for a record that could not be validated.
    pub fn from_error(index: usize, error: &RecordError) -> Self {
        Self {
            index,
            name: None,
            masked_number: None,
            brand: None,
            scheme: None,
            bank: None,
            checks: None,
            status: Status::Error,
            lookup_error: None,
            error: Some(error.to_string()),
        }
    }
}

/// Receives one event per processed record.
///
/// Called from worker threads when the batch runs in parallel, so events
/// may arrive out of input order; use `RecordEvent::index` to correlate.
pub trait EventSink: Send + Sync {
    /// Handles one record event.
    fn record(&self, event: &RecordEvent);
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn record(&self, _event: &RecordEvent) {}
}

/// Forwards events to `tracing`.
///
/// Valid records are logged at `info`, invalid and errored records at
/// `warn`, and lookup degradation at `debug`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&self, event: &RecordEvent) {
        let holder = event.name.as_deref().unwrap_or("N/A");
        let card = event.masked_number.as_deref().unwrap_or("-");
        let brand = event.brand.map(|b| b.name()).unwrap_or("-");
        let scheme = event.scheme.as_deref().unwrap_or("N/A");
        let bank = event.bank.as_deref().unwrap_or("N/A");

        if let Some(ref cause) = event.lookup_error {
            tracing::debug!(index = event.index, card, cause = %cause, "issuer lookup degraded");
        }

        match (event.status, event.checks) {
            (Status::Valid, _) => tracing::info!(
                index = event.index,
                holder,
                card,
                brand,
                scheme,
                bank,
                status = %event.status,
                "card validated"
            ),
            (Status::Invalid, Some(checks)) => tracing::warn!(
                index = event.index,
                holder,
                card,
                brand,
                scheme,
                bank,
                luhn = checks.checksum_ok,
                length = checks.length_ok,
                expiry = checks.expiry_ok,
                cvv = checks.cvv_ok,
                reason = checks.first_failure().map(|f| f.reason()).unwrap_or("-"),
                status = %event.status,
                "card rejected"
            ),
            _ => tracing::warn!(
                index = event.index,
                error = event.error.as_deref().unwrap_or("-"),
                status = %event.status,
                "record not validated"
            ),
        }
    }
}

/// Collects events in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<RecordEvent>>,
}

impl MemorySink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the collected events sorted by record index.
    pub fn events(&self) -> Vec<RecordEvent> {
        let mut events = match self.events.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        };
        events.sort_by_key(|e| e.index);
        events
    }

    /// Returns the number of events collected.
    pub fn len(&self) -> usize {
        match self.events.lock() {
            Ok(guard) => guard.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    /// Returns true if no events were collected.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl EventSink for MemorySink {
    fn record(&self, event: &RecordEvent) {
        match self.events.lock() {
            Ok(mut guard) => guard.push(event.clone()),
            Err(poisoned) => poisoned.into_inner().push(event.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::issuer::NoLookup;
    use crate::{CardRecord, RecordValidator};

    #[test]
    fn test_event_from_verdict_is_masked() {
        let verdict = RecordValidator::default().validate(
            CardRecord::new("Jane", "4539148803436467", "01/2000", "123"),
            &NoLookup,
        );
        let event = RecordEvent::from_verdict(7, &verdict);
        assert_eq!(event.index, 7);
        assert_eq!(event.name.as_deref(), Some("Jane"));
        assert_eq!(event.masked_number.as_deref(), Some("****-****-****-6467"));
        assert_eq!(event.status, Status::Invalid);
        assert_eq!(event.brand, Some(CardBrand::Visa));
    }

    #[test]
    fn test_event_from_error() {
        let err = RecordError::MissingField {
            index: 1,
            field: "number",
        };
        let event = RecordEvent::from_error(1, &err);
        assert_eq!(event.status, Status::Error);
        assert!(event.checks.is_none());
        assert!(event.error.unwrap().contains("number"));
    }

    #[test]
    fn test_memory_sink_sorts_by_index() {
        let sink = MemorySink::new();
        let err = RecordError::MissingField {
            index: 0,
            field: "number",
        };
        sink.record(&RecordEvent::from_error(2, &err));
        sink.record(&RecordEvent::from_error(0, &err));
        assert_eq!(sink.len(), 2);
        let indices: Vec<_> = sink.events().iter().map(|e| e.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_tracing_sink_does_not_panic_without_subscriber() {
        let verdict = RecordValidator::default().validate(
            CardRecord::new("Jane", "4539148803436467", "12/2099", "123"),
            &NoLookup,
        );
        TracingSink.record(&RecordEvent::from_verdict(0, &verdict));
    }
}
