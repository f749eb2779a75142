//! Validator configuration.
//!
//! Read from a JSON file; every field is optional and falls back to its
//! default. Command-line flags override file values.
//!
//! ```json
//! {
//!   "length_policy": "minimum",
//!   "workers": 8,
//!   "lookup_timeout_ms": 2000
//! }
//! ```

use crate::batch::BatchProcessor;
use crate::checks::{FieldValidator, LengthPolicy};
use crate::error::ConfigError;
use crate::events::EventSink;
use crate::expiry::Clock;
use crate::validate::RecordValidator;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Default worker pool size.
pub const DEFAULT_WORKERS: usize = 4;

/// Default per-record lookup deadline in milliseconds.
pub const DEFAULT_LOOKUP_TIMEOUT_MS: u64 = 5000;

/// Default `Accept-Version` header for the binlist endpoint.
pub const DEFAULT_ACCEPT_VERSION: &str = "3";

/// Default issuer lookup endpoint.
const LOOKUP_URL: &str = "https://lookup.binlist.net/";

/// Settings for a validation run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Length rule for card numbers.
    pub length_policy: LengthPolicy,
    /// Worker pool size; `0` or `1` processes sequentially.
    pub workers: usize,
    /// Per-record lookup deadline in milliseconds; `0` disables the deadline.
    pub lookup_timeout_ms: u64,
    /// Base URL of the issuer lookup endpoint.
    pub lookup_url: String,
    /// `Accept-Version` header sent with lookups.
    pub accept_version: String,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            length_policy: LengthPolicy::Strict,
            workers: DEFAULT_WORKERS,
            lookup_timeout_ms: DEFAULT_LOOKUP_TIMEOUT_MS,
            lookup_url: LOOKUP_URL.to_string(),
            accept_version: DEFAULT_ACCEPT_VERSION.to_string(),
        }
    }
}

impl ValidatorConfig {
    /// Loads a config from a JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parses a config from a JSON string.
    pub fn parse(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// The lookup deadline, or `None` when disabled.
    pub fn lookup_timeout(&self) -> Option<Duration> {
        (self.lookup_timeout_ms > 0).then(|| Duration::from_millis(self.lookup_timeout_ms))
    }

    /// Builds a record validator judging expiry against `clock`.
    pub fn record_validator(&self, clock: Arc<dyn Clock>) -> RecordValidator {
        let validator = RecordValidator::new(FieldValidator::new(self.length_policy, clock));
        match self.lookup_timeout() {
            Some(timeout) => validator.with_lookup_timeout(timeout),
            None => validator,
        }
    }

    /// Builds a batch processor emitting events to `sink`.
    pub fn processor(&self, clock: Arc<dyn Clock>, sink: Arc<dyn EventSink>) -> BatchProcessor {
        BatchProcessor::new(self.record_validator(clock))
            .with_sink(sink)
            .with_workers(self.workers)
    }

    /// Builds a binlist client for the configured endpoint.
    #[cfg(feature = "http")]
    pub fn binlist_client(&self) -> crate::issuer::BinlistClient {
        let timeout = self
            .lookup_timeout()
            .unwrap_or(Duration::from_millis(DEFAULT_LOOKUP_TIMEOUT_MS));
        crate::issuer::BinlistClient::new(self.lookup_url.clone(), timeout)
            .accept_version(self.accept_version.clone())
    }
}
