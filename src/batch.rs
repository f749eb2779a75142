//! Batch processing over an ordered sequence of card records.
//!
//! Every input record yields exactly one outcome, in input order. A failed
//! lookup or an invalid record never stops the batch. With the `parallel`
//! feature and more than one worker, records are validated on a bounded
//! rayon pool; output order is still the input order. The pool is built
//! once per processor and shared by its clones.

use crate::card::{CardRecord, RawCardRecord};
use crate::error::RecordError;
use crate::events::{EventSink, NullSink, RecordEvent};
use crate::issuer::IssuerLookup;
use crate::validate::{RecordValidator, Verdict};
use serde::Serialize;
use std::sync::Arc;

/// Outcome for one input record.
pub type RecordOutcome = Result<Verdict, RecordError>;

/// Aggregate counts for a processed batch.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchSummary {
    /// Number of input records.
    pub total: usize,
    /// Records that passed every check.
    pub valid: usize,
    /// Records validated and found invalid.
    pub invalid: usize,
    /// Records that could not be validated.
    pub errored: usize,
}

/// Result of processing a batch.
#[derive(Debug, Clone, Default)]
pub struct BatchResult {
    outcomes: Vec<RecordOutcome>,
}

impl BatchResult {
    /// All outcomes, one per input record, in input order.
    pub fn outcomes(&self) -> &[RecordOutcome] {
        &self.outcomes
    }

    /// Consumes the result, returning the ordered outcomes.
    pub fn into_outcomes(self) -> Vec<RecordOutcome> {
        self.outcomes
    }

    /// Verdicts in input order, skipping records that could not be validated.
    pub fn verdicts(&self) -> impl Iterator<Item = &Verdict> {
        self.outcomes.iter().filter_map(|o| o.as_ref().ok())
    }

    /// Valid verdicts, in the same relative order as the input.
    pub fn valid_subset(&self) -> Vec<&Verdict> {
        self.verdicts().filter(|v| v.is_valid()).collect()
    }

    /// Records that could not be validated.
    pub fn errors(&self) -> Vec<&RecordError> {
        self.outcomes.iter().filter_map(|o| o.as_ref().err()).collect()
    }

    /// Returns the number of outcomes.
    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    /// Returns true if the batch was empty.
    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Counts valid, invalid and errored records.
    pub fn summary(&self) -> BatchSummary {
        let mut summary = BatchSummary {
            total: self.outcomes.len(),
            ..Default::default()
        };

        for outcome in &self.outcomes {
            match outcome {
                Ok(v) if v.is_valid() => summary.valid += 1,
                Ok(_) => summary.invalid += 1,
                Err(_) => summary.errored += 1,
            }
        }

        summary
    }
}

/// Runs a `RecordValidator` over a batch.
///
/// # Example
///
/// ```
/// use card_batch::issuer::NoLookup;
/// use card_batch::{BatchProcessor, CardRecord, RecordValidator};
///
/// let processor = BatchProcessor::new(RecordValidator::default());
/// let records = vec![
///     CardRecord::new("A", "4539148803436467", "12/2099", "123"),
///     CardRecord::new("B", "4539148803436468", "12/2099", "123"),
/// ];
/// let result = processor.process(&records, &NoLookup);
///
/// assert_eq!(result.len(), 2);
/// assert_eq!(result.valid_subset().len(), 1);
/// assert_eq!(result.summary().invalid, 1);
/// ```
#[derive(Clone)]
pub struct BatchProcessor {
    validator: RecordValidator,
    sink: Arc<dyn EventSink>,
    workers: usize,
    #[cfg(feature = "parallel")]
    pool: Option<Arc<rayon::ThreadPool>>,
}

impl BatchProcessor {
    /// Creates a sequential processor that discards events.
    pub fn new(validator: RecordValidator) -> Self {
        Self {
            validator,
            sink: Arc::new(NullSink),
            workers: 1,
            #[cfg(feature = "parallel")]
            pool: None,
        }
    }

    /// Sends one event per record to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Sets the worker pool size. `0` and `1` mean sequential.
    ///
    /// Without the `parallel` feature the batch always runs sequentially.
    /// If the pool cannot be built, batches run sequentially with a warning.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;

        #[cfg(feature = "parallel")]
        {
            self.pool = if workers > 1 {
                match rayon::ThreadPoolBuilder::new().num_threads(workers).build() {
                    Ok(pool) => Some(Arc::new(pool)),
                    Err(e) => {
                        tracing::warn!(error = %e, workers, "worker pool unavailable, processing sequentially");
                        None
                    }
                }
            } else {
                None
            };
        }

        self
    }

    /// Returns the record validator.
    pub fn validator(&self) -> &RecordValidator {
        &self.validator
    }

    /// Returns the configured worker count.
    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Validates complete records.
    ///
    /// Every outcome is `Ok`; the `Result` shape matches [`process_raw`].
    ///
    /// [`process_raw`]: BatchProcessor::process_raw
    pub fn process<L: IssuerLookup + ?Sized>(
        &self,
        records: &[CardRecord],
        lookup: &L,
    ) -> BatchResult {
        self.run(records, |index, record| {
            let verdict = self.validator.validate(record.clone(), lookup);
            self.sink.record(&RecordEvent::from_verdict(index, &verdict));
            Ok(verdict)
        })
    }

    /// Validates decoded records, reporting missing required fields per record.
    pub fn process_raw<L: IssuerLookup + ?Sized>(
        &self,
        records: &[RawCardRecord],
        lookup: &L,
    ) -> BatchResult {
        self.run(records, |index, raw| {
            match self.validator.validate_raw(raw.clone(), index, lookup) {
                Ok(verdict) => {
                    self.sink.record(&RecordEvent::from_verdict(index, &verdict));
                    Ok(verdict)
                }
                Err(e) => {
                    self.sink.record(&RecordEvent::from_error(index, &e));
                    Err(e)
                }
            }
        })
    }

    fn run<T, F>(&self, items: &[T], f: F) -> BatchResult
    where
        T: Sync,
        F: Fn(usize, &T) -> RecordOutcome + Sync,
    {
        #[cfg(feature = "parallel")]
        if let Some(pool) = self.pool.as_deref().filter(|_| items.len() > 1) {
            use rayon::prelude::*;
            let outcomes = pool.install(|| {
                items
                    .par_iter()
                    .enumerate()
                    .map(|(i, item)| f(i, item))
                    .collect()
            });
            return BatchResult { outcomes };
        }

        BatchResult {
            outcomes: items.iter().enumerate().map(|(i, item)| f(i, item)).collect(),
        }
    }
}

impl Default for BatchProcessor {
    fn default() -> Self {
        Self::new(RecordValidator::default())
    }
}

impl std::fmt::Debug for BatchProcessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchProcessor")
            .field("validator", &self.validator)
            .field("workers", &self.workers)
            .finish_non_exhaustive()
    }
}

/// Processes a batch sequentially with default settings.
///
/// Uses the system clock, the strict length policy, no lookup deadline and
/// no event sink.
pub fn process_batch<L: IssuerLookup + ?Sized>(records: &[CardRecord], lookup: &L) -> BatchResult {
    BatchProcessor::default().process(records, lookup)
}
