//! In-memory issuer table.
//!
//! Holds exact six-digit prefixes and inclusive prefix ranges in a sorted
//! vector, searched with binary search. Exact prefixes also get a hash
//! index once [`MemoryIssuerDb::build_index`] is called.

use super::{is_valid_prefix, IssuerInfo, IssuerLookup, LookupContext};
use crate::error::LookupError;
use std::cmp::Ordering;
use std::collections::HashMap;

/// An inclusive range of six-digit issuer prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrefixRange {
    /// Start of the range (inclusive).
    pub start: u32,
    /// End of the range (inclusive).
    pub end: u32,
}

impl PrefixRange {
    /// Creates a range. The bounds are swapped if given in reverse.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start: start.min(end),
            end: start.max(end),
        }
    }

    /// Creates a range covering one prefix.
    pub fn single(prefix: u32) -> Self {
        Self {
            start: prefix,
            end: prefix,
        }
    }

    /// Checks if a prefix falls within this range.
    #[inline]
    pub fn contains(&self, prefix: u32) -> bool {
        prefix >= self.start && prefix <= self.end
    }

    /// Parses a six-digit prefix, ignoring separators.
    pub fn parse_prefix(prefix: &str) -> Option<u32> {
        let digits = crate::card::normalize_number(prefix);
        if !is_valid_prefix(&digits) {
            return None;
        }
        digits.parse().ok()
    }
}

impl PartialOrd for PrefixRange {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PrefixRange {
    fn cmp(&self, other: &Self) -> Ordering {
        self.start.cmp(&other.start).then(self.end.cmp(&other.end))
    }
}

/// In-memory issuer table.
///
/// ```
/// use card_batch::issuer::{IssuerInfo, MemoryIssuerDb};
///
/// let mut db = MemoryIssuerDb::new();
/// db.insert_range("510000", "519999", IssuerInfo::new().scheme("mastercard"));
/// assert_eq!(db.get("512345").unwrap().scheme.as_deref(), Some("mastercard"));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryIssuerDb {
    entries: Vec<(PrefixRange, IssuerInfo)>,
    exact_index: Option<HashMap<u32, usize>>,
    sorted: bool,
}

impl MemoryIssuerDb {
    /// Creates an empty table.
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            exact_index: None,
            sorted: true,
        }
    }

    /// Creates an empty table with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
            exact_index: None,
            sorted: true,
        }
    }

    /// Inserts one prefix. Returns false if `prefix` is not six digits.
    pub fn insert(&mut self, prefix: &str, info: IssuerInfo) -> bool {
        match PrefixRange::parse_prefix(prefix) {
            Some(p) => {
                self.push(PrefixRange::single(p), info);
                true
            }
            None => false,
        }
    }

    /// Inserts a prefix range. Returns false if either bound is not six digits.
    pub fn insert_range(&mut self, start: &str, end: &str, info: IssuerInfo) -> bool {
        match (PrefixRange::parse_prefix(start), PrefixRange::parse_prefix(end)) {
            (Some(s), Some(e)) => {
                self.push(PrefixRange::new(s, e), info);
                true
            }
            _ => false,
        }
    }

    fn push(&mut self, range: PrefixRange, info: IssuerInfo) {
        self.entries.push((range, info));
        self.sorted = false;
        self.exact_index = None;
    }

    fn ensure_sorted(&mut self) {
        if !self.sorted {
            self.entries.sort_by(|a, b| a.0.cmp(&b.0));
            self.sorted = true;
        }
    }

    /// Sorts entries and builds the exact-prefix index.
    ///
    /// Lookups before this call fall back to a linear scan.
    pub fn build_index(&mut self) {
        self.ensure_sorted();

        let index: HashMap<u32, usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, (range, _))| range.start == range.end)
            .map(|(i, (range, _))| (range.start, i))
            .collect();

        self.exact_index = Some(index);
    }

    /// Returns issuer info for a six-digit prefix, if present.
    pub fn get(&self, prefix: &str) -> Option<&IssuerInfo> {
        let prefix = PrefixRange::parse_prefix(prefix)?;

        if let Some(ref index) = self.exact_index {
            if let Some(&i) = index.get(&prefix) {
                return Some(&self.entries[i].1);
            }
        }

        if self.sorted {
            // Last range starting at or before the prefix, walking back
            // over earlier ranges that may still cover it.
            let upper = self.entries.partition_point(|(r, _)| r.start <= prefix);
            self.entries[..upper]
                .iter()
                .rev()
                .find(|(r, _)| r.contains(prefix))
                .map(|(_, info)| info)
        } else {
            self.entries
                .iter()
                .find(|(r, _)| r.start == prefix && r.end == prefix)
                .or_else(|| self.entries.iter().find(|(r, _)| r.contains(prefix)))
                .map(|(_, info)| info)
        }
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if the table has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Removes all entries.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.exact_index = None;
        self.sorted = true;
    }
}

impl IssuerLookup for MemoryIssuerDb {
    fn lookup(&self, prefix: &str, ctx: &LookupContext) -> Result<IssuerInfo, LookupError> {
        if !is_valid_prefix(prefix) {
            return Err(LookupError::InvalidPrefix(prefix.to_string()));
        }
        ctx.check()?;
        Ok(self.get(prefix).cloned().unwrap_or_default())
    }
}

/// Builder for `MemoryIssuerDb`.
#[derive(Debug, Default)]
pub struct MemoryIssuerDbBuilder {
    db: MemoryIssuerDb,
}

impl MemoryIssuerDbBuilder {
    /// Creates a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a single prefix. Invalid prefixes are skipped.
    pub fn add(mut self, prefix: &str, info: IssuerInfo) -> Self {
        self.db.insert(prefix, info);
        self
    }

    /// Adds a prefix range. Invalid bounds are skipped.
    pub fn add_range(mut self, start: &str, end: &str, info: IssuerInfo) -> Self {
        self.db.insert_range(start, end, info);
        self
    }

    /// Sorts, indexes and returns the table.
    pub fn build(mut self) -> MemoryIssuerDb {
        self.db.build_index();
        self.db
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_db() -> MemoryIssuerDb {
        MemoryIssuerDbBuilder::new()
            .add(
                "453914",
                IssuerInfo::new().scheme("visa").bank_name("Test Bank"),
            )
            .add(
                "555555",
                IssuerInfo::new()
                    .scheme("mastercard")
                    .bank_name("Another Bank")
                    .country_name("United States"),
            )
            .add_range(
                "400000",
                "400099",
                IssuerInfo::new().scheme("visa").bank_name("Range Bank"),
            )
            .build()
    }

    #[test]
    fn test_exact_lookup() {
        let db = sample_db();
        let info = db.get("453914").unwrap();
        assert_eq!(info.bank_name.as_deref(), Some("Test Bank"));
    }

    #[test]
    fn test_range_lookup() {
        let db = sample_db();
        for prefix in ["400000", "400050", "400099"] {
            assert_eq!(db.get(prefix).unwrap().bank_name.as_deref(), Some("Range Bank"));
        }
        assert!(db.get("400100").is_none());
    }

    #[test]
    fn test_nested_range_lookup() {
        let db = MemoryIssuerDbBuilder::new()
            .add_range("400000", "499999", IssuerInfo::new().bank_name("Wide"))
            .add_range("410000", "410999", IssuerInfo::new().bank_name("Narrow"))
            .build();
        assert_eq!(db.get("410500").unwrap().bank_name.as_deref(), Some("Narrow"));
        assert_eq!(db.get("450000").unwrap().bank_name.as_deref(), Some("Wide"));
    }

    #[test]
    fn test_unsorted_lookup() {
        let mut db = MemoryIssuerDb::new();
        db.insert("555555", IssuerInfo::new().bank_name("B"));
        db.insert("411111", IssuerInfo::new().bank_name("A"));
        assert_eq!(db.get("411111").unwrap().bank_name.as_deref(), Some("A"));
    }

    #[test]
    fn test_lookup_miss_is_empty() {
        let db = sample_db();
        let info = db.lookup("999999", &LookupContext::unbounded()).unwrap();
        assert!(info.is_empty());
    }

    #[test]
    fn test_lookup_invalid_prefix() {
        let db = sample_db();
        assert_eq!(
            db.lookup("4539", &LookupContext::unbounded()),
            Err(LookupError::InvalidPrefix("4539".to_string()))
        );
    }

    #[test]
    fn test_insert_rejects_bad_prefix() {
        let mut db = MemoryIssuerDb::new();
        assert!(!db.insert("12345", IssuerInfo::new()));
        assert!(!db.insert_range("123456", "12345x", IssuerInfo::new()));
        assert!(db.insert("4539-14", IssuerInfo::new()));
        assert_eq!(db.len(), 1);
    }

    #[test]
    fn test_prefix_range() {
        let range = PrefixRange::new(400099, 400000);
        assert_eq!(range.start, 400000);
        assert!(range.contains(400050));
        assert!(!range.contains(400100));
    }

    #[test]
    fn test_clear() {
        let mut db = sample_db();
        assert!(!db.is_empty());
        db.clear();
        assert!(db.is_empty());
        assert!(db.get("453914").is_none());
    }
}
