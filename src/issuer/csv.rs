//! CSV issuer table loader.
//!
//! Requires the `issuer-csv` feature.
//!
//! ```csv
//! bin,scheme,bank,country
//! 453914,visa,Test Bank,Denmark
//! ```
//!
//! Column order doesn't matter as long as headers are present. Only the
//! `bin` column is required; an optional `bin_end` column makes a row a range.

use super::{IssuerInfo, MemoryIssuerDb};
use crate::error::LoadError;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Builds a `MemoryIssuerDb` from CSV with a header row.
pub struct CsvIssuerLoader;

impl CsvIssuerLoader {
    /// Loads a table from a CSV file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<MemoryIssuerDb, LoadError> {
        let file = File::open(path)?;
        Self::from_reader(file)
    }

    /// Loads a table from a CSV string.
    pub fn parse(csv: &str) -> Result<MemoryIssuerDb, LoadError> {
        Self::from_reader(csv.as_bytes())
    }

    /// Loads a table from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<MemoryIssuerDb, LoadError> {
        let mut csv_reader = ::csv::ReaderBuilder::new()
            .flexible(true)
            .trim(::csv::Trim::All)
            .from_reader(reader);

        let headers = csv_reader
            .headers()
            .map_err(|e| LoadError::Csv(format!("failed to read headers: {}", e)))?
            .clone();
        let columns = ColumnMap::from_headers(&headers)?;

        let mut db = MemoryIssuerDb::new();
        for result in csv_reader.records() {
            let record = result.map_err(|e| LoadError::Csv(e.to_string()))?;
            columns.insert_record(&record, &mut db);
        }

        db.build_index();
        Ok(db)
    }
}

/// Maps CSV column names to indices.
struct ColumnMap {
    bin: usize,
    bin_end: Option<usize>,
    scheme: Option<usize>,
    bank: Option<usize>,
    country: Option<usize>,
}

impl ColumnMap {
    fn from_headers(headers: &::csv::StringRecord) -> Result<Self, LoadError> {
        let mut bin = None;
        let mut bin_end = None;
        let mut scheme = None;
        let mut bank = None;
        let mut country = None;

        for (i, header) in headers.iter().enumerate() {
            match header.to_lowercase().trim() {
                "bin" | "iin" | "prefix" => bin = Some(i),
                "bin_end" | "iin_end" | "prefix_end" => bin_end = Some(i),
                "scheme" | "brand" | "network" => scheme = Some(i),
                "bank" | "bank_name" | "issuer" => bank = Some(i),
                "country" | "country_name" => country = Some(i),
                _ => {}
            }
        }

        let bin = bin.ok_or_else(|| LoadError::InvalidTable("missing 'bin' column".to_string()))?;

        Ok(Self {
            bin,
            bin_end,
            scheme,
            bank,
            country,
        })
    }

    fn insert_record(&self, record: &::csv::StringRecord, db: &mut MemoryIssuerDb) {
        let field = |idx: Option<usize>| -> Option<String> {
            idx.and_then(|i| record.get(i))
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let Some(bin) = field(Some(self.bin)) else {
            return;
        };

        let info = IssuerInfo {
            scheme: field(self.scheme),
            country_name: field(self.country),
            bank_name: field(self.bank),
        };

        let inserted = match field(self.bin_end) {
            Some(end) => db.insert_range(&bin, &end, info),
            None => db.insert(&bin, info),
        };
        if !inserted {
            tracing::debug!(bin = %bin, "skipping issuer row with invalid prefix");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_basic() {
        let csv = "bin,scheme,bank,country\n453914,visa,Test Bank,Denmark\n555555,mastercard,,\n";
        let db = CsvIssuerLoader::parse(csv).unwrap();
        assert_eq!(db.len(), 2);

        let info = db.get("453914").unwrap();
        assert_eq!(info.scheme.as_deref(), Some("visa"));
        assert_eq!(info.bank_name.as_deref(), Some("Test Bank"));
        assert_eq!(info.country_name.as_deref(), Some("Denmark"));

        let info = db.get("555555").unwrap();
        assert!(info.bank_name.is_none());
    }

    #[test]
    fn test_column_order_and_ranges() {
        let csv = "issuer,bin_end,iin\nRange Bank,400099,400000\n";
        let db = CsvIssuerLoader::parse(csv).unwrap();
        let info = db.get("400042").unwrap();
        assert_eq!(info.bank_name.as_deref(), Some("Range Bank"));
    }

    #[test]
    fn test_missing_bin_column() {
        let result = CsvIssuerLoader::parse("scheme,bank\nvisa,Test\n");
        assert!(matches!(result, Err(LoadError::InvalidTable(_))));
    }
}
