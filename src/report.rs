//! Human-readable batch reports.
//!
//! Card numbers are rendered with [`mask_with_prefix`], so reports never
//! contain a full number.

use crate::batch::{BatchResult, BatchSummary, RecordOutcome};
use crate::card::UNKNOWN_NAME;
use crate::mask::mask_with_prefix;
use crate::validate::Status;
use serde::Serialize;
use std::fmt::Write;

const HEADERS: [&str; 12] = [
    "#", "Name", "Card", "Type", "Brand", "Country", "Bank", "Luhn", "Length", "Expiry", "CVV",
    "Status",
];

const PASS: &str = "✔";
const FAIL: &str = "✘";

/// One report row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    /// 1-based position in the input.
    pub position: usize,
    /// Cardholder name.
    pub name: String,
    /// Masked card number.
    pub card: String,
    /// Brand from prefix classification.
    #[serde(rename = "type")]
    pub card_type: String,
    /// Scheme from the issuer lookup.
    pub brand: String,
    /// Issuing country.
    pub country: String,
    /// Issuing bank.
    pub bank: String,
    /// Checksum result; absent when the record was not validated.
    pub luhn: Option<bool>,
    /// Length result.
    pub length: Option<bool>,
    /// Expiry result.
    pub expiry: Option<bool>,
    /// CVV result.
    pub cvv: Option<bool>,
    /// Outcome label.
    pub status: Status,
    /// First failed check or processing error.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl ReportRow {
    /// Builds the row for the outcome at `index`.
    pub fn new(index: usize, outcome: &RecordOutcome) -> Self {
        match outcome {
            Ok(verdict) => {
                let record = verdict.record();
                let issuer = verdict.issuer();
                let checks = verdict.checks();
                let or_na = |s: &Option<String>| s.clone().unwrap_or_else(|| UNKNOWN_NAME.into());

                Self {
                    position: index + 1,
                    name: record.name.clone(),
                    card: mask_with_prefix(&verdict.normalized_number()),
                    card_type: verdict.brand().name().to_string(),
                    brand: or_na(&issuer.scheme),
                    country: or_na(&issuer.country_name),
                    bank: or_na(&issuer.bank_name),
                    luhn: Some(checks.checksum_ok),
                    length: Some(checks.length_ok),
                    expiry: Some(checks.expiry_ok),
                    cvv: Some(checks.cvv_ok),
                    status: verdict.status(),
                    reason: verdict.reason().map(|r| r.reason().to_string()),
                }
            }
            Err(e) => Self {
                position: index + 1,
                name: UNKNOWN_NAME.into(),
                card: UNKNOWN_NAME.into(),
                card_type: UNKNOWN_NAME.into(),
                brand: UNKNOWN_NAME.into(),
                country: UNKNOWN_NAME.into(),
                bank: UNKNOWN_NAME.into(),
                luhn: None,
                length: None,
                expiry: None,
                cvv: None,
                status: Status::Error,
                reason: Some(e.to_string()),
            },
        }
    }

    fn cells(&self) -> [String; 12] {
        let mark = |check: Option<bool>| match check {
            Some(true) => PASS.to_string(),
            Some(false) => FAIL.to_string(),
            None => "-".to_string(),
        };

        [
            self.position.to_string(),
            self.name.clone(),
            self.card.clone(),
            self.card_type.clone(),
            self.brand.clone(),
            self.country.clone(),
            self.bank.clone(),
            mark(self.luhn),
            mark(self.length),
            mark(self.expiry),
            mark(self.cvv),
            self.status.to_string(),
        ]
    }
}

/// Builds report rows for every outcome, in input order.
pub fn rows(result: &BatchResult) -> Vec<ReportRow> {
    result
        .outcomes()
        .iter()
        .enumerate()
        .map(|(i, outcome)| ReportRow::new(i, outcome))
        .collect()
}

/// Renders the batch as a bordered text table.
pub fn render_table(result: &BatchResult) -> String {
    let body: Vec<[String; 12]> = rows(result).iter().map(ReportRow::cells).collect();

    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &body {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell.chars().count());
        }
    }

    let border = {
        let mut line = String::from("+");
        for w in &widths {
            line.push_str(&"-".repeat(w + 2));
            line.push('+');
        }
        line
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", border);
    push_row(&mut out, HEADERS.iter().copied(), &widths);
    let _ = writeln!(out, "{}", border);
    for row in &body {
        push_row(&mut out, row.iter().map(String::as_str), &widths);
    }
    let _ = writeln!(out, "{}", border);
    out
}

fn push_row<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    out.push('|');
    for (cell, w) in cells.zip(widths) {
        let _ = write!(out, " {:<width$} |", cell, width = w);
    }
    out.push('\n');
}

/// Renders the rows as a pretty JSON array.
pub fn render_json(result: &BatchResult) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&rows(result))
}

/// One-line summary of a batch.
pub fn render_summary(summary: &BatchSummary) -> String {
    format!(
        "{} record(s): {} valid, {} invalid, {} error(s)",
        summary.total, summary.valid, summary.invalid, summary.errored
    )
}
