//! Card record types and number normalization.
//!
//! `RawCardRecord` is the shape a loader produces, where any field may be
//! absent. `CardRecord` is the complete, immutable input to validation.
//! Both zero their contents on drop.

use crate::error::RecordError;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Name used when a record carries no cardholder name.
pub const UNKNOWN_NAME: &str = "N/A";

/// Length of the issuer prefix used for lookups.
pub const ISSUER_PREFIX_LEN: usize = 6;

/// Card brands recognized by prefix classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardBrand {
    /// Prefix 4
    Visa,
    /// Prefix 51-55
    MasterCard,
    /// Prefix 34, 37
    AmericanExpress,
    /// Prefix 6011, 65
    Discover,
    /// Prefix 35
    Jcb,
    /// Prefix 62
    UnionPay,
    /// No rule matched.
    Unknown,
}

impl CardBrand {
    /// Returns the display label for this brand.
    #[inline]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Visa => "Visa",
            Self::MasterCard => "MasterCard",
            Self::AmericanExpress => "American Express",
            Self::Discover => "Discover",
            Self::Jcb => "JCB",
            Self::UnionPay => "UnionPay",
            Self::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for CardBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Strips every non-digit character from a card number.
///
/// Normalizing an already normalized number returns it unchanged.
///
/// ```
/// use card_batch::card::normalize_number;
///
/// assert_eq!(normalize_number("4539 1488-0343 6467"), "4539148803436467");
/// ```
pub fn normalize_number(number: &str) -> String {
    number.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// One card record as supplied by the caller.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct CardRecord {
    /// Cardholder name.
    pub name: String,
    /// Card number, possibly formatted with spaces or dashes.
    pub number: String,
    /// Expiry as `MM/YY` or `MM/YYYY`.
    pub expiry: String,
    /// Card verification value.
    pub cvv: String,
}

impl CardRecord {
    /// Creates a record from its four fields.
    pub fn new(
        name: impl Into<String>,
        number: impl Into<String>,
        expiry: impl Into<String>,
        cvv: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            number: number.into(),
            expiry: expiry.into(),
            cvv: cvv.into(),
        }
    }

    /// Returns the digit-only projection of the card number.
    ///
    /// Recomputed on every call.
    pub fn normalized_number(&self) -> String {
        normalize_number(&self.number)
    }

    /// Returns up to the first six digits of the normalized number.
    pub fn issuer_prefix(&self) -> String {
        self.normalized_number()
            .chars()
            .take(ISSUER_PREFIX_LEN)
            .collect()
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("name", &self.name)
            .field("number", &crate::mask::mask_number(&self.number))
            .field("expiry", &self.expiry)
            .field("cvv", &"***")
            .finish()
    }
}

/// A record as decoded from input, before required fields are checked.
///
/// Fields accept any JSON scalar. Numbers and booleans are kept as their
/// JSON text, so `"cvv": 123` reads as `"123"`; `null` counts as absent.
///
/// ```
/// use card_batch::RawCardRecord;
///
/// let raw: RawCardRecord =
///     serde_json::from_str(r#"{"number": 4539148803436467, "cvv": 123}"#).unwrap();
/// assert_eq!(raw.number.as_deref(), Some("4539148803436467"));
/// assert_eq!(raw.cvv.as_deref(), Some("123"));
/// ```
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
pub struct RawCardRecord {
    /// Cardholder name.
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: Option<String>,
    /// Card number (required).
    #[serde(default, deserialize_with = "lenient_text")]
    pub number: Option<String>,
    /// Expiry string.
    #[serde(default, deserialize_with = "lenient_text")]
    pub expiry: Option<String>,
    /// Card verification value.
    #[serde(default, deserialize_with = "lenient_text")]
    pub cvv: Option<String>,
}

fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s),
        Some(other) => Some(other.to_string()),
    })
}

impl RawCardRecord {
    /// Sets the cardholder name.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Sets the card number.
    pub fn number(mut self, number: impl Into<String>) -> Self {
        self.number = Some(number.into());
        self
    }

    /// Sets the expiry.
    pub fn expiry(mut self, expiry: impl Into<String>) -> Self {
        self.expiry = Some(expiry.into());
        self
    }

    /// Sets the CVV.
    pub fn cvv(mut self, cvv: impl Into<String>) -> Self {
        self.cvv = Some(cvv.into());
        self
    }

    /// Converts into a `CardRecord`.
    ///
    /// Only `number` is required. A missing name becomes `"N/A"`, and a
    /// missing expiry or CVV becomes empty (and later fails its check).
    pub fn into_record(mut self, index: usize) -> Result<CardRecord, RecordError> {
        let number = self.number.take().ok_or(RecordError::MissingField {
            index,
            field: "number",
        })?;

        Ok(CardRecord {
            name: self.name.take().unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            number,
            expiry: self.expiry.take().unwrap_or_default(),
            cvv: self.cvv.take().unwrap_or_default(),
        })
    }
}

impl From<CardRecord> for RawCardRecord {
    fn from(record: CardRecord) -> Self {
        Self {
            name: Some(record.name.clone()),
            number: Some(record.number.clone()),
            expiry: Some(record.expiry.clone()),
            cvv: Some(record.cvv.clone()),
        }
    }
}

impl fmt::Debug for RawCardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RawCardRecord")
            .field("name", &self.name)
            .field(
                "number",
                &self.number.as_deref().map(crate::mask::mask_number),
            )
            .field("expiry", &self.expiry)
            .field("cvv", &self.cvv.as_ref().map(|_| "***"))
            .finish()
    }
}
