//! Expiry date parsing and recency checking.
//!
//! # Supported Formats
//!
//! - `MM/YY` - e.g., "12/29"
//! - `MM/YYYY` - e.g., "12/2029"
//!
//! The year may have one to four digits. Any year below 100 is read as
//! 2000 + year, so "12/099" and "12/99" are both December 2099.
//!
//! # Recency
//!
//! A card passes when the first day of its expiry month is strictly after
//! the current moment. This is conservative: a card expiring in the current
//! month is already treated as expired, even though issuers honour it until
//! the month ends.
//!
//! The current moment comes from a [`Clock`] so tests can pin it.

use crate::error::ExpiryError;
use chrono::{Local, NaiveDate, NaiveDateTime};
use std::fmt;

/// Source of the current local time.
pub trait Clock: Send + Sync {
    /// Returns the current moment as naive local time.
    fn now(&self) -> NaiveDateTime;
}

/// Clock backed by the system's local time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> NaiveDateTime {
        Local::now().naive_local()
    }
}

/// Clock that always reports the same moment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDateTime);

impl FixedClock {
    /// Pins the clock to midnight at the start of the given date.
    ///
    /// Returns `None` for an impossible date.
    pub fn at_date(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(Self)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> NaiveDateTime {
        self.0
    }
}

/// A parsed expiry month.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExpiryDate {
    year: i32,
    month: u32,
}

impl ExpiryDate {
    /// Returns the month (1-12).
    #[inline]
    pub const fn month(&self) -> u32 {
        self.month
    }

    /// Returns the four-digit year.
    #[inline]
    pub const fn year(&self) -> i32 {
        self.year
    }

    /// Returns the first calendar day of the expiry month at midnight.
    pub fn first_moment(&self) -> NaiveDateTime {
        // Constructed only through parse_expiry, which checks the date exists.
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .unwrap_or(NaiveDateTime::MIN)
    }

    /// Returns true if the card is still usable at `now`.
    pub fn is_valid_at(&self, now: NaiveDateTime) -> bool {
        self.first_moment() > now
    }
}

impl fmt::Display for ExpiryDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}/{:04}", self.month, self.year)
    }
}

/// Parses an expiry string of the form `MM/YY` or `MM/YYYY`.
///
/// Years of one to four digits are accepted; years below 100 are offset
/// by 2000.
///
/// # Example
///
/// ```
/// use card_batch::expiry::parse_expiry;
///
/// let expiry = parse_expiry("12/29").unwrap();
/// assert_eq!(expiry.month(), 12);
/// assert_eq!(expiry.year(), 2029);
///
/// assert!(parse_expiry("13/29").is_err());
/// assert!(parse_expiry("1229").is_err());
/// ```
pub fn parse_expiry(input: &str) -> Result<ExpiryDate, ExpiryError> {
    let input = input.trim();

    if input.is_empty() {
        return Err(ExpiryError::Empty);
    }

    let (month_str, year_str) = input.split_once('/').ok_or(ExpiryError::InvalidFormat)?;
    let (month_str, year_str) = (month_str.trim(), year_str.trim());

    if !is_digits(month_str) || month_str.len() > 2 || !is_digits(year_str) {
        return Err(ExpiryError::InvalidFormat);
    }

    let month: u32 = month_str.parse().map_err(|_| ExpiryError::InvalidFormat)?;
    if !(1..=12).contains(&month) {
        return Err(ExpiryError::InvalidMonth(month));
    }

    if year_str.len() > 4 {
        return Err(ExpiryError::InvalidFormat);
    }
    let year: i32 = match year_str.parse().map_err(|_| ExpiryError::InvalidFormat)? {
        y if y < 100 => 2000 + y,
        y => y,
    };

    if NaiveDate::from_ymd_opt(year, month, 1).is_none() {
        return Err(ExpiryError::InvalidYear(year));
    }

    Ok(ExpiryDate { year, month })
}

/// Returns true if `input` parses and has not yet reached its expiry month.
///
/// Parse failures return false.
pub fn check_expiry(input: &str, clock: &dyn Clock) -> bool {
    parse_expiry(input)
        .map(|e| e.is_valid_at(clock.now()))
        .unwrap_or(false)
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}
