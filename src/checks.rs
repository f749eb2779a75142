//! Field-level checks for a single card record.
//!
//! All four checks run on every record; none short-circuits another.

use crate::card::CardRecord;
use crate::cvv::is_valid_cvv;
use crate::expiry::{check_expiry, Clock, SystemClock};
use crate::luhn;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Exact digit counts accepted by [`LengthPolicy::Strict`].
pub const STRICT_LENGTHS: [usize; 4] = [13, 15, 16, 19];

/// Minimum digit count accepted by [`LengthPolicy::Minimum`].
pub const MIN_LENGTH: usize = 13;

/// How the length of a normalized card number is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthPolicy {
    /// Exactly 13, 15, 16 or 19 digits.
    #[default]
    Strict,
    /// At least 13 digits.
    Minimum,
}

impl LengthPolicy {
    /// Returns true if `digit_count` is acceptable under this policy.
    #[inline]
    pub fn accepts(&self, digit_count: usize) -> bool {
        match self {
            Self::Strict => is_strict_length(digit_count),
            Self::Minimum => is_minimum_length(digit_count),
        }
    }
}

impl std::str::FromStr for LengthPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "strict" => Ok(Self::Strict),
            "minimum" | "min" => Ok(Self::Minimum),
            other => Err(format!("unknown length policy '{}'", other)),
        }
    }
}

/// Returns true for 13, 15, 16 or 19 digits.
#[inline]
pub fn is_strict_length(digit_count: usize) -> bool {
    STRICT_LENGTHS.contains(&digit_count)
}

/// Returns true for 13 or more digits.
#[inline]
pub fn is_minimum_length(digit_count: usize) -> bool {
    digit_count >= MIN_LENGTH
}

/// Results of the four independent field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldChecks {
    /// Luhn checksum of the normalized number.
    pub checksum_ok: bool,
    /// Digit count under the active length policy.
    pub length_ok: bool,
    /// Expiry month not yet reached.
    pub expiry_ok: bool,
    /// CVV is 3 or 4 digits.
    pub cvv_ok: bool,
}

impl FieldChecks {
    /// Returns true only if every check passed.
    #[inline]
    pub const fn all_passed(&self) -> bool {
        self.checksum_ok && self.length_ok && self.expiry_ok && self.cvv_ok
    }

    /// Returns the first failed check, in reporting order.
    ///
    /// The order is length, checksum, CVV, expiry.
    pub fn first_failure(&self) -> Option<FailedCheck> {
        if !self.length_ok {
            Some(FailedCheck::Length)
        } else if !self.checksum_ok {
            Some(FailedCheck::Checksum)
        } else if !self.cvv_ok {
            Some(FailedCheck::Cvv)
        } else if !self.expiry_ok {
            Some(FailedCheck::Expiry)
        } else {
            None
        }
    }

    /// Returns every failed check, in reporting order.
    pub fn failures(&self) -> Vec<FailedCheck> {
        [
            (self.length_ok, FailedCheck::Length),
            (self.checksum_ok, FailedCheck::Checksum),
            (self.cvv_ok, FailedCheck::Cvv),
            (self.expiry_ok, FailedCheck::Expiry),
        ]
        .into_iter()
        .filter(|(ok, _)| !ok)
        .map(|(_, check)| check)
        .collect()
    }
}

/// Identifies one of the four field checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FailedCheck {
    /// Card number has the wrong number of digits.
    Length,
    /// Luhn checksum failed.
    Checksum,
    /// CVV is not 3 or 4 digits.
    Cvv,
    /// Expiry is unparseable or already reached.
    Expiry,
}

impl FailedCheck {
    /// Returns a short human-readable reason.
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Length => "Invalid card number format",
            Self::Checksum => "Luhn check failed",
            Self::Cvv => "Invalid CVV",
            Self::Expiry => "Card expired",
        }
    }
}

impl fmt::Display for FailedCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.reason())
    }
}

/// Runs the four field checks against a record.
#[derive(Clone)]
pub struct FieldValidator {
    policy: LengthPolicy,
    clock: Arc<dyn Clock>,
}

impl FieldValidator {
    /// Creates a validator with the given length policy and clock.
    pub fn new(policy: LengthPolicy, clock: Arc<dyn Clock>) -> Self {
        Self { policy, clock }
    }

    /// Returns the active length policy.
    pub fn policy(&self) -> LengthPolicy {
        self.policy
    }

    /// Checks every field of `record`.
    ///
    /// `normalized` must be the digit-only projection of `record.number`.
    pub fn check(&self, record: &CardRecord, normalized: &str) -> FieldChecks {
        FieldChecks {
            checksum_ok: luhn::passes(normalized),
            length_ok: self.policy.accepts(normalized.len()),
            expiry_ok: check_expiry(&record.expiry, self.clock.as_ref()),
            cvv_ok: is_valid_cvv(&record.cvv),
        }
    }
}

impl Default for FieldValidator {
    fn default() -> Self {
        Self::new(LengthPolicy::default(), Arc::new(SystemClock))
    }
}

impl fmt::Debug for FieldValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldValidator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expiry::FixedClock;

    fn validator(policy: LengthPolicy) -> FieldValidator {
        FieldValidator::new(policy, Arc::new(FixedClock::at_date(2026, 10, 16).unwrap()))
    }

    #[test]
    fn test_strict_lengths() {
        assert!(is_strict_length(16));
        assert!(is_strict_length(13));
        assert!(!is_strict_length(12));
        assert!(!is_strict_length(14));
        assert!(!is_strict_length(20));
    }

    #[test]
    fn test_minimum_lengths() {
        assert!(is_minimum_length(13));
        assert!(is_minimum_length(14));
        assert!(is_minimum_length(25));
        assert!(!is_minimum_length(12));
    }

    #[test]
    fn test_policy_from_str() {
        assert_eq!("strict".parse::<LengthPolicy>(), Ok(LengthPolicy::Strict));
        assert_eq!("Minimum".parse::<LengthPolicy>(), Ok(LengthPolicy::Minimum));
        assert!("loose".parse::<LengthPolicy>().is_err());
    }

    #[test]
    fn test_all_checks_pass() {
        let record = CardRecord::new("Jane", "4539 1488 0343 6467", "12/2099", "123");
        let checks = validator(LengthPolicy::Strict).check(&record, "4539148803436467");
        assert!(checks.all_passed());
        assert_eq!(checks.first_failure(), None);
    }

    #[test]
    fn test_checks_are_independent() {
        let record = CardRecord::new("Jane", "4539148803436468", "01/2000", "12");
        let checks = validator(LengthPolicy::Strict).check(&record, "4539148803436468");
        assert!(!checks.checksum_ok);
        assert!(checks.length_ok);
        assert!(!checks.expiry_ok);
        assert!(!checks.cvv_ok);
        assert_eq!(
            checks.failures(),
            vec![FailedCheck::Checksum, FailedCheck::Cvv, FailedCheck::Expiry]
        );
    }

    #[test]
    fn test_policy_changes_length_only() {
        // 14-digit Luhn-valid number
        let number = "30569309025904";
        let record = CardRecord::new("Jane", number, "12/2099", "123");
        let strict = validator(LengthPolicy::Strict).check(&record, number);
        let minimum = validator(LengthPolicy::Minimum).check(&record, number);
        assert!(!strict.length_ok);
        assert!(minimum.length_ok);
        assert_eq!(strict.checksum_ok, minimum.checksum_ok);
    }

    #[test]
    fn test_first_failure_order() {
        let checks = FieldChecks {
            checksum_ok: false,
            length_ok: false,
            expiry_ok: false,
            cvv_ok: false,
        };
        assert_eq!(checks.first_failure(), Some(FailedCheck::Length));
        assert_eq!(FailedCheck::Length.reason(), "Invalid card number format");
    }
}
