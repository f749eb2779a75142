//! Masking of card numbers for events, debug output and reports.
//!
//! Only the last four digits (and optionally the six-digit issuer prefix)
//! are ever shown. Full numbers stay inside `CardRecord` and `Verdict`.

use crate::card::normalize_number;

/// Masks a card number, keeping only the last four digits.
///
/// Separators in the input are ignored. Mask characters are grouped in
/// fours with `-`. Inputs with four or fewer digits are fully masked.
///
/// ```
/// use card_batch::mask::mask_number;
///
/// assert_eq!(mask_number("4111 1111 1111 1111"), "****-****-****-1111");
/// assert_eq!(mask_number("378282246310005"), "****-****-***0005");
/// assert_eq!(mask_number("123"), "***");
/// ```
pub fn mask_number(number: &str) -> String {
    let digits = normalize_number(number);
    let len = digits.len();

    if len <= 4 {
        return "*".repeat(len);
    }

    let masked_count = len - 4;
    let mut result = String::with_capacity(len + len / 4);

    for i in 0..masked_count {
        if i > 0 && i % 4 == 0 {
            result.push('-');
        }
        result.push('*');
    }

    if masked_count % 4 == 0 {
        result.push('-');
    }

    result.push_str(&digits[masked_count..]);
    result
}

/// Masks a card number, keeping the issuer prefix and the last four digits.
///
/// Numbers too short to hide anything between the two are masked with
/// [`mask_number`] instead.
///
/// ```
/// use card_batch::mask::mask_with_prefix;
///
/// assert_eq!(mask_with_prefix("4111-1111-1111-1111"), "411111******1111");
/// ```
pub fn mask_with_prefix(number: &str) -> String {
    let digits = normalize_number(number);
    let len = digits.len();

    if len <= 10 {
        return mask_number(&digits);
    }

    format!(
        "{}{}{}",
        &digits[..6],
        "*".repeat(len - 10),
        &digits[len - 4..]
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mask_16() {
        assert_eq!(mask_number("4111111111111111"), "****-****-****-1111");
    }

    #[test]
    fn test_mask_13() {
        assert_eq!(mask_number("4222222222222"), "****-****-*2222");
    }

    #[test]
    fn test_mask_never_contains_full_number() {
        let masked = mask_number("4539148803436467");
        assert!(!masked.contains("4539148803436467"));
        assert!(masked.ends_with("6467"));
    }

    #[test]
    fn test_mask_short_and_empty() {
        assert_eq!(mask_number("1234"), "****");
        assert_eq!(mask_number(""), "");
    }

    #[test]
    fn test_mask_with_prefix() {
        assert_eq!(mask_with_prefix("4539148803436467"), "453914******6467");
        assert_eq!(mask_with_prefix("1234567"), "***4567");
    }
}
