//! Card brand classification by numeric prefix.
//!
//! Prefixes overlap (`6011` and `65` both start with `6`), so rules are
//! tried in a fixed order and the first match wins:
//!
//! | Order | Prefix | Brand |
//! |-------|--------|-------|
//! | 1 | 4 | Visa |
//! | 2 | 51-55 | MasterCard |
//! | 3 | 34, 37 | American Express |
//! | 4 | 6011, 65 | Discover |
//! | 5 | 35 | JCB |
//! | 6 | 62 | UnionPay |
//!
//! Anything else is `Unknown`. Classification never fails.

use crate::CardBrand;

/// Classifies a normalized (digit-only) card number.
///
/// # Example
///
/// ```
/// use card_batch::detect::classify;
/// use card_batch::CardBrand;
///
/// assert_eq!(classify("4539148803436467"), CardBrand::Visa);
/// assert_eq!(classify("6011111111111117"), CardBrand::Discover);
/// assert_eq!(classify("9999"), CardBrand::Unknown);
/// ```
#[inline]
pub fn classify(number: &str) -> CardBrand {
    match number.as_bytes() {
        [b'4', ..] => CardBrand::Visa,
        [b'5', b'1'..=b'5', ..] => CardBrand::MasterCard,
        [b'3', b'4' | b'7', ..] => CardBrand::AmericanExpress,
        [b'6', b'0', b'1', b'1', ..] | [b'6', b'5', ..] => CardBrand::Discover,
        [b'3', b'5', ..] => CardBrand::Jcb,
        [b'6', b'2', ..] => CardBrand::UnionPay,
        _ => CardBrand::Unknown,
    }
}

/// Classifies a card number that may still contain separators.
pub fn classify_formatted(number: &str) -> CardBrand {
    classify(&crate::card::normalize_number(number))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_visa() {
        assert_eq!(classify("4111111111111111"), CardBrand::Visa);
        assert_eq!(classify("4"), CardBrand::Visa);
        // Visa regardless of later digits
        assert_eq!(classify("4011601165620000"), CardBrand::Visa);
    }

    #[test]
    fn test_mastercard() {
        for prefix in ["51", "52", "53", "54", "55"] {
            assert_eq!(classify(&format!("{}00000000000000", prefix)), CardBrand::MasterCard);
        }
        assert_eq!(classify("5000000000000000"), CardBrand::Unknown);
        assert_eq!(classify("5600000000000000"), CardBrand::Unknown);
    }

    #[test]
    fn test_amex() {
        assert_eq!(classify("378282246310005"), CardBrand::AmericanExpress);
        assert_eq!(classify("340000000000009"), CardBrand::AmericanExpress);
        assert_eq!(classify("360000000000000"), CardBrand::Unknown);
    }

    #[test]
    fn test_discover_precedence() {
        assert_eq!(classify("6011000990139424"), CardBrand::Discover);
        assert_eq!(classify("6500000000000002"), CardBrand::Discover);
        // 6012 is not Discover and not 62
        assert_eq!(classify("6012000000000000"), CardBrand::Unknown);
    }

    #[test]
    fn test_jcb_and_unionpay() {
        assert_eq!(classify("3530111333300000"), CardBrand::Jcb);
        assert_eq!(classify("6200000000000005"), CardBrand::UnionPay);
    }

    #[test]
    fn test_unknown() {
        assert_eq!(classify(""), CardBrand::Unknown);
        assert_eq!(classify("6"), CardBrand::Unknown);
        assert_eq!(classify("1234567890123456"), CardBrand::Unknown);
    }

    #[test]
    fn test_classify_formatted() {
        assert_eq!(classify_formatted("6011-1111-1111-1117"), CardBrand::Discover);
        assert_eq!(classify_formatted(" 37 8282 246310 005"), CardBrand::AmericanExpress);
    }
}
