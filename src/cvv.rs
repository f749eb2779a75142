//! CVV format checking.
//!
//! A CVV passes when it is made only of digits and is 3 or 4 digits long.
//! The check is brand-agnostic.

use crate::error::CvvError;

/// Validates a CVV and returns its length.
///
/// # Example
///
/// ```
/// use card_batch::cvv::validate_cvv;
///
/// assert_eq!(validate_cvv("123"), Ok(3));
/// assert_eq!(validate_cvv("1234"), Ok(4));
/// assert!(validate_cvv("12").is_err());
/// assert!(validate_cvv("12a").is_err());
/// ```
pub fn validate_cvv(input: &str) -> Result<usize, CvvError> {
    if input.is_empty() {
        return Err(CvvError::Empty);
    }

    if let Some((position, character)) = input
        .chars()
        .enumerate()
        .find(|(_, c)| !c.is_ascii_digit())
    {
        return Err(CvvError::InvalidCharacter {
            position,
            character,
        });
    }

    match input.len() {
        len @ (3 | 4) => Ok(len),
        len => Err(CvvError::InvalidLength(len)),
    }
}

/// Returns true if the CVV is 3 or 4 digits.
#[inline]
pub fn is_valid_cvv(input: &str) -> bool {
    validate_cvv(input).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_lengths() {
        assert!(is_valid_cvv("000"));
        assert!(is_valid_cvv("999"));
        assert!(is_valid_cvv("1234"));
    }

    #[test]
    fn test_invalid_lengths() {
        assert_eq!(validate_cvv("12"), Err(CvvError::InvalidLength(2)));
        assert_eq!(validate_cvv("12345"), Err(CvvError::InvalidLength(5)));
    }

    #[test]
    fn test_non_digit() {
        assert_eq!(
            validate_cvv("1 3"),
            Err(CvvError::InvalidCharacter {
                position: 1,
                character: ' '
            })
        );
        assert!(!is_valid_cvv("abc"));
        assert!(!is_valid_cvv("١٢٣"));
    }

    #[test]
    fn test_empty() {
        assert_eq!(validate_cvv(""), Err(CvvError::Empty));
    }
}
