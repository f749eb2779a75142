//! Luhn (modulus 10) checksum.
//!
//! Digits are weighted from the right: the rightmost digit is offset 0 and
//! kept as is, offsets 1, 3, 5, ... are doubled, and a doubled value above 9
//! has 9 subtracted. The number is valid iff the sum is a multiple of 10.

/// Doubled digit with 9 subtracted when the result exceeds 9, indexed by digit.
const DOUBLE_TABLE: [u8; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Validates a digit sequence (values 0-9) with the Luhn algorithm.
///
/// Empty input fails. Any element above 9 also fails rather than panicking.
///
/// # Example
///
/// ```
/// use card_batch::luhn::validate;
///
/// let digits = [4, 5, 3, 9, 1, 4, 8, 8, 0, 3, 4, 3, 6, 4, 6, 7];
/// assert!(validate(&digits));
///
/// let invalid = [4, 5, 3, 9, 1, 4, 8, 8, 0, 3, 4, 3, 6, 4, 6, 8];
/// assert!(!validate(&invalid));
/// ```
#[inline]
pub fn validate(digits: &[u8]) -> bool {
    if digits.is_empty() || digits.iter().any(|&d| d > 9) {
        return false;
    }

    compute_checksum(digits) % 10 == 0
}

/// Validates a normalized card number given as text.
///
/// The input must already be digit-only; any other character (including
/// separators) makes the check fail.
///
/// ```
/// use card_batch::luhn::passes;
///
/// assert!(passes("4539148803436467"));
/// assert!(!passes("4539 1488 0343 6467"));
/// assert!(!passes(""));
/// ```
pub fn passes(number: &str) -> bool {
    let mut digits = Vec::with_capacity(number.len());
    for b in number.bytes() {
        if !b.is_ascii_digit() {
            return false;
        }
        digits.push(b - b'0');
    }
    validate(&digits)
}

/// Computes the Luhn sum (not reduced modulo 10).
///
/// Callers must pass digits in 0-9.
#[inline]
pub fn compute_checksum(digits: &[u8]) -> u32 {
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(offset, &d)| {
            if offset % 2 == 1 {
                DOUBLE_TABLE[d as usize] as u32
            } else {
                d as u32
            }
        })
        .sum()
}

/// Computes the check digit to append to `digits` so the result passes.
///
/// Every existing digit moves one offset to the left once the check digit
/// is appended, so the parity of the doubling flips.
///
/// ```
/// use card_batch::luhn::generate_check_digit;
///
/// let partial = [4, 5, 3, 9, 1, 4, 8, 8, 0, 3, 4, 3, 6, 4, 6];
/// assert_eq!(generate_check_digit(&partial), 7);
/// ```
pub fn generate_check_digit(digits: &[u8]) -> u8 {
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(offset, &d)| {
            if offset % 2 == 0 {
                DOUBLE_TABLE[d as usize] as u32
            } else {
                d as u32
            }
        })
        .sum();

    ((10 - (sum % 10)) % 10) as u8
}
