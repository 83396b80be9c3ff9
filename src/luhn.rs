//! Luhn algorithm implementation for card number validation.
//!
//! The Luhn algorithm (also known as the "modulus 10" algorithm) is a checksum
//! formula used to validate credit card numbers and other identification numbers.
//!
//! The string-level entry points are [`is_valid_card_number`] and
//! [`check_card_number`]; the slice-level functions work on digit values
//! (0-9, not ASCII) and are shared with test-data generation.

use crate::error::{Field, ValidationError};

/// Minimum number of digits in an accepted card number.
pub const MIN_CARD_DIGITS: usize = 13;

/// Maximum number of digits in an accepted card number.
pub const MAX_CARD_DIGITS: usize = 19;

/// Lookup table for doubled digits: double the value, subtract 9 if >= 10.
/// Index is the digit (0-9), value is the transformed result.
const DOUBLE_TABLE: [u8; 10] = [0, 2, 4, 6, 8, 1, 3, 5, 7, 9];

/// Returns true if `input` is a plausible card number.
///
/// Whitespace is ignored. The remaining characters must all be ASCII digits,
/// there must be 13 to 19 of them, and they must pass the Luhn checksum.
/// Malformed input yields `false`; this function never panics.
///
/// # Example
///
/// ```
/// use card_registry::luhn::is_valid_card_number;
///
/// assert!(is_valid_card_number("4532015112830366"));
/// assert!(is_valid_card_number("4532 0151 1283 0366"));
/// assert!(!is_valid_card_number("1234567890123"));
/// assert!(!is_valid_card_number("4532-0151-1283-0366"));
/// ```
#[inline]
pub fn is_valid_card_number(input: &str) -> bool {
    check_card_number(input).is_ok()
}

/// Validates a card number and returns it with whitespace stripped.
///
/// # Errors
///
/// * [`ValidationError::Missing`] if nothing but whitespace was given
/// * [`ValidationError::CardNumberInvalidCharacter`] for any non-digit
/// * [`ValidationError::CardNumberLength`] outside 13..=19 digits
/// * [`ValidationError::CardNumberChecksum`] if the Luhn sum is wrong
///
/// # Example
///
/// ```
/// use card_registry::luhn::check_card_number;
///
/// assert_eq!(check_card_number("4111 1111 1111 1111").unwrap(), "4111111111111111");
/// assert!(check_card_number("4111 1111 1111 1112").is_err());
/// ```
pub fn check_card_number(input: &str) -> Result<String, ValidationError> {
    let mut digits = Vec::with_capacity(MAX_CARD_DIGITS);

    for (position, c) in input.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if !c.is_ascii_digit() {
            return Err(ValidationError::CardNumberInvalidCharacter {
                position,
                character: c,
            });
        }
        digits.push((c as u8) - b'0');
    }

    if digits.is_empty() {
        return Err(ValidationError::Missing(Field::CardNumber));
    }

    if !(MIN_CARD_DIGITS..=MAX_CARD_DIGITS).contains(&digits.len()) {
        return Err(ValidationError::CardNumberLength {
            length: digits.len(),
            minimum: MIN_CARD_DIGITS,
            maximum: MAX_CARD_DIGITS,
        });
    }

    if !validate(&digits) {
        return Err(ValidationError::CardNumberChecksum);
    }

    Ok(digits.iter().map(|d| char::from(b'0' + d)).collect())
}

/// Validates a sequence of digits using the Luhn algorithm.
///
/// # Arguments
///
/// * `digits` - A slice of digits (0-9) representing the card number.
///
/// # Algorithm
///
/// 1. Starting from the rightmost digit (check digit), moving left
/// 2. Double every second digit
/// 3. If doubling results in a number > 9, subtract 9
/// 4. Sum all digits
/// 5. If the sum is divisible by 10, the number is valid
///
/// # Example
///
/// ```
/// use card_registry::luhn::validate;
///
/// let digits = [4, 5, 3, 2, 0, 1, 5, 1, 1, 2, 8, 3, 0, 3, 6, 6];
/// assert!(validate(&digits));
///
/// let invalid = [4, 5, 3, 2, 0, 1, 5, 1, 1, 2, 8, 3, 0, 3, 6, 7];
/// assert!(!validate(&invalid));
/// ```
#[inline]
pub fn validate(digits: &[u8]) -> bool {
    if digits.is_empty() {
        return false;
    }

    compute_checksum(digits) % 10 == 0
}

/// Computes the Luhn sum (not reduced modulo 10) for a sequence of digits.
#[inline]
pub fn compute_checksum(digits: &[u8]) -> u32 {
    // Rightmost digit is position 0 and is never doubled.
    digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| {
            if i % 2 == 1 {
                DOUBLE_TABLE[digit as usize] as u32
            } else {
                digit as u32
            }
        })
        .sum()
}

/// Generates the check digit for a partial card number.
///
/// Given digits without the check digit, computes what the check digit
/// should be for the number to pass Luhn validation.
///
/// # Example
///
/// ```
/// use card_registry::luhn::generate_check_digit;
///
/// let partial = [4, 5, 3, 2, 0, 1, 5, 1, 1, 2, 8, 3, 0, 3, 6];
/// assert_eq!(generate_check_digit(&partial), 6);
/// ```
#[inline]
pub fn generate_check_digit(digits: &[u8]) -> u8 {
    // Once the check digit is appended every existing digit shifts one
    // position left, so the rightmost one here gets doubled.
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &digit)| {
            if i % 2 == 0 {
                DOUBLE_TABLE[digit as usize] as u32
            } else {
                digit as u32
            }
        })
        .sum();

    ((10 - (sum % 10)) % 10) as u8
}
