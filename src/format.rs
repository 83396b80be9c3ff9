//! Input masks applied while the user types.
//!
//! Each formatter accepts whatever is in the input field right now (raw
//! digits, a partially masked value, or a fully masked one) and returns the
//! masked form. They are safe to call on every keystroke:
//!
//! - empty input gives empty output
//! - output length is bounded, whatever the input length
//! - applying a formatter to its own output changes nothing
//!
//! # Mask Conventions
//!
//! - **Card number**: `XXXX XXXX XXXX XXXX` (at most 19 characters)
//! - **CPF**: `XXX.XXX.XXX-XX` (at most 14 characters)
//! - **Date**: `DD/MM/YYYY` (at most 10 characters)
//!
//! # Example
//!
//! ```
//! use card_registry::format::{format_card_number, format_cpf, format_date};
//!
//! assert_eq!(format_card_number("1234567890123456"), "1234 5678 9012 3456");
//! assert_eq!(format_cpf("1234567"), "123.456.7");
//! assert_eq!(format_date("250520"), "25/05/20");
//! ```

/// Longest masked card number: 16 digits and 3 spaces.
pub const CARD_NUMBER_MASK_LEN: usize = 19;

/// Longest masked CPF: 11 digits and 3 separators.
pub const CPF_MASK_LEN: usize = 14;

/// Longest masked date: 8 digits and 2 slashes.
pub const DATE_MASK_LEN: usize = 10;

const CARD_GROUP: usize = 4;
const CPF_SEPARATORS: &[(usize, char)] = &[(3, '.'), (6, '.'), (9, '-')];
const DATE_SEPARATORS: &[(usize, char)] = &[(2, '/'), (4, '/')];

/// Masks a card number in groups of four as it is typed.
///
/// Only whitespace is stripped before regrouping, so whatever else was
/// typed stays visible for the validator to reject.
///
/// # Example
///
/// ```
/// use card_registry::format::format_card_number;
///
/// assert_eq!(format_card_number("12345"), "1234 5");
/// assert_eq!(format_card_number("1234 5678 9012 3456"), "1234 5678 9012 3456");
/// assert_eq!(format_card_number("12345678901234567890"), "1234 5678 9012 3456");
/// ```
pub fn format_card_number(input: &str) -> String {
    let mut result = String::with_capacity(CARD_NUMBER_MASK_LEN);
    let mut written = 0;

    for (i, c) in input.chars().filter(|c| !c.is_whitespace()).enumerate() {
        if i > 0 && i % CARD_GROUP == 0 {
            // A separator must be followed by a character within the limit.
            if written + 2 > CARD_NUMBER_MASK_LEN {
                break;
            }
            result.push(' ');
            written += 1;
        }
        if written == CARD_NUMBER_MASK_LEN {
            break;
        }
        result.push(c);
        written += 1;
    }

    result
}

/// Masks a CPF as `XXX.XXX.XXX-XX` as it is typed.
///
/// # Example
///
/// ```
/// use card_registry::format::format_cpf;
///
/// assert_eq!(format_cpf("123"), "123");
/// assert_eq!(format_cpf("1234"), "123.4");
/// assert_eq!(format_cpf("12345678909"), "123.456.789-09");
/// ```
pub fn format_cpf(input: &str) -> String {
    mask_digits(input, CPF_SEPARATORS, CPF_MASK_LEN)
}

/// Masks a date as `DD/MM/YYYY` as it is typed.
///
/// # Example
///
/// ```
/// use card_registry::format::format_date;
///
/// assert_eq!(format_date("25"), "25");
/// assert_eq!(format_date("250"), "25/0");
/// assert_eq!(format_date("25052004"), "25/05/2004");
/// ```
pub fn format_date(input: &str) -> String {
    mask_digits(input, DATE_SEPARATORS, DATE_MASK_LEN)
}

/// Strips everything but ASCII digits.
///
/// # Example
///
/// ```
/// use card_registry::format::strip_formatting;
///
/// assert_eq!(strip_formatting("111.444.777-35"), "11144477735");
/// ```
pub fn strip_formatting(input: &str) -> String {
    input.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strips whitespace, leaving every other character in place.
pub fn strip_whitespace(input: &str) -> String {
    input.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Splits a card number into its display groups of four, ignoring
/// whitespace. The last group may be shorter.
///
/// # Example
///
/// ```
/// use card_registry::format::split_into_groups;
///
/// assert_eq!(split_into_groups("4111 1111 111"), vec!["4111", "1111", "111"]);
/// assert!(split_into_groups("").is_empty());
/// ```
pub fn split_into_groups(input: &str) -> Vec<String> {
    let chars: Vec<char> = input.chars().filter(|c| !c.is_whitespace()).collect();
    chars
        .chunks(CARD_GROUP)
        .map(|group| group.iter().collect())
        .collect()
}

/// Keeps the digits of `input` and inserts each separator once the digit
/// group before it is complete and another digit follows.
fn mask_digits(input: &str, separators: &[(usize, char)], max_len: usize) -> String {
    let mut result = String::with_capacity(max_len);
    let mut written = 0;

    for (i, c) in input.chars().filter(|c| c.is_ascii_digit()).enumerate() {
        if let Some(&(_, sep)) = separators.iter().find(|(at, _)| *at == i) {
            if written + 2 > max_len {
                break;
            }
            result.push(sep);
            written += 1;
        }
        if written == max_len {
            break;
        }
        result.push(c);
        written += 1;
    }

    result
}
