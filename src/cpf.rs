//! CPF (Cadastro de Pessoas Físicas) validation.
//!
//! A CPF is eleven digits: nine base digits followed by two check digits,
//! each a weighted mod-11 sum over the digits before it. Written forms such
//! as `111.444.777-35` are accepted; every non-digit is ignored.

use crate::error::{Field, ValidationError};

/// Number of digits in a CPF.
pub const CPF_DIGITS: usize = 11;

/// Sequences that pass the check-digit arithmetic but are never issued.
pub const REPEATED_DIGIT_CPFS: [&str; 10] = [
    "00000000000",
    "11111111111",
    "22222222222",
    "33333333333",
    "44444444444",
    "55555555555",
    "66666666666",
    "77777777777",
    "88888888888",
    "99999999999",
];

/// Returns true if `input` is a valid CPF.
///
/// # Example
///
/// ```
/// use card_registry::cpf::is_valid_cpf;
///
/// assert!(is_valid_cpf("11144477735"));
/// assert!(is_valid_cpf("111.444.777-35"));
/// assert!(!is_valid_cpf("11111111111"));
/// assert!(!is_valid_cpf("11144477736"));
/// ```
#[inline]
pub fn is_valid_cpf(input: &str) -> bool {
    check_cpf(input).is_ok()
}

/// Validates a CPF and returns its eleven digits with separators removed.
///
/// # Errors
///
/// * [`ValidationError::Missing`] if the input has no digits at all
/// * [`ValidationError::CpfLength`] unless exactly eleven digits remain
/// * [`ValidationError::CpfRepeatedDigits`] for `00000000000` … `99999999999`
/// * [`ValidationError::CpfChecksum`] if either check digit is wrong
pub fn check_cpf(input: &str) -> Result<String, ValidationError> {
    let cleaned: String = input.chars().filter(|c| c.is_ascii_digit()).collect();

    if cleaned.is_empty() {
        return Err(ValidationError::Missing(Field::Cpf));
    }

    if cleaned.len() != CPF_DIGITS {
        return Err(ValidationError::CpfLength {
            length: cleaned.len(),
        });
    }

    if REPEATED_DIGIT_CPFS.contains(&cleaned.as_str()) {
        return Err(ValidationError::CpfRepeatedDigits);
    }

    let mut digits = [0u8; CPF_DIGITS];
    for (slot, b) in digits.iter_mut().zip(cleaned.bytes()) {
        *slot = b - b'0';
    }

    let mut base = [0u8; 9];
    base.copy_from_slice(&digits[..9]);

    if check_digits(&base) != (digits[9], digits[10]) {
        return Err(ValidationError::CpfChecksum);
    }

    Ok(cleaned)
}

/// Computes both check digits for the nine base digits of a CPF.
///
/// # Example
///
/// ```
/// use card_registry::cpf::check_digits;
///
/// assert_eq!(check_digits(&[1, 1, 1, 4, 4, 4, 7, 7, 7]), (3, 5));
/// ```
pub fn check_digits(base: &[u8; 9]) -> (u8, u8) {
    let first = check_digit(base);

    let mut extended = [0u8; 10];
    extended[..9].copy_from_slice(base);
    extended[9] = first;

    (first, check_digit(&extended))
}

/// Weighted mod-11 digit over `digits`, weights running from `len + 1` down to 2.
fn check_digit(digits: &[u8]) -> u8 {
    let top = digits.len() as u32 + 1;
    let sum: u32 = digits
        .iter()
        .enumerate()
        .map(|(i, &d)| d as u32 * (top - i as u32))
        .sum();

    match sum % 11 {
        0 | 1 => 0,
        r => (11 - r) as u8,
    }
}
