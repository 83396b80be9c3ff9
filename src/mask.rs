//! Masking utilities for display and logging.
//!
//! Only the trailing digits of a card number or CPF are ever shown. Record
//! `Debug` output and every log line in this crate go through these helpers.

/// Masks a card number, keeping only the last four digits.
///
/// Non-digits are ignored; the mask is grouped in fours like the input mask.
///
/// # Example
///
/// ```
/// use card_registry::mask::mask_card_number;
///
/// assert_eq!(mask_card_number("4111111111111111"), "**** **** **** 1111");
/// assert_eq!(mask_card_number("378282246310005"), "**** **** ***0 005");
/// ```
pub fn mask_card_number(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    let visible_from = digits.len().saturating_sub(4);

    let mut result = String::with_capacity(digits.len() + digits.len() / 4);
    for (i, c) in digits.iter().enumerate() {
        if i > 0 && i % 4 == 0 {
            result.push(' ');
        }
        result.push(if i < visible_from { '*' } else { *c });
    }

    result
}

/// Masks a CPF, keeping only the two check digits.
///
/// # Example
///
/// ```
/// use card_registry::mask::mask_cpf;
///
/// assert_eq!(mask_cpf("11144477735"), "***.***.***-35");
/// ```
pub fn mask_cpf(cpf: &str) -> String {
    let digits: Vec<char> = cpf.chars().filter(|c| c.is_ascii_digit()).collect();
    let visible_from = digits.len().saturating_sub(2);

    let mut result = String::with_capacity(14);
    for (i, c) in digits.iter().enumerate() {
        match i {
            3 | 6 => result.push('.'),
            9 => result.push('-'),
            _ => {}
        }
        result.push(if i < visible_from { '*' } else { *c });
    }

    result
}

/// Returns the last four digits of a card number, or fewer if it is shorter.
pub fn last_four(card_number: &str) -> String {
    let digits: Vec<char> = card_number.chars().filter(|c| c.is_ascii_digit()).collect();
    digits[digits.len().saturating_sub(4)..].iter().collect()
}
