//! Fuzz target for input masks.
//!
//! Tests that formatting functions never panic on arbitrary input and stay
//! idempotent and bounded.

#![no_main]

use card_registry::format;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let card = format::format_card_number(data);
    let cpf = format::format_cpf(data);
    let date = format::format_date(data);
    let _ = format::split_into_groups(data);
    let _ = format::strip_whitespace(data);

    // Bounded output
    assert!(card.chars().count() <= format::CARD_NUMBER_MASK_LEN);
    assert!(cpf.chars().count() <= format::CPF_MASK_LEN);
    assert!(date.chars().count() <= format::DATE_MASK_LEN);

    // Idempotent
    assert_eq!(format::format_card_number(&card), card);
    assert_eq!(format::format_cpf(&cpf), cpf);
    assert_eq!(format::format_date(&date), date);

    // The digit masks keep a prefix of the typed digits
    let digits = format::strip_formatting(data);
    assert!(digits.starts_with(&format::strip_formatting(&cpf)));
    assert!(digits.starts_with(&format::strip_formatting(&date)));
});
