//! Fuzz target for CPF validation.
//!
//! Tests that CPF checks never panic and that accepted values are normalized.

#![no_main]

use card_registry::cpf;
use card_registry::format::{format_cpf, strip_formatting};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let result = cpf::check_cpf(data);
    assert_eq!(result.is_ok(), cpf::is_valid_cpf(data));

    if let Ok(digits) = result {
        assert_eq!(digits.len(), 11);
        assert_eq!(digits, strip_formatting(data));

        // The mask keeps a valid CPF valid
        assert!(cpf::is_valid_cpf(&format_cpf(data)));
    }
});
