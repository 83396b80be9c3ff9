//! Fuzz target for Luhn algorithm.
//!
//! Tests that luhn functions never panic and maintain invariants.

#![no_main]

use card_registry::luhn;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Clamp values to valid digit range
    let digits: Vec<u8> = data.iter().map(|&b| b % 10).collect();

    if digits.is_empty() {
        return;
    }

    let valid = luhn::validate(&digits);
    assert_eq!(valid, luhn::compute_checksum(&digits) % 10 == 0);

    // The string validator agrees with the digit validator inside the length range
    let text: String = digits.iter().map(|&d| (b'0' + d) as char).collect();
    if (13..=19).contains(&digits.len()) {
        assert_eq!(luhn::is_valid_card_number(&text), valid, "mismatch for {}", text);
    } else {
        assert!(!luhn::is_valid_card_number(&text));
    }

    // Adding the check digit makes any sequence valid
    if digits.len() <= 18 {
        let check = luhn::generate_check_digit(&digits);
        assert!(check <= 9, "Check digit should be 0-9");

        let mut with_check = digits.clone();
        with_check.push(check);
        assert!(luhn::validate(&with_check), "Adding check digit should make valid");
    }
});
