//! Fuzz target for whole-submission validation.
//!
//! Tests that validation never panics and reports at most one error per field.

#![no_main]

use arbitrary::Arbitrary;
use card_registry::clock::FixedClock;
use card_registry::{is_valid_card, validate_card, validate_update, CardUpdate, NewCard};
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

#[derive(Debug, Arbitrary)]
struct Input {
    holder_name: String,
    card_number: String,
    birth_date: String,
    cpf: String,
    partial: [bool; 4],
}

fuzz_target!(|input: Input| {
    let Some(today) = NaiveDate::from_ymd_opt(2024, 6, 15) else {
        return;
    };
    let clock = FixedClock(today);

    let card = NewCard::new(
        input.holder_name.clone(),
        input.card_number.clone(),
        input.birth_date.clone(),
        input.cpf.clone(),
    );
    let errors = validate_card(&card, &clock);
    assert!(errors.len() <= 4);
    assert_eq!(errors.is_empty(), is_valid_card(&card, &clock));

    let pick = |keep: bool, value: String| keep.then_some(value);
    let update = CardUpdate {
        holder_name: pick(input.partial[0], input.holder_name),
        card_number: pick(input.partial[1], input.card_number),
        birth_date: pick(input.partial[2], input.birth_date),
        cpf: pick(input.partial[3], input.cpf),
    };
    if let Err(errors) = validate_update(&update, &clock) {
        assert!(!errors.is_empty() && errors.len() <= 4);
    }
});
