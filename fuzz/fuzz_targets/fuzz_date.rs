//! Fuzz target for birth date parsing.
//!
//! Tests that date parsing never panics and that accepted dates format back
//! to the same text.

#![no_main]

use card_registry::birth_date::{format_birth_date, parse_birth_date, parse_calendar_date};
use card_registry::clock::FixedClock;
use chrono::NaiveDate;
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &str| {
    let Some(today) = NaiveDate::from_ymd_opt(2024, 6, 15) else {
        return;
    };

    if let Ok(date) = parse_calendar_date(data) {
        assert_eq!(format_birth_date(date), data);
    }

    if let Ok(date) = parse_birth_date(data, &FixedClock(today)) {
        assert!(date <= today);
    }
});
