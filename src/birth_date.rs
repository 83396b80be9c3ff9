//! Birth date parsing and age policy.
//!
//! Dates are written `DD/MM/YYYY`. A date is accepted when it exists in the
//! Gregorian calendar, is not after the reference date, and puts the holder
//! between [`MINIMUM_AGE`] and [`MAXIMUM_AGE`] years old inclusive.
//!
//! The reference date comes from a [`Clock`]; this is the one place in the
//! validation pipeline that observes wall-clock time.
//!
//! # Example
//!
//! ```
//! use card_registry::birth_date::{is_valid_date, parse_birth_date};
//! use card_registry::clock::FixedClock;
//! use chrono::NaiveDate;
//!
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//!
//! assert!(is_valid_date("15/06/2006", &clock));
//! assert!(!is_valid_date("16/06/2006", &clock));
//! assert!(!is_valid_date("31/02/2000", &clock));
//!
//! let date = parse_birth_date("25/05/2004", &clock).unwrap();
//! assert_eq!(date, NaiveDate::from_ymd_opt(2004, 5, 25).unwrap());
//! ```

use chrono::{Datelike, Months, NaiveDate};

use crate::clock::Clock;
use crate::error::{Field, ValidationError};

/// Youngest accepted card holder, in whole years.
pub const MINIMUM_AGE: u32 = 18;

/// Oldest accepted card holder, in whole years.
pub const MAXIMUM_AGE: u32 = 120;

/// Returns true if `input` is a well-formed, real, policy-compliant birth date.
///
/// Reads the reference date from `clock`.
#[inline]
pub fn is_valid_date<C: Clock + ?Sized>(input: &str, clock: &C) -> bool {
    parse_birth_date(input, clock).is_ok()
}

/// Parses a `DD/MM/YYYY` birth date and applies the age policy.
///
/// # Errors
///
/// * [`ValidationError::Missing`] for blank input
/// * [`ValidationError::BirthDateFormat`] if the text is not exactly `DD/MM/YYYY`
/// * [`ValidationError::BirthDateNotACalendarDate`] for dates such as `31/02/2020`
/// * [`ValidationError::BirthDateInFuture`], [`ValidationError::Underage`] or
///   [`ValidationError::TooOld`] from [`check_age`]
pub fn parse_birth_date<C: Clock + ?Sized>(
    input: &str,
    clock: &C,
) -> Result<NaiveDate, ValidationError> {
    let date = parse_calendar_date(input)?;
    check_age(date, clock.today())?;
    Ok(date)
}

/// Parses `DD/MM/YYYY` into a date without applying any age policy.
///
/// The calendar construction is checked: out-of-range days are an error,
/// never rolled over into the next month.
pub fn parse_calendar_date(input: &str) -> Result<NaiveDate, ValidationError> {
    if input.trim().is_empty() {
        return Err(ValidationError::Missing(Field::BirthDate));
    }

    let (day, month, year) = split_date(input).ok_or(ValidationError::BirthDateFormat)?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or(ValidationError::BirthDateNotACalendarDate {
        day,
        month,
        year,
    })
}

/// Checks a birth date against `today` for the future/minimum/maximum age rules.
///
/// Years are subtracted as twelve-month steps, so on 29 February the
/// boundary in a non-leap year is 28 February. It never rolls forward to
/// 1 March: someone born on 01/03/2006 is still underage on 29/02/2024.
pub fn check_age(date: NaiveDate, today: NaiveDate) -> Result<(), ValidationError> {
    if date > today {
        return Err(ValidationError::BirthDateInFuture);
    }

    let youngest = years_before(today, MINIMUM_AGE);
    if date > youngest {
        return Err(ValidationError::Underage {
            minimum_age: MINIMUM_AGE,
        });
    }

    let oldest = years_before(today, MAXIMUM_AGE);
    if date < oldest {
        return Err(ValidationError::TooOld {
            maximum_age: MAXIMUM_AGE,
        });
    }

    Ok(())
}

/// Whole years between `birth` and `today`; zero if `birth` is later.
pub fn age_on(birth: NaiveDate, today: NaiveDate) -> u32 {
    if birth > today {
        return 0;
    }

    let mut years = today.year() - birth.year();
    if (today.month(), today.day()) < (birth.month(), birth.day()) {
        years -= 1;
    }
    years.max(0) as u32
}

/// Formats a date back into `DD/MM/YYYY`.
pub fn format_birth_date(date: NaiveDate) -> String {
    format!("{:02}/{:02}/{:04}", date.day(), date.month(), date.year())
}

fn years_before(today: NaiveDate, years: u32) -> NaiveDate {
    today
        .checked_sub_months(Months::new(years * 12))
        .unwrap_or(NaiveDate::MIN)
}

/// Splits exactly `DD/MM/YYYY` into (day, month, year).
fn split_date(input: &str) -> Option<(u32, u32, i32)> {
    let bytes = input.as_bytes();
    if bytes.len() != 10 || bytes[2] != b'/' || bytes[5] != b'/' {
        return None;
    }

    let all_digits = bytes
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != 2 && *i != 5)
        .all(|(_, b)| b.is_ascii_digit());
    if !all_digits {
        return None;
    }

    // Every byte is ASCII past this point, so the slices sit on char boundaries.
    let day = input[0..2].parse().ok()?;
    let month = input[3..5].parse().ok()?;
    let year = input[6..10].parse().ok()?;
    Some((day, month, year))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;

    fn ymd(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).unwrap()
    }

    fn clock() -> FixedClock {
        FixedClock(ymd(2024, 6, 15))
    }

    #[test]
    fn test_exactly_minimum_age() {
        assert!(is_valid_date("15/06/2006", &clock()));
    }

    #[test]
    fn test_one_day_short_of_minimum_age() {
        assert_eq!(
            parse_birth_date("16/06/2006", &clock()).unwrap_err(),
            ValidationError::Underage { minimum_age: 18 }
        );
    }

    #[test]
    fn test_maximum_age_boundary() {
        assert!(is_valid_date("15/06/1904", &clock()));
        assert_eq!(
            parse_birth_date("14/06/1904", &clock()).unwrap_err(),
            ValidationError::TooOld { maximum_age: 120 }
        );
    }

    #[test]
    fn test_future_date() {
        assert_eq!(
            parse_birth_date("16/06/2024", &clock()).unwrap_err(),
            ValidationError::BirthDateInFuture
        );
        assert_eq!(
            parse_birth_date("01/01/2100", &clock()).unwrap_err(),
            ValidationError::BirthDateInFuture
        );
    }

    #[test]
    fn test_today_is_underage_not_future() {
        assert_eq!(
            parse_birth_date("15/06/2024", &clock()).unwrap_err(),
            ValidationError::Underage { minimum_age: 18 }
        );
    }

    #[test]
    fn test_impossible_dates() {
        assert_eq!(
            parse_birth_date("31/02/2020", &clock()).unwrap_err(),
            ValidationError::BirthDateNotACalendarDate {
                day: 31,
                month: 2,
                year: 2020
            }
        );
        assert!(!is_valid_date("29/02/2001", &clock()));
        assert!(!is_valid_date("00/01/1990", &clock()));
        assert!(!is_valid_date("10/13/1990", &clock()));
        assert!(!is_valid_date("31/04/1990", &clock()));
    }

    #[test]
    fn test_leap_day_birth() {
        assert!(is_valid_date("29/02/2000", &clock()));
    }

    #[test]
    fn test_leap_day_reference() {
        let clock = FixedClock(ymd(2024, 2, 29));
        assert!(is_valid_date("28/02/2006", &clock));
        assert!(!is_valid_date("01/03/2006", &clock));
    }

    #[test]
    fn test_wrong_shape() {
        for input in [
            "1/6/1990",
            "01-06-1990",
            "01/06/90",
            "1990/06/01",
            " 01/06/1990",
            "01/06/1990 ",
            "0a/06/1990",
            "01/06/19900",
            "+1/06/1990",
        ] {
            assert_eq!(
                parse_birth_date(input, &clock()).unwrap_err(),
                ValidationError::BirthDateFormat,
                "{:?} should be rejected",
                input
            );
        }
    }

    #[test]
    fn test_blank_is_missing() {
        assert_eq!(
            parse_birth_date("", &clock()).unwrap_err(),
            ValidationError::Missing(Field::BirthDate)
        );
        assert_eq!(
            parse_birth_date("   ", &clock()).unwrap_err(),
            ValidationError::Missing(Field::BirthDate)
        );
    }

    #[test]
    fn test_multibyte_input_does_not_panic() {
        assert!(!is_valid_date("ü1/06/1990", &clock()));
        assert!(!is_valid_date("01/06/199€", &clock()));
    }

    #[test]
    fn test_age_on() {
        assert_eq!(age_on(ymd(2006, 6, 15), ymd(2024, 6, 15)), 18);
        assert_eq!(age_on(ymd(2006, 6, 16), ymd(2024, 6, 15)), 17);
        assert_eq!(age_on(ymd(2030, 1, 1), ymd(2024, 6, 15)), 0);
    }

    #[test]
    fn test_format_birth_date() {
        assert_eq!(format_birth_date(ymd(2004, 5, 25)), "25/05/2004");
    }
}
