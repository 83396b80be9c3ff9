//! Reference-date sources for date validation.
//!
//! Birth-date policy is relative to "today". Reading the wall clock is the
//! only side effect in the validation pipeline, so it goes through [`Clock`]
//! and tests pin it with [`FixedClock`].

use chrono::{Local, NaiveDate};

/// Supplies the date that age checks are measured against.
pub trait Clock: Send + Sync {
    /// Returns the current reference date.
    fn today(&self) -> NaiveDate;
}

/// Reads the local calendar date from the system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// Always returns the same date.
///
/// # Example
///
/// ```
/// use card_registry::clock::{Clock, FixedClock};
/// use chrono::NaiveDate;
///
/// let date = NaiveDate::from_ymd_opt(2024, 6, 15).unwrap();
/// assert_eq!(FixedClock(date).today(), date);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedClock(pub NaiveDate);

impl Clock for FixedClock {
    fn today(&self) -> NaiveDate {
        self.0
    }
}

impl<F> Clock for F
where
    F: Fn() -> NaiveDate + Send + Sync,
{
    fn today(&self) -> NaiveDate {
        self()
    }
}
