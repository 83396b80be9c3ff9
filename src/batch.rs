//! Batch validation and re-validation of stored records.
//!
//! Every rule is a pure function of its input and the reference date, so
//! batches can be checked sequentially or, with the `parallel` feature,
//! spread across threads with rayon.
//!
//! Stored records passed validation when they were written, but the data
//! file can be edited by hand and age limits move with the calendar.
//! [`audit_records`] reports every record that no longer passes.

use serde::Serialize;

use crate::clock::Clock;
use crate::error::ValidationError;
use crate::record::{CardRecord, NewCard};
use crate::validate::{validate_card, validate_new_card, ValidCard};

/// Batch validator for card submissions, bound to one reference date source.
///
/// # Example
///
/// ```
/// use card_registry::batch::BatchValidator;
/// use card_registry::clock::FixedClock;
/// use card_registry::NewCard;
/// use chrono::NaiveDate;
///
/// let batch = BatchValidator::new(FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
/// let cards = vec![
///     NewCard::new("Maria Silva", "4532015112830366", "25/05/2004", "11144477735"),
///     NewCard::new("Jo", "4532015112830366", "25/05/2004", "11144477735"),
/// ];
///
/// let (valid, invalid) = batch.validate_partitioned(&cards);
/// assert_eq!(valid.len(), 1);
/// assert_eq!(invalid[0].0, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct BatchValidator<C> {
    clock: C,
}

impl<C: Clock> BatchValidator<C> {
    /// Creates a batch validator.
    #[inline]
    pub fn new(clock: C) -> Self {
        Self { clock }
    }

    /// Validates every submission and returns its errors, in input order.
    /// An empty entry means the submission is valid.
    pub fn validate_all(&self, cards: &[NewCard]) -> Vec<Vec<ValidationError>> {
        validate_batch(cards, &self.clock)
    }

    /// Validates a batch and partitions into normalized valid cards and
    /// `(index, errors)` pairs for the rest.
    pub fn validate_partitioned(
        &self,
        cards: &[NewCard],
    ) -> (Vec<ValidCard>, Vec<(usize, Vec<ValidationError>)>) {
        let mut valid = Vec::new();
        let mut invalid = Vec::new();

        for (i, card) in cards.iter().enumerate() {
            match validate_new_card(card, &self.clock) {
                Ok(c) => valid.push(c),
                Err(e) => invalid.push((i, e)),
            }
        }

        (valid, invalid)
    }

    /// Re-validates stored records.
    pub fn audit(&self, records: &[CardRecord]) -> AuditReport {
        audit_records(records, &self.clock)
    }

    /// Validates submissions in parallel using rayon.
    ///
    /// # Feature
    ///
    /// Requires the `parallel` feature to be enabled.
    #[cfg(feature = "parallel")]
    pub fn validate_parallel(&self, cards: &[NewCard]) -> Vec<Vec<ValidationError>> {
        validate_batch_parallel(cards, &self.clock)
    }

    /// Re-validates stored records in parallel.
    ///
    /// # Feature
    ///
    /// Requires the `parallel` feature to be enabled.
    #[cfg(feature = "parallel")]
    pub fn audit_parallel(&self, records: &[CardRecord]) -> AuditReport {
        audit_records_parallel(records, &self.clock)
    }
}

/// A stored record that failed re-validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditFailure {
    /// Record id.
    pub id: String,
    /// Masked card number, for display.
    pub card_number: String,
    /// Every rule the record now breaks.
    pub errors: Vec<ValidationError>,
}

/// Result of re-validating a set of records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct AuditReport {
    /// Number of records checked.
    pub checked: usize,
    /// Records that failed, in store order.
    pub failures: Vec<AuditFailure>,
}

impl AuditReport {
    /// Returns true if every record passed.
    #[inline]
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of records that passed.
    #[inline]
    pub fn passed(&self) -> usize {
        self.checked - self.failures.len()
    }
}

/// Validates a slice of submissions without creating a [`BatchValidator`].
#[inline]
pub fn validate_batch<C: Clock + ?Sized>(cards: &[NewCard], clock: &C) -> Vec<Vec<ValidationError>> {
    cards.iter().map(|c| validate_card(c, clock)).collect()
}

/// Validates a slice of submissions in parallel.
///
/// # Feature
///
/// Requires the `parallel` feature to be enabled.
#[cfg(feature = "parallel")]
#[inline]
pub fn validate_batch_parallel<C: Clock + ?Sized>(
    cards: &[NewCard],
    clock: &C,
) -> Vec<Vec<ValidationError>> {
    use rayon::prelude::*;
    cards.par_iter().map(|c| validate_card(c, clock)).collect()
}

/// Counts valid and invalid submissions.
///
/// # Returns
///
/// Tuple of (valid_count, invalid_count)
pub fn count_valid<C: Clock + ?Sized>(cards: &[NewCard], clock: &C) -> (usize, usize) {
    let valid = cards
        .iter()
        .filter(|c| validate_card(c, clock).is_empty())
        .count();
    (valid, cards.len() - valid)
}

/// Re-validates stored records against the current rules.
///
/// # Example
///
/// ```
/// use card_registry::batch::audit_records;
/// use card_registry::clock::FixedClock;
/// use chrono::NaiveDate;
///
/// let report = audit_records(&[], &FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()));
/// assert!(report.is_clean());
/// assert_eq!(report.checked, 0);
/// ```
pub fn audit_records<C: Clock + ?Sized>(records: &[CardRecord], clock: &C) -> AuditReport {
    let failures = records
        .iter()
        .filter_map(|r| audit_one(r, clock))
        .collect();

    AuditReport {
        checked: records.len(),
        failures,
    }
}

/// Re-validates stored records in parallel. Failures keep store order.
///
/// # Feature
///
/// Requires the `parallel` feature to be enabled.
#[cfg(feature = "parallel")]
pub fn audit_records_parallel<C: Clock + ?Sized>(records: &[CardRecord], clock: &C) -> AuditReport {
    use rayon::prelude::*;

    let failures = records
        .par_iter()
        .filter_map(|r| audit_one(r, clock))
        .collect();

    AuditReport {
        checked: records.len(),
        failures,
    }
}

fn audit_one<C: Clock + ?Sized>(record: &CardRecord, clock: &C) -> Option<AuditFailure> {
    let errors = validate_card(&record.to_new_card(), clock);
    if errors.is_empty() {
        return None;
    }

    tracing::warn!(
        id = record.id(),
        card = %record.masked_card_number(),
        errors = errors.len(),
        "stored card failed re-validation"
    );
    Some(AuditFailure {
        id: record.id().to_string(),
        card_number: record.masked_card_number(),
        errors,
    })
}
