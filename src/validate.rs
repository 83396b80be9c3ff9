//! Validation orchestration for card submissions.
//!
//! Runs the holder-name rule and the card number, birth date and CPF
//! validators independently and reports every failure together, in field
//! order (holder name, card number, birth date, CPF). A submission that
//! passes is returned normalized:
//!
//! - holder name trimmed
//! - card number with whitespace removed
//! - CPF reduced to its eleven digits
//!
//! # Example
//!
//! ```
//! use card_registry::{validate_card, NewCard, Field};
//! use card_registry::clock::FixedClock;
//! use chrono::NaiveDate;
//!
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//! let card = NewCard::new("Maria Silva", "1234 5678 9012 3456", "25/05/2004", "11144477736");
//!
//! let errors = validate_card(&card, &clock);
//! let fields: Vec<Field> = errors.iter().map(|e| e.field()).collect();
//! assert_eq!(fields, vec![Field::CardNumber, Field::Cpf]);
//! ```

use crate::birth_date::{format_birth_date, parse_birth_date};
use crate::clock::Clock;
use crate::cpf::check_cpf;
use crate::error::ValidationError;
use crate::holder::check_holder_name;
use crate::luhn::check_card_number;
use crate::record::{CardUpdate, NewCard};

/// A submission that passed every check, in normalized form.
///
/// Only [`validate_new_card`] constructs this type.
#[derive(Clone, PartialEq, Eq)]
pub struct ValidCard {
    pub(crate) holder_name: String,
    pub(crate) card_number: String,
    pub(crate) birth_date: String,
    pub(crate) cpf: String,
}

impl ValidCard {
    /// Trimmed holder name.
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Card number, digits only.
    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    /// Birth date as `DD/MM/YYYY`.
    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    /// CPF, digits only.
    pub fn cpf(&self) -> &str {
        &self.cpf
    }
}

impl std::fmt::Debug for ValidCard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidCard")
            .field("holder_name", &self.holder_name)
            .field("card_number", &crate::mask::mask_card_number(&self.card_number))
            .field("cpf", &crate::mask::mask_cpf(&self.cpf))
            .finish_non_exhaustive()
    }
}

/// A partial update whose supplied fields all passed validation.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ValidUpdate {
    pub(crate) holder_name: Option<String>,
    pub(crate) card_number: Option<String>,
    pub(crate) birth_date: Option<String>,
    pub(crate) cpf: Option<String>,
}

impl ValidUpdate {
    /// Returns true if the update changes nothing.
    pub fn is_empty(&self) -> bool {
        self.holder_name.is_none()
            && self.card_number.is_none()
            && self.birth_date.is_none()
            && self.cpf.is_none()
    }
}

impl std::fmt::Debug for ValidUpdate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ValidUpdate")
            .field("holder_name", &self.holder_name)
            .field(
                "card_number",
                &self.card_number.as_deref().map(crate::mask::mask_card_number),
            )
            .field("birth_date", &self.birth_date.as_ref().map(|_| "**/**/****"))
            .field("cpf", &self.cpf.as_deref().map(crate::mask::mask_cpf))
            .finish()
    }
}

/// Validates a submission and returns every error found (empty means valid).
pub fn validate_card<C: Clock + ?Sized>(card: &NewCard, clock: &C) -> Vec<ValidationError> {
    match validate_new_card(card, clock) {
        Ok(_) => Vec::new(),
        Err(errors) => errors,
    }
}

/// Quickly checks whether a submission is valid.
#[inline]
pub fn is_valid_card<C: Clock + ?Sized>(card: &NewCard, clock: &C) -> bool {
    validate_new_card(card, clock).is_ok()
}

/// Validates a submission and returns its normalized form.
///
/// # Errors
///
/// Returns all field errors, never just the first.
pub fn validate_new_card<C: Clock + ?Sized>(
    card: &NewCard,
    clock: &C,
) -> Result<ValidCard, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let holder_name = collect(check_holder_name(&card.holder_name), &mut errors);
    let card_number = collect(check_card_number(&card.card_number), &mut errors);
    let birth_date = collect(
        parse_birth_date(&card.birth_date, clock).map(format_birth_date),
        &mut errors,
    );
    let cpf = collect(check_cpf(&card.cpf), &mut errors);

    match (holder_name, card_number, birth_date, cpf) {
        (Some(holder_name), Some(card_number), Some(birth_date), Some(cpf)) => Ok(ValidCard {
            holder_name,
            card_number,
            birth_date,
            cpf,
        }),
        _ => Err(errors),
    }
}

/// Validates only the fields present in `update`.
///
/// A field that is present but blank is reported as missing rather than
/// silently clearing the stored value.
///
/// # Errors
///
/// Returns all field errors found among the supplied fields.
pub fn validate_update<C: Clock + ?Sized>(
    update: &CardUpdate,
    clock: &C,
) -> Result<ValidUpdate, Vec<ValidationError>> {
    let mut errors = Vec::new();

    let holder_name = update
        .holder_name
        .as_deref()
        .and_then(|v| collect(check_holder_name(v), &mut errors));
    let card_number = update
        .card_number
        .as_deref()
        .and_then(|v| collect(check_card_number(v), &mut errors));
    let birth_date = update.birth_date.as_deref().and_then(|v| {
        collect(
            parse_birth_date(v, clock).map(format_birth_date),
            &mut errors,
        )
    });
    let cpf = update
        .cpf
        .as_deref()
        .and_then(|v| collect(check_cpf(v), &mut errors));

    if !errors.is_empty() {
        return Err(errors);
    }

    Ok(ValidUpdate {
        holder_name,
        card_number,
        birth_date,
        cpf,
    })
}

fn collect<T>(result: Result<T, ValidationError>, errors: &mut Vec<ValidationError>) -> Option<T> {
    match result {
        Ok(value) => Some(value),
        Err(e) => {
            errors.push(e);
            None
        }
    }
}
