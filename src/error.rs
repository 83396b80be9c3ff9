//! Rich error types for card record validation and storage.
//!
//! Validation never fails fast: every field check produces its own
//! [`ValidationError`] and callers collect them, so a submission can be
//! corrected in one round trip.

use serde::Serialize;
use std::fmt;

/// The card record field an error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum Field {
    /// Card holder's name.
    HolderName,
    /// Payment card number.
    CardNumber,
    /// Holder's birth date.
    BirthDate,
    /// Holder's CPF.
    Cpf,
}

impl Field {
    /// Returns the JSON key used for this field.
    pub const fn key(&self) -> &'static str {
        match self {
            Self::HolderName => "holderName",
            Self::CardNumber => "cardNumber",
            Self::BirthDate => "birthDate",
            Self::Cpf => "cpf",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Broad category of a validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    /// Required field absent or blank.
    Missing,
    /// Input does not have the expected shape.
    Format,
    /// Input is well formed but its check digits are wrong.
    Checksum,
    /// Input is well formed but outside the accepted policy range.
    Range,
}

/// Errors produced by the field validators.
///
/// Each variant names the offending field through [`ValidationError::field`]
/// and its category through [`ValidationError::kind`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A required field was absent or contained only whitespace.
    Missing(Field),

    /// Holder name has fewer than three characters after trimming.
    HolderNameTooShort {
        /// Number of characters provided.
        length: usize,
        /// Minimum accepted (3).
        minimum: usize,
    },

    /// Holder name contains something other than letters and spaces.
    HolderNameInvalidCharacter {
        /// The offending character.
        character: char,
    },

    /// Card number contains a character that is neither a digit nor whitespace.
    CardNumberInvalidCharacter {
        /// Position in the whitespace-stripped input (0-indexed, in characters).
        position: usize,
        /// The offending character.
        character: char,
    },

    /// Card number has a digit count outside 13..=19.
    CardNumberLength {
        /// Digits provided.
        length: usize,
        /// Minimum accepted.
        minimum: usize,
        /// Maximum accepted.
        maximum: usize,
    },

    /// Card number failed the Luhn check.
    CardNumberChecksum,

    /// CPF does not contain exactly eleven digits.
    CpfLength {
        /// Digits found after stripping separators.
        length: usize,
    },

    /// CPF is a single digit repeated eleven times.
    CpfRepeatedDigits,

    /// CPF check digits do not match.
    CpfChecksum,

    /// Birth date is not written as `DD/MM/YYYY`.
    BirthDateFormat,

    /// Birth date has the right shape but is not a real calendar date.
    BirthDateNotACalendarDate {
        /// Parsed day.
        day: u32,
        /// Parsed month.
        month: u32,
        /// Parsed year.
        year: i32,
    },

    /// Birth date is after the reference date.
    BirthDateInFuture,

    /// Holder is younger than the minimum age.
    Underage {
        /// Minimum age in years.
        minimum_age: u32,
    },

    /// Holder is older than the maximum plausible age.
    TooOld {
        /// Maximum age in years.
        maximum_age: u32,
    },
}

impl ValidationError {
    /// Returns the field this error belongs to.
    pub const fn field(&self) -> Field {
        match self {
            Self::Missing(field) => *field,
            Self::HolderNameTooShort { .. } | Self::HolderNameInvalidCharacter { .. } => {
                Field::HolderName
            }
            Self::CardNumberInvalidCharacter { .. }
            | Self::CardNumberLength { .. }
            | Self::CardNumberChecksum => Field::CardNumber,
            Self::CpfLength { .. } | Self::CpfRepeatedDigits | Self::CpfChecksum => Field::Cpf,
            Self::BirthDateFormat
            | Self::BirthDateNotACalendarDate { .. }
            | Self::BirthDateInFuture
            | Self::Underage { .. }
            | Self::TooOld { .. } => Field::BirthDate,
        }
    }

    /// Returns the failure category.
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Missing(_) => ErrorKind::Missing,
            Self::HolderNameTooShort { .. }
            | Self::HolderNameInvalidCharacter { .. }
            | Self::CardNumberInvalidCharacter { .. }
            | Self::CardNumberLength { .. }
            | Self::CpfLength { .. }
            | Self::BirthDateFormat
            | Self::BirthDateNotACalendarDate { .. } => ErrorKind::Format,
            Self::CardNumberChecksum | Self::CpfRepeatedDigits | Self::CpfChecksum => {
                ErrorKind::Checksum
            }
            Self::BirthDateInFuture | Self::Underage { .. } | Self::TooOld { .. } => {
                ErrorKind::Range
            }
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Missing(field) => match field {
                Field::HolderName => write!(f, "holder name is required"),
                Field::CardNumber => write!(f, "card number is required"),
                Field::BirthDate => write!(f, "birth date is required"),
                Field::Cpf => write!(f, "CPF is required"),
            },

            Self::HolderNameTooShort { length, minimum } => {
                write!(
                    f,
                    "holder name must have at least {} characters, got {}",
                    minimum, length
                )
            }

            Self::HolderNameInvalidCharacter { character } => {
                write!(
                    f,
                    "holder name must contain only letters and spaces (found '{}')",
                    character.escape_default()
                )
            }

            Self::CardNumberInvalidCharacter {
                position,
                character,
            } => {
                write!(
                    f,
                    "invalid character '{}' at position {} in card number (only digits and spaces allowed)",
                    character.escape_default(),
                    position
                )
            }

            Self::CardNumberLength {
                length,
                minimum,
                maximum,
            } => {
                write!(
                    f,
                    "card number must have {} to {} digits, got {}",
                    minimum, maximum, length
                )
            }

            Self::CardNumberChecksum => {
                write!(f, "invalid card number (Luhn check failed) - please verify the digits")
            }

            Self::CpfLength { length } => {
                write!(f, "CPF must have 11 digits, got {}", length)
            }

            Self::CpfRepeatedDigits => {
                write!(f, "invalid CPF (repeated digit sequence)")
            }

            Self::CpfChecksum => write!(f, "invalid CPF (check digits do not match)"),

            Self::BirthDateFormat => {
                write!(f, "birth date must be written as DD/MM/YYYY")
            }

            Self::BirthDateNotACalendarDate { day, month, year } => {
                write!(
                    f,
                    "birth date {:02}/{:02}/{:04} does not exist",
                    day, month, year
                )
            }

            Self::BirthDateInFuture => write!(f, "birth date cannot be in the future"),

            Self::Underage { minimum_age } => {
                write!(f, "card holder must be at least {} years old", minimum_age)
            }

            Self::TooOld { maximum_age } => {
                write!(f, "birth date implies an age above {} years", maximum_age)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl Serialize for ValidationError {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::SerializeStruct;

        let mut state = serializer.serialize_struct("ValidationError", 3)?;
        state.serialize_field("field", &self.field())?;
        state.serialize_field("kind", &self.kind())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Errors raised by a [`CardStore`](crate::store::CardStore) backend.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the backing file failed.
    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing file does not contain a valid record array.
    #[error("corrupt card data: {0}")]
    Json(#[from] serde_json::Error),

    /// A thread panicked while holding the store lock.
    #[error("card store lock poisoned")]
    Poisoned,

    /// Attempted to insert a record whose id is already present.
    #[error("duplicate card id {0}")]
    DuplicateId(String),
}
