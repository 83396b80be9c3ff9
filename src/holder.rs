//! Card holder name policy.

use crate::error::{Field, ValidationError};

/// Minimum number of characters in a trimmed holder name.
pub const MIN_HOLDER_NAME_CHARS: usize = 3;

/// Validates a holder name and returns it trimmed.
///
/// Letters from any script (including accented Latin letters) and whitespace
/// are allowed; digits and punctuation are not.
///
/// # Example
///
/// ```
/// use card_registry::holder::check_holder_name;
///
/// assert_eq!(check_holder_name("  João da Silva ").unwrap(), "João da Silva");
/// assert!(check_holder_name("Jo").is_err());
/// assert!(check_holder_name("R2-D2").is_err());
/// ```
pub fn check_holder_name(input: &str) -> Result<String, ValidationError> {
    let name = input.trim();

    if name.is_empty() {
        return Err(ValidationError::Missing(Field::HolderName));
    }

    let length = name.chars().count();
    if length < MIN_HOLDER_NAME_CHARS {
        return Err(ValidationError::HolderNameTooShort {
            length,
            minimum: MIN_HOLDER_NAME_CHARS,
        });
    }

    if let Some(character) = name
        .chars()
        .find(|c| !c.is_alphabetic() && !c.is_whitespace())
    {
        return Err(ValidationError::HolderNameInvalidCharacter { character });
    }

    Ok(name.to_string())
}

/// Returns true if `input` is an acceptable holder name.
#[inline]
pub fn is_valid_holder_name(input: &str) -> bool {
    check_holder_name(input).is_ok()
}
