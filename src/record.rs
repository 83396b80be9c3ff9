//! Card record data model.
//!
//! [`NewCard`] and [`CardUpdate`] are what clients submit. [`CardRecord`] is
//! what the store holds; it can only be built from a
//! [`ValidCard`](crate::validate::ValidCard), so every stored record has
//! passed validation.
//!
//! All three types print masked card numbers and CPFs in their `Debug`
//! output, and [`CardRecord`] wipes its text fields when dropped.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::mask::{mask_card_number, mask_cpf};
use crate::validate::{ValidCard, ValidUpdate};

/// A stored, validated card record.
///
/// Serialized with camelCase keys:
///
/// ```json
/// {
///   "id": "5f0c…",
///   "holderName": "Maria Silva",
///   "cardNumber": "4532015112830366",
///   "birthDate": "25/05/2004",
///   "cpf": "11144477735",
///   "createdAt": "2024-06-15T12:00:00Z"
/// }
/// ```
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize, Zeroize, ZeroizeOnDrop)]
#[serde(rename_all = "camelCase")]
pub struct CardRecord {
    #[zeroize(skip)]
    id: String,
    holder_name: String,
    card_number: String,
    birth_date: String,
    cpf: String,
    #[zeroize(skip)]
    created_at: DateTime<Utc>,
}

impl CardRecord {
    /// Builds a new record with a fresh id and creation timestamp.
    pub fn create(card: &ValidCard, created_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            holder_name: card.holder_name.clone(),
            card_number: card.card_number.clone(),
            birth_date: card.birth_date.clone(),
            cpf: card.cpf.clone(),
            created_at,
        }
    }

    /// Applies a validated partial update; `id` and `created_at` never change.
    pub fn apply(&mut self, update: &ValidUpdate) {
        if let Some(holder_name) = &update.holder_name {
            self.holder_name.clone_from(holder_name);
        }
        if let Some(card_number) = &update.card_number {
            self.card_number.clone_from(card_number);
        }
        if let Some(birth_date) = &update.birth_date {
            self.birth_date.clone_from(birth_date);
        }
        if let Some(cpf) = &update.cpf {
            self.cpf.clone_from(cpf);
        }
    }

    /// Unique record identifier.
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Trimmed holder name.
    #[inline]
    pub fn holder_name(&self) -> &str {
        &self.holder_name
    }

    /// Card number, digits only.
    #[inline]
    pub fn card_number(&self) -> &str {
        &self.card_number
    }

    /// Birth date as `DD/MM/YYYY`.
    #[inline]
    pub fn birth_date(&self) -> &str {
        &self.birth_date
    }

    /// CPF, digits only.
    #[inline]
    pub fn cpf(&self) -> &str {
        &self.cpf
    }

    /// When the record was created.
    #[inline]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Card number masked for display.
    pub fn masked_card_number(&self) -> String {
        mask_card_number(&self.card_number)
    }

    /// Converts back into a submission, e.g. to re-run validation on stored data.
    pub fn to_new_card(&self) -> NewCard {
        NewCard {
            holder_name: self.holder_name.clone(),
            card_number: self.card_number.clone(),
            birth_date: self.birth_date.clone(),
            cpf: self.cpf.clone(),
        }
    }
}

impl fmt::Debug for CardRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRecord")
            .field("id", &self.id)
            .field("holder_name", &self.holder_name)
            .field("card_number", &mask_card_number(&self.card_number))
            .field("birth_date", &"**/**/****")
            .field("cpf", &mask_cpf(&self.cpf))
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// A create request. Absent fields deserialize as empty strings and are
/// reported as missing by validation.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct NewCard {
    /// Holder name as typed.
    pub holder_name: String,
    /// Card number, possibly masked with spaces.
    pub card_number: String,
    /// Birth date as `DD/MM/YYYY`.
    pub birth_date: String,
    /// CPF, possibly masked.
    pub cpf: String,
}

impl NewCard {
    /// Convenience constructor.
    pub fn new(
        holder_name: impl Into<String>,
        card_number: impl Into<String>,
        birth_date: impl Into<String>,
        cpf: impl Into<String>,
    ) -> Self {
        Self {
            holder_name: holder_name.into(),
            card_number: card_number.into(),
            birth_date: birth_date.into(),
            cpf: cpf.into(),
        }
    }
}

impl fmt::Debug for NewCard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewCard")
            .field("holder_name", &self.holder_name)
            .field("card_number", &mask_card_number(&self.card_number))
            .field("birth_date", &"**/**/****")
            .field("cpf", &mask_cpf(&self.cpf))
            .finish()
    }
}

/// A partial update. Only the fields present are validated and changed.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "server", derive(utoipa::ToSchema))]
#[serde(rename_all = "camelCase", default)]
pub struct CardUpdate {
    /// New holder name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub holder_name: Option<String>,
    /// New card number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card_number: Option<String>,
    /// New birth date.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub birth_date: Option<String>,
    /// New CPF.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cpf: Option<String>,
}

impl CardUpdate {
    /// Returns true if no field is set.
    pub fn is_empty(&self) -> bool {
        self.holder_name.is_none()
            && self.card_number.is_none()
            && self.birth_date.is_none()
            && self.cpf.is_none()
    }
}

impl fmt::Debug for CardUpdate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardUpdate")
            .field("holder_name", &self.holder_name)
            .field(
                "card_number",
                &self.card_number.as_deref().map(mask_card_number),
            )
            .field("birth_date", &self.birth_date.as_ref().map(|_| "**/**/****"))
            .field("cpf", &self.cpf.as_deref().map(mask_cpf))
            .finish()
    }
}
