//! Validate-then-store card service.
//!
//! [`CardRegistry`] is the only write path into a [`CardStore`]: every create
//! and update runs the full validation pipeline first, and nothing is stored
//! unless all supplied fields pass.
//!
//! # Example
//!
//! ```
//! use card_registry::registry::CardRegistry;
//! use card_registry::store::MemoryStore;
//! use card_registry::clock::FixedClock;
//! use card_registry::NewCard;
//! use chrono::NaiveDate;
//!
//! let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
//! let registry = CardRegistry::with_clock(MemoryStore::new(), clock);
//!
//! let card = registry
//!     .create(&NewCard::new("Maria Silva", "4532 0151 1283 0366", "25/05/2004", "111.444.777-35"))
//!     .unwrap();
//! assert_eq!(card.card_number(), "4532015112830366");
//! assert_eq!(registry.list().unwrap().len(), 1);
//! ```

use std::fmt;
use std::sync::Arc;

use chrono::Utc;

use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, ValidationError};
use crate::record::{CardRecord, CardUpdate, NewCard};
use crate::store::CardStore;
use crate::validate::{validate_card, validate_new_card, validate_update};

/// Errors returned by [`CardRegistry`] operations.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// One or more fields failed validation. Nothing was stored.
    #[error("{} validation error(s)", .0.len())]
    Invalid(Vec<ValidationError>),

    /// No record has the given id.
    #[error("card {0} not found")]
    NotFound(String),

    /// The backing store failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Card service combining a store with the validation pipeline.
///
/// Cheap to clone; clones share the same store and clock.
#[derive(Clone)]
pub struct CardRegistry {
    store: Arc<dyn CardStore>,
    clock: Arc<dyn Clock>,
}

impl CardRegistry {
    /// Creates a registry that measures ages against the system date.
    pub fn new<S: CardStore + 'static>(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }

    /// Creates a registry with an explicit reference-date source.
    pub fn with_clock<S, C>(store: S, clock: C) -> Self
    where
        S: CardStore + 'static,
        C: Clock + 'static,
    {
        Self {
            store: Arc::new(store),
            clock: Arc::new(clock),
        }
    }

    /// Creates a registry from already shared parts.
    pub fn from_parts(store: Arc<dyn CardStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// The reference-date source used for age checks.
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    /// Returns every stored record.
    pub fn list(&self) -> Result<Vec<CardRecord>, RegistryError> {
        Ok(self.store.list()?)
    }

    /// Looks up a record by id.
    pub fn get(&self, id: &str) -> Result<CardRecord, RegistryError> {
        self.store
            .get(id)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))
    }

    /// Validates a submission without storing it.
    pub fn check(&self, card: &NewCard) -> Vec<ValidationError> {
        validate_card(card, self.clock.as_ref())
    }

    /// Validates and stores a new card.
    ///
    /// # Errors
    ///
    /// [`RegistryError::Invalid`] with every failing field, or
    /// [`RegistryError::Store`] if the write fails.
    pub fn create(&self, card: &NewCard) -> Result<CardRecord, RegistryError> {
        let valid = validate_new_card(card, self.clock.as_ref()).map_err(|errors| {
            tracing::debug!(errors = errors.len(), "card rejected");
            RegistryError::Invalid(errors)
        })?;

        let record = CardRecord::create(&valid, Utc::now());
        self.store.insert(record.clone())?;

        tracing::info!(
            id = record.id(),
            card = %record.masked_card_number(),
            "card created"
        );
        Ok(record)
    }

    /// Re-validates the supplied fields and applies them to a stored record.
    ///
    /// Validation runs before the lookup, so an invalid update for an unknown
    /// id reports the validation errors.
    pub fn update(&self, id: &str, update: &CardUpdate) -> Result<CardRecord, RegistryError> {
        let valid = validate_update(update, self.clock.as_ref()).map_err(RegistryError::Invalid)?;

        let record = self
            .store
            .update(id, &valid)?
            .ok_or_else(|| RegistryError::NotFound(id.to_string()))?;

        tracing::info!(id, card = %record.masked_card_number(), "card updated");
        Ok(record)
    }

    /// Deletes a record.
    pub fn delete(&self, id: &str) -> Result<(), RegistryError> {
        if !self.store.delete(id)? {
            return Err(RegistryError::NotFound(id.to_string()));
        }
        tracing::info!(id, "card deleted");
        Ok(())
    }
}

impl fmt::Debug for CardRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CardRegistry")
            .field("today", &self.clock.today())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::error::Field;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;

    fn registry() -> CardRegistry {
        let clock = FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap());
        CardRegistry::with_clock(MemoryStore::new(), clock)
    }

    fn maria() -> NewCard {
        NewCard::new("Maria Silva", "4532 0151 1283 0366", "25/05/2004", "111.444.777-35")
    }

    #[test]
    fn test_create_and_get() {
        let registry = registry();
        let created = registry.create(&maria()).unwrap();

        let fetched = registry.get(created.id()).unwrap();
        assert_eq!(fetched, created);
        assert_eq!(fetched.cpf(), "11144477735");
    }

    #[test]
    fn test_invalid_create_stores_nothing() {
        let registry = registry();
        let mut card = maria();
        card.card_number = "1234567890123".into();
        card.cpf = "11111111111".into();

        match registry.create(&card) {
            Err(RegistryError::Invalid(errors)) => {
                let fields: Vec<Field> = errors.iter().map(|e| e.field()).collect();
                assert_eq!(fields, vec![Field::CardNumber, Field::Cpf]);
            }
            other => panic!("expected validation errors, got {other:?}"),
        }
        assert!(registry.list().unwrap().is_empty());
    }

    #[test]
    fn test_update_revalidates_supplied_fields_only() {
        let registry = registry();
        let created = registry.create(&maria()).unwrap();

        let updated = registry
            .update(
                created.id(),
                &CardUpdate {
                    holder_name: Some("Maria Souza".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(updated.holder_name(), "Maria Souza");
        assert_eq!(updated.card_number(), created.card_number());
        assert_eq!(updated.created_at(), created.created_at());

        let err = registry
            .update(
                created.id(),
                &CardUpdate {
                    cpf: Some("11144477736".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::Invalid(ref e) if e.len() == 1));
        assert_eq!(registry.get(created.id()).unwrap().cpf(), "11144477735");
    }

    #[test]
    fn test_update_unknown_id() {
        let registry = registry();
        let err = registry
            .update(
                "nope",
                &CardUpdate {
                    holder_name: Some("Ana Lima".into()),
                    ..Default::default()
                },
            )
            .unwrap_err();
        assert!(matches!(err, RegistryError::NotFound(id) if id == "nope"));
    }

    #[test]
    fn test_delete() {
        let registry = registry();
        let created = registry.create(&maria()).unwrap();

        registry.delete(created.id()).unwrap();
        assert!(matches!(
            registry.delete(created.id()),
            Err(RegistryError::NotFound(_))
        ));
        assert!(matches!(
            registry.get(created.id()),
            Err(RegistryError::NotFound(_))
        ));
    }

    #[test]
    fn test_check_is_dry_run() {
        let registry = registry();
        assert!(registry.check(&maria()).is_empty());
        assert!(registry.list().unwrap().is_empty());
    }
}
