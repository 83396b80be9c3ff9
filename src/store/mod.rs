//! Card record persistence.
//!
//! Stores hold only [`CardRecord`]s, which can only be created from
//! validated input. Validation itself happens one layer up, in
//! [`CardRegistry`](crate::registry::CardRegistry).
//!
//! Two implementations ship with the crate:
//!
//! - [`MemoryStore`] - records in a `Vec` behind a lock, for tests and demos
//! - [`JsonFileStore`] - a single pretty-printed JSON array on disk
//!
//! # Example
//!
//! ```
//! use card_registry::store::{CardStore, MemoryStore};
//!
//! let store = MemoryStore::new();
//! assert!(store.is_empty().unwrap());
//! ```

mod json;
mod memory;

pub use json::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreError;
use crate::record::CardRecord;
use crate::validate::ValidUpdate;

/// Trait for card record storage backends.
///
/// Implementations serialize their own writes; callers may share one store
/// across threads.
pub trait CardStore: Send + Sync {
    /// Returns every record in insertion order.
    fn list(&self) -> Result<Vec<CardRecord>, StoreError>;

    /// Looks up a record by id.
    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError>;

    /// Appends a record.
    ///
    /// Fails with [`StoreError::DuplicateId`] if the id is already taken.
    fn insert(&self, record: CardRecord) -> Result<(), StoreError>;

    /// Applies a validated update and returns the new record, or `None` if
    /// no record has this id.
    fn update(&self, id: &str, update: &ValidUpdate) -> Result<Option<CardRecord>, StoreError>;

    /// Removes a record. Returns false if no record has this id.
    fn delete(&self, id: &str) -> Result<bool, StoreError>;

    /// Returns the number of stored records.
    fn len(&self) -> Result<usize, StoreError> {
        Ok(self.list()?.len())
    }

    /// Returns true if the store holds no records.
    fn is_empty(&self) -> Result<bool, StoreError> {
        Ok(self.len()? == 0)
    }
}

/// Shared logic for backends that keep the full record list in a `Vec`.
pub(crate) fn insert_into(records: &mut Vec<CardRecord>, record: CardRecord) -> Result<(), StoreError> {
    if records.iter().any(|r| r.id() == record.id()) {
        return Err(StoreError::DuplicateId(record.id().to_string()));
    }
    records.push(record);
    Ok(())
}

pub(crate) fn update_in(
    records: &mut [CardRecord],
    id: &str,
    update: &ValidUpdate,
) -> Option<CardRecord> {
    let record = records.iter_mut().find(|r| r.id() == id)?;
    record.apply(update);
    Some(record.clone())
}

pub(crate) fn delete_from(records: &mut Vec<CardRecord>, id: &str) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}
