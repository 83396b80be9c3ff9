//! In-memory card store.

use std::sync::RwLock;

use super::{delete_from, insert_into, update_in, CardStore};
use crate::error::StoreError;
use crate::record::CardRecord;
use crate::validate::ValidUpdate;

/// Card store that keeps records in memory only.
///
/// Contents are lost when the store is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<CardRecord>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-filled with records.
    pub fn with_records(records: Vec<CardRecord>) -> Self {
        Self {
            records: RwLock::new(records),
        }
    }
}

impl CardStore for MemoryStore {
    fn list(&self) -> Result<Vec<CardRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.clone())
    }

    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.iter().find(|r| r.id() == id).cloned())
    }

    fn insert(&self, record: CardRecord) -> Result<(), StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        insert_into(&mut records, record)
    }

    fn update(&self, id: &str, update: &ValidUpdate) -> Result<Option<CardRecord>, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(update_in(&mut records, id, update))
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        let mut records = self.records.write().map_err(|_| StoreError::Poisoned)?;
        Ok(delete_from(&mut records, id))
    }

    fn len(&self) -> Result<usize, StoreError> {
        let records = self.records.read().map_err(|_| StoreError::Poisoned)?;
        Ok(records.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FixedClock;
    use crate::record::{CardUpdate, NewCard};
    use crate::validate::{validate_new_card, validate_update};
    use chrono::{NaiveDate, Utc};

    fn clock() -> FixedClock {
        FixedClock(NaiveDate::from_ymd_opt(2024, 6, 15).unwrap())
    }

    fn record(name: &str) -> CardRecord {
        let card = validate_new_card(
            &NewCard::new(name, "4532015112830366", "25/05/2004", "11144477735"),
            &clock(),
        )
        .unwrap();
        CardRecord::create(&card, Utc::now())
    }

    #[test]
    fn test_insert_and_get() {
        let store = MemoryStore::new();
        let record = record("Maria Silva");
        let id = record.id().to_string();

        store.insert(record).unwrap();

        assert_eq!(store.len().unwrap(), 1);
        assert_eq!(store.get(&id).unwrap().unwrap().holder_name(), "Maria Silva");
        assert!(store.get("missing").unwrap().is_none());
    }

    #[test]
    fn test_list_preserves_order() {
        let store = MemoryStore::new();
        store.insert(record("Ana Clara")).unwrap();
        store.insert(record("Bruno Lima")).unwrap();

        let names: Vec<String> = store
            .list()
            .unwrap()
            .iter()
            .map(|r| r.holder_name().to_string())
            .collect();
        assert_eq!(names, vec!["Ana Clara", "Bruno Lima"]);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        let record = record("Maria Silva");
        store.insert(record.clone()).unwrap();
        assert!(matches!(
            store.insert(record),
            Err(StoreError::DuplicateId(_))
        ));
    }

    #[test]
    fn test_update() {
        let store = MemoryStore::new();
        let record = record("Maria Silva");
        let id = record.id().to_string();
        store.insert(record).unwrap();

        let update = validate_update(
            &CardUpdate {
                holder_name: Some("Maria Souza".into()),
                ..Default::default()
            },
            &clock(),
        )
        .unwrap();

        let updated = store.update(&id, &update).unwrap().unwrap();
        assert_eq!(updated.holder_name(), "Maria Souza");
        assert_eq!(store.get(&id).unwrap().unwrap().holder_name(), "Maria Souza");
        assert!(store.update("missing", &update).unwrap().is_none());
    }

    #[test]
    fn test_delete() {
        let store = MemoryStore::new();
        let record = record("Maria Silva");
        let id = record.id().to_string();
        store.insert(record).unwrap();

        assert!(store.delete(&id).unwrap());
        assert!(!store.delete(&id).unwrap());
        assert!(store.is_empty().unwrap());
    }
}
