//! JSON file card store.
//!
//! All records live in one file as a pretty-printed JSON array:
//!
//! ```json
//! [
//!   {
//!     "id": "6a1f…",
//!     "holderName": "Maria Silva",
//!     "cardNumber": "4532015112830366",
//!     "birthDate": "25/05/2004",
//!     "cpf": "11144477735",
//!     "createdAt": "2024-06-15T12:00:00Z"
//!   }
//! ]
//! ```
//!
//! The file is re-read on every operation, so edits made by another process
//! between calls (the CLI and the server sharing a file, say) are picked up.
//! Writes go to a uniquely named sibling temp file, synced to disk, then
//! renamed over the original, so readers only ever see a complete file.
//!
//! The lock below only serializes handles within one process. Two processes
//! writing at the same moment do not corrupt the file, but the later rename
//! wins and the other write is lost.

use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use tempfile::NamedTempFile;

use super::{delete_from, insert_into, update_in, CardStore};
use crate::error::StoreError;
use crate::record::CardRecord;
use crate::validate::ValidUpdate;

/// Card store backed by a JSON file.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    // Readers share the file; read-modify-write cycles are exclusive.
    lock: RwLock<()>,
}

impl JsonFileStore {
    /// Opens a store at `path`, creating the file (and its parent
    /// directories) with an empty array if it does not exist.
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// use card_registry::store::JsonFileStore;
    ///
    /// let store = JsonFileStore::open("data/cards.json")?;
    /// ```
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, StoreError> {
        let store = Self {
            path: path.as_ref().to_path_buf(),
            lock: RwLock::new(()),
        };
        store.ensure_file()?;
        Ok(store)
    }

    /// Path of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn ensure_file(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            return Ok(());
        }

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        tracing::info!(path = %self.path.display(), "creating empty card data file");
        self.write_records(&[])
    }

    fn read_records(&self) -> Result<Vec<CardRecord>, StoreError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        if content.trim().is_empty() {
            return Ok(Vec::new());
        }

        Ok(serde_json::from_str(&content)?)
    }

    fn write_records(&self, records: &[CardRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string_pretty(records)?;
        let parent = match self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            Some(parent) => parent,
            None => Path::new("."),
        };

        // Unique temp name per write, so concurrent writers never share one.
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(json.as_bytes())?;
        tmp.as_file().sync_all()?;
        tmp.persist(&self.path).map_err(|e| e.error)?;

        if let Ok(dir) = fs::File::open(parent) {
            let _ = dir.sync_all();
        }

        tracing::debug!(path = %self.path.display(), count = records.len(), "card data written");
        Ok(())
    }

    /// Runs a read-modify-write cycle under the write lock.
    fn modify<T>(
        &self,
        f: impl FnOnce(&mut Vec<CardRecord>) -> Result<(T, bool), StoreError>,
    ) -> Result<T, StoreError> {
        let _guard = self.lock.write().map_err(|_| StoreError::Poisoned)?;
        let mut records = self.read_records()?;
        let (value, changed) = f(&mut records)?;
        if changed {
            self.write_records(&records)?;
        }
        Ok(value)
    }
}

impl CardStore for JsonFileStore {
    fn list(&self) -> Result<Vec<CardRecord>, StoreError> {
        let _guard = self.lock.read().map_err(|_| StoreError::Poisoned)?;
        self.read_records()
    }

    fn get(&self, id: &str) -> Result<Option<CardRecord>, StoreError> {
        Ok(self.list()?.into_iter().find(|r| r.id() == id))
    }

    fn insert(&self, record: CardRecord) -> Result<(), StoreError> {
        self.modify(|records| insert_into(records, record).map(|()| ((), true)))
    }

    fn update(&self, id: &str, update: &ValidUpdate) -> Result<Option<CardRecord>, StoreError> {
        self.modify(|records| {
            let updated = update_in(records, id, update);
            let changed = updated.is_some();
            Ok((updated, changed))
        })
    }

    fn delete(&self, id: &str) -> Result<bool, StoreError> {
        self.modify(|records| {
            let deleted = delete_from(records, id);
            Ok((deleted, deleted))
        })
    }
}
