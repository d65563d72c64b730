//! sled-backed document store.
//!
//! Each collection is a set of trees inside one sled database; documents are JSON objects
//! serialized with serde_json. The handle is cheap to clone and safe to share between threads.

pub mod collection;
pub mod filter;
pub mod id;

use std::path::Path;

use log::info;
use serde_json::{Map, Value};

pub use collection::{Collection, ID_FIELD};
pub use filter::{Condition, Filter, FindOptions, SortOrder};
pub use id::DocumentId;

use crate::error::{EldenDataError, EldenDataResult};

/// A stored document: a JSON object.
pub type Document = Map<String, Value>;

const COLLECTION_PREFIX: &str = "collection:";

#[derive(Clone)]
pub struct DocumentStore {
    db: sled::Db,
}

impl DocumentStore {
    /// Opens (or creates) the store at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> EldenDataResult<Self> {
        let path = path.as_ref();
        let db = sled::open(path).map_err(|e| {
            EldenDataError::store_unavailable(format!(
                "failed to open store at {}: {}",
                path.display(),
                e
            ))
        })?;
        info!("Opened document store at {}", path.display());
        Ok(Self { db })
    }

    /// Opens a store that is deleted when the last handle is dropped.
    pub fn open_temporary() -> EldenDataResult<Self> {
        let db = sled::Config::new()
            .temporary(true)
            .open()
            .map_err(|e| EldenDataError::store_unavailable(e.to_string()))?;
        Ok(Self { db })
    }

    pub fn collection(&self, name: &str) -> EldenDataResult<Collection> {
        if name.is_empty() || name.contains(':') {
            return Err(EldenDataError::bad_request(format!(
                "invalid collection name '{}'",
                name
            )));
        }
        Collection::open(&self.db, name)
    }

    /// Names of collections that currently hold documents.
    pub fn list_collections(&self) -> EldenDataResult<Vec<String>> {
        let mut names = Vec::new();
        for tree_name in self.db.tree_names() {
            let tree_name = String::from_utf8_lossy(&tree_name).into_owned();
            if let Some(name) = tree_name.strip_prefix(COLLECTION_PREFIX) {
                if !self.db.open_tree(&tree_name)?.is_empty() {
                    names.push(name.to_string());
                }
            }
        }
        names.sort();
        Ok(names)
    }

    /// Drops a collection. Returns false when it never existed.
    pub fn drop_collection(&self, name: &str) -> EldenDataResult<bool> {
        let tree_name = collection::docs_tree_name(name);
        let existed = self
            .db
            .tree_names()
            .iter()
            .any(|existing| existing.as_ref() == tree_name.as_bytes());
        self.collection(name)?.drop_all()?;
        Ok(existed)
    }

    /// Checks that the database answers.
    pub fn ping(&self) -> EldenDataResult<()> {
        self.db
            .size_on_disk()
            .map(|_| ())
            .map_err(|e| EldenDataError::store_unavailable(e.to_string()))
    }

    pub fn flush(&self) -> EldenDataResult<()> {
        self.db.flush()?;
        Ok(())
    }
}
