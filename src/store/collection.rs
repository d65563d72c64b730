use log::debug;
use serde_json::Value;

use super::filter::{compare_at, Filter, FindOptions, SortOrder};
use super::id::DocumentId;
use super::Document;
use crate::error::{EldenDataError, EldenDataResult};

/// Field under which the store keeps a document's identifier.
pub const ID_FIELD: &str = "_id";

const INDEX_SEPARATOR: u8 = 0;

/// A named set of JSON documents backed by sled trees.
///
/// Documents live in `collection:<name>` keyed by an insertion sequence number, so a plain scan
/// returns them in insertion order. `ids:<name>` maps identifiers to sequence keys and
/// `index:<name>:<field>` trees hold secondary indexes listed in `indexes:<name>`.
#[derive(Clone)]
pub struct Collection {
    name: String,
    db: sled::Db,
    docs: sled::Tree,
    ids: sled::Tree,
    indexes: sled::Tree,
}

impl Collection {
    pub(super) fn open(db: &sled::Db, name: &str) -> EldenDataResult<Self> {
        Ok(Self {
            name: name.to_string(),
            db: db.clone(),
            docs: db.open_tree(docs_tree_name(name))?,
            ids: db.open_tree(ids_tree_name(name))?,
            indexes: db.open_tree(indexes_tree_name(name))?,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.docs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.docs.is_empty()
    }

    /// Inserts a document under a fresh identifier, replacing any `_id` it carried.
    pub fn insert_one(&self, mut doc: Document) -> EldenDataResult<DocumentId> {
        let id = DocumentId::new();
        let seq = self.db.generate_id()?.to_be_bytes();
        doc.insert(ID_FIELD.to_string(), Value::String(id.to_string()));

        let bytes = serde_json::to_vec(&doc)?;
        self.docs.insert(seq, bytes)?;
        self.ids.insert(id.as_bytes(), &seq[..])?;
        self.index_document(&id, &doc)?;
        Ok(id)
    }

    pub fn insert_many(&self, docs: Vec<Document>) -> EldenDataResult<Vec<DocumentId>> {
        let ids = docs
            .into_iter()
            .map(|doc| self.insert_one(doc))
            .collect::<EldenDataResult<Vec<_>>>()?;
        self.docs.flush()?;
        Ok(ids)
    }

    pub fn find_by_id(&self, id: &DocumentId) -> EldenDataResult<Option<Document>> {
        let Some(seq) = self.ids.get(id.as_bytes())? else {
            return Ok(None);
        };
        match self.docs.get(seq)? {
            Some(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// All documents in insertion order.
    pub fn scan(&self) -> impl Iterator<Item = EldenDataResult<Document>> + '_ {
        self.docs.iter().values().map(|entry| {
            let bytes = entry?;
            Ok(serde_json::from_slice::<Document>(&bytes)?)
        })
    }

    pub fn find(&self, filter: &Filter, options: &FindOptions) -> EldenDataResult<Vec<Document>> {
        let mut matched = Vec::new();
        for doc in self.scan() {
            let doc = doc?;
            if filter.matches(&doc) {
                matched.push(doc);
            }
        }

        if let Some(path) = options.sort_by.as_deref().filter(|p| *p != ID_FIELD) {
            matched.sort_by(|a, b| compare_at(a, b, path));
        }
        if options.sort_order == SortOrder::Descending {
            matched.reverse();
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        Ok(matched.into_iter().skip(options.skip).take(limit).collect())
    }

    pub fn count(&self, filter: &Filter) -> EldenDataResult<usize> {
        if filter.is_empty() {
            return Ok(self.docs.len());
        }
        let mut count = 0;
        for doc in self.scan() {
            if filter.matches(&doc?) {
                count += 1;
            }
        }
        Ok(count)
    }

    /// Merges `fields` into the stored document. Dotted keys set nested values.
    ///
    /// Returns whether a document with `id` existed.
    pub fn update_fields(&self, id: &DocumentId, fields: Document) -> EldenDataResult<bool> {
        let Some(seq) = self.ids.get(id.as_bytes())? else {
            return Ok(false);
        };
        let Some(bytes) = self.docs.get(&seq)? else {
            return Ok(false);
        };

        let mut doc: Document = serde_json::from_slice(&bytes)?;
        self.unindex_document(id, &doc)?;
        for (path, value) in fields {
            if path == ID_FIELD {
                continue;
            }
            set_path(&mut doc, &path, value);
        }
        self.docs.insert(&seq, serde_json::to_vec(&doc)?)?;
        self.index_document(id, &doc)?;
        Ok(true)
    }

    pub fn delete_one(&self, id: &DocumentId) -> EldenDataResult<bool> {
        let Some(seq) = self.ids.remove(id.as_bytes())? else {
            return Ok(false);
        };
        if let Some(bytes) = self.docs.remove(&seq)? {
            let doc: Document = serde_json::from_slice(&bytes)?;
            self.unindex_document(id, &doc)?;
        }
        Ok(true)
    }

    /// Removes every document, keeping index definitions. Returns how many were removed.
    pub fn delete_all(&self) -> EldenDataResult<usize> {
        let removed = self.docs.len();
        self.docs.clear()?;
        self.ids.clear()?;
        for field in self.indexed_fields()? {
            self.db.open_tree(index_tree_name(&self.name, &field))?.clear()?;
        }
        debug!("cleared {} documents from '{}'", removed, self.name);
        Ok(removed)
    }

    /// Removes the collection and all of its trees.
    pub fn drop_all(self) -> EldenDataResult<()> {
        for field in self.indexed_fields()? {
            self.db.drop_tree(index_tree_name(&self.name, &field))?;
        }
        self.db.drop_tree(docs_tree_name(&self.name))?;
        self.db.drop_tree(ids_tree_name(&self.name))?;
        self.db.drop_tree(indexes_tree_name(&self.name))?;
        Ok(())
    }

    /// Creates (or rebuilds) a secondary index on a top-level field.
    pub fn create_index(&self, field: &str) -> EldenDataResult<()> {
        if field.is_empty() || field.contains('.') {
            return Err(EldenDataError::bad_request(format!(
                "cannot index field '{}'",
                field
            )));
        }
        let tree = self.db.open_tree(index_tree_name(&self.name, field))?;
        tree.clear()?;
        self.indexes.insert(field.as_bytes(), Vec::new())?;

        for doc in self.scan() {
            let doc = doc?;
            if let Some(id) = stored_id(&doc) {
                if let Some(value) = doc.get(field) {
                    tree.insert(index_key(value, &id), &id.as_bytes()[..])?;
                }
            }
        }
        Ok(())
    }

    pub fn indexed_fields(&self) -> EldenDataResult<Vec<String>> {
        self.indexes
            .iter()
            .keys()
            .map(|key| Ok(String::from_utf8_lossy(&key?).into_owned()))
            .collect()
    }

    /// Documents whose indexed `field` equals `value`.
    pub fn find_by_index(&self, field: &str, value: &Value) -> EldenDataResult<Vec<Document>> {
        if !self.indexes.contains_key(field.as_bytes())? {
            return Err(EldenDataError::bad_request(format!(
                "no index on '{}.{}'",
                self.name, field
            )));
        }
        let tree = self.db.open_tree(index_tree_name(&self.name, field))?;
        let mut prefix = value.to_string().into_bytes();
        prefix.push(INDEX_SEPARATOR);

        let mut docs = Vec::new();
        for entry in tree.scan_prefix(prefix) {
            let (_, id_bytes) = entry?;
            let id = DocumentId::from_slice(&id_bytes)?;
            if let Some(doc) = self.find_by_id(&id)? {
                docs.push(doc);
            }
        }
        Ok(docs)
    }

    fn index_document(&self, id: &DocumentId, doc: &Document) -> EldenDataResult<()> {
        for field in self.indexed_fields()? {
            if let Some(value) = doc.get(&field) {
                self.db
                    .open_tree(index_tree_name(&self.name, &field))?
                    .insert(index_key(value, id), &id.as_bytes()[..])?;
            }
        }
        Ok(())
    }

    fn unindex_document(&self, id: &DocumentId, doc: &Document) -> EldenDataResult<()> {
        for field in self.indexed_fields()? {
            if let Some(value) = doc.get(&field) {
                self.db
                    .open_tree(index_tree_name(&self.name, &field))?
                    .remove(index_key(value, id))?;
            }
        }
        Ok(())
    }
}

fn stored_id(doc: &Document) -> Option<DocumentId> {
    doc.get(ID_FIELD)
        .and_then(Value::as_str)
        .and_then(|raw| DocumentId::parse(raw).ok())
}

fn index_key(value: &Value, id: &DocumentId) -> Vec<u8> {
    let mut key = value.to_string().into_bytes();
    key.push(INDEX_SEPARATOR);
    key.extend_from_slice(id.as_bytes());
    key
}

fn set_path(doc: &mut Document, path: &str, value: Value) {
    match path.split_once('.') {
        None => {
            doc.insert(path.to_string(), value);
        }
        Some((head, rest)) => {
            let entry = doc
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Document::new()));
            if !entry.is_object() {
                *entry = Value::Object(Document::new());
            }
            if let Value::Object(child) = entry {
                set_path(child, rest, value);
            }
        }
    }
}

pub(super) fn docs_tree_name(collection: &str) -> String {
    format!("collection:{}", collection)
}

fn ids_tree_name(collection: &str) -> String {
    format!("ids:{}", collection)
}

fn indexes_tree_name(collection: &str) -> String {
    format!("indexes:{}", collection)
}

fn index_tree_name(collection: &str, field: &str) -> String {
    format!("index:{}:{}", collection, field)
}
