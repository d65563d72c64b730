use std::marker::PhantomData;

use log::{info, warn};
use serde_json::Value;

use super::adapter::{adapt_document, prepare_payload};
use super::pagination::{Page, Pagination, MAX_PAGE_SIZE};
use crate::error::{EldenDataError, EldenDataResult};
use crate::models::Entity;
use crate::store::{Collection, Document, DocumentId, DocumentStore, Filter, FindOptions, ID_FIELD};

/// Generic CRUD over one collection of `E`.
///
/// Single fetches propagate validation failures; multi-document reads log and skip documents
/// that fail to adapt.
pub struct Repository<E: Entity> {
    collection: Collection,
    max_page_size: usize,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> Clone for Repository<E> {
    fn clone(&self) -> Self {
        Self {
            collection: self.collection.clone(),
            max_page_size: self.max_page_size,
            _entity: PhantomData,
        }
    }
}

impl<E: Entity> Repository<E> {
    pub fn new(store: &DocumentStore) -> EldenDataResult<Self> {
        Self::for_collection(store, E::COLLECTION)
    }

    /// Binds `E` to a collection other than its default one.
    pub fn for_collection(store: &DocumentStore, name: &str) -> EldenDataResult<Self> {
        Ok(Self {
            collection: store.collection(name)?,
            max_page_size: MAX_PAGE_SIZE,
            _entity: PhantomData,
        })
    }

    pub fn with_max_page_size(mut self, max_page_size: usize) -> Self {
        self.max_page_size = max_page_size;
        self
    }

    pub fn max_page_size(&self) -> usize {
        self.max_page_size
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn get_by_id(&self, id: &str) -> EldenDataResult<E> {
        let doc_id = DocumentId::parse(id)?;
        let doc = self
            .collection
            .find_by_id(&doc_id)?
            .ok_or_else(|| EldenDataError::not_found(format!("{} with id {} not found", E::LABEL, id)))?;
        adapt_document(doc)
    }

    pub fn list(&self, filter: &Filter, pagination: &Pagination) -> EldenDataResult<Page<E>> {
        let options = pagination.to_find_options(self.max_page_size)?;
        let docs = self.collection.find(filter, &options)?;
        let total = self.collection.count(filter)?;
        Ok(Page {
            items: self.adapt_all(docs),
            total,
            skip: pagination.skip,
            limit: pagination.limit,
        })
    }

    /// Every matching entity, invalid documents skipped.
    pub fn find_all(&self, filter: &Filter) -> EldenDataResult<Vec<E>> {
        self.find_with(filter, &FindOptions::default())
    }

    pub fn find_with(&self, filter: &Filter, options: &FindOptions) -> EldenDataResult<Vec<E>> {
        let docs = self.collection.find(filter, options)?;
        Ok(self.adapt_all(docs))
    }

    pub fn create(&self, payload: Document) -> EldenDataResult<E> {
        let prepared = prepare_payload::<E>(payload)?;
        let id = self.collection.insert_one(prepared)?;
        info!("Created {} {}", E::LABEL, id);
        self.get_by_id(&id.to_string())
    }

    pub fn bulk_create(&self, payloads: Vec<Document>) -> EldenDataResult<Vec<String>> {
        let prepared = payloads
            .into_iter()
            .map(prepare_payload::<E>)
            .collect::<EldenDataResult<Vec<_>>>()?;
        let ids = self.collection.insert_many(prepared)?;
        Ok(ids.iter().map(DocumentId::to_string).collect())
    }

    /// Merges `partial` into the stored document.
    ///
    /// Null values are dropped and composite columns are normalized before the merge; the
    /// merged document must still adapt cleanly or nothing is written.
    pub fn update(&self, id: &str, partial: Document) -> EldenDataResult<E> {
        let doc_id = DocumentId::parse(id)?;
        let mut changes: Document = partial
            .into_iter()
            .filter(|(key, value)| !value.is_null() && key != ID_FIELD && key != "id")
            .collect();
        if changes.is_empty() {
            return Err(EldenDataError::bad_request("No data to update"));
        }
        E::column_schema().apply(&mut changes);

        let mut current = self
            .collection
            .find_by_id(&doc_id)?
            .ok_or_else(|| EldenDataError::not_found(format!("{} with id {} not found", E::LABEL, id)))?;
        for (key, value) in &changes {
            current.insert(key.clone(), value.clone());
        }
        adapt_document::<E>(current)?;

        if !self.collection.update_fields(&doc_id, changes)? {
            return Err(EldenDataError::not_found(format!(
                "{} with id {} not found",
                E::LABEL,
                id
            )));
        }
        self.get_by_id(id)
    }

    pub fn delete(&self, id: &str) -> EldenDataResult<()> {
        let doc_id = DocumentId::parse(id)?;
        if self.collection.delete_one(&doc_id)? {
            info!("Deleted {} {}", E::LABEL, id);
            Ok(())
        } else {
            Err(EldenDataError::not_found(format!(
                "{} with id {} not found",
                E::LABEL,
                id
            )))
        }
    }

    pub fn count(&self, filter: &Filter) -> EldenDataResult<usize> {
        self.collection.count(filter)
    }

    pub fn exists(&self, id: &str) -> EldenDataResult<bool> {
        let doc_id = DocumentId::parse(id)?;
        Ok(self.collection.find_by_id(&doc_id)?.is_some())
    }

    fn adapt_all(&self, docs: Vec<Document>) -> Vec<E> {
        docs.into_iter()
            .filter_map(|doc| {
                let id = doc.get(ID_FIELD).and_then(Value::as_str).map(str::to_string);
                match adapt_document::<E>(doc) {
                    Ok(entity) => Some(entity),
                    Err(e) => {
                        warn!(
                            "Skipping invalid {} document {} in '{}': {}",
                            E::LABEL,
                            id.as_deref().unwrap_or("<no id>"),
                            self.collection.name(),
                            e
                        );
                        None
                    }
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Boss, Weapon};
    use serde_json::json;

    fn doc(value: Value) -> Document {
        match value {
            Value::Object(map) => map,
            other => panic!("not an object: {other}"),
        }
    }

    fn weapons() -> (DocumentStore, Repository<Weapon>) {
        let store = DocumentStore::open_temporary().unwrap();
        let repo = Repository::new(&store).unwrap();
        (store, repo)
    }

    #[test]
    fn create_get_update_delete() {
        let (_store, repo) = weapons();
        let created = repo
            .create(doc(json!({"name": "Club", "weight": 3, "attack": "{'Phy': 103}"})))
            .unwrap();
        let id = created.id.clone().unwrap();
        assert_eq!(created.attack.as_ref().unwrap().physical, Some(103.0));

        let updated = repo
            .update(&id, doc(json!({"attack": [{"name": "Fire", "amount": 50}], "passive": null})))
            .unwrap();
        let attack = updated.attack.unwrap();
        assert_eq!(attack.fire, Some(50.0));
        assert_eq!(attack.physical, None);

        let stored = repo
            .collection()
            .find_by_id(&DocumentId::parse(&id).unwrap())
            .unwrap()
            .unwrap();
        assert_eq!(stored["attack"]["fire"], json!(50.0));

        assert!(repo.exists(&id).unwrap());
        repo.delete(&id).unwrap();
        assert!(matches!(repo.get_by_id(&id), Err(EldenDataError::NotFound(_))));
        assert!(matches!(repo.delete(&id), Err(EldenDataError::NotFound(_))));
    }

    #[test]
    fn invalid_identifier_is_rejected_first() {
        let (_store, repo) = weapons();
        assert!(matches!(
            repo.get_by_id("not-an-id"),
            Err(EldenDataError::InvalidIdentifier(_))
        ));
    }

    #[test]
    fn empty_patch_is_rejected() {
        let (_store, repo) = weapons();
        let created = repo.create(doc(json!({"name": "Club"}))).unwrap();
        let id = created.id.unwrap();
        let err = repo.update(&id, doc(json!({"name": null}))).unwrap_err();
        assert!(matches!(err, EldenDataError::BadRequest(_)));
    }

    #[test]
    fn invalid_patch_writes_nothing() {
        let (_store, repo) = weapons();
        let id = repo.create(doc(json!({"name": "Club"}))).unwrap().id.unwrap();
        let err = repo.update(&id, doc(json!({"weight": -4}))).unwrap_err();
        assert!(matches!(err, EldenDataError::Validation(_)));
        assert_eq!(repo.get_by_id(&id).unwrap().weight, None);
    }

    #[test]
    fn list_skips_what_get_rejects() {
        let (_store, repo) = weapons();
        repo.create(doc(json!({"name": "Dagger"}))).unwrap();
        let bad_id = repo
            .collection()
            .insert_one(doc(json!({"name": "Cursed", "scalesWith": {"Dex": "Q"}})))
            .unwrap();
        repo.create(doc(json!({"name": "Rapier"}))).unwrap();

        let page = repo.list(&Filter::new(), &Pagination::default()).unwrap();
        let names: Vec<_> = page.items.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Dagger", "Rapier"]);
        assert_eq!(page.total, 3);

        assert!(matches!(
            repo.get_by_id(&bad_id.to_string()),
            Err(EldenDataError::Validation(_))
        ));
    }

    #[test]
    fn bulk_create_and_count() {
        let store = DocumentStore::open_temporary().unwrap();
        let repo: Repository<Boss> = Repository::new(&store).unwrap();
        let ids = repo
            .bulk_create(vec![
                doc(json!({"name": "Margit", "drops": "['Talisman Pouch']"})),
                doc(json!({"name": "Godrick", "drops": ["Godrick's Great Rune"]})),
            ])
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(repo.count(&Filter::new()).unwrap(), 2);
        assert!(repo.bulk_create(vec![doc(json!({"drops": []}))]).is_err());
        assert_eq!(repo.count(&Filter::new()).unwrap(), 2);
    }
}
