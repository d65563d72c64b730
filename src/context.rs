//! Shared application state.

use std::sync::Arc;

use log::info;

use crate::config::AppConfig;
use crate::error::EldenDataResult;
use crate::models::{Armor, Boss, CharacterClass, Entity, Spell, Weapon};
use crate::service::{spells, Repository};
use crate::store::DocumentStore;

/// The store handle and configuration, cheap to clone into every request.
#[derive(Clone)]
pub struct AppContext {
    store: DocumentStore,
    config: Arc<AppConfig>,
}

impl AppContext {
    /// Opens the configured store and checks that it answers.
    pub fn connect(config: AppConfig) -> EldenDataResult<Self> {
        let store = DocumentStore::open(&config.storage_path)?;
        store.ping()?;
        info!("Connected to store at {}", config.storage_path.display());
        Ok(Self::with_store(store, config))
    }

    pub fn with_store(store: DocumentStore, config: AppConfig) -> Self {
        Self {
            store,
            config: Arc::new(config),
        }
    }

    pub fn store(&self) -> &DocumentStore {
        &self.store
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Repository for `E`'s default collection, bounded by the configured page size.
    pub fn repository<E: Entity>(&self) -> EldenDataResult<Repository<E>> {
        Ok(Repository::new(&self.store)?.with_max_page_size(self.config.max_page_size))
    }

    pub fn weapons(&self) -> EldenDataResult<Repository<Weapon>> {
        self.repository()
    }

    pub fn armors(&self) -> EldenDataResult<Repository<Armor>> {
        self.repository()
    }

    pub fn bosses(&self) -> EldenDataResult<Repository<Boss>> {
        self.repository()
    }

    pub fn classes(&self) -> EldenDataResult<Repository<CharacterClass>> {
        self.repository()
    }

    pub fn sorceries(&self) -> EldenDataResult<Repository<Spell>> {
        Ok(spells::sorceries(&self.store)?.with_max_page_size(self.config.max_page_size))
    }

    pub fn incantations(&self) -> EldenDataResult<Repository<Spell>> {
        Ok(spells::incantations(&self.store)?.with_max_page_size(self.config.max_page_size))
    }

    /// Flushes pending writes before exit.
    pub fn shutdown(&self) -> EldenDataResult<()> {
        self.store.flush()?;
        info!("Store flushed");
        Ok(())
    }
}
