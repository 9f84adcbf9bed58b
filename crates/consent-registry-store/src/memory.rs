//! In-memory implementation of the Store trait.
//!
//! Same semantics as SQLite, no persistence.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;

use consent_registry_core::{AccountName, GrantRecord};

use crate::error::{Result, StoreError};
use crate::traits::{InsertResult, Store};

/// In-memory store implementation.
///
/// All data is lost when the store is dropped. Thread-safe via RwLock.
pub struct MemoryStore {
    /// owner -> (connected user -> record). The inner map keeps list order.
    collections: RwLock<HashMap<AccountName, BTreeMap<AccountName, GrantRecord>>>,
}

type Collections = HashMap<AccountName, BTreeMap<AccountName, GrantRecord>>;

impl MemoryStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            collections: RwLock::new(HashMap::new()),
        }
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, Collections>> {
        self.collections
            .read()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, Collections>> {
        self.collections
            .write()
            .map_err(|e| StoreError::Poisoned(e.to_string()))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn insert(&self, owner: &AccountName, record: &GrantRecord) -> Result<InsertResult> {
        let mut collections = self.write()?;
        let collection = collections.entry(*owner).or_default();

        if collection.contains_key(&record.connected_user) {
            return Ok(InsertResult::AlreadyExists);
        }

        collection.insert(record.connected_user, record.clone());
        Ok(InsertResult::Inserted)
    }

    async fn get(&self, owner: &AccountName, user: &AccountName) -> Result<Option<GrantRecord>> {
        let collections = self.read()?;
        Ok(collections
            .get(owner)
            .and_then(|collection| collection.get(user))
            .cloned())
    }

    async fn update(&self, owner: &AccountName, record: &GrantRecord) -> Result<bool> {
        let mut collections = self.write()?;
        match collections
            .get_mut(owner)
            .and_then(|collection| collection.get_mut(&record.connected_user))
        {
            Some(existing) => {
                *existing = record.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<bool> {
        let mut collections = self.write()?;
        let Some(collection) = collections.get_mut(owner) else {
            return Ok(false);
        };

        let removed = collection.remove(user).is_some();

        // Empty collections are indistinguishable from absent ones.
        if collection.is_empty() {
            collections.remove(owner);
        }

        Ok(removed)
    }

    async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>> {
        let collections = self.read()?;
        Ok(collections
            .get(owner)
            .map(|collection| collection.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count(&self, owner: &AccountName) -> Result<usize> {
        let collections = self.read()?;
        Ok(collections.get(owner).map_or(0, BTreeMap::len))
    }
}
