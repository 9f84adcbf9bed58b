//! Store trait: the abstract interface for grant persistence.
//!
//! This trait lets the registry run on any host that can provide a keyed
//! store. Implementations include SQLite (durable) and in-memory.

use async_trait::async_trait;
use consent_registry_core::{AccountName, GrantRecord};

use crate::error::Result;

/// Result of inserting a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    /// Record was inserted.
    Inserted,
    /// A record for this key already exists; nothing was written.
    AlreadyExists,
}

/// The Store trait: async interface for grant persistence.
///
/// All methods are async so blocking backends can move work off the runtime.
/// Keys are `(owner, record.connected_user)`.
#[async_trait]
pub trait Store: Send + Sync {
    /// Insert a new record into the owner's collection.
    ///
    /// Returns `AlreadyExists` without writing if the key is taken.
    async fn insert(&self, owner: &AccountName, record: &GrantRecord) -> Result<InsertResult>;

    /// Look up a record.
    async fn get(&self, owner: &AccountName, user: &AccountName) -> Result<Option<GrantRecord>>;

    /// Replace an existing record.
    ///
    /// Returns `false` if there was no record to replace.
    async fn update(&self, owner: &AccountName, record: &GrantRecord) -> Result<bool>;

    /// Remove a record.
    ///
    /// Returns `false` if there was no record to remove.
    async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<bool>;

    /// All records in an owner's collection, ordered by connected user.
    async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>>;

    /// Number of records in an owner's collection.
    async fn count(&self, owner: &AccountName) -> Result<usize>;
}

#[async_trait]
impl<S: Store + ?Sized> Store for std::sync::Arc<S> {
    async fn insert(&self, owner: &AccountName, record: &GrantRecord) -> Result<InsertResult> {
        (**self).insert(owner, record).await
    }

    async fn get(&self, owner: &AccountName, user: &AccountName) -> Result<Option<GrantRecord>> {
        (**self).get(owner, user).await
    }

    async fn update(&self, owner: &AccountName, record: &GrantRecord) -> Result<bool> {
        (**self).update(owner, record).await
    }

    async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<bool> {
        (**self).delete(owner, user).await
    }

    async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>> {
        (**self).list(owner).await
    }

    async fn count(&self, owner: &AccountName) -> Result<usize> {
        (**self).count(owner).await
    }
}
