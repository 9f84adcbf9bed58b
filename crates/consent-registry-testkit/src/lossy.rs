//! A store that lies.
//!
//! [`LossyStore`] wraps a real store and, when armed, acknowledges the next
//! matching write without performing it (or performs a different one). The
//! registry must turn every such lie into `StorageInconsistency`.

use std::sync::Mutex;

use async_trait::async_trait;

use consent_registry::store::{InsertResult, Result, Store, StoreError};
use consent_registry::{AccountName, GrantRecord};

/// A single injected fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    /// `insert` reports `Inserted` but writes nothing.
    DropInsert,
    /// `insert` writes the record with its `enabled` flag flipped.
    CorruptInsert,
    /// `update` reports success but writes nothing.
    DropUpdate,
    /// `delete` reports success but removes nothing.
    DropDelete,
    /// `delete` reports that nothing existed, even though it did.
    DenyDelete,
}

/// Store wrapper with one-shot fault injection.
pub struct LossyStore<S: Store> {
    inner: S,
    armed: Mutex<Option<Fault>>,
}

impl<S: Store> LossyStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            armed: Mutex::new(None),
        }
    }

    /// Arm a fault. It fires on the next matching call and then disarms.
    pub fn arm(&self, fault: Fault) {
        if let Ok(mut armed) = self.armed.lock() {
            *armed = Some(fault);
        }
    }

    /// Whether an armed fault is still waiting to fire.
    pub fn is_armed(&self) -> bool {
        self.armed.lock().map(|armed| armed.is_some()).unwrap_or(false)
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// Take the armed fault if it is one of `faults`.
    fn fire(&self, faults: &[Fault]) -> Result<Option<Fault>> {
        let mut armed = self
            .armed
            .lock()
            .map_err(|e| StoreError::Poisoned(e.to_string()))?;

        match *armed {
            Some(fault) if faults.contains(&fault) => {
                *armed = None;
                tracing::debug!(?fault, "injecting store fault");
                Ok(Some(fault))
            }
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl<S: Store> Store for LossyStore<S> {
    async fn insert(&self, owner: &AccountName, record: &GrantRecord) -> Result<InsertResult> {
        match self.fire(&[Fault::DropInsert, Fault::CorruptInsert])? {
            Some(Fault::DropInsert) => Ok(InsertResult::Inserted),
            Some(_) => {
                let mut corrupted = record.clone();
                corrupted.enabled = !corrupted.enabled;
                self.inner.insert(owner, &corrupted).await
            }
            None => self.inner.insert(owner, record).await,
        }
    }

    async fn get(&self, owner: &AccountName, user: &AccountName) -> Result<Option<GrantRecord>> {
        self.inner.get(owner, user).await
    }

    async fn update(&self, owner: &AccountName, record: &GrantRecord) -> Result<bool> {
        match self.fire(&[Fault::DropUpdate])? {
            Some(_) => Ok(true),
            None => self.inner.update(owner, record).await,
        }
    }

    async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<bool> {
        match self.fire(&[Fault::DropDelete, Fault::DenyDelete])? {
            Some(Fault::DropDelete) => Ok(true),
            Some(_) => Ok(false),
            None => self.inner.delete(owner, user).await,
        }
    }

    async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>> {
        self.inner.list(owner).await
    }

    async fn count(&self, owner: &AccountName) -> Result<usize> {
        self.inner.count(owner).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consent_registry::store::MemoryStore;
    use consent_registry::GrantAttributes;

    #[tokio::test]
    async fn test_fault_fires_once() {
        let store = LossyStore::new(MemoryStore::new());
        let alice = AccountName::new("alice").unwrap();
        let record = GrantRecord::new(AccountName::new("bob").unwrap(), GrantAttributes::default(), 0);

        store.arm(Fault::DropInsert);
        assert_eq!(store.insert(&alice, &record).await.unwrap(), InsertResult::Inserted);
        assert!(!store.is_armed());
        assert_eq!(store.count(&alice).await.unwrap(), 0);

        assert_eq!(store.insert(&alice, &record).await.unwrap(), InsertResult::Inserted);
        assert_eq!(store.count(&alice).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_unmatched_fault_stays_armed() {
        let store = LossyStore::new(MemoryStore::new());
        let alice = AccountName::new("alice").unwrap();
        let record = GrantRecord::new(AccountName::new("bob").unwrap(), GrantAttributes::default(), 0);

        store.arm(Fault::DropDelete);
        store.insert(&alice, &record).await.unwrap();
        assert!(store.is_armed());
    }
}
