//! The grant store: keyed grant operations with postcondition checks.
//!
//! Every mutation looks the key up, performs exactly one store write, and
//! looks the key up again. A store that acknowledges a write it did not make
//! surfaces as [`RegistryError::StorageInconsistency`] instead of silently
//! diverging from what the caller was told.
//!
//! No authorization happens here; see [`crate::Registry`].

use consent_registry_core::{AccountName, GrantAttributes, GrantRecord};
use consent_registry_store::{InsertResult, Store};

use crate::error::{RegistryError, Result};

/// Owner-partitioned grant operations over a [`Store`].
pub struct GrantStore<S: Store> {
    store: S,
}

impl<S: Store> GrantStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// The underlying store.
    pub fn inner(&self) -> &S {
        &self.store
    }

    /// Create a grant. Fails with `AlreadyGranted` if any record exists for
    /// the pair, enabled or not.
    pub async fn create(
        &self,
        owner: &AccountName,
        user: &AccountName,
        attrs: GrantAttributes,
        now: i64,
    ) -> Result<GrantRecord> {
        if self.store.get(owner, user).await?.is_some() {
            return Err(already_granted(owner, user));
        }

        let record = GrantRecord::new(*user, attrs, now);
        if self.store.insert(owner, &record).await? == InsertResult::AlreadyExists {
            return Err(already_granted(owner, user));
        }

        match self.store.get(owner, user).await? {
            Some(stored) if stored.has_attributes(&attrs) => Ok(stored),
            Some(_) => Err(inconsistency(owner, user, "inserted record has wrong attributes")),
            None => Err(inconsistency(owner, user, "record missing after insert")),
        }
    }

    /// Replace a grant's role and enabled flag.
    pub async fn update(
        &self,
        owner: &AccountName,
        user: &AccountName,
        attrs: GrantAttributes,
        now: i64,
    ) -> Result<GrantRecord> {
        let existing = self.require(owner, user).await?;
        self.write_attributes(owner, &existing, attrs, now).await
    }

    /// Set only the enabled flag, leaving the role as it is.
    ///
    /// Returns the record and whether it was written. A record already in
    /// the requested state is returned unchanged, with no write.
    pub async fn set_enabled(
        &self,
        owner: &AccountName,
        user: &AccountName,
        enabled: bool,
        now: i64,
    ) -> Result<(GrantRecord, bool)> {
        let existing = self.require(owner, user).await?;
        if existing.enabled == enabled {
            return Ok((existing, false));
        }

        let attrs = existing.attributes().with_enabled(enabled);
        let record = self.write_attributes(owner, &existing, attrs, now).await?;
        Ok((record, true))
    }

    /// Remove a grant, returning the record that was removed.
    pub async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<GrantRecord> {
        let existing = self.require(owner, user).await?;

        if !self.store.delete(owner, user).await? {
            return Err(inconsistency(owner, user, "record vanished before delete"));
        }

        if self.store.get(owner, user).await?.is_some() {
            return Err(inconsistency(owner, user, "record still present after delete"));
        }

        Ok(existing)
    }

    /// Look up a grant. Absence is `None`, never a default record.
    pub async fn query(
        &self,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<Option<GrantRecord>> {
        Ok(self.store.get(owner, user).await?)
    }

    /// All grants in an owner's collection, ordered by connected user.
    pub async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>> {
        Ok(self.store.list(owner).await?)
    }

    async fn require(&self, owner: &AccountName, user: &AccountName) -> Result<GrantRecord> {
        self.store
            .get(owner, user)
            .await?
            .ok_or(RegistryError::NotFound {
                owner: *owner,
                user: *user,
            })
    }

    async fn write_attributes(
        &self,
        owner: &AccountName,
        existing: &GrantRecord,
        attrs: GrantAttributes,
        now: i64,
    ) -> Result<GrantRecord> {
        let user = &existing.connected_user;
        let updated = existing.with_attributes(attrs, now);

        if !self.store.update(owner, &updated).await? {
            return Err(inconsistency(owner, user, "record vanished before update"));
        }

        match self.store.get(owner, user).await? {
            Some(stored) if stored.has_attributes(&attrs) => Ok(stored),
            Some(_) => Err(inconsistency(owner, user, "update not reflected in store")),
            None => Err(inconsistency(owner, user, "record missing after update")),
        }
    }
}

fn already_granted(owner: &AccountName, user: &AccountName) -> RegistryError {
    RegistryError::AlreadyGranted {
        owner: *owner,
        user: *user,
    }
}

fn inconsistency(owner: &AccountName, user: &AccountName, detail: &'static str) -> RegistryError {
    tracing::error!(%owner, %user, detail, "grant store postcondition failed");
    RegistryError::StorageInconsistency {
        owner: *owner,
        user: *user,
        detail,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consent_registry_core::Role;
    use consent_registry_store::MemoryStore;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    #[tokio::test]
    async fn test_create_then_query() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, bob) = (name("alice"), name("bob"));

        let created = grants
            .create(&alice, &bob, GrantAttributes::default(), 100)
            .await
            .unwrap();
        assert_eq!(created.connected_user, bob);
        assert_eq!(created.granted_at, 100);

        assert_eq!(grants.query(&alice, &bob).await.unwrap(), Some(created));
        assert_eq!(grants.query(&bob, &alice).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_create_twice_fails() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, bob) = (name("alice"), name("bob"));

        grants.create(&alice, &bob, GrantAttributes::default(), 1).await.unwrap();
        let err = grants
            .create(&alice, &bob, GrantAttributes::new(Role::Doctor, true), 2)
            .await
            .unwrap_err();
        assert!(matches!(err, RegistryError::AlreadyGranted { .. }));

        // The first record is untouched.
        let stored = grants.query(&alice, &bob).await.unwrap().unwrap();
        assert_eq!(stored.role, Role::Generic);
    }

    #[tokio::test]
    async fn test_update_keeps_creation_time() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, bob) = (name("alice"), name("bob"));

        grants.create(&alice, &bob, GrantAttributes::default(), 1).await.unwrap();
        let updated = grants
            .update(&alice, &bob, GrantAttributes::new(Role::Doctor, false), 5)
            .await
            .unwrap();

        assert_eq!(updated.role, Role::Doctor);
        assert!(!updated.enabled);
        assert_eq!(updated.granted_at, 1);
        assert_eq!(updated.updated_at, 5);
    }

    #[tokio::test]
    async fn test_set_enabled_leaves_role() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, bob) = (name("alice"), name("bob"));

        grants
            .create(&alice, &bob, GrantAttributes::new(Role::Doctor, true), 1)
            .await
            .unwrap();

        let (disabled, written) = grants.set_enabled(&alice, &bob, false, 2).await.unwrap();
        assert!(written);
        assert_eq!(disabled.role, Role::Doctor);
        assert!(!disabled.enabled);

        // Already disabled: no write, timestamp unchanged.
        let (again, written) = grants.set_enabled(&alice, &bob, false, 3).await.unwrap();
        assert!(!written);
        assert_eq!(again.updated_at, 2);
    }

    #[tokio::test]
    async fn test_missing_record_errors() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, carol) = (name("alice"), name("carol"));

        for err in [
            grants.delete(&alice, &carol).await.unwrap_err(),
            grants.set_enabled(&alice, &carol, true, 1).await.unwrap_err(),
            grants
                .update(&alice, &carol, GrantAttributes::default(), 1)
                .await
                .unwrap_err(),
        ] {
            assert!(matches!(err, RegistryError::NotFound { .. }));
        }
    }

    #[tokio::test]
    async fn test_delete_returns_removed_record() {
        let grants = GrantStore::new(MemoryStore::new());
        let (alice, bob) = (name("alice"), name("bob"));

        let created = grants.create(&alice, &bob, GrantAttributes::default(), 1).await.unwrap();
        assert_eq!(grants.delete(&alice, &bob).await.unwrap(), created);
        assert!(grants.list(&alice).await.unwrap().is_empty());
    }
}
