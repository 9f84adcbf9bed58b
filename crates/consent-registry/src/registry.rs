//! The Registry: the public action set.
//!
//! Each action authorizes the caller, performs one grant-store operation,
//! and relies on that operation's own postcondition check.

use consent_registry_auth::{AuthorizationGate, Operation};
use consent_registry_core::{AccountName, GrantAttributes, GrantRecord, Role};
use consent_registry_store::Store;
use tokio::sync::Mutex;

use crate::config::{RegistryConfig, RevocationPolicy};
use crate::error::Result;
use crate::grants::GrantStore;

/// What a revoke did to the grant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RevokeOutcome {
    /// The record was removed. Holds the record as it was.
    Deleted(GrantRecord),
    /// The record was kept with `enabled = false`.
    Disabled(GrantRecord),
}

impl RevokeOutcome {
    /// The record the revoke acted on.
    pub fn record(&self) -> &GrantRecord {
        match self {
            RevokeOutcome::Deleted(record) | RevokeOutcome::Disabled(record) => record,
        }
    }
}

/// The consent registry.
///
/// `caller` on every action is an identity the host has already
/// authenticated. Mutating actions are serialized; reads are not.
pub struct Registry<S: Store> {
    grants: GrantStore<S>,
    gate: AuthorizationGate,
    config: RegistryConfig,
    /// Held across each mutation's lookup, write and re-lookup.
    write_lock: Mutex<()>,
}

impl<S: Store> Registry<S> {
    /// Create a registry over a store.
    pub fn new(store: S, config: RegistryConfig) -> Self {
        Self {
            grants: GrantStore::new(store),
            gate: AuthorizationGate::new(config.query_policy),
            config,
            write_lock: Mutex::new(()),
        }
    }

    /// Get the store reference.
    pub fn store(&self) -> &S {
        self.grants.inner()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Owner actions
    // ─────────────────────────────────────────────────────────────────────────

    /// First-time grant with default attributes (generic role, enabled).
    pub async fn grant_access(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<GrantRecord> {
        self.grant_access_with(caller, owner, user, GrantAttributes::default())
            .await
    }

    /// First-time grant with explicit attributes.
    ///
    /// Fails with `AlreadyGranted` if a record exists, even a disabled one;
    /// use [`Registry::regrant_access`] to re-enable.
    pub async fn grant_access_with(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
        attrs: GrantAttributes,
    ) -> Result<GrantRecord> {
        self.authorize(Operation::Grant, caller, owner, Some(user))?;

        let _guard = self.write_lock.lock().await;
        let record = self.grants.create(owner, user, attrs, now_millis()).await?;

        tracing::info!(%owner, %user, role = ?record.role, enabled = record.enabled, "access granted");
        Ok(record)
    }

    /// Re-enable a soft-revoked grant.
    pub async fn regrant_access(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<GrantRecord> {
        self.authorize(Operation::Regrant, caller, owner, Some(user))?;

        let _guard = self.write_lock.lock().await;
        let (record, written) = self
            .grants
            .set_enabled(owner, user, true, now_millis())
            .await?;

        if written {
            tracing::info!(%owner, %user, "access re-granted");
        } else {
            tracing::debug!(%owner, %user, "grant already enabled");
        }
        Ok(record)
    }

    /// Owner withdraws a grant.
    pub async fn revoke_access(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<RevokeOutcome> {
        self.authorize(Operation::Revoke, caller, owner, Some(user))?;
        self.revoke(owner, user).await
    }

    /// Rewrite a grant's role and enabled flag.
    pub async fn update_profile(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
        role: Role,
        enabled: bool,
    ) -> Result<GrantRecord> {
        self.authorize(Operation::UpdateProfile, caller, owner, Some(user))?;

        let _guard = self.write_lock.lock().await;
        let record = self
            .grants
            .update(owner, user, GrantAttributes::new(role, enabled), now_millis())
            .await?;

        tracing::info!(%owner, %user, ?role, enabled, "grant profile updated");
        Ok(record)
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Grantee actions
    // ─────────────────────────────────────────────────────────────────────────

    /// The connected user disclaims a grant held against them.
    ///
    /// Reaches the same store mutation as [`Registry::revoke_access`].
    pub async fn revoke_access_by_grantee(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<RevokeOutcome> {
        self.authorize(Operation::RevokeByGrantee, caller, owner, Some(user))?;
        self.revoke(owner, user).await
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Reads
    // ─────────────────────────────────────────────────────────────────────────

    /// Inspect a grant. Never mutates.
    pub async fn query_grant(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<Option<GrantRecord>> {
        self.authorize(Operation::Query, caller, owner, Some(user))?;
        self.grants.query(owner, user).await
    }

    /// Whether `user` currently has access: a record exists and is enabled.
    pub async fn access_granted(
        &self,
        caller: &AccountName,
        owner: &AccountName,
        user: &AccountName,
    ) -> Result<bool> {
        Ok(self
            .query_grant(caller, owner, user)
            .await?
            .is_some_and(|record| record.enabled))
    }

    /// Every grant in an owner's collection, enabled or not.
    pub async fn list_grants(
        &self,
        caller: &AccountName,
        owner: &AccountName,
    ) -> Result<Vec<GrantRecord>> {
        self.authorize(Operation::List, caller, owner, None)?;
        self.grants.list(owner).await
    }

    /// Users that currently have access to an owner's records.
    pub async fn list_connected(
        &self,
        caller: &AccountName,
        owner: &AccountName,
    ) -> Result<Vec<AccountName>> {
        Ok(self
            .list_grants(caller, owner)
            .await?
            .into_iter()
            .filter(|record| record.enabled)
            .map(|record| record.connected_user)
            .collect())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Internals
    // ─────────────────────────────────────────────────────────────────────────

    fn authorize(
        &self,
        operation: Operation,
        caller: &AccountName,
        owner: &AccountName,
        user: Option<&AccountName>,
    ) -> Result<()> {
        tracing::debug!(%operation, %caller, %owner, user = ?user, "authorizing action");

        self.gate
            .authorize(operation, caller, owner, user)
            .into_result()
            .map_err(|reason| {
                tracing::warn!(%operation, %caller, %owner, %reason, "action denied");
                reason.into()
            })
    }

    async fn revoke(&self, owner: &AccountName, user: &AccountName) -> Result<RevokeOutcome> {
        let _guard = self.write_lock.lock().await;

        let (outcome, written) = match self.config.revocation {
            RevocationPolicy::Hard => (
                RevokeOutcome::Deleted(self.grants.delete(owner, user).await?),
                true,
            ),
            RevocationPolicy::Soft => {
                let (record, written) = self
                    .grants
                    .set_enabled(owner, user, false, now_millis())
                    .await?;
                (RevokeOutcome::Disabled(record), written)
            }
        };

        if written {
            tracing::info!(%owner, %user, policy = ?self.config.revocation, "access revoked");
        } else {
            tracing::debug!(%owner, %user, "grant already disabled");
        }
        Ok(outcome)
    }
}

/// Get current time in milliseconds.
fn now_millis() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RegistryError;
    use consent_registry_auth::{DenyReason, QueryPolicy};
    use consent_registry_store::MemoryStore;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    fn registry(config: RegistryConfig) -> Registry<MemoryStore> {
        Registry::new(MemoryStore::new(), config)
    }

    #[tokio::test]
    async fn test_grant_and_query() {
        let registry = registry(RegistryConfig::default());
        let (alice, bob) = (name("alice"), name("bob"));

        let record = registry.grant_access(&alice, &alice, &bob).await.unwrap();
        assert_eq!(record.role, Role::Generic);
        assert!(record.enabled);

        assert_eq!(
            registry.query_grant(&bob, &alice, &bob).await.unwrap(),
            Some(record)
        );
        assert!(registry.access_granted(&bob, &alice, &bob).await.unwrap());
    }

    #[tokio::test]
    async fn test_denial_leaves_store_untouched() {
        let registry = registry(RegistryConfig::default());
        let (alice, bob) = (name("alice"), name("bob"));

        let err = registry.grant_access(&bob, &alice, &bob).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(DenyReason::NotOwner)));
        assert_eq!(registry.store().count(&alice).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_soft_revoke_then_regrant() {
        let registry = registry(RegistryConfig::soft());
        let (alice, bob) = (name("alice"), name("bob"));

        registry
            .grant_access_with(&alice, &alice, &bob, GrantAttributes::new(Role::Doctor, true))
            .await
            .unwrap();

        let outcome = registry.revoke_access(&alice, &alice, &bob).await.unwrap();
        assert!(matches!(outcome, RevokeOutcome::Disabled(ref r) if !r.enabled));
        assert!(!registry.access_granted(&alice, &alice, &bob).await.unwrap());

        let record = registry.regrant_access(&alice, &alice, &bob).await.unwrap();
        assert!(record.enabled);
        assert_eq!(record.role, Role::Doctor);
    }

    #[tokio::test]
    async fn test_repeated_soft_revoke_leaves_record_untouched() {
        let registry = registry(RegistryConfig::soft());
        let (alice, bob) = (name("alice"), name("bob"));

        registry.grant_access(&alice, &alice, &bob).await.unwrap();
        let first = registry.revoke_access(&alice, &alice, &bob).await.unwrap();
        let second = registry
            .revoke_access_by_grantee(&bob, &alice, &bob)
            .await
            .unwrap();

        // No second write: the stored record is exactly the first revoke's.
        assert_eq!(second, first);
        assert_eq!(
            registry.query_grant(&alice, &alice, &bob).await.unwrap().as_ref(),
            Some(first.record())
        );

        let regranted = registry.regrant_access(&alice, &alice, &bob).await.unwrap();
        let again = registry.regrant_access(&alice, &alice, &bob).await.unwrap();
        assert_eq!(again, regranted);
    }

    #[tokio::test]
    async fn test_hard_revoke_deletes() {
        let registry = registry(RegistryConfig::default());
        let (alice, bob) = (name("alice"), name("bob"));

        let granted = registry.grant_access(&alice, &alice, &bob).await.unwrap();
        let outcome = registry.revoke_access(&alice, &alice, &bob).await.unwrap();
        assert_eq!(outcome, RevokeOutcome::Deleted(granted));
        assert_eq!(registry.query_grant(&alice, &alice, &bob).await.unwrap(), None);

        // Nothing left to re-enable.
        let err = registry.regrant_access(&alice, &alice, &bob).await.unwrap_err();
        assert!(matches!(err, RegistryError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_list_connected_skips_disabled() {
        let registry = registry(RegistryConfig::soft());
        let alice = name("alice");

        for user in ["bob", "carol", "dave"] {
            registry.grant_access(&alice, &alice, &name(user)).await.unwrap();
        }
        registry
            .revoke_access_by_grantee(&name("carol"), &alice, &name("carol"))
            .await
            .unwrap();

        let connected = registry.list_connected(&alice, &alice).await.unwrap();
        assert_eq!(connected, vec![name("bob"), name("dave")]);
        assert_eq!(registry.list_grants(&alice, &alice).await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_participant_query_policy() {
        let registry =
            registry(RegistryConfig::default().with_query_policy(QueryPolicy::Participants));
        let (alice, bob, carol) = (name("alice"), name("bob"), name("carol"));

        registry.grant_access(&alice, &alice, &bob).await.unwrap();

        assert!(registry.query_grant(&bob, &alice, &bob).await.unwrap().is_some());
        let err = registry.query_grant(&carol, &alice, &bob).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(DenyReason::NotParticipant)));

        let err = registry.list_connected(&bob, &alice).await.unwrap_err();
        assert!(matches!(err, RegistryError::Unauthorized(DenyReason::NotOwner)));
    }
}
