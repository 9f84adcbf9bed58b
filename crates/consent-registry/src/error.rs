//! Error types for the registry.

use consent_registry_auth::DenyReason;
use consent_registry_core::AccountName;
use consent_registry_store::StoreError;
use thiserror::Error;

/// Errors that can occur during registry actions.
///
/// All are terminal for the action that raised them; nothing is retried.
#[derive(Debug, Error)]
pub enum RegistryError {
    /// A grant for this pair already exists (enabled or not).
    #[error("access already granted: {owner} -> {user}")]
    AlreadyGranted {
        owner: AccountName,
        user: AccountName,
    },

    /// No grant exists for this pair.
    #[error("no grant found: {owner} -> {user}")]
    NotFound {
        owner: AccountName,
        user: AccountName,
    },

    /// The caller may not invoke this action.
    #[error("unauthorized: {0}")]
    Unauthorized(#[from] DenyReason),

    /// The store did not reflect a mutation it just acknowledged.
    ///
    /// This is a defect in the host store, not a user error.
    #[error("storage inconsistency for {owner} -> {user}: {detail}")]
    StorageInconsistency {
        owner: AccountName,
        user: AccountName,
        detail: &'static str,
    },

    /// The store itself failed.
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl RegistryError {
    /// Whether the error reflects caller misuse rather than a host defect.
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            RegistryError::AlreadyGranted { .. }
                | RegistryError::NotFound { .. }
                | RegistryError::Unauthorized(_)
        )
    }
}

/// Result type for registry actions.
pub type Result<T> = std::result::Result<T, RegistryError>;
