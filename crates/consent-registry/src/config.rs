//! Registry configuration.

use serde::{Deserialize, Serialize};

use consent_registry_auth::QueryPolicy;

/// What a revoke does to the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RevocationPolicy {
    /// Delete the record. A second revoke finds nothing.
    #[default]
    Hard,
    /// Keep the record with `enabled = false`. Revoking again succeeds, and
    /// the owner can re-enable the grant with `regrant_access`.
    Soft,
}

/// Configuration for the Registry.
///
/// Every field has a default, so a host can deserialize a partial document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Hard delete or soft disable on revoke.
    pub revocation: RevocationPolicy,
    /// Who may read grants.
    pub query_policy: QueryPolicy,
}

impl RegistryConfig {
    /// Soft revocation, open queries.
    pub fn soft() -> Self {
        Self {
            revocation: RevocationPolicy::Soft,
            ..Self::default()
        }
    }

    pub fn with_query_policy(mut self, query_policy: QueryPolicy) -> Self {
        self.query_policy = query_policy;
        self
    }
}
