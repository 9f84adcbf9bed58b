//! The authorization gate.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use consent_registry_core::AccountName;

use crate::operation::Operation;

/// Who may read grants.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QueryPolicy {
    /// Any caller may read any grant.
    #[default]
    Open,
    /// Only the owner or the connected user may read a grant, and only the
    /// owner may list a collection.
    Participants,
}

/// Why a caller was turned away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DenyReason {
    #[error("caller is not the owner")]
    NotOwner,

    #[error("caller is not the connected user")]
    NotConnectedUser,

    #[error("caller is neither the owner nor the connected user")]
    NotParticipant,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }

    /// Convert into a `Result`, so callers can `?` on a denial.
    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Pure predicate over `(operation, caller, owner, connected user)`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthorizationGate {
    query_policy: QueryPolicy,
}

impl AuthorizationGate {
    pub fn new(query_policy: QueryPolicy) -> Self {
        Self { query_policy }
    }

    /// Decide whether `caller` may run `operation` against the grant
    /// `(owner, user)`. `user` is `None` for collection-wide operations.
    pub fn authorize(
        &self,
        operation: Operation,
        caller: &AccountName,
        owner: &AccountName,
        user: Option<&AccountName>,
    ) -> Decision {
        let is_owner = caller == owner;
        let is_user = user == Some(caller);

        match operation {
            Operation::Grant
            | Operation::Regrant
            | Operation::Revoke
            | Operation::UpdateProfile => allow_if(is_owner, DenyReason::NotOwner),

            Operation::RevokeByGrantee => allow_if(is_user, DenyReason::NotConnectedUser),

            Operation::Query => match self.query_policy {
                QueryPolicy::Open => Decision::Allow,
                QueryPolicy::Participants => {
                    allow_if(is_owner || is_user, DenyReason::NotParticipant)
                }
            },

            Operation::List => match self.query_policy {
                QueryPolicy::Open => Decision::Allow,
                QueryPolicy::Participants => allow_if(is_owner, DenyReason::NotOwner),
            },
        }
    }
}

fn allow_if(condition: bool, reason: DenyReason) -> Decision {
    if condition {
        Decision::Allow
    } else {
        Decision::Deny(reason)
    }
}
