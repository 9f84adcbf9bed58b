//! Registry operations as seen by the authorization gate.

use std::fmt;

/// A registry action, classified by who may invoke it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    /// First-time grant by the owner.
    Grant,
    /// Owner re-enables a soft-revoked grant.
    Regrant,
    /// Owner withdraws a grant.
    Revoke,
    /// Connected user disclaims a grant held against them.
    RevokeByGrantee,
    /// Owner rewrites a grant's attributes.
    UpdateProfile,
    /// Read a single grant.
    Query,
    /// Read an owner's whole collection.
    List,
}

impl Operation {
    /// Stable action name, as used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Grant => "grant_access",
            Operation::Regrant => "regrant_access",
            Operation::Revoke => "revoke_access",
            Operation::RevokeByGrantee => "revoke_access_by_grantee",
            Operation::UpdateProfile => "update_profile",
            Operation::Query => "query_grant",
            Operation::List => "list_grants",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
