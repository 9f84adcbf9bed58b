//! Grant records.
//!
//! A grant links an owner to a connected user. The owner is not part of the
//! record: it selects the collection the record lives in.

use serde::{Deserialize, Serialize};

use crate::account::AccountName;
use crate::error::{CoreError, Result};

/// Role of a connected user within a grant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Role {
    /// No particular role.
    #[default]
    Generic = 0,
    /// A medical practitioner acting on the owner's records.
    Doctor = 1,
}

impl Role {
    /// Convert to u8 for storage.
    pub fn to_u8(self) -> u8 {
        self as u8
    }

    /// Try to parse from a stored u8.
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Generic),
            1 => Some(Self::Doctor),
            _ => None,
        }
    }
}

impl TryFrom<u8> for Role {
    type Error = CoreError;

    fn try_from(value: u8) -> Result<Self> {
        Self::from_u8(value).ok_or(CoreError::InvalidRole(value))
    }
}

/// The mutable attributes of a grant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrantAttributes {
    pub role: Role,
    pub enabled: bool,
}

impl GrantAttributes {
    pub fn new(role: Role, enabled: bool) -> Self {
        Self { role, enabled }
    }

    /// Same attributes with a different `enabled` flag.
    pub fn with_enabled(self, enabled: bool) -> Self {
        Self { enabled, ..self }
    }
}

impl Default for GrantAttributes {
    fn default() -> Self {
        Self {
            role: Role::Generic,
            enabled: true,
        }
    }
}

/// A stored grant.
///
/// `connected_user` is the primary key within the owner's collection and
/// never changes once the record exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrantRecord {
    /// The user being granted access.
    pub connected_user: AccountName,

    /// Role of the connected user.
    pub role: Role,

    /// Whether the grant is currently active.
    pub enabled: bool,

    /// When the grant was created (Unix milliseconds).
    pub granted_at: i64,

    /// When the attributes were last written (Unix milliseconds).
    pub updated_at: i64,
}

impl GrantRecord {
    /// Create a fresh record.
    pub fn new(connected_user: AccountName, attrs: GrantAttributes, now: i64) -> Self {
        Self {
            connected_user,
            role: attrs.role,
            enabled: attrs.enabled,
            granted_at: now,
            updated_at: now,
        }
    }

    /// The mutable part of the record.
    pub fn attributes(&self) -> GrantAttributes {
        GrantAttributes {
            role: self.role,
            enabled: self.enabled,
        }
    }

    /// Check whether the record carries exactly these attributes.
    pub fn has_attributes(&self, attrs: &GrantAttributes) -> bool {
        self.attributes() == *attrs
    }

    /// Copy of this record with new attributes. The key and creation time stay.
    pub fn with_attributes(&self, attrs: GrantAttributes, now: i64) -> Self {
        Self {
            connected_user: self.connected_user,
            role: attrs.role,
            enabled: attrs.enabled,
            granted_at: self.granted_at,
            updated_at: now,
        }
    }
}
