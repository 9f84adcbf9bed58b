//! # Consent Registry
//!
//! A per-owner access-control list. A data owner grants or revokes a
//! connected user's access to the owner's records; the connected user can
//! drop a grant held against them.
//!
//! ## Overview
//!
//! Two layers compose vertically:
//!
//! - **Authorization gate** ([`auth`]): decides whether the authenticated
//!   caller may run an action (owner-only, grantee-only, or open reads).
//! - **Grant store** ([`GrantStore`]): owner-partitioned keyed records with a
//!   postcondition check after every mutation.
//!
//! [`Registry`] runs every action in the same order: authorize, perform one
//! store operation, verify it took effect.
//!
//! ## Actions
//!
//! | Action | Caller | Effect |
//! |---|---|---|
//! | [`Registry::grant_access`] | owner | create; `AlreadyGranted` if a record exists |
//! | [`Registry::regrant_access`] | owner | set `enabled = true` |
//! | [`Registry::revoke_access`] | owner | delete or disable, per [`RevocationPolicy`] |
//! | [`Registry::revoke_access_by_grantee`] | connected user | same mutation as `revoke_access` |
//! | [`Registry::update_profile`] | owner | rewrite role and enabled flag |
//! | [`Registry::query_grant`] | any (configurable) | read one record |
//! | [`Registry::access_granted`] | any (configurable) | record exists and is enabled |
//! | [`Registry::list_grants`] / [`Registry::list_connected`] | any (configurable) | read a collection |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consent_registry::{Registry, RegistryConfig};
//! use consent_registry::core::AccountName;
//! use consent_registry::store::SqliteStore;
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!     let registry = Registry::new(store, RegistryConfig::default());
//!
//!     let alice = AccountName::new("alice").unwrap();
//!     let bob = AccountName::new("bob").unwrap();
//!
//!     // The host authenticated alice; she grants bob access.
//!     registry.grant_access(&alice, &alice, &bob).await.unwrap();
//!     assert!(registry.access_granted(&bob, &alice, &bob).await.unwrap());
//!
//!     // Bob disclaims it.
//!     registry.revoke_access_by_grantee(&bob, &alice, &bob).await.unwrap();
//! }
//! ```
//!
//! ## Re-exports
//!
//! - `consent_registry::core` - Account names and grant records
//! - `consent_registry::store` - Store trait, SQLite and in-memory backends
//! - `consent_registry::auth` - Authorization gate

pub mod config;
pub mod error;
pub mod grants;
pub mod registry;

// Re-export component crates
pub use consent_registry_auth as auth;
pub use consent_registry_core as core;
pub use consent_registry_store as store;

// Re-export main types for convenience
pub use config::{RegistryConfig, RevocationPolicy};
pub use error::{RegistryError, Result};
pub use grants::GrantStore;
pub use registry::{Registry, RevokeOutcome};

pub use consent_registry_auth::{DenyReason, QueryPolicy};
pub use consent_registry_core::{AccountName, GrantAttributes, GrantRecord, Role};
