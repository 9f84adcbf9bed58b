//! # Consent Registry Store
//!
//! The persistent keyed store the registry runs on. Records are addressed by
//! `(owner, connected_user)`; each owner's records form an independent
//! collection that exists implicitly once it holds a record.
//!
//! ## Key Types
//!
//! - [`Store`] - The async trait for all storage operations
//! - [`SqliteStore`] - SQLite-based persistent storage
//! - [`MemoryStore`] - In-memory storage for tests and embedding
//! - [`InsertResult`] - Result of inserting a record
//!
//! ## Usage
//!
//! ```rust,no_run
//! use consent_registry_core::{AccountName, GrantAttributes, GrantRecord};
//! use consent_registry_store::{InsertResult, SqliteStore, Store};
//!
//! async fn example() {
//!     let store = SqliteStore::open("registry.db").unwrap();
//!
//!     let alice = AccountName::new("alice").unwrap();
//!     let bob = AccountName::new("bob").unwrap();
//!     let record = GrantRecord::new(bob, GrantAttributes::default(), 0);
//!
//!     let result = store.insert(&alice, &record).await.unwrap();
//!     assert_eq!(result, InsertResult::Inserted);
//! }
//! ```
//!
//! ## Design Notes
//!
//! - **No overwrites**: `insert` never replaces an existing record and `update`
//!   never creates one. The caller decides which mutation it means.
//! - **No verification**: the store reports what it did; checking that a
//!   mutation actually took effect is the registry's job.

pub mod error;
pub mod memory;
pub mod migration;
pub mod sqlite;
pub mod traits;

pub use error::{Result, StoreError};
pub use memory::MemoryStore;
pub use sqlite::SqliteStore;
pub use traits::{InsertResult, Store};
