//! # Consent Registry Testkit
//!
//! Testing utilities for the consent registry.
//!
//! ## Overview
//!
//! This crate provides:
//!
//! - **Fixtures**: a registry plus a cast of named accounts
//! - **Generators**: Proptest strategies for account names and attributes
//! - **Fault injection**: [`LossyStore`], a store that acknowledges writes it
//!   does not make, for exercising the registry's postcondition checks
//!
//! ## Property Testing
//!
//! ```rust,ignore
//! use proptest::prelude::*;
//! use consent_registry_testkit::generators::account_name;
//!
//! proptest! {
//!     #[test]
//!     fn names_round_trip(name in account_name()) {
//!         prop_assert_eq!(name.to_string().parse::<AccountName>().unwrap(), name);
//!     }
//! }
//! ```
//!
//! ## Test Fixtures
//!
//! ```rust
//! use consent_registry_testkit::TestFixture;
//!
//! # tokio::runtime::Runtime::new().unwrap().block_on(async {
//! let fixture = TestFixture::new();
//! fixture.grant_alice_to_bob().await.unwrap();
//! # });
//! ```

pub mod fixtures;
pub mod generators;
pub mod lossy;

pub use fixtures::{init_tracing, party_names, TestFixture};
pub use lossy::{Fault, LossyStore};
