//! # Consent Registry Authorization
//!
//! Decides whether an authenticated caller may invoke a registry action.
//!
//! ## Overview
//!
//! Access control in the registry is bilateral. The owner of a collection
//! creates, modifies and withdraws grants; the connected user a grant points
//! at may always disclaim it. Reads are open by default.
//!
//! The gate is a pure predicate. It never sees the store and never verifies
//! identities: the caller value it receives has already been authenticated
//! by the host.
//!
//! ## Rules
//!
//! | Operation class | Allowed caller |
//! |---|---|
//! | [`Operation::Grant`], [`Operation::Regrant`], [`Operation::Revoke`], [`Operation::UpdateProfile`] | owner |
//! | [`Operation::RevokeByGrantee`] | connected user |
//! | [`Operation::Query`] | anyone, or owner/connected user under [`QueryPolicy::Participants`] |
//! | [`Operation::List`] | anyone, or owner under [`QueryPolicy::Participants`] |
//!
//! ## Usage
//!
//! ```rust
//! use consent_registry_auth::{AuthorizationGate, Decision, DenyReason, Operation};
//! use consent_registry_core::AccountName;
//!
//! let alice = AccountName::new("alice").unwrap();
//! let bob = AccountName::new("bob").unwrap();
//! let gate = AuthorizationGate::default();
//!
//! assert_eq!(gate.authorize(Operation::Grant, &alice, &alice, Some(&bob)), Decision::Allow);
//! assert_eq!(
//!     gate.authorize(Operation::Grant, &bob, &alice, Some(&bob)),
//!     Decision::Deny(DenyReason::NotOwner),
//! );
//! ```

pub mod gate;
pub mod operation;

pub use gate::{AuthorizationGate, Decision, DenyReason, QueryPolicy};
pub use operation::Operation;
