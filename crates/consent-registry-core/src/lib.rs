//! # Consent Registry Core
//!
//! Pure types for the consent registry: the identities that own and receive
//! grants, and the grant record stored for each pair.
//!
//! This crate contains no I/O, no storage, no authorization logic.
//!
//! ## Key Types
//!
//! - [`AccountName`] - Packed 64-bit account identity (owner, grantee, caller)
//! - [`GrantRecord`] - The record stored per (owner, connected user) pair
//! - [`GrantAttributes`] - The mutable part of a record (role, enabled)
//! - [`Role`] - Small enumerated role flag

pub mod account;
pub mod error;
pub mod grant;

pub use account::AccountName;
pub use error::{CoreError, Result};
pub use grant::{GrantAttributes, GrantRecord, Role};
