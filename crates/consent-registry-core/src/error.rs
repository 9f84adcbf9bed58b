//! Error types for the consent registry core.

use thiserror::Error;

/// Errors raised while constructing core values.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("invalid account name {name:?}: {reason}")]
    InvalidAccountName { name: String, reason: &'static str },

    #[error("invalid packed account name {0:#018x}")]
    InvalidAccountValue(u64),

    #[error("unknown role flag: {0}")]
    InvalidRole(u8),
}

/// Result type for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
