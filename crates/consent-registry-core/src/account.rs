//! Account names: the identity type for owners, grantees and callers.
//!
//! An account name is 1 to 12 characters from `.12345abcdefghijklmnopqrstuvwxyz`
//! packed into a `u64`, five bits per character, most significant first. The
//! low four bits are always zero. Because the alphabet is packed in ASCII
//! order and unused slots are zero, ordering by the packed value is the same
//! as ordering by the string.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

use crate::error::{CoreError, Result};

/// Maximum number of characters in an account name.
pub const MAX_LEN: usize = 12;

const BITS_PER_CHAR: u32 = 5;
const SYMBOL_MASK: u64 = 0x1f;
const TAIL_MASK: u64 = 0x0f;
const ALPHABET: &[u8; 32] = b".12345abcdefghijklmnopqrstuvwxyz";

/// A packed account identity.
///
/// Cheap to copy and hash; the packed `u64` is the storage key.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountName(u64);

impl AccountName {
    /// Parse and pack an account name.
    pub fn new(name: &str) -> Result<Self> {
        let invalid = |reason| CoreError::InvalidAccountName {
            name: name.to_string(),
            reason,
        };

        if name.is_empty() {
            return Err(invalid("name is empty"));
        }
        if name.len() > MAX_LEN {
            return Err(invalid("name is longer than 12 characters"));
        }
        if name.ends_with('.') {
            return Err(invalid("name ends with '.'"));
        }

        let mut value = 0u64;
        for (i, byte) in name.bytes().enumerate() {
            let symbol = symbol_of(byte).ok_or_else(|| invalid("character outside [a-z1-5.]"))?;
            value |= symbol << shift_for(i);
        }

        Ok(Self(value))
    }

    /// Unpack a stored value, rejecting anything that is not a canonical name.
    pub fn from_u64(value: u64) -> Result<Self> {
        if value == 0 || value & TAIL_MASK != 0 {
            return Err(CoreError::InvalidAccountValue(value));
        }
        Ok(Self(value))
    }

    /// The packed value.
    pub const fn value(&self) -> u64 {
        self.0
    }

    /// Big-endian bytes of the packed value. Byte order preserves name order.
    pub const fn to_be_bytes(&self) -> [u8; 8] {
        self.0.to_be_bytes()
    }

    fn len(&self) -> usize {
        (0..MAX_LEN)
            .rev()
            .find(|&i| self.symbol_at(i) != 0)
            .map_or(0, |i| i + 1)
    }

    fn symbol_at(&self, i: usize) -> u64 {
        (self.0 >> shift_for(i)) & SYMBOL_MASK
    }
}

fn shift_for(i: usize) -> u32 {
    64 - BITS_PER_CHAR * (i as u32 + 1)
}

fn symbol_of(byte: u8) -> Option<u64> {
    match byte {
        b'a'..=b'z' => Some(u64::from(byte - b'a') + 6),
        b'1'..=b'5' => Some(u64::from(byte - b'1') + 1),
        b'.' => Some(0),
        _ => None,
    }
}

impl fmt::Display for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for i in 0..self.len() {
            let symbol = self.symbol_at(i) as usize;
            write!(f, "{}", ALPHABET[symbol] as char)?;
        }
        Ok(())
    }
}

impl fmt::Debug for AccountName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "AccountName({})", self)
    }
}

impl FromStr for AccountName {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

impl TryFrom<u64> for AccountName {
    type Error = CoreError;

    fn try_from(value: u64) -> Result<Self> {
        Self::from_u64(value)
    }
}

impl From<AccountName> for u64 {
    fn from(name: AccountName) -> Self {
        name.0
    }
}

impl Serialize for AccountName {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for AccountName {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::new(&s).map_err(serde::de::Error::custom)
    }
}
