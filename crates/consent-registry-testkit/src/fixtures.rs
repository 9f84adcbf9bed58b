//! Test fixtures and helpers.
//!
//! Common setup code for integration tests.

use std::sync::Once;

use consent_registry::store::{MemoryStore, SqliteStore, Store};
use consent_registry::{AccountName, GrantRecord, Registry, RegistryConfig, Result};

/// A registry plus the usual cast: alice owns records, bob is connected,
/// carol is a bystander.
pub struct TestFixture<S: Store = MemoryStore> {
    pub registry: Registry<S>,
    pub alice: AccountName,
    pub bob: AccountName,
    pub carol: AccountName,
}

impl TestFixture<MemoryStore> {
    /// Hard revocation, open queries, in-memory store.
    pub fn new() -> Self {
        Self::with_config(RegistryConfig::default())
    }

    /// Soft revocation, in-memory store.
    pub fn soft() -> Self {
        Self::with_config(RegistryConfig::soft())
    }

    pub fn with_config(config: RegistryConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl TestFixture<SqliteStore> {
    /// In-memory SQLite store.
    pub fn sqlite(config: RegistryConfig) -> Self {
        let store = SqliteStore::open_memory().expect("in-memory SQLite should open");
        Self::with_store(store, config)
    }
}

impl<S: Store> TestFixture<S> {
    pub fn with_store(store: S, config: RegistryConfig) -> Self {
        Self {
            registry: Registry::new(store, config),
            alice: named("alice"),
            bob: named("bob"),
            carol: named("carol"),
        }
    }

    /// Alice grants bob access with default attributes.
    pub async fn grant_alice_to_bob(&self) -> Result<GrantRecord> {
        self.registry
            .grant_access(&self.alice, &self.alice, &self.bob)
            .await
    }
}

impl Default for TestFixture<MemoryStore> {
    fn default() -> Self {
        Self::new()
    }
}

/// Deterministic, distinct account names: `partya`, `partyb`, ... `partyaa`.
pub fn party_names(count: usize) -> Vec<AccountName> {
    (0..count).map(|i| named(&format!("party{}", suffix(i)))).collect()
}

fn suffix(mut i: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push(b'a' + (i % 26) as u8);
        i /= 26;
        if i == 0 {
            break;
        }
        i -= 1;
    }
    letters.reverse();
    String::from_utf8(letters).expect("ascii letters")
}

fn named(s: &str) -> AccountName {
    AccountName::new(s).expect("fixture account names are valid")
}

static TRACING: Once = Once::new();

/// Install a test-friendly tracing subscriber once per process.
///
/// Output goes through the test harness's capture, at DEBUG and above.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::DEBUG)
            .try_init();
    });
}
