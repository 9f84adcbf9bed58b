//! SQLite implementation of the Store trait.
//!
//! The durable backend. Uses rusqlite with bundled SQLite, wrapped in async
//! via `tokio::task::spawn_blocking`.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rusqlite::{params, Connection, OptionalExtension};

use consent_registry_core::{AccountName, GrantRecord, Role};

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{InsertResult, Store};

/// SQLite-based store implementation.
///
/// Thread-safe via internal Mutex. All operations run on the blocking pool.
#[derive(Clone)]
pub struct SqliteStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open a SQLite database at the given path.
    ///
    /// Creates the file and runs migrations if needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        tracing::debug!(path = %path.display(), "opening grant store");

        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory SQLite database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a closure against the connection on the blocking pool.
    async fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = Arc::clone(&self.conn);

        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|e| StoreError::Poisoned(e.to_string()))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Task(e.to_string()))?
    }
}

/// Columns of a `grants` row before validation.
struct RawGrant {
    connected_user: Vec<u8>,
    role: i64,
    enabled: bool,
    granted_at: i64,
    updated_at: i64,
}

const SELECT_COLUMNS: &str = "connected_user, role, enabled, granted_at, updated_at";

impl RawGrant {
    fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            connected_user: row.get("connected_user")?,
            role: row.get("role")?,
            enabled: row.get("enabled")?,
            granted_at: row.get("granted_at")?,
            updated_at: row.get("updated_at")?,
        })
    }

    fn into_record(self) -> Result<GrantRecord> {
        let connected_user = decode_account(&self.connected_user)?;
        let role = u8::try_from(self.role)
            .ok()
            .and_then(Role::from_u8)
            .ok_or_else(|| StoreError::InvalidData(format!("unknown role flag {}", self.role)))?;

        Ok(GrantRecord {
            connected_user,
            role,
            enabled: self.enabled,
            granted_at: self.granted_at,
            updated_at: self.updated_at,
        })
    }
}

fn decode_account(bytes: &[u8]) -> Result<AccountName> {
    let arr: [u8; 8] = bytes
        .try_into()
        .map_err(|_| StoreError::InvalidData(format!("account key of {} bytes", bytes.len())))?;
    AccountName::from_u64(u64::from_be_bytes(arr)).map_err(|e| StoreError::InvalidData(e.to_string()))
}

#[async_trait]
impl Store for SqliteStore {
    async fn insert(&self, owner: &AccountName, record: &GrantRecord) -> Result<InsertResult> {
        let owner_key = owner.to_be_bytes();
        let record = record.clone();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "INSERT INTO grants (owner, connected_user, role, enabled, granted_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                 ON CONFLICT (owner, connected_user) DO NOTHING",
                params![
                    owner_key.as_slice(),
                    record.connected_user.to_be_bytes().as_slice(),
                    record.role.to_u8(),
                    record.enabled,
                    record.granted_at,
                    record.updated_at,
                ],
            )?;

            Ok(if changed == 0 {
                InsertResult::AlreadyExists
            } else {
                InsertResult::Inserted
            })
        })
        .await
    }

    async fn get(&self, owner: &AccountName, user: &AccountName) -> Result<Option<GrantRecord>> {
        let owner_key = owner.to_be_bytes();
        let user_key = user.to_be_bytes();

        self.with_conn(move |conn| {
            let raw = conn
                .query_row(
                    &format!(
                        "SELECT {} FROM grants WHERE owner = ?1 AND connected_user = ?2",
                        SELECT_COLUMNS
                    ),
                    params![owner_key.as_slice(), user_key.as_slice()],
                    RawGrant::from_row,
                )
                .optional()?;

            raw.map(RawGrant::into_record).transpose()
        })
        .await
    }

    async fn update(&self, owner: &AccountName, record: &GrantRecord) -> Result<bool> {
        let owner_key = owner.to_be_bytes();
        let record = record.clone();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "UPDATE grants SET role = ?3, enabled = ?4, granted_at = ?5, updated_at = ?6
                 WHERE owner = ?1 AND connected_user = ?2",
                params![
                    owner_key.as_slice(),
                    record.connected_user.to_be_bytes().as_slice(),
                    record.role.to_u8(),
                    record.enabled,
                    record.granted_at,
                    record.updated_at,
                ],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn delete(&self, owner: &AccountName, user: &AccountName) -> Result<bool> {
        let owner_key = owner.to_be_bytes();
        let user_key = user.to_be_bytes();

        self.with_conn(move |conn| {
            let changed = conn.execute(
                "DELETE FROM grants WHERE owner = ?1 AND connected_user = ?2",
                params![owner_key.as_slice(), user_key.as_slice()],
            )?;
            Ok(changed > 0)
        })
        .await
    }

    async fn list(&self, owner: &AccountName) -> Result<Vec<GrantRecord>> {
        let owner_key = owner.to_be_bytes();

        self.with_conn(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {} FROM grants WHERE owner = ?1 ORDER BY connected_user",
                SELECT_COLUMNS
            ))?;

            let rows = stmt
                .query_map(params![owner_key.as_slice()], RawGrant::from_row)?
                .collect::<rusqlite::Result<Vec<_>>>()?;

            rows.into_iter().map(RawGrant::into_record).collect()
        })
        .await
    }

    async fn count(&self, owner: &AccountName) -> Result<usize> {
        let owner_key = owner.to_be_bytes();

        self.with_conn(move |conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM grants WHERE owner = ?1",
                params![owner_key.as_slice()],
                |row| row.get(0),
            )?;
            usize::try_from(count).map_err(|_| StoreError::InvalidData(format!("row count {}", count)))
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use consent_registry_core::GrantAttributes;

    fn name(s: &str) -> AccountName {
        AccountName::new(s).unwrap()
    }

    fn record(user: &str) -> GrantRecord {
        GrantRecord::new(name(user), GrantAttributes::default(), 1234567890000)
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = name("alice");

        let result = store.insert(&alice, &record("bob")).await.unwrap();
        assert_eq!(result, InsertResult::Inserted);

        let retrieved = store.get(&alice, &name("bob")).await.unwrap().unwrap();
        assert_eq!(retrieved, record("bob"));
    }

    #[tokio::test]
    async fn test_duplicate_insert() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = name("alice");

        let r1 = store.insert(&alice, &record("bob")).await.unwrap();
        assert_eq!(r1, InsertResult::Inserted);

        let r2 = store.insert(&alice, &record("bob")).await.unwrap();
        assert_eq!(r2, InsertResult::AlreadyExists);
    }

    #[tokio::test]
    async fn test_update_and_delete() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = name("alice");

        assert!(!store.update(&alice, &record("bob")).await.unwrap());

        store.insert(&alice, &record("bob")).await.unwrap();
        let doctor = record("bob").with_attributes(GrantAttributes::new(Role::Doctor, false), 1234567899999);
        assert!(store.update(&alice, &doctor).await.unwrap());
        assert_eq!(store.get(&alice, &name("bob")).await.unwrap(), Some(doctor));

        assert!(store.delete(&alice, &name("bob")).await.unwrap());
        assert!(!store.delete(&alice, &name("bob")).await.unwrap());
        assert!(store.get(&alice, &name("bob")).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_list_orders_by_name() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = name("alice");

        // "zed" packs above i64::MAX; byte order must still sort it last.
        for user in ["zed", "bob", "kate", "a"] {
            store.insert(&alice, &record(user)).await.unwrap();
        }
        store.insert(&name("carol"), &record("dave")).await.unwrap();

        let users: Vec<String> = store
            .list(&alice)
            .await
            .unwrap()
            .iter()
            .map(|r| r.connected_user.to_string())
            .collect();
        assert_eq!(users, vec!["a", "bob", "kate", "zed"]);
        assert_eq!(store.count(&alice).await.unwrap(), 4);
        assert_eq!(store.count(&name("carol")).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_rejects_corrupt_rows() {
        let store = SqliteStore::open_memory().unwrap();
        let alice = name("alice");
        store.insert(&alice, &record("bob")).await.unwrap();

        store
            .with_conn(|conn| {
                conn.execute("UPDATE grants SET role = 42", [])?;
                Ok(())
            })
            .await
            .unwrap();

        let err = store.get(&alice, &name("bob")).await.unwrap_err();
        assert!(matches!(err, StoreError::InvalidData(_)));
    }

    #[tokio::test]
    async fn test_persists_across_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("grants.db");
        let alice = name("alice");

        {
            let store = SqliteStore::open(&path).unwrap();
            store.insert(&alice, &record("bob")).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).unwrap();
        assert_eq!(
            reopened.get(&alice, &name("bob")).await.unwrap(),
            Some(record("bob"))
        );
    }
}
