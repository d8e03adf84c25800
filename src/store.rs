// 🔐 Credential Store - Key/value persistence for the lock credential
// In-memory for embedding and tests, SQLite + WAL for surviving restarts

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// Key the lock stores its credential under
pub const DEFAULT_CREDENTIAL_KEY: &str = "password";

/// Synchronous single-key read/write surface used by the session
pub trait CredentialStore {
    /// Stored value, or `None` when the key was never set
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Insert or replace the value for `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Delete `key`; returns whether anything was removed
    fn remove(&mut self, key: &str) -> Result<bool>;
}

impl<S: CredentialStore + ?Sized> CredentialStore for &mut S {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}

impl<S: CredentialStore + ?Sized> CredentialStore for Box<S> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        (**self).remove(key)
    }
}

// ============================================================================
// MEMORY STORE
// ============================================================================

#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl CredentialStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        Ok(self.values.remove(key).is_some())
    }
}

// ============================================================================
// SQLITE STORE
// ============================================================================

/// Credential row with its last write time
#[derive(Debug, Clone, PartialEq)]
pub struct StoredCredential {
    pub key: String,
    pub value: String,
    pub updated_at: DateTime<Utc>,
}

pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Open (or create) the database file and make sure the schema exists
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)
            .with_context(|| format!("Failed to open credential database {}", path.display()))?;
        setup_database(&conn)?;
        debug!(path = %path.display(), "credential database ready");
        Ok(SqliteStore { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        setup_database(&conn)?;
        Ok(SqliteStore { conn })
    }

    /// Full row for `key`, including when it was written
    pub fn credential(&self, key: &str) -> Result<Option<StoredCredential>> {
        let row = self
            .conn
            .query_row(
                "SELECT key, value, updated_at FROM credentials WHERE key = ?1",
                params![key],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                    ))
                },
            )
            .optional()?;

        match row {
            Some((key, value, updated_at)) => {
                let updated_at = DateTime::parse_from_rfc3339(&updated_at)
                    .with_context(|| format!("Bad updated_at for credential {}", key))?
                    .with_timezone(&Utc);
                Ok(Some(StoredCredential {
                    key,
                    value,
                    updated_at,
                }))
            }
            None => Ok(None),
        }
    }
}

pub fn setup_database(conn: &Connection) -> Result<()> {
    // In-memory databases silently keep their own journal mode
    conn.pragma_update(None, "journal_mode", "WAL")?;

    conn.execute(
        "CREATE TABLE IF NOT EXISTS credentials (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )",
        [],
    )?;

    Ok(())
}

impl CredentialStore for SqliteStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM credentials WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()
            .context("Failed to read credential")?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.conn
            .execute(
                "INSERT INTO credentials (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                params![key, value, Utc::now().to_rfc3339()],
            )
            .context("Failed to write credential")?;
        debug!(key, "credential written");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<bool> {
        let deleted = self
            .conn
            .execute("DELETE FROM credentials WHERE key = ?1", params![key])
            .context("Failed to delete credential")?;
        Ok(deleted > 0)
    }
}
