//! SQLite-backed local mirror.
//!
//! # Responsibility
//! - Persist namespace documents in the `kv_entries` table.
//!
//! # Invariants
//! - One row per namespace; saves upsert and bump `updated_at`.
//! - Saves leave `pending_push` alone; only `set_pending` changes it.
//! - Rows holding invalid JSON surface as `Serialization` errors instead of
//!   being masked.

use crate::db::{open_db, open_db_in_memory};
use crate::repo::kv_store::{KvStore, Namespace, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use std::path::Path;

/// Namespace documents stored in a local SQLite file.
pub struct SqliteKvStore {
    conn: Connection,
}

impl SqliteKvStore {
    /// Wraps an already migrated connection.
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Opens (or creates) the state file at `path`.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Ok(Self::new(open_db(path)?))
    }

    pub fn open_in_memory() -> StoreResult<Self> {
        Ok(Self::new(open_db_in_memory()?))
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

impl KvStore for SqliteKvStore {
    fn load(&self, namespace: Namespace) -> StoreResult<Option<Value>> {
        let text: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE namespace = ?1;",
                params![namespace.as_str()],
                |row| row.get(0),
            )
            .optional()?;

        match text {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn save(&self, namespace: Namespace, value: &Value) -> StoreResult<()> {
        let text = serde_json::to_string(value)?;
        self.conn.execute(
            "INSERT INTO kv_entries (namespace, value) VALUES (?1, ?2)
             ON CONFLICT(namespace) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![namespace.as_str(), text],
        )?;
        Ok(())
    }

    fn is_pending(&self, namespace: Namespace) -> StoreResult<bool> {
        let pending: Option<bool> = self
            .conn
            .query_row(
                "SELECT pending_push FROM kv_entries WHERE namespace = ?1;",
                params![namespace.as_str()],
                |row| row.get(0),
            )
            .optional()?;
        Ok(pending.unwrap_or(false))
    }

    fn set_pending(&self, namespace: Namespace, pending: bool) -> StoreResult<()> {
        self.conn.execute(
            "UPDATE kv_entries SET pending_push = ?2 WHERE namespace = ?1;",
            params![namespace.as_str(), pending],
        )?;
        Ok(())
    }
}
