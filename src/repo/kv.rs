use rusqlite::{Connection, OptionalExtension};
use anyhow::{Context, Result};

/// Key-value repository over the kv_store table
pub struct KvRepo;

impl KvRepo {
    /// Read the value stored under `key`
    pub fn get(conn: &Connection, key: &str) -> Result<Option<String>> {
        conn.query_row(
            "SELECT value FROM kv_store WHERE key = ?1",
            [key],
            |row| row.get(0),
        )
        .optional()
        .with_context(|| format!("Failed to read key '{}'", key))
    }

    /// Overwrite the value stored under `key`
    pub fn set(conn: &Connection, key: &str, value: &str) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        conn.execute(
            "INSERT INTO kv_store (key, value, modified_ts) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, modified_ts = excluded.modified_ts",
            rusqlite::params![key, value, now],
        )
        .with_context(|| format!("Failed to write key '{}'", key))?;
        Ok(())
    }

    /// Remove `key`. Returns whether a row was deleted.
    pub fn remove(conn: &Connection, key: &str) -> Result<bool> {
        let deleted = conn
            .execute("DELETE FROM kv_store WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove key '{}'", key))?;
        Ok(deleted > 0)
    }
}
