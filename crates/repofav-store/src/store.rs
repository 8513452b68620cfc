use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension};
use thiserror::Error;
use tracing::debug;

/// Set once any search has completed successfully
pub const HAS_DATA_KEY: &str = "hasData";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, StoreError>;

/// Persistent boolean flags keyed by name.
///
/// A tiny key/value table that survives restarts. Unknown keys read as false.
pub struct SessionStore {
    conn: Connection,
}

impl SessionStore {
    pub fn open(db_path: impl AsRef<Path>) -> Result<Self> {
        let db_path = db_path.as_ref();
        if let Some(parent) = db_path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let conn = Connection::open(db_path)?;
        Self::init_schema(&conn)?;
        debug!("Opened session store at {}", db_path.display());

        Ok(Self { conn })
    }

    /// Throwaway store that forgets everything on drop
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_schema(&conn)?;
        Ok(Self { conn })
    }

    fn init_schema(conn: &Connection) -> Result<()> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS session_flags (
                key TEXT PRIMARY KEY,
                value INTEGER NOT NULL,
                updated_at INTEGER NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Read a flag; unknown keys read as `false`
    pub fn get_flag(&self, key: &str) -> Result<bool> {
        let value: Option<i64> = self
            .conn
            .query_row(
                "SELECT value FROM session_flags WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;

        Ok(value.map(|v| v != 0).unwrap_or(false))
    }

    pub fn set_flag(&self, key: &str, value: bool) -> Result<()> {
        let now = chrono::Utc::now().timestamp();
        self.conn.execute(
            "INSERT INTO session_flags (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value as i64, now],
        )?;
        debug!("Session flag {} = {}", key, value);
        Ok(())
    }

    pub fn has_data(&self) -> Result<bool> {
        self.get_flag(HAS_DATA_KEY)
    }

    pub fn mark_has_data(&self) -> Result<()> {
        self.set_flag(HAS_DATA_KEY, true)
    }
}
