//! Database module for the credential store
//!
//! One SQLite table keyed by `(user_id, service)`. Data survives restarts.

mod schema;

pub use schema::*;

use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        let conn = Connection::open(path)?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        let conn = Connection::open_in_memory()?;
        let db = Self {
            conn: Arc::new(Mutex::new(conn)),
        };
        db.run_migrations()?;
        Ok(db)
    }

    fn run_migrations(&self) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
    }

    fn lock(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    // ==================== Credential Operations ====================

    /// Insert a credential or overwrite login and password of the existing one
    pub fn save_credential(
        &self,
        user_id: i64,
        service: &str,
        login: &str,
        password: &str,
    ) -> DbResult<()> {
        let conn = self.lock()?;
        conn.execute(UPSERT_CREDENTIAL, params![user_id, service, login, password])?;
        Ok(())
    }

    /// Exact, case-sensitive lookup by service name
    pub fn find_credential(
        &self,
        user_id: i64,
        service: &str,
    ) -> DbResult<Option<CredentialRecord>> {
        let conn = self.lock()?;
        conn.query_row(
            "SELECT user_id, service, login, password FROM credentials
             WHERE user_id = ?1 AND service = ?2",
            params![user_id, service],
            |row| {
                Ok(CredentialRecord {
                    user_id: row.get(0)?,
                    service: row.get(1)?,
                    login: row.get(2)?,
                    password: row.get(3)?,
                })
            },
        )
        .optional()
        .map_err(DbError::from)
    }

    /// Delete a credential. Returns whether a row was removed.
    pub fn delete_credential(&self, user_id: i64, service: &str) -> DbResult<bool> {
        let conn = self.lock()?;
        let deleted = conn.execute(
            "DELETE FROM credentials WHERE user_id = ?1 AND service = ?2",
            params![user_id, service],
        )?;
        Ok(deleted > 0)
    }

    /// Service names owned by the user, byte-wise ascending
    pub fn list_services(&self, user_id: i64) -> DbResult<Vec<String>> {
        let conn = self.lock()?;
        let mut stmt =
            conn.prepare("SELECT service FROM credentials WHERE user_id = ?1 ORDER BY service")?;

        let rows = stmt.query_map(params![user_id], |row| row.get(0))?;

        rows.collect::<Result<Vec<_>, _>>().map_err(DbError::from)
    }
}
