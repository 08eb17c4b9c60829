//! Trait abstractions for engine I/O
//!
//! These traits enable testing the engine with mock implementations.

use crate::db::{CredentialRecord, Database, DbError};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// A credential store call failed. Never conflated with "not found".
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Db(#[from] DbError),
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Durable `(user_id, service) -> (login, password)` storage
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Insert or overwrite the record for `(user_id, service)`
    async fn save(
        &self,
        user_id: i64,
        service: &str,
        login: &str,
        password: &str,
    ) -> StoreResult<()>;

    /// Exact, case-sensitive lookup
    async fn find(&self, user_id: i64, service: &str) -> StoreResult<Option<CredentialRecord>>;

    /// Remove the record if present; returns whether anything was removed
    async fn delete(&self, user_id: i64, service: &str) -> StoreResult<bool>;

    /// The user's service names, ascending
    async fn list_services(&self, user_id: i64) -> StoreResult<Vec<String>>;
}

// ============================================================================
// Arc implementation for trait objects
// ============================================================================

#[async_trait]
impl<T: CredentialStore + ?Sized> CredentialStore for Arc<T> {
    async fn save(
        &self,
        user_id: i64,
        service: &str,
        login: &str,
        password: &str,
    ) -> StoreResult<()> {
        (**self).save(user_id, service, login, password).await
    }

    async fn find(&self, user_id: i64, service: &str) -> StoreResult<Option<CredentialRecord>> {
        (**self).find(user_id, service).await
    }

    async fn delete(&self, user_id: i64, service: &str) -> StoreResult<bool> {
        (**self).delete(user_id, service).await
    }

    async fn list_services(&self, user_id: i64) -> StoreResult<Vec<String>> {
        (**self).list_services(user_id).await
    }
}

// ============================================================================
// Production Adapter
// ============================================================================

/// Adapter to use Database as a `CredentialStore`
#[derive(Clone)]
pub struct DatabaseStore {
    db: Database,
}

impl DatabaseStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn inner(&self) -> &Database {
        &self.db
    }
}

#[async_trait]
impl CredentialStore for DatabaseStore {
    async fn save(
        &self,
        user_id: i64,
        service: &str,
        login: &str,
        password: &str,
    ) -> StoreResult<()> {
        Ok(self.db.save_credential(user_id, service, login, password)?)
    }

    async fn find(&self, user_id: i64, service: &str) -> StoreResult<Option<CredentialRecord>> {
        Ok(self.db.find_credential(user_id, service)?)
    }

    async fn delete(&self, user_id: i64, service: &str) -> StoreResult<bool> {
        Ok(self.db.delete_credential(user_id, service)?)
    }

    async fn list_services(&self, user_id: i64) -> StoreResult<Vec<String>> {
        Ok(self.db.list_services(user_id)?)
    }
}
