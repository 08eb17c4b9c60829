//! Mock implementations for testing
//!
//! These mocks enable engine testing without real I/O.

use super::traits::{CredentialStore, StoreError, StoreResult};
use crate::db::CredentialRecord;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// In-memory credential store with failure injection
#[derive(Default)]
pub struct MockStore {
    records: Mutex<BTreeMap<(i64, String), (String, String)>>,
    failing: AtomicBool,
    /// Record of every store call, e.g. `"save Shop"`
    pub calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl MockStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail until reset
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Seed a record directly
    pub fn insert(&self, user_id: i64, service: &str, login: &str, password: &str) {
        self.records.lock().unwrap().insert(
            (user_id, service.to_string()),
            (login.to_string(), password.to_string()),
        );
    }

    /// Remove a record behind the engine's back
    pub fn remove(&self, user_id: i64, service: &str) {
        self.records
            .lock()
            .unwrap()
            .remove(&(user_id, service.to_string()));
    }

    pub fn recorded_calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn record(&self, call: String) -> StoreResult<()> {
        self.calls.lock().unwrap().push(call);
        if self.failing.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("injected failure".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for MockStore {
    async fn save(
        &self,
        user_id: i64,
        service: &str,
        login: &str,
        password: &str,
    ) -> StoreResult<()> {
        self.record(format!("save {service}"))?;
        self.insert(user_id, service, login, password);
        Ok(())
    }

    async fn find(&self, user_id: i64, service: &str) -> StoreResult<Option<CredentialRecord>> {
        self.record(format!("find {service}"))?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .get(&(user_id, service.to_string()))
            .map(|(login, password)| CredentialRecord::new(user_id, service, login, password)))
    }

    async fn delete(&self, user_id: i64, service: &str) -> StoreResult<bool> {
        self.record(format!("delete {service}"))?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .remove(&(user_id, service.to_string()))
            .is_some())
    }

    async fn list_services(&self, user_id: i64) -> StoreResult<Vec<String>> {
        self.record("list".to_string())?;
        Ok(self
            .records
            .lock()
            .unwrap()
            .keys()
            .filter(|(owner, _)| *owner == user_id)
            .map(|(_, service)| service.clone())
            .collect())
    }
}
