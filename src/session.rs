//! Process-wide table of per-user dialog sessions
//!
//! The table lock is held only to fetch or insert a handle. Each handle has
//! its own async mutex, so one user's messages are processed one at a time
//! while different users never wait on each other.

use crate::dialog::Session;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle to one user's session
pub type SessionHandle = Arc<tokio::sync::Mutex<Session>>;

pub const DEFAULT_MAX_SESSIONS: usize = 10_000;

struct Entry {
    handle: SessionHandle,
    last_used: u64,
}

#[derive(Default)]
struct Table {
    entries: HashMap<i64, Entry>,
    /// Logical clock for least-recently-used eviction
    tick: u64,
}

/// Sessions are created on first contact and evicted least-recently-used
/// once `capacity` is exceeded.
pub struct SessionStore {
    table: Mutex<Table>,
    capacity: usize,
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_SESSIONS)
    }
}

impl SessionStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            table: Mutex::new(Table::default()),
            capacity: capacity.max(1),
        }
    }

    /// Get the user's session, creating a default one on first contact
    pub fn get(&self, user_id: i64) -> SessionHandle {
        // The table holds no invariants a panicking holder could break
        let mut table = self.table.lock().unwrap_or_else(PoisonError::into_inner);
        table.tick += 1;
        let tick = table.tick;

        if let Some(entry) = table.entries.get_mut(&user_id) {
            entry.last_used = tick;
            return Arc::clone(&entry.handle);
        }

        if table.entries.len() >= self.capacity {
            evict_least_recent(&mut table);
        }

        let handle = SessionHandle::default();
        table.entries.insert(
            user_id,
            Entry {
                handle: Arc::clone(&handle),
                last_used: tick,
            },
        );
        tracing::debug!(user_id, sessions = table.entries.len(), "Created session");
        handle
    }

    pub fn len(&self) -> usize {
        self.table
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .entries
            .len()
    }

    #[allow(dead_code)] // API completeness
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Drop the least recently used session nobody is holding right now.
/// A session in use is never evicted, so the table may briefly exceed capacity.
fn evict_least_recent(table: &mut Table) {
    let victim = table
        .entries
        .iter()
        .filter(|(_, entry)| Arc::strong_count(&entry.handle) == 1)
        .min_by_key(|(_, entry)| entry.last_used)
        .map(|(user_id, _)| *user_id);

    if let Some(user_id) = victim {
        table.entries.remove(&user_id);
        tracing::debug!(user_id, "Evicted idle session");
    }
}
