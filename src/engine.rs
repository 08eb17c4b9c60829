//! Dialog engine: runs the state machine against real I/O
//!
//! One inbound line becomes an `Event::Text`. Each transition's effects are
//! executed in order; effects that produce an outcome feed it back as the
//! next event. The user's session stays locked until no event is left.

pub mod traits;

#[cfg(test)]
pub mod testing;

pub use traits::*;

use crate::dialog::event::GeneratePurpose;
use crate::dialog::{transition, Effect, Event, Session};
use crate::generator::{self, GenerationSettings};
use crate::session::SessionStore;
use std::collections::VecDeque;

/// Upper bound on transitions per inbound message. The longest chain
/// (auto-generated change) takes four.
const MAX_ROUNDS: usize = 8;

pub struct DialogEngine<S: CredentialStore> {
    store: S,
    sessions: SessionStore,
}

impl<S: CredentialStore> DialogEngine<S> {
    pub fn new(store: S, sessions: SessionStore) -> Self {
        Self { store, sessions }
    }

    #[allow(dead_code)] // Useful for tests
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn sessions(&self) -> &SessionStore {
        &self.sessions
    }

    /// Process one inbound line. `None` means send nothing.
    pub async fn handle(&self, user_id: i64, text: &str) -> Option<String> {
        let handle = self.sessions.get(user_id);
        let mut session = handle.lock().await;

        let mut replies = Vec::new();
        let mut pending = VecDeque::from([Event::Text(text.to_string())]);
        let mut rounds = 0;

        while let Some(event) = pending.pop_front() {
            rounds += 1;
            if rounds > MAX_ROUNDS {
                tracing::error!(user_id, "Dialog did not settle, dropping remaining events");
                break;
            }

            let result = match transition(&session, event) {
                Ok(result) => result,
                Err(e) => {
                    tracing::error!(user_id, error = %e, "Rejected dialog event");
                    break;
                }
            };

            if result.new_session.mode != session.mode {
                tracing::debug!(
                    user_id,
                    from = session.mode.label(),
                    to = result.new_session.mode.label(),
                    "Dialog mode changed"
                );
            }
            *session = result.new_session;

            pending.extend(self.execute_effects(user_id, result.effects, &mut replies).await);
        }

        log_settled(user_id, &session, replies.len());

        if replies.is_empty() {
            None
        } else {
            Some(replies.join("\n"))
        }
    }

    /// Run effects in order and collect follow-up events. A storage failure
    /// drops the rest of the batch, so no confirmation follows a failed write.
    async fn execute_effects(
        &self,
        user_id: i64,
        effects: Vec<Effect>,
        replies: &mut Vec<String>,
    ) -> Vec<Event> {
        let mut follow_ups = Vec::new();

        let mut effects = effects.into_iter();
        while let Some(effect) = effects.next() {
            match self.execute_effect(user_id, effect, replies).await {
                Ok(Some(event)) => follow_ups.push(event),
                Ok(None) => {}
                Err(e) => {
                    let skipped = effects.filter(Effect::is_storage).count();
                    tracing::error!(user_id, error = %e, skipped, "Credential store failed");
                    return vec![Event::StorageFailed];
                }
            }
        }

        follow_ups
    }

    async fn execute_effect(
        &self,
        user_id: i64,
        effect: Effect,
        replies: &mut Vec<String>,
    ) -> StoreResult<Option<Event>> {
        match effect {
            Effect::Reply(text) => {
                replies.push(text);
                Ok(None)
            }

            Effect::Lookup { service, purpose } => {
                let record = self.store.find(user_id, &service).await?;
                tracing::debug!(user_id, service = %service, found = record.is_some(), "Looked up credential");
                Ok(Some(Event::Lookup {
                    service,
                    purpose,
                    record,
                }))
            }

            Effect::ListServices => {
                let services = self.store.list_services(user_id).await?;
                Ok(Some(Event::Listed { services }))
            }

            Effect::Generate { settings, purpose } => Ok(Some(generate(user_id, &settings, purpose))),

            Effect::Save {
                service,
                login,
                password,
            } => {
                self.store.save(user_id, &service, &login, &password).await?;
                tracing::info!(user_id, service = %service, "Saved credential");
                Ok(None)
            }

            Effect::Delete { service } => {
                let removed = self.store.delete(user_id, &service).await?;
                tracing::info!(user_id, service = %service, removed, "Deleted credential");
                Ok(None)
            }
        }
    }
}

fn generate(user_id: i64, settings: &GenerationSettings, purpose: GeneratePurpose) -> Event {
    match generator::generate(settings) {
        Ok(password) => Event::Generated { purpose, password },
        Err(e) => {
            tracing::warn!(user_id, error = %e, "Password generation refused");
            Event::GenerationFailed
        }
    }
}

fn log_settled(user_id: i64, session: &Session, reply_count: usize) {
    tracing::info!(
        user_id,
        mode = session.mode.label(),
        replies = reply_count,
        "Handled message"
    );
}
