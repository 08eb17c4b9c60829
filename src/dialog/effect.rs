//! Effects produced by state transitions

use super::event::{GeneratePurpose, LookupPurpose};
use crate::generator::GenerationSettings;

/// Effects to be executed after state transition, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Send text back to the user
    Reply(String),

    /// Look up one credential, answered by `Event::Lookup`
    Lookup {
        service: String,
        purpose: LookupPurpose,
    },

    /// List the user's services, answered by `Event::Listed`
    ListServices,

    /// Generate a password, answered by `Event::Generated`
    Generate {
        settings: GenerationSettings,
        purpose: GeneratePurpose,
    },

    /// Upsert a credential
    Save {
        service: String,
        login: String,
        password: String,
    },

    /// Remove a credential
    Delete { service: String },
}

impl Effect {
    pub fn reply(text: impl Into<String>) -> Self {
        Effect::Reply(text.into())
    }

    pub fn lookup(service: impl Into<String>, purpose: LookupPurpose) -> Self {
        Effect::Lookup {
            service: service.into(),
            purpose,
        }
    }

    pub fn save(
        service: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Effect::Save {
            service: service.into(),
            login: login.into(),
            password: password.into(),
        }
    }

    /// Effects that touch the credential store
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Effect::Lookup { .. } | Effect::ListServices | Effect::Save { .. } | Effect::Delete { .. }
        )
    }
}
