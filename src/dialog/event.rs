//! Events that drive the dialog

use crate::db::CredentialRecord;

/// Events that trigger state transitions
#[derive(Debug, Clone)]
pub enum Event {
    // User events
    /// One inbound line of text from the chat
    Text(String),

    // Effect outcomes
    /// Result of an `Effect::Lookup`
    Lookup {
        service: String,
        purpose: LookupPurpose,
        record: Option<CredentialRecord>,
    },
    /// Result of an `Effect::ListServices`
    Listed { services: Vec<String> },
    /// Result of an `Effect::Generate`
    Generated {
        purpose: GeneratePurpose,
        password: String,
    },
    /// The generator refused the policy
    GenerationFailed,
    /// A credential store call failed; the rest of the batch was dropped
    StorageFailed,
}

/// Why a credential was looked up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupPurpose {
    /// `/get`
    Show,
    /// `/delete`, asks for confirmation when present
    ConfirmDelete,
    /// `/change`, asks for the password method when present
    BeginChange,
    /// Last step of a change: keep the stored login, replace the password
    FinishChange { password: String, generated: bool },
}

/// What a generated password is for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GeneratePurpose {
    /// `/password`
    Quick,
    AddCredential { service: String, login: String },
    ChangeCredential { service: String },
}
