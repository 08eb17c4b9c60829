//! Dialog state types

use crate::generator::GenerationSettings;
use serde::{Deserialize, Serialize};

/// Everything the bot remembers about one chat user between messages
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Committed generation policy
    pub settings: GenerationSettings,
    /// Which wizard, if any, owns the next line of text
    pub mode: DialogMode,
}

impl Session {
    pub fn with_mode(&self, mode: DialogMode) -> Self {
        Self {
            settings: self.settings,
            mode,
        }
    }
}

// ============================================================================
// Dialog Mode
// ============================================================================

/// At most one wizard is in flight; scratch values live inside the variant
/// and disappear with it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DialogMode {
    /// No wizard in flight, text is parsed as a command
    #[default]
    Idle,

    /// Generation-settings wizard. `draft` is committed only after the last step.
    Settings {
        step: SettingsStep,
        draft: GenerationSettings,
    },

    /// Credential-manager wizard
    Manager { flow: ManagerFlow },
}

impl DialogMode {
    pub fn is_idle(&self) -> bool {
        matches!(self, DialogMode::Idle)
    }

    pub fn settings(step: SettingsStep, draft: GenerationSettings) -> Self {
        DialogMode::Settings { step, draft }
    }

    pub fn manager(flow: ManagerFlow) -> Self {
        DialogMode::Manager { flow }
    }

    /// Short name for logs
    pub fn label(&self) -> &'static str {
        match self {
            DialogMode::Idle => "idle",
            DialogMode::Settings { step, .. } => step.label(),
            DialogMode::Manager { flow } => flow.label(),
        }
    }
}

/// Cursor of the settings wizard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingsStep {
    WaitLength,
    AskDigits,
    AskUpper,
    AskLower,
    AskSpecial,
}

impl SettingsStep {
    fn label(self) -> &'static str {
        match self {
            SettingsStep::WaitLength => "settings_wait_length",
            SettingsStep::AskDigits => "settings_ask_digits",
            SettingsStep::AskUpper => "settings_ask_upper",
            SettingsStep::AskLower => "settings_ask_lower",
            SettingsStep::AskSpecial => "settings_ask_special",
        }
    }
}

/// Cursor of the credential-manager wizard together with its scratch values
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ManagerFlow {
    AddService,
    AddLogin { service: String },
    AddMethod { service: String, login: String },
    AddPassword { service: String, login: String },
    DeleteConfirm { service: String },
    ChangeMethod { service: String },
    ChangePassword { service: String },
}

impl ManagerFlow {
    fn label(&self) -> &'static str {
        match self {
            ManagerFlow::AddService => "add_wait_service",
            ManagerFlow::AddLogin { .. } => "add_wait_login",
            ManagerFlow::AddMethod { .. } => "add_wait_method",
            ManagerFlow::AddPassword { .. } => "add_wait_password",
            ManagerFlow::DeleteConfirm { .. } => "delete_confirm",
            ManagerFlow::ChangeMethod { .. } => "change_wait_method",
            ManagerFlow::ChangePassword { .. } => "change_wait_password",
        }
    }
}

/// How the password for an add or change flow is obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordMethod {
    Generate,
    Manual,
}

impl PasswordMethod {
    /// `1` generates, `2` asks for manual entry
    pub fn parse(text: &str) -> Option<Self> {
        match text {
            "1" => Some(PasswordMethod::Generate),
            "2" => Some(PasswordMethod::Manual),
            _ => None,
        }
    }
}

/// `+` is yes, `-` is no, anything else is not an answer
pub fn parse_yes_no(text: &str) -> Option<bool> {
    match text {
        "+" => Some(true),
        "-" => Some(false),
        _ => None,
    }
}
