//! Process configuration from environment variables

use crate::session::DEFAULT_MAX_SESSIONS;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

const DEFAULT_DB_PATH: &str = "passwords.db";
const DEFAULT_POLL_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingRequired(String),
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Where inbound messages come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportConfig {
    /// Telegram Bot API long polling
    Telegram {
        token: String,
        poll_timeout: Duration,
    },
    /// Lines from stdin, replies to stdout
    Console,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: PathBuf,
    pub max_sessions: usize,
    pub transport: TransportConfig,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let optional = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let db_path = optional("PASSKEEPER_DB_PATH")
            .map_or_else(|| PathBuf::from(DEFAULT_DB_PATH), PathBuf::from);

        let max_sessions = parse_optional(
            "PASSKEEPER_MAX_SESSIONS",
            optional("PASSKEEPER_MAX_SESSIONS"),
        )?
        .unwrap_or(DEFAULT_MAX_SESSIONS);
        if max_sessions == 0 {
            return Err(ConfigError::InvalidValue {
                key: "PASSKEEPER_MAX_SESSIONS".to_string(),
                message: "must be at least 1".to_string(),
            });
        }

        let transport = match optional("PASSKEEPER_TRANSPORT").as_deref() {
            None | Some("telegram") => {
                let token = optional("TOKEN_BOT")
                    .ok_or_else(|| ConfigError::MissingRequired("TOKEN_BOT".to_string()))?;
                let poll_timeout = parse_optional(
                    "PASSKEEPER_POLL_TIMEOUT_SECS",
                    optional("PASSKEEPER_POLL_TIMEOUT_SECS"),
                )?
                .unwrap_or(DEFAULT_POLL_TIMEOUT_SECS);
                TransportConfig::Telegram {
                    token,
                    poll_timeout: Duration::from_secs(poll_timeout),
                }
            }
            Some("console") => TransportConfig::Console,
            Some(other) => {
                return Err(ConfigError::InvalidValue {
                    key: "PASSKEEPER_TRANSPORT".to_string(),
                    message: format!("unknown transport: {other}, expected 'telegram' or 'console'"),
                })
            }
        };

        Ok(Self {
            db_path,
            max_sessions,
            transport,
        })
    }
}

fn parse_optional<T>(key: &str, value: Option<String>) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value
        .map(|s| s.trim().parse())
        .transpose()
        .map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: format!("must be a positive integer: {e}"),
        })
}
