//! Database schema and types

use serde::{Deserialize, Serialize};

/// SQL schema for initialization
pub const SCHEMA: &str = r"
CREATE TABLE IF NOT EXISTS credentials (
    user_id INTEGER NOT NULL,
    service TEXT NOT NULL,
    login TEXT NOT NULL,
    password TEXT NOT NULL,
    PRIMARY KEY (user_id, service)
);
";

/// Upsert keyed by `(user_id, service)`; an existing row keeps its key and
/// gets the new login and password.
pub const UPSERT_CREDENTIAL: &str = r"
INSERT INTO credentials (user_id, service, login, password)
VALUES (?1, ?2, ?3, ?4)
ON CONFLICT (user_id, service)
DO UPDATE SET login = excluded.login,
              password = excluded.password
";

/// Stored credential owned by one chat user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CredentialRecord {
    pub user_id: i64,
    pub service: String,
    pub login: String,
    pub password: String,
}

impl CredentialRecord {
    pub fn new(
        user_id: i64,
        service: impl Into<String>,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            user_id,
            service: service.into(),
            login: login.into(),
            password: password.into(),
        }
    }
}
