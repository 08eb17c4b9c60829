//! Telegram Bot API transport
//!
//! Long-polls `getUpdates`, hands each text message to the dialog engine and
//! sends non-empty replies back with `sendMessage`. Every fetched update is
//! confirmed by advancing the offset, whether or not it carried text.

use crate::engine::{CredentialStore, DialogEngine};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;

const API_BASE: &str = "https://api.telegram.org";
const RETRY_DELAY: Duration = Duration::from_secs(3);

#[derive(Debug, Error)]
pub enum TelegramError {
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("Telegram API error: {0}")]
    Api(String),
}

// ============================================================================
// Telegram API Types
// ============================================================================

/// Telegram API response wrapper.
#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    ok: bool,
    description: Option<String>,
    result: Option<T>,
}

/// https://core.telegram.org/bots/api#update
#[derive(Debug, Deserialize)]
struct TelegramUpdate {
    update_id: i64,
    message: Option<TelegramMessage>,
}

/// https://core.telegram.org/bots/api#message
#[derive(Debug, Deserialize)]
struct TelegramMessage {
    chat: TelegramChat,
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TelegramChat {
    id: i64,
}

#[derive(Debug, Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

#[derive(Debug, Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
}

// ============================================================================
// Client
// ============================================================================

pub struct TelegramClient {
    client: Client,
    base_url: String,
    poll_timeout: Duration,
}

impl TelegramClient {
    pub fn new(token: &str, poll_timeout: Duration) -> Result<Self, TelegramError> {
        // The HTTP timeout must outlast the long-poll window
        let client = Client::builder()
            .timeout(poll_timeout + Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: format!("{API_BASE}/bot{token}"),
            poll_timeout,
        })
    }

    async fn call<B: Serialize + ?Sized, T: serde::de::DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, TelegramError> {
        let response: ApiResponse<T> = self
            .client
            .post(format!("{}/{method}", self.base_url))
            .json(body)
            .send()
            .await?
            .json()
            .await?;

        match response {
            ApiResponse {
                ok: true,
                result: Some(result),
                ..
            } => Ok(result),
            ApiResponse { description, .. } => Err(TelegramError::Api(
                description.unwrap_or_else(|| format!("{method} returned no result")),
            )),
        }
    }

    async fn get_updates(&self, offset: i64) -> Result<Vec<TelegramUpdate>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset,
                timeout: self.poll_timeout.as_secs(),
                allowed_updates: ["message"],
            },
        )
        .await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        let _: serde_json::Value = self
            .call("sendMessage", &SendMessage { chat_id, text })
            .await?;
        Ok(())
    }
}

// ============================================================================
// Polling Loop
// ============================================================================

/// Poll until `shutdown` fires. Chats in one batch are served in parallel;
/// the batch completes before the next poll so per-chat order is kept.
pub async fn run<S>(
    client: TelegramClient,
    engine: Arc<DialogEngine<S>>,
    shutdown: CancellationToken,
) where
    S: CredentialStore + 'static,
{
    let client = Arc::new(client);
    let mut offset = 0;

    tracing::info!("Telegram polling started");

    loop {
        let updates = tokio::select! {
            () = shutdown.cancelled() => break,
            result = client.get_updates(offset) => result,
        };

        let updates = match updates {
            Ok(updates) => updates,
            Err(e) => {
                tracing::warn!(error = %e, "getUpdates failed, retrying");
                tokio::select! {
                    () = shutdown.cancelled() => break,
                    () = tokio::time::sleep(RETRY_DELAY) => continue,
                }
            }
        };

        if let Some(last) = updates.iter().map(|u| u.update_id).max() {
            offset = last + 1;
        }

        let mut batch = JoinSet::new();
        for (chat_id, lines) in group_by_chat(updates) {
            let client = Arc::clone(&client);
            let engine = Arc::clone(&engine);
            batch.spawn(async move {
                for line in lines {
                    let Some(reply) = engine.handle(chat_id, &line).await else {
                        continue;
                    };
                    if reply.trim().is_empty() {
                        continue;
                    }
                    if let Err(e) = client.send_message(chat_id, &reply).await {
                        tracing::warn!(chat_id, error = %e, "sendMessage failed");
                    }
                }
            });
        }
        while let Some(joined) = batch.join_next().await {
            if let Err(e) = joined {
                tracing::error!(error = %e, "Chat task panicked");
            }
        }
    }

    tracing::info!("Telegram polling stopped");
}

/// Text messages grouped by chat, in arrival order within each chat
fn group_by_chat(updates: Vec<TelegramUpdate>) -> Vec<(i64, Vec<String>)> {
    let mut chats: Vec<(i64, Vec<String>)> = Vec::new();

    for update in updates {
        let Some(TelegramMessage {
            chat,
            text: Some(text),
        }) = update.message
        else {
            continue;
        };

        match chats.iter_mut().find(|(id, _)| *id == chat.id) {
            Some((_, lines)) => lines.push(text),
            None => chats.push((chat.id, vec![text])),
        }
    }

    chats
}
