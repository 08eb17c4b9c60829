//! Passkeeper bot - chat-driven password generator and credential keeper
//!
//! Each inbound line runs through a per-user dialog state machine; credentials
//! persist in SQLite keyed by (user, service).

mod config;
mod console;
mod db;
mod dialog;
mod engine;
mod generator;
mod session;
mod telegram;

use config::{Config, TransportConfig};
use db::Database;
use engine::{DatabaseStore, DialogEngine};
use session::SessionStore;
use std::sync::Arc;
use telegram::TelegramClient;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "passkeeper_bot=info".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false)
                .with_writer(std::io::stderr),
        )
        .init();

    let config = Config::from_env()?;

    // Ensure database directory exists
    if let Some(parent) = config.db_path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }

    tracing::info!(path = %config.db_path.display(), "Opening database");
    let db = Database::open(&config.db_path)?;

    let engine = Arc::new(DialogEngine::new(
        DatabaseStore::new(db),
        SessionStore::new(config.max_sessions),
    ));

    let shutdown = CancellationToken::new();
    tokio::spawn({
        let shutdown = shutdown.clone();
        async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for shutdown signal");
                return;
            }
            tracing::info!("Shutdown requested");
            shutdown.cancel();
        }
    });

    match config.transport {
        TransportConfig::Telegram {
            token,
            poll_timeout,
        } => {
            let client = TelegramClient::new(&token, poll_timeout)?;
            telegram::run(client, Arc::clone(&engine), shutdown).await;
        }
        TransportConfig::Console => console::run(&*engine, shutdown).await?,
    }

    tracing::info!(
        sessions = engine.sessions().len(),
        "Passkeeper bot stopped"
    );
    Ok(())
}
