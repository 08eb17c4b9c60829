//! Local console transport: stdin lines in, replies on stdout
//!
//! All input belongs to a single fixed user.

use crate::engine::{CredentialStore, DialogEngine};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};
use tokio_util::sync::CancellationToken;

pub const CONSOLE_USER_ID: i64 = 0;

pub async fn run<S: CredentialStore>(
    engine: &DialogEngine<S>,
    shutdown: CancellationToken,
) -> std::io::Result<()> {
    tracing::info!("Console transport started");
    serve(
        engine,
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        shutdown,
    )
    .await?;
    tracing::info!("Console transport stopped");
    Ok(())
}

async fn serve<S, R, W>(
    engine: &DialogEngine<S>,
    input: R,
    mut output: W,
    shutdown: CancellationToken,
) -> std::io::Result<()>
where
    S: CredentialStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    loop {
        let line = tokio::select! {
            biased;
            () = shutdown.cancelled() => break,
            line = lines.next_line() => line?,
        };
        // EOF
        let Some(line) = line else { break };

        if let Some(reply) = engine.handle(CONSOLE_USER_ID, &line).await {
            output.write_all(reply.as_bytes()).await?;
            if !reply.ends_with('\n') {
                output.write_all(b"\n").await?;
            }
            output.flush().await?;
        }
    }

    Ok(())
}
