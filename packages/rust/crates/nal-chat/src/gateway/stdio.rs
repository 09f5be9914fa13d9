//! Stdio gateway: read line from stdin → chat engine → print reply.

use std::sync::Arc;

use anyhow::Result;
use nal_faq::ChatEngine;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

/// Answer one message per line until EOF. Blank lines are skipped.
pub async fn run_stdio(engine: Arc<ChatEngine>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();
    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let reply = engine.reply(line).await?;
        stdout.write_all(reply.reply.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }
    Ok(())
}
