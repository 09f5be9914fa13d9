use nal_chat::RuntimeSettings;

use crate::engine_builder::{EngineOverrides, build_shared_engine};

pub(crate) async fn run_ask_mode(
    message: String,
    overrides: EngineOverrides,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let engine = build_shared_engine(overrides, runtime_settings).await?;
    let reply = engine.reply(&message).await?;
    tracing::debug!(
        event = "nal.ask.completed",
        intent = reply.intent.as_str(),
        normalized = %reply.normalized,
        score = ?reply.score,
        "ask completed"
    );
    println!("{}", reply.reply);
    Ok(())
}
