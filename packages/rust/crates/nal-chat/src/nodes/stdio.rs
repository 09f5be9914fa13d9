use nal_chat::{RuntimeSettings, run_stdio};

use crate::engine_builder::{EngineOverrides, build_shared_engine};

pub(crate) async fn run_stdio_mode(
    overrides: EngineOverrides,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let engine = build_shared_engine(overrides, runtime_settings).await?;
    run_stdio(engine).await
}
