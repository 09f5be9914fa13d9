use nal_chat::{DEFAULT_REQUEST_TIMEOUT_SECS, RuntimeSettings, run_http};

use crate::engine_builder::{EngineOverrides, build_shared_engine};
use crate::resolve::{resolve_optional_positive_usize, resolve_positive_u64, resolve_string};

const DEFAULT_GATEWAY_BIND: &str = "127.0.0.1:5000";

pub(crate) async fn run_gateway_mode(
    bind: Option<String>,
    request_timeout: Option<u64>,
    max_concurrent: Option<usize>,
    overrides: EngineOverrides,
    runtime_settings: &RuntimeSettings,
) -> anyhow::Result<()> {
    let gateway = &runtime_settings.gateway;
    let bind_addr = resolve_string(
        bind,
        "NAL_GATEWAY_BIND",
        gateway.bind.as_deref(),
        DEFAULT_GATEWAY_BIND,
    );
    let request_timeout_secs = resolve_positive_u64(
        request_timeout,
        "NAL_REQUEST_TIMEOUT_SECS",
        gateway.request_timeout_secs,
        DEFAULT_REQUEST_TIMEOUT_SECS,
    );
    let max_concurrent_requests = resolve_optional_positive_usize(
        max_concurrent,
        "NAL_MAX_CONCURRENT_REQUESTS",
        gateway.max_concurrent_requests,
    );
    let engine = build_shared_engine(overrides, runtime_settings).await?;
    run_http(
        engine,
        &bind_addr,
        Some(request_timeout_secs),
        max_concurrent_requests,
    )
    .await
}
