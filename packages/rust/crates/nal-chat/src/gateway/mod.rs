//! Gateway namespace: HTTP and stdio entrypoints.

mod http;
mod stdio;

pub use http::{
    ChatRequest, ChatResponse, DEFAULT_REQUEST_TIMEOUT_SECS, GatewayHealthResponse, GatewayState,
    router, router_with_state, run_http,
};
pub use stdio::run_stdio;
