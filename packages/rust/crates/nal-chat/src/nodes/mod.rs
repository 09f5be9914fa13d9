mod ask;
mod gateway;
mod stdio;

pub(crate) use ask::run_ask_mode;
pub(crate) use gateway::run_gateway_mode;
pub(crate) use stdio::run_stdio_mode;
