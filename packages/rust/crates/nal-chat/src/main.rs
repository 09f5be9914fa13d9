//! nal-chat CLI: HTTP gateway, stdio loop, or one-shot ask.
//!
//! Logging: set `RUST_LOG=nal_chat=debug,nal_faq=debug` (or pass `--verbose`)
//! to see pipeline decisions on stderr.

mod cli;
mod engine_builder;
mod nodes;
mod resolve;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use nal_chat::{load_runtime_settings, set_config_home_override};

use crate::cli::{Cli, Command};
use crate::engine_builder::EngineOverrides;
use crate::nodes::{run_ask_mode, run_gateway_mode, run_stdio_mode};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // RUST_LOG overrides; --verbose => debug; else info
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if cli.verbose {
            "nal_chat=debug,nal_faq=debug"
        } else {
            "nal_chat=info,nal_faq=info"
        })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if let Some(conf_dir) = cli.conf.clone() {
        set_config_home_override(conf_dir);
    }
    let runtime_settings = load_runtime_settings();
    let overrides = EngineOverrides {
        knowledge: cli.knowledge,
        embedding_provider: cli.embedding_provider.map(Into::into),
    };

    match cli.command {
        Command::Gateway {
            bind,
            request_timeout,
            max_concurrent,
        } => {
            run_gateway_mode(
                bind,
                request_timeout,
                max_concurrent,
                overrides,
                &runtime_settings,
            )
            .await
        }
        Command::Stdio => run_stdio_mode(overrides, &runtime_settings).await,
        Command::Ask { message } => run_ask_mode(message, overrides, &runtime_settings).await,
    }
}
