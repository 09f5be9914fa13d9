use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use nal_chat::EmbeddingProviderKind;

#[derive(Parser)]
#[command(name = "nal-chat")]
#[command(about = "NAL Real Estate FAQ assistant. HTTP gateway, stdio loop, or one-shot ask.")]
pub(crate) struct Cli {
    /// Override config home (user settings live under `<DIR>/nal-chat/settings.yaml`).
    #[arg(long, global = true)]
    pub(crate) conf: Option<PathBuf>,

    /// Debug-level logs for nal_chat and nal_faq (ignored when RUST_LOG is set).
    #[arg(long, short, global = true)]
    pub(crate) verbose: bool,

    /// Knowledge CSV with `question` and `answer` columns.
    #[arg(long, global = true)]
    pub(crate) knowledge: Option<PathBuf>,

    /// Embedding provider (default: http).
    #[arg(long, value_enum, global = true)]
    pub(crate) embedding_provider: Option<EmbeddingProviderArg>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub(crate) enum EmbeddingProviderArg {
    Http,
    Tfidf,
}

impl From<EmbeddingProviderArg> for EmbeddingProviderKind {
    fn from(value: EmbeddingProviderArg) -> Self {
        match value {
            EmbeddingProviderArg::Http => Self::Http,
            EmbeddingProviderArg::Tfidf => Self::TfIdf,
        }
    }
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Run HTTP server (POST /chat, GET /health). Default bind: 127.0.0.1:5000
    Gateway {
        /// Listen address (e.g. 0.0.0.0:5000)
        #[arg(long)]
        bind: Option<String>,

        /// Per-request timeout in seconds (default: 60)
        #[arg(long)]
        request_timeout: Option<u64>,

        /// Max concurrent chat requests (omit for no limit)
        #[arg(long)]
        max_concurrent: Option<usize>,
    },
    /// Read one message per line from stdin and print the reply. Exit on EOF.
    Stdio,
    /// Answer a single message and exit.
    Ask {
        /// Message text.
        message: String,
    },
}
