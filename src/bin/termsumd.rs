//! termsumd, the legal document summarizer daemon.
//!
//! Serves `POST /api/summarize` and `GET /api/health` over HTTP.

use std::sync::Arc;

use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use termsum::server::{self, AppState, Config, Secrets};

/// Termsum daemon: plain-language summaries of terms and policies.
#[derive(Parser)]
#[command(name = "termsumd")]
#[command(version = termsum::PKG_VERSION)]
#[command(about = "Legal document summarizer daemon")]
struct Args {
    /// Path to configuration file.
    #[arg(short, long, env = "TERMSUM_CONFIG")]
    config: Option<std::path::PathBuf>,

    /// Override the listen address from the config file.
    #[arg(short, long)]
    address: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();

    let mut config = Config::load(args.config.as_deref())?;
    if let Some(address) = args.address {
        config.server.address = address;
    }
    let secrets = Secrets::load()?;

    let api_key = secrets.api_key();
    if api_key.is_none() {
        // Still serve; each summarize call reports the configuration error.
        warn!(critical = true, "no Perplexity API key configured");
    }

    let summarizer = config.builder().api_key_opt(api_key).build()?;
    let state = AppState::new(Arc::new(summarizer), config.input_limits());
    let router = server::router(state, &config.server);

    info!(
        version = termsum::version_string(),
        address = %config.server.address,
        "termsumd starting"
    );

    let listener = tokio::net::TcpListener::bind(&config.server.address).await?;
    server::serve(listener, router).await?;

    Ok(())
}
