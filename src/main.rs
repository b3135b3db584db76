mod chat;
mod cli;
mod hf;
mod knowledge;
mod lang;
mod prompt;
mod shell;

pub const USER_AGENT: &str = concat!("polyglot-rag/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

use chat::Chatbot;
use cli::Args;
use hf::HfClient;
use knowledge::KnowledgeStore;
use lang::WhatlangDetector;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Ceiling for any single model call, including a cold model load.
const HTTP_TIMEOUT: Duration = Duration::from_secs(180);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("polyglot_rag=info".parse()?),
        )
        .init();

    let args = Args::parse();
    info!(product = %args.product, "starting polyglot-rag");

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let models = HfClient::from_env(http)
        .inspect_err(|e| tracing::error!("model client unavailable: {e}"))?;
    let store = KnowledgeStore::load(&args.index, &args.passages);

    let chatbot = Chatbot::new(
        store,
        WhatlangDetector,
        models.clone(),
        models.clone(),
        models,
    )
    .with_product(args.product);

    shell::run(&chatbot, BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await?;
    info!("session ended");
    Ok(())
}
