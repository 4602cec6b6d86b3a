use anyhow::Result;
use clap::Parser;
use llm::TextGenerator;
use server::{build_app, AppConfig};
use std::net::SocketAddr;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

/// JSON API for saving, searching and brainstorming stories.
#[derive(Parser)]
struct Args {
    /// Story store (JSONL) path
    #[arg(long, default_value = "./data/stories.jsonl")]
    store: String,
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let generator = TextGenerator::from_env();
    tracing::info!(llm = generator.is_available(), "starting");
    let app = build_app(AppConfig::from_env(args.store), generator)?;

    let addr = SocketAddr::new(args.host.parse()?, args.port);
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
