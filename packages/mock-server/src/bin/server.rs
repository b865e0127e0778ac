use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use cms_client::{MemoryPageStore, DEFAULT_EMAIL, DEFAULT_PASSWORD};
use cms_model::Credentials;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cms-mock-server")]
#[command(about = "Local stand-in for the CMS REST backend", long_about = None)]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, default_value_t = 3001)]
    port: u16,

    /// Address to bind
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Email accepted by the login route
    #[arg(long, env = "CMS_MOCK_EMAIL", default_value = DEFAULT_EMAIL)]
    email: String,

    /// Password accepted by the login route
    #[arg(long, env = "CMS_MOCK_PASSWORD", default_value = DEFAULT_PASSWORD)]
    password: String,

    /// Start without the sample pages
    #[arg(long)]
    empty: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let credentials = Credentials::new(args.email, args.password);
    let store = if args.empty {
        MemoryPageStore::new(credentials)
    } else {
        MemoryPageStore::seeded(credentials)
    };

    let addr: SocketAddr = format!("{}:{}", args.host, args.port)
        .parse()
        .with_context(|| format!("Invalid listen address {}:{}", args.host, args.port))?;
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;

    info!(
        %addr,
        pages = store.page_count().await,
        "mock CMS backend listening on http://{}/api",
        addr
    );

    cms_mock_server::serve(listener, Arc::new(store))
        .await
        .context("Server error")?;

    Ok(())
}
