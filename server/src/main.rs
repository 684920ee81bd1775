use anyhow::Result;
use clap::Parser;
use reviewlens_core::store::{SledStore, StoreConfig};
use reviewlens_server::build_app;
use reviewlens_server::reply::{ReplyClient, ReplyConfig};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
struct Args {
    /// Review database path
    #[arg(long, default_value = "./reviews.db")]
    db: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = 8080)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();

    let store = Arc::new(SledStore::open(&StoreConfig::new(&args.db))?);
    let reply = match std::env::var("OPENAI_API_KEY") {
        Ok(key) => Some(Arc::new(ReplyClient::new(ReplyConfig::new(key)))),
        Err(_) => {
            tracing::warn!("OPENAI_API_KEY unset, reply suggestions disabled");
            None
        }
    };
    let app = build_app(store, reply);

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
