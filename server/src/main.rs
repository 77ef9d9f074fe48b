use anyhow::Result;
use axum::Router;
use bookrec_core::config::{DEFAULT_DATA_DIR, DEFAULT_PORT};
use bookrec_core::TokenizerOptions;
use clap::Parser;
use std::net::SocketAddr;
use tracing_subscriber::{fmt, EnvFilter};
use server::build_app;
use tokio::net::TcpListener;

#[derive(Parser)]
struct Args {
    /// Directory with books.csv, tags.csv and book_tags.csv
    #[arg(long, default_value = DEFAULT_DATA_DIR)]
    data: String,
    /// Host to bind
    #[arg(long, default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, default_value_t = DEFAULT_PORT)]
    port: u16,
    /// Stem terms before indexing
    #[arg(long, default_value_t = false)]
    stem: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    // The index is built before the listener exists; a bad data directory aborts startup.
    let data = args.data.clone();
    let options = TokenizerOptions { stem: args.stem };
    let app: Router = tokio::task::spawn_blocking(move || build_app(data, options)).await??;

    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
