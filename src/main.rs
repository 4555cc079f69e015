use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;

use sheetgate::config;
use sheetgate::router::{app, AppState};
use sheetgate::store::JsonFileStore;

/// JSON/JSONP API server over a tabular sheet document.
#[derive(Debug, Parser)]
#[command(name = "sheetgate", version)]
struct Args {
    /// Listen port (overrides SHEETGATE_PORT / config)
    #[arg(long)]
    port: Option<u16>,

    /// Path of the JSON sheet document (overrides SHEETGATE_DATA / config)
    #[arg(long)]
    data: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present so cargo run picks up SHEETGATE_DATA and friends.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let mut config = config::config().clone();
    if let Some(port) = args.port {
        config.server.port = port;
    }
    if let Some(data) = args.data {
        config.sheets.data_path = Some(data);
    }

    tracing::info!("starting sheetgate in {:?} mode", config.environment);

    let data_path = config
        .sheets
        .data_path
        .clone()
        .context("no sheet document configured; pass --data or set SHEETGATE_DATA")?;
    let store = JsonFileStore::open(&data_path)
        .with_context(|| format!("failed to open sheet document {}", data_path))?;

    let port = config.server.port;
    let state = Arc::new(AppState::new(config, Arc::new(store))?);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("sheetgate listening on http://{}", bind_addr);

    axum::serve(listener, app(state)).await.context("server")?;
    Ok(())
}
