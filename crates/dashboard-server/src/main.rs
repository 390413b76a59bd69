use std::path::PathBuf;

use dashboard_core::{Config, Database};
use dashboard_server::AppState;
use tokio::net::TcpListener;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("dashboard_server=info,dashboard_core=info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let db = match std::env::var_os("DASHBOARD_DB") {
        Some(path) => Database::open_at(&PathBuf::from(path))?,
        None => Database::open()?,
    };

    let addr = format!("{}:{}", config.server.host, config.server_port());
    let listener = TcpListener::bind(&addr).await?;
    info!(
        "dashboard API listening on http://{}/api",
        listener.local_addr()?
    );

    let state = AppState::new(db, config.server.client_origin.clone());
    dashboard_server::serve(listener, state, shutdown_signal()).await?;
    Ok(())
}

#[tokio::main]
async fn main() {
    init_tracing();
    if let Err(e) = run().await {
        error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
