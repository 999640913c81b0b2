//! cellar-api - Wine cellar inventory backend
//!
//! GraphQL API over SQLite with local photo object storage. Serves
//! the mobile client at /graphql plus REST endpoints for uploads,
//! media, import/export files, health and SSE.

use anyhow::Result;
use cellar_common::config::CellarConfig;
use clap::Parser;
use std::path::PathBuf;
use tracing::{info, Level};
use tracing_subscriber::FmtSubscriber;

use cellar_api::AppState;

#[derive(Parser, Debug)]
#[command(name = "cellar-api", version, about = "Wine cellar inventory backend")]
struct Args {
    /// Configuration file path
    #[arg(short, long, env = "CELLAR_CONFIG")]
    config: Option<PathBuf>,

    /// Listen port; overrides the config file
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable debug logging
    #[arg(long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let level = if args.debug { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    info!("Starting cellar-api");
    info!("Version: {}", env!("CARGO_PKG_VERSION"));

    let mut config = CellarConfig::load(args.config.as_deref())?;
    if let Some(port) = args.port {
        config.port = port;
    }
    info!("Root folder: {}", config.root_folder().display());
    info!("Database: {}", config.database_path().display());

    let addr = format!("{}:{}", config.host, config.port);
    let state = AppState::new(config).await?;
    info!("Database connection established");

    let app = cellar_api::build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);
    info!("GraphQL endpoint: http://{}/graphql", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
