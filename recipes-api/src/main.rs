//! recipes-api - HTTP service for the family recipe catalog

use anyhow::Result;
use clap::Parser;
use recipes_api::{build_router, AppState};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "recipes-api", about = "Family recipe catalog HTTP service")]
struct Args {
    /// SQLite database path
    #[arg(long, env = "RECIPES_DB", default_value = "recipes.db")]
    db: PathBuf,

    /// Listen address
    #[arg(long, env = "RECIPES_BIND", default_value = "127.0.0.1:8080")]
    bind: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!(
        "Starting recipes-api v{}",
        env!("CARGO_PKG_VERSION")
    );

    let args = Args::parse();
    info!("Database path: {}", args.db.display());

    let pool = recipes_common::db::init_database(&args.db).await?;

    let state = AppState::new(pool);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&args.bind).await?;
    info!("recipes-api listening on http://{}", args.bind);
    info!("Health check: http://{}/api/health", args.bind);

    axum::serve(listener, app).await?;

    Ok(())
}
