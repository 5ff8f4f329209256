//! recipes-worker - notification delivery worker
//!
//! Separate worker process: dequeues notification jobs recorded by the
//! API's mutations and delivers email over SMTP. Runs fine without SMTP
//! configured (jobs drain without sending), so the catalog never
//! depends on it.

use anyhow::Result;
use clap::Parser;
use recipes_common::config::SmtpConfig;
use recipes_common::notify::Mailer;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "recipes-worker", about = "Recipe notification delivery worker")]
struct Args {
    /// SQLite database path (shared with recipes-api)
    #[arg(long, env = "RECIPES_DB", default_value = "recipes.db")]
    db: PathBuf,

    /// Seconds between queue polls
    #[arg(long, env = "RECIPES_POLL_SECS", default_value_t = 5)]
    poll_secs: u64,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting recipes-worker v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    info!("Database path: {}", args.db.display());

    let pool = recipes_common::db::init_database(&args.db).await?;

    let smtp = SmtpConfig::from_env()?;
    if smtp.is_none() {
        info!("SMTP not configured; notifications will be marked done without delivery");
    }
    let mailer = Mailer::new(smtp)?;

    recipes_worker::run(pool, mailer, Duration::from_secs(args.poll_secs)).await?;

    Ok(())
}
