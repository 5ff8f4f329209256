//! recipes-import - Word-document migration tool
//!
//! `parse` prints parsed recipes as JSON without touching the database
//! (dry run), `migrate` walks a directory of .docx files and inserts
//! everything that parses, `ai-parse` runs the AI-assisted parser
//! instead of the rule-based one.

use anyhow::Result;
use chrono::Utc;
use clap::{Parser, Subcommand};
use recipes_common::model::NewRecipe;
use recipes_common::{db, retry};
use recipes_import::{ai, docx, parser};
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};
use walkdir::WalkDir;

#[derive(Parser, Debug)]
#[command(name = "recipes-import", about = "Migrate Word-document recipes into the catalog")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse documents and print the recipes as JSON (dry run)
    Parse {
        /// .docx files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
    /// Parse every .docx under a directory and insert into the database
    Migrate {
        /// Directory to scan for .docx files
        dir: PathBuf,

        /// SQLite database path
        #[arg(long, env = "RECIPES_DB", default_value = "recipes.db")]
        db: PathBuf,
    },
    /// Parse documents with the AI-assisted parser and print JSON
    AiParse {
        /// .docx files to parse
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Starting recipes-import v{}", env!("CARGO_PKG_VERSION"));

    let args = Args::parse();
    match args.command {
        Command::Parse { files } => parse_files(&files)?,
        Command::Migrate { dir, db } => migrate_directory(&dir, &db).await?,
        Command::AiParse { files } => ai_parse_files(&files).await?,
    }

    Ok(())
}

fn parse_files(files: &[PathBuf]) -> Result<()> {
    let mut failed = 0usize;

    for path in files {
        match parse_document(path) {
            Ok(recipe) => {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            }
            Err(e) => {
                error!("Failed to parse {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} documents failed to parse", failed, files.len());
    }
    Ok(())
}

async fn migrate_directory(dir: &Path, db_path: &Path) -> Result<()> {
    let documents: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .map(|ext| ext.eq_ignore_ascii_case("docx"))
                .unwrap_or(false)
        })
        .collect();

    info!("Found {} Word documents under {}", documents.len(), dir.display());

    let pool = db::init_database(db_path).await?;

    let mut inserted = 0usize;
    let mut skipped = 0usize;

    for path in &documents {
        let parsed = match parse_document(path) {
            Ok(recipe) => recipe,
            Err(e) => {
                warn!("Skipping {}: {}", path.display(), e);
                skipped += 1;
                continue;
            }
        };

        let errors = parsed.validate();
        if !errors.is_empty() {
            let details: Vec<String> = errors
                .iter()
                .map(|e| format!("{}: {}", e.field, e.message))
                .collect();
            warn!("Skipping {}: {}", path.display(), details.join(", "));
            skipped += 1;
            continue;
        }

        let recipe = parsed.into_recipe(Utc::now());
        match retry::with_retries("insert migrated recipe", || {
            db::insert_recipe(&pool, &recipe)
        })
        .await
        {
            Ok(()) => {
                info!("Migrated {} ({})", recipe.title, path.display());
                inserted += 1;
            }
            Err(e) => {
                error!("Failed to insert {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    info!("Migration complete: {} inserted, {} skipped", inserted, skipped);
    Ok(())
}

async fn ai_parse_files(files: &[PathBuf]) -> Result<()> {
    let parser = ai::AiParser::from_env()?;
    let mut failed = 0usize;

    for path in files {
        let result = match docx::extract_text(path) {
            Ok(text) => parser.parse_recipe_text(&text, path).await,
            Err(e) => Err(e),
        };
        match result {
            Ok(recipe) => {
                println!("{}", serde_json::to_string_pretty(&recipe)?);
            }
            Err(e) => {
                error!("Failed to parse {}: {}", path.display(), e);
                failed += 1;
            }
        }
    }

    if failed > 0 {
        anyhow::bail!("{} of {} documents failed to parse", failed, files.len());
    }
    Ok(())
}

fn parse_document(path: &Path) -> recipes_common::Result<NewRecipe> {
    let text = docx::extract_text(path)?;
    parser::parse_recipe_text(&text, path)
}
