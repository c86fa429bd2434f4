//! Recipe Finder CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Create or upgrade the schema
//! rf-cli migrate
//!
//! # Replace all data with a JSON backup
//! rf-cli seed --dir data/backup
//!
//! # Add a backup on top of existing data
//! rf-cli seed --dir data/backup --keep-existing
//! ```
//!
//! # Environment Variables
//!
//! - `RECIPES_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "rf-cli")]
#[command(author, version, about = "Recipe Finder CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load users, recipes and favorites from a JSON backup directory
    Seed {
        /// Directory containing users.json, recipes.json and favorites.json
        #[arg(short, long, default_value = "data/backup")]
        dir: PathBuf,

        /// Keep existing rows instead of clearing all tables first
        #[arg(long)]
        keep_existing: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Seed { dir, keep_existing } => {
            commands::seed::run(&dir, keep_existing).await?;
        }
    }
    Ok(())
}
