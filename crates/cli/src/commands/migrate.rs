//! Database migration command.
//!
//! Applies the SQL files under `crates/api/migrations/` in order. Already
//! applied versions are skipped, so running it twice is harmless.

use tracing::info;

use recipe_finder_api::db;

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration fails to apply.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let database_url = super::database_url()?;

    info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    info!(
        available = db::MIGRATOR.iter().count(),
        "Running migrations..."
    );
    db::MIGRATOR.run(&pool).await?;

    info!("Migrations complete!");
    Ok(())
}
