use crate::config::StudioConfig;
use crate::database::Database;
use anyhow::{Context, Result};

pub struct Bootstrap {
    pub database: Database,
}

/// Prepares the data directory and brings the database schema up to date.
pub fn initialize(config: &StudioConfig) -> Result<Bootstrap> {
    std::fs::create_dir_all(&config.paths.data_dir)
        .with_context(|| format!("failed to create data dir {:?}", config.paths.data_dir))?;

    let database = Database::connect(&config.paths)?;
    let newly_created = database.ensure_migrations()?;
    tracing::info!(
        db_path = ?config.paths.db_path,
        newly_created,
        "database ready"
    );
    Ok(Bootstrap { database })
}
