use migration::{Migrator, MigratorTrait};
use sea_orm::Database;
use std::error::Error;
use tracing::{error, info};

use crate::config::ApiConfig;

/// Execute the migrate command
pub async fn execute(config: &ApiConfig, steps: Option<u32>) -> Result<(), Box<dyn Error>> {
    info!("Connecting to database: {}", config.database_url);

    let connection = match Database::connect(&config.database_url).await {
        Ok(conn) => conn,
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            return Err(Box::new(e));
        }
    };

    let all_migrations = Migrator::get_migration_files();
    info!("Found {} migration files", all_migrations.len());
    for m in &all_migrations {
        info!("Migration file: {}", m.name());
    }

    match steps {
        Some(n) => info!("Running {} migrations", n),
        None => info!("Running all pending migrations"),
    }
    match Migrator::up(&connection, steps).await {
        Ok(_) => {
            info!("Migrations applied");
            Ok(())
        }
        Err(e) => {
            error!("Failed to run migrations: {}", e);
            error!("Migration error details: {:?}", e);
            Err(Box::new(e))
        }
    }
}

/// Logs applied and pending migrations
pub async fn status(config: &ApiConfig) -> Result<(), Box<dyn Error>> {
    let connection = Database::connect(&config.database_url).await?;

    let applied = Migrator::get_applied_migrations(&connection).await?;
    let pending = Migrator::get_pending_migrations(&connection).await?;

    info!("{} applied, {} pending", applied.len(), pending.len());
    for m in &applied {
        info!("Applied: {}", m.name());
    }
    for m in &pending {
        info!("Pending: {}", m.name());
    }
    Ok(())
}
