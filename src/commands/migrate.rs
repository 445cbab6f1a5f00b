//! Migrate command - Database migration management.

use sea_orm::DbErr;

use crate::cli::args::{MigrateAction, MigrateArgs};
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;

fn migration_failed(e: DbErr) -> AppError {
    AppError::internal(format!("Migration failed: {}", e))
}

/// Execute the migrate command
pub async fn execute(args: MigrateArgs, config: Config) -> AppResult<()> {
    // Connect without auto-running migrations for manual control
    let db = Database::connect_without_migrations(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    match args.action {
        MigrateAction::Up => {
            db.run_migrations().await.map_err(migration_failed)?;
            tracing::info!("Migrations applied");
        }
        MigrateAction::Down => {
            db.rollback_migration().await.map_err(migration_failed)?;
            tracing::info!("Last migration rolled back");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await.map_err(migration_failed)?;
            for (name, applied) in status {
                println!("{:<55} {}", name, if applied { "applied" } else { "pending" });
            }
        }
        MigrateAction::Fresh => {
            tracing::warn!("Dropping every table and re-running all migrations");
            db.fresh_migrations().await.map_err(migration_failed)?;
            tracing::info!("Schema rebuilt");
        }
    }

    Ok(())
}
