//! Create-admin command - Bootstraps an administrator account.
//!
//! Admins cannot register over HTTP; the first one is created here.

use crate::cli::args::CreateAdminArgs;
use crate::config::Config;
use crate::errors::{AppError, AppResult};
use crate::infra::Database;
use crate::services::{ServiceContainer, Services};

/// Execute the create-admin command
pub async fn execute(args: CreateAdminArgs, config: Config) -> AppResult<()> {
    let db = Database::connect(&config)
        .await
        .map_err(|e| AppError::internal(format!("Database connection failed: {}", e)))?;

    let services = Services::from_connection(db.get_connection(), config);
    let admin = services
        .auth()
        .create_admin(args.name, args.email, args.password)
        .await?;

    println!("Admin created: {} <{}>", admin.id, admin.email);
    Ok(())
}
