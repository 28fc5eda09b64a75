//! PostgreSQL pool for the note and task store.

use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr};
use sea_orm_migration::MigratorTrait;
use std::time::Duration;
use tracing::info;

use crate::retry::{RetryConfig, retry_connect};

/// Pool settings used by every service in the workspace
pub fn connect_options(database_url: &str) -> ConnectOptions {
    let mut opt = ConnectOptions::new(database_url);
    opt.max_connections(32)
        .min_connections(2)
        .connect_timeout(Duration::from_secs(8))
        .acquire_timeout(Duration::from_secs(8))
        .idle_timeout(Duration::from_secs(300))
        .sqlx_logging(true);
    opt
}

/// Open a pool against `database_url`
pub async fn connect(database_url: &str) -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect(connect_options(database_url)).await?;
    info!("Connected to PostgreSQL");
    Ok(db)
}

/// [`connect`] retried per `retry_config`
pub async fn connect_with_retry(
    database_url: &str,
    retry_config: &RetryConfig,
) -> Result<DatabaseConnection, DbErr> {
    retry_connect(retry_config, || connect(database_url)).await
}

/// Connect using `DATABASE_URL`
#[cfg(feature = "config")]
pub async fn connect_from_env() -> crate::DatabaseResult<DatabaseConnection> {
    use core_config::FromEnv;

    let config = core_config::database::DatabaseConfig::from_env()?;
    Ok(connect_with_retry(&config.url, &RetryConfig::default()).await?)
}

/// Apply all pending migrations of `M`
pub async fn run_migrations<M: MigratorTrait>(
    db: &DatabaseConnection,
    app_name: &str,
) -> Result<(), DbErr> {
    info!(app = app_name, "Running database migrations");
    M::up(db, None).await?;
    info!(app = app_name, "Migrations complete");
    Ok(())
}
