//! Session-store migration commands.
//!
//! Both servers keep sessions in `PostgreSQL` through
//! `tower-sessions-sqlx-store`. Neither migrates on startup; run these once per
//! database before the first deploy.
//!
//! # Usage
//!
//! ```bash
//! loomwear-cli migrate storefront
//! loomwear-cli migrate admin
//! loomwear-cli migrate all
//! ```
//!
//! # Environment Variables
//!
//! - `STOREFRONT_DATABASE_URL` - storefront session database
//! - `ADMIN_DATABASE_URL` - admin session database
//! - `DATABASE_URL` - fallback for either

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use thiserror::Error;
use tower_sessions_sqlx_store::PostgresStore;

#[derive(Debug, Error)]
pub enum MigrationError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Run storefront session-store migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn storefront() -> Result<(), MigrationError> {
    run("storefront", "STOREFRONT_DATABASE_URL").await
}

/// Run admin session-store migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing or the migration fails.
pub async fn admin() -> Result<(), MigrationError> {
    run("admin", "ADMIN_DATABASE_URL").await
}

async fn run(target: &str, env_key: &'static str) -> Result<(), MigrationError> {
    dotenvy::dotenv().ok();
    let database_url = database_url(env_key)?;

    tracing::info!("Connecting to {target} database...");
    let pool = PgPool::connect(database_url.expose_secret()).await?;

    tracing::info!("Creating {target} session table...");
    PostgresStore::new(pool).migrate().await?;

    tracing::info!("{target} migrations complete!");
    Ok(())
}

fn database_url(primary_key: &'static str) -> Result<SecretString, MigrationError> {
    std::env::var(primary_key)
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| MigrationError::MissingEnvVar(primary_key))
}
