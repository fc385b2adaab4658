//! PostgreSQL access for the college-management tooling.
//!
//! - [`provision`]: login role creation and schema (re)creation
//! - [`access`]: ownership discovery and privilege repair
//! - [`loader`]: batched CSV loading
//! - [`repositories`]: multi-row inserts, counts and truncation

use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub mod access;
pub mod identifiers;
pub mod loader;
pub mod provision;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Embedded schema migrations (tables, indexes, sequences).
pub static MIGRATOR: Migrator = sqlx::migrate!("../../db/migrations");

/// Create a connection pool from a database URL.
///
/// The tools run one statement at a time, so a handful of connections is
/// plenty.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(4)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to prove the connection works.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Server version string, for the connection banner.
pub async fn server_version(pool: &DbPool) -> Result<String, sqlx::Error> {
    let (version,): (String,) = sqlx::query_as("SHOW server_version")
        .fetch_one(pool)
        .await?;
    Ok(version)
}

/// Role the pool is connected as.
pub async fn current_user(pool: &DbPool) -> Result<String, sqlx::Error> {
    let (user,): (String,) = sqlx::query_as("SELECT current_user::text")
        .fetch_one(pool)
        .await?;
    Ok(user)
}
