//! Database access layer: pool construction, migrations, entity models,
//! and read repositories.
//!
//! The core subsystems only ever read these entities; creation and
//! mutation belong to the administrative layer.

pub mod models;
pub mod repositories;

use std::time::Duration;

use sqlx::postgres::PgPoolOptions;

/// Shared Postgres connection pool type.
pub type DbPool = sqlx::PgPool;

/// Maximum number of pooled connections.
const MAX_CONNECTIONS: u32 = 10;

/// Upper bound on waiting for a pooled connection. Every resolution read
/// goes through the pool, so this bounds how long a resolve call can block
/// on the database before failing loudly.
const ACQUIRE_TIMEOUT: Duration = Duration::from_secs(5);

/// Create a connection pool for the given database URL.
pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(MAX_CONNECTIONS)
        .acquire_timeout(ACQUIRE_TIMEOUT)
        .connect(database_url)
        .await
}

/// Verify the database is reachable.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(pool).await?;
    Ok(())
}

/// Apply embedded migrations.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
