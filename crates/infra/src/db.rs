//! Database wiring: connection pool and schema migrations.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

use crate::camp_store::StoreError;
use crate::camp_store::postgres::map_sqlx_error;

/// Open a Postgres connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool, StoreError> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .map_err(|e| map_sqlx_error("connect", e))
}

/// Upgrade the schema to the latest migration under `migrations/`.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Migration(e.to_string()))?;
    tracing::info!("database schema is up to date");
    Ok(())
}
