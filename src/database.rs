//! Connection pool and backend selection.

use crate::config::{ServerConfig, StoreKind};
use crate::error::{ConfigError, StartupError};
use crate::migration::apply_migrations;
use crate::store::{Backend, MemoryDatabase};
use sqlx::postgres::PgPoolOptions;

/// Connect (and bootstrap the schema) for the configured store.
pub async fn open_backend(config: &ServerConfig) -> Result<Backend, StartupError> {
    match config.store {
        StoreKind::Memory => {
            tracing::info!("using in-memory record store");
            Ok(Backend::Memory(MemoryDatabase::new()))
        }
        StoreKind::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or(ConfigError::Missing("DATABASE_URL"))?;
            let pool = PgPoolOptions::new()
                .max_connections(config.max_connections)
                .connect(url)
                .await
                .map_err(StartupError::Connect)?;
            apply_migrations(&pool).await?;
            tracing::info!(max_connections = config.max_connections, "connected to PostgreSQL");
            Ok(Backend::Postgres(pool))
        }
    }
}
