//! Connection pool wiring.

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use tracing::instrument;

use crate::config::StoreConfig;
use crate::error::{map_sqlx_error, RepositoryError};

/// Open a SQLite pool for `config` with foreign keys enforced.
///
/// An in-memory database only lives as long as its connection, so in-memory
/// URLs get exactly one connection that is never recycled.
#[instrument(skip(config), fields(database_url = %config.database_url), err)]
pub async fn connect(config: &StoreConfig) -> Result<SqlitePool, RepositoryError> {
    let options = SqliteConnectOptions::from_str(&config.database_url)
        .map_err(|e| map_sqlx_error("parse_database_url", e))?
        .foreign_keys(true)
        .create_if_missing(true);

    let pool_options = if config.is_in_memory() {
        SqlitePoolOptions::new()
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        SqlitePoolOptions::new().max_connections(config.max_connections)
    };

    let pool = pool_options
        .connect_with(options)
        .await
        .map_err(|e| map_sqlx_error("connect", e))?;

    tracing::info!(in_memory = config.is_in_memory(), "database pool ready");
    Ok(pool)
}
