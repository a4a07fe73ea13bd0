//! SQLite connection setup for the key store.

use crate::errors::JwksError;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;

/// Open the key database, creating the file if it does not exist.
///
/// The pool holds exactly one connection. All key store access is therefore
/// serialized, and an in-memory database (`sqlite::memory:`) lives as long as
/// the pool does.
pub async fn connect(database_url: &str) -> Result<SqlitePool, JwksError> {
    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| JwksError::StoreWrite(format!("Invalid database URL: {}", e)))?
        .create_if_missing(true);

    SqlitePoolOptions::new()
        .max_connections(1)
        .min_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await
        .map_err(|e| JwksError::StoreWrite(format!("Failed to open key database: {}", e)))
}
