// Connection checks and pool setup
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, PgConnection};
use tracing::{debug, info};

use crate::config::ConnectionConfig;
use crate::errors::{AppError, Result};

/// Opens and closes a single connection to prove the credentials work.
pub async fn check_db_connection(config: &ConnectionConfig) -> Result<()> {
    let url = config.database_url()?;
    debug!(host = %config.host, port = config.port, db = %config.dbname, "checking database connection");

    let conn = PgConnection::connect(&url)
        .await
        .map_err(|e| AppError::ConnectionFailure(format!("{}@{}:{}/{}: {}", config.user, config.host, config.port, config.dbname, e)))?;
    conn.close().await?;

    info!(db = %config.dbname, "database connection ok");
    Ok(())
}

/// Single-connection pool for the CRM commands.
pub async fn connect_pool(config: &ConnectionConfig) -> Result<PgPool> {
    let url = config.database_url()?;
    PgPoolOptions::new()
        .max_connections(1)
        .connect(&url)
        .await
        .map_err(|e| AppError::ConnectionFailure(format!("{}@{}:{}/{}: {}", config.user, config.host, config.port, config.dbname, e)))
}
