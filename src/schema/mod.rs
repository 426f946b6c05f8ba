// dirttool/src/schema/mod.rs
use sqlx::{Executor, PgPool};
use tracing::info;

use crate::errors::Result;

/// DDL for the CRM domain: six enum types and four tables.
pub const DDL: &str = include_str!("crm.sql");

/// Tables in dependency order, parents first.
pub const TABLES: [&str; 4] = ["client", "contact", "payment", "event"];

/// Executes the DDL against an empty database. Not a migration: re-running fails
/// because the types already exist.
pub async fn apply(pool: &PgPool) -> Result<()> {
    info!("applying CRM schema");
    pool.execute(DDL).await?;
    info!(tables = ?TABLES, "CRM schema applied");
    Ok(())
}
