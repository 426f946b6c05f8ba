mod logic;
mod db_dump;

pub use db_dump::{DumpInvocation, DumpRunner, PG_DUMP_OPTIONS, PgDump};
pub use logic::{LATEST_FILE_NAME, backup_file_name, perform_backup};

use chrono::Local;
use std::path::PathBuf;

use crate::config::{BackupConfig, ConnectionConfig};
use crate::errors::Result;
use crate::utils::{find_pg_dump_executable, setting::check_db_connection};

/// Public entry point for the backup process.
///
/// Proves the credentials with a direct connection first, so an unreachable
/// server surfaces as `ConnectionFailure` rather than as a pg_dump exit code.
pub async fn run_backup_flow(
    connection: &ConnectionConfig,
    backup_config: &BackupConfig,
) -> Result<PathBuf> {
    check_db_connection(connection).await?;

    let pg_dump = find_pg_dump_executable()?;
    println!("Found pg_dump executable at: {}", pg_dump.display());

    perform_backup(&PgDump, &pg_dump, connection, backup_config, Local::now())
}
