// dirttool/src/backup/logic.rs
use chrono::{DateTime, Local};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::db_dump::{DumpInvocation, DumpRunner};
use crate::config::{BackupConfig, BackupNaming, ConnectionConfig};
use crate::errors::{AppError, Result};

pub const LATEST_FILE_NAME: &str = "backup-latest.sql";

/// Artifact file name for a backup taken at `now`.
pub fn backup_file_name(naming: BackupNaming, now: DateTime<Local>) -> String {
    match naming {
        BackupNaming::Daily => format!("backup-{}.sql", now.format("%Y-%m-%d")),
        BackupNaming::Timestamped => format!("backup-{}.sql", now.format("%Y-%m-%d_%H-%M-%S")),
    }
}

/// Runs one export and returns the artifact path.
///
/// A failed export leaves whatever pg_dump wrote in place.
pub fn perform_backup<R: DumpRunner>(
    runner: &R,
    pg_dump: &Path,
    connection: &ConnectionConfig,
    backup_config: &BackupConfig,
    now: DateTime<Local>,
) -> Result<PathBuf> {
    fs::create_dir_all(&backup_config.backup_dir)?;

    let artifact = backup_config
        .backup_dir
        .join(backup_file_name(backup_config.naming, now));
    if artifact.exists() {
        warn!(artifact = %artifact.display(), "overwriting existing backup");
    }

    let invocation = DumpInvocation::new(pg_dump, connection, &artifact);
    info!(db = %connection.dbname, artifact = %artifact.display(), "starting pg_dump");

    let status = runner.run(&invocation)?;
    if !status.success() {
        return Err(AppError::ExportFailure { status, artifact });
    }

    if backup_config.write_latest {
        let latest = backup_config.backup_dir.join(LATEST_FILE_NAME);
        fs::copy(&artifact, &latest)?;
        info!(latest = %latest.display(), "latest alias refreshed");
    }

    info!(artifact = %artifact.display(), "backup written");
    Ok(artifact)
}
