pub mod prompt;
pub mod setting;
pub mod table;

use std::path::PathBuf;
use which::which;

use crate::errors::{AppError, Result};

/// Finds the pg_dump executable in the system PATH.
pub fn find_pg_dump_executable() -> Result<PathBuf> {
    which("pg_dump").map_err(|_| AppError::ToolNotFound("pg_dump"))
}

/// Finds the psql executable in the system PATH.
pub fn find_psql_executable() -> Result<PathBuf> {
    which("psql").map_err(|_| AppError::ToolNotFound("psql"))
}
