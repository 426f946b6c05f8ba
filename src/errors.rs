use std::path::PathBuf;
use std::process::ExitStatus;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Missing required configuration: {}", .0.join(", "))]
    MissingConfiguration(Vec<String>),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Database connection failed: {0}")]
    ConnectionFailure(String),

    #[error("{0} executable not found in PATH. Please ensure PostgreSQL client tools are installed and in your PATH.")]
    ToolNotFound(&'static str),

    #[error("pg_dump exited with {status}; artifact {} may be incomplete", artifact.display())]
    ExportFailure { status: ExitStatus, artifact: PathBuf },

    #[error("Role '{role}' already exists")]
    ProvisioningConflict { role: String },

    #[error("psql exited with {status}: {stderr}")]
    ProvisioningFailure { status: ExitStatus, stderr: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl AppError {
    /// Exit code for the CLI. Child process failures pass their own code through.
    pub fn exit_code(&self) -> u8 {
        let status = match self {
            AppError::ExportFailure { status, .. } => Some(status),
            AppError::ProvisioningFailure { status, .. } => Some(status),
            _ => None,
        };
        status
            .and_then(|s| s.code())
            .and_then(|code| u8::try_from(code).ok())
            .filter(|code| *code != 0)
            .unwrap_or(1)
    }
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_configuration_lists_every_key() {
        let err = AppError::MissingConfiguration(vec!["DIRTY_HOST".into(), "DIRTY_DB".into()]);
        assert_eq!(
            err.to_string(),
            "Missing required configuration: DIRTY_HOST, DIRTY_DB"
        );
        assert_eq!(err.exit_code(), 1);
    }

    #[cfg(unix)]
    #[test]
    fn export_failure_passes_child_exit_code_through() {
        use std::os::unix::process::ExitStatusExt;

        let err = AppError::ExportFailure {
            status: ExitStatus::from_raw(3 << 8),
            artifact: PathBuf::from("backup-2024-01-01.sql"),
        };
        assert_eq!(err.exit_code(), 3);
    }
}
