// dirttool/src/provision/psql.rs
use std::io::Write;
use std::path::Path;
use std::process::{Command, ExitStatus, Output, Stdio};

use tempfile::Builder as TempFileBuilder;
use tracing::{debug, info};

use super::statements::ProvisionScript;
use crate::config::ConnectionConfig;
use crate::errors::{AppError, Result};

/// Executes the script with psql as a single transaction, stopping at the
/// first error.
pub fn execute_script_with_psql(
    psql: &Path,
    connection: &ConnectionConfig,
    script: &ProvisionScript,
    role: &str,
) -> Result<()> {
    let mut sql_file = TempFileBuilder::new()
        .prefix("provision_")
        .suffix(".sql")
        .tempfile()?;
    sql_file.write_all(script.render().as_bytes())?;
    sql_file.flush()?;

    debug!(script = %script.render_redacted(), file = %sql_file.path().display(), "running provisioning script");

    let output = Command::new(psql)
        .arg("-X") // Do not read psqlrc
        .arg("-q")
        .arg("-v")
        .arg("ON_ERROR_STOP=1")
        .arg("--single-transaction")
        .args(connection.libpq_args())
        .arg("-f")
        .arg(sql_file.path())
        .envs(connection.libpq_env())
        .stdin(Stdio::null())
        .output()?;

    check_output(&output, role)?;

    let stdout = String::from_utf8_lossy(&output.stdout);
    if !stdout.trim().is_empty() {
        println!("{}", stdout.trim_end());
    }
    info!(role, db = %connection.dbname, "provisioning script applied");
    Ok(())
}

fn check_output(output: &Output, role: &str) -> Result<()> {
    if output.status.success() {
        return Ok(());
    }
    Err(classify_failure(
        output.status,
        &String::from_utf8_lossy(&output.stderr),
        role,
    ))
}

/// Maps a failed psql run onto the error taxonomy.
pub fn classify_failure(status: ExitStatus, stderr: &str, role: &str) -> AppError {
    let conflict = stderr.lines().any(|line| {
        line.contains("already exists") && line.contains(&format!("role \"{}\"", role))
    });
    if conflict {
        AppError::ProvisioningConflict {
            role: role.to_string(),
        }
    } else {
        AppError::ProvisioningFailure {
            status,
            stderr: stderr.trim().to_string(),
        }
    }
}
