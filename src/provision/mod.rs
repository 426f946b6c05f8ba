mod psql;
mod statements;

pub use psql::{classify_failure, execute_script_with_psql};
pub use statements::{ProvisionScript, quote_ident, quote_literal, validate_role_name};

use tracing::info;

use crate::config::{ConnectionConfig, ProvisionConfig};
use crate::errors::Result;
use crate::utils::{find_psql_executable, setting::check_db_connection};

/// Public entry point for role provisioning.
///
/// With `dry_run` the script is printed (password masked) and nothing connects.
pub async fn run_provision_flow(
    connection: &ConnectionConfig,
    provision_config: &ProvisionConfig,
    dry_run: bool,
) -> Result<ProvisionScript> {
    let script = ProvisionScript::build(&connection.dbname, provision_config)?;

    if dry_run {
        print!("{}", script.render_redacted());
        return Ok(script);
    }

    check_db_connection(connection).await?;
    let psql = find_psql_executable()?;
    println!("Found psql executable at: {}", psql.display());
    info!(
        role = %provision_config.role,
        schema = %provision_config.schema,
        creation = ?provision_config.creation,
        "provisioning application role"
    );

    execute_script_with_psql(&psql, connection, &script, &provision_config.role)?;
    Ok(script)
}
