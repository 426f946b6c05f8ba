//! CRM database tool
//!
//! Provides CLI interface for configuration checks, backups, role
//! provisioning and the CRM commands

// dirttool/src/main.rs
use anyhow::{Context, Result};
use std::env;
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use dirttool::config::{self, ConnectionConfig, RoleCreation, env_lookup};
use dirttool::errors::AppError;
use dirttool::utils::setting::connect_pool;
use dirttool::{backup, crm, provision, schema};

/// Main entry point for the CRM tool
#[tokio::main]
async fn main() -> ExitCode {
    dotenv::dotenv().ok();
    init_tracing();

    match run_app().await {
        Ok(_) => {
            println!("✅ Operation completed successfully.");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ Error: {:?}", e);
            let code = e
                .downcast_ref::<AppError>()
                .map(AppError::exit_code)
                .unwrap_or(1);
            ExitCode::from(code)
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("dirttool=info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn run_app() -> Result<()> {
    let args: Vec<String> = env::args().skip(1).collect();
    let choice = match args.first() {
        Some(arg) => arg.trim().to_string(),
        None => prompt_choice()?,
    };
    let rest: Vec<&str> = args.iter().skip(1).map(String::as_str).collect();
    debug!(command = %choice, args = ?rest, "dispatching");

    if choice == "schema" && rest.first() == Some(&"print") {
        print!("{}", schema::DDL);
        return Ok(());
    }

    // Everything below needs the full connection configuration.
    let connection = ConnectionConfig::from_env().context("Configuration check failed")?;

    match choice.as_str() {
        "1" | "validate" => {
            println!("✅ Configuration is complete for {:?}", connection);
        }
        "2" | "backup" => {
            println!("🚀 Starting Backup Process...");
            let backup_config = config::load_backup_config(&env_lookup)
                .context("Failed to load backup configuration")?;
            let artifact = backup::run_backup_flow(&connection, &backup_config)
                .await
                .context("Backup process failed")?;
            println!("Backup written to {}", artifact.display());
        }
        "3" | "provision" => {
            println!("🔐 Starting Provisioning Process...");
            let creation = if rest.contains(&"--strict") {
                RoleCreation::Strict
            } else {
                RoleCreation::IfMissing
            };
            let dry_run = rest.contains(&"--dry-run");
            let provision_config = config::load_provision_config(&env_lookup, creation)
                .context("Failed to load provisioning configuration")?;
            provision::run_provision_flow(&connection, &provision_config, dry_run)
                .await
                .context("Provisioning process failed")?;
        }
        "schema" => match rest.first() {
            Some(&"apply") => {
                let pool = connect_pool(&connection).await?;
                schema::apply(&pool).await.context("Failed to apply schema")?;
                pool.close().await;
            }
            _ => anyhow::bail!("Usage: schema print|apply"),
        },
        "4" | "client" | "contact" | "payment" => {
            let pool = connect_pool(&connection).await?;
            let result = run_crm(&pool, &choice, rest.first().copied()).await;
            pool.close().await;
            result?;
        }
        _ => {
            println!("❌ Invalid choice. Please enter '1' (validate), '2' (backup), '3' (provision) or '4' (client).");
            anyhow::bail!("Invalid operation choice");
        }
    }
    Ok(())
}

async fn run_crm(pool: &sqlx::PgPool, command: &str, sub: Option<&str>) -> Result<()> {
    match (command, sub) {
        ("4" | "client", None) => crm::run_client_list(pool).await?,
        ("client", Some("show")) => crm::run_client_show(pool, &env_lookup).await?,
        ("client", Some("new")) => {
            crm::run_client_new(pool, &env_lookup).await?;
        }
        ("client", Some("edit")) => {
            crm::run_client_edit(pool, &env_lookup).await?;
        }
        ("contact", Some("new")) => {
            crm::run_contact_new(pool, &env_lookup).await?;
        }
        ("payment", Some("new")) => {
            crm::run_payment_new(pool, &env_lookup).await?;
        }
        _ => anyhow::bail!(
            "Usage: client [show|new|edit] | contact new | payment new"
        ),
    }
    Ok(())
}

/// Prompts user to select an operation
///
/// Returns the user's choice as String
fn prompt_choice() -> Result<String> {
    use std::io::{Write, stdin, stdout};

    println!("Select an operation:");
    println!("1. Validate configuration (or type 'validate')");
    println!("2. Take Backup (or type 'backup')");
    println!("3. Provision application role (or type 'provision')");
    println!("4. List clients (or type 'client')");
    print!("Enter your choice: ");
    stdout().flush().context("Failed to flush stdout")?;

    let mut input = String::new();
    stdin().read_line(&mut input).context("Failed to read user input")?;
    Ok(input.trim().to_string())
}
