// dirttool/src/provision/statements.rs
use regex::Regex;
use std::sync::LazyLock;

use crate::config::{ProvisionConfig, RoleCreation};
use crate::errors::{AppError, Result};

static ROLE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]{0,62}$").expect("valid role name pattern"));

/// Dollar-quote tag for the role creation block.
const DO_TAG: &str = "$provision$";

const REDACTED: &str = "'********'";

pub fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

pub fn quote_literal(value: &str) -> String {
    format!("'{}'", value.replace('\'', "''"))
}

pub fn validate_role_name(role: &str) -> Result<()> {
    if ROLE_NAME.is_match(role) {
        Ok(())
    } else {
        Err(AppError::InvalidInput(format!(
            "role name '{}' must start with a letter or underscore and contain only letters, digits and underscores",
            role
        )))
    }
}

/// Ordered statements granting `role` full access to `dbname` and to every
/// current and future table and sequence in the configured schema.
#[derive(Clone, PartialEq, Eq)]
pub struct ProvisionScript {
    pub statements: Vec<String>,
    password_literal: String,
}

impl ProvisionScript {
    pub fn build(dbname: &str, config: &ProvisionConfig) -> Result<Self> {
        validate_role_name(&config.role)?;
        if config.password.is_empty() {
            return Err(AppError::InvalidInput("role password cannot be empty".into()));
        }
        if config.password.contains(DO_TAG) {
            return Err(AppError::InvalidInput(format!(
                "role password cannot contain {}",
                DO_TAG
            )));
        }

        let role = quote_ident(&config.role);
        let schema = quote_ident(&config.schema);
        let password = quote_literal(&config.password);

        let create = match config.creation {
            RoleCreation::Strict => {
                format!("CREATE ROLE {} WITH LOGIN PASSWORD {};", role, password)
            }
            // Refreshes the password when the role already exists.
            RoleCreation::IfMissing => format!(
                "DO {tag}\nBEGIN\n    IF NOT EXISTS (SELECT 1 FROM pg_catalog.pg_roles WHERE rolname = {name}) THEN\n        CREATE ROLE {role} WITH LOGIN PASSWORD {password};\n    ELSE\n        ALTER ROLE {role} WITH LOGIN PASSWORD {password};\n    END IF;\nEND\n{tag};",
                tag = DO_TAG,
                name = quote_literal(&config.role),
                role = role,
                password = password,
            ),
        };

        let statements = vec![
            create,
            format!("GRANT ALL PRIVILEGES ON DATABASE {} TO {};", quote_ident(dbname), role),
            format!("GRANT USAGE ON SCHEMA {} TO {};", schema, role),
            format!("GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA {} TO {};", schema, role),
            format!("GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA {} TO {};", schema, role),
            // Grants are not retroactive: objects created later need default privileges.
            format!("ALTER DEFAULT PRIVILEGES IN SCHEMA {} GRANT ALL PRIVILEGES ON TABLES TO {};", schema, role),
            format!("ALTER DEFAULT PRIVILEGES IN SCHEMA {} GRANT ALL PRIVILEGES ON SEQUENCES TO {};", schema, role),
        ];

        Ok(ProvisionScript {
            statements,
            password_literal: password,
        })
    }

    /// The script as fed to psql.
    pub fn render(&self) -> String {
        let mut script = self.statements.join("\n");
        script.push('\n');
        script
    }

    /// The script with the password literal masked, for display.
    pub fn render_redacted(&self) -> String {
        self.render().replace(&self.password_literal, REDACTED)
    }
}

impl std::fmt::Debug for ProvisionScript {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.render_redacted())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(creation: RoleCreation) -> ProvisionConfig {
        ProvisionConfig {
            role: "crm_app".into(),
            password: "s3cr'et".into(),
            schema: "public".into(),
            creation,
        }
    }

    #[test]
    fn test_statement_order() -> anyhow::Result<()> {
        let script = ProvisionScript::build("crm", &config(RoleCreation::Strict))?;

        assert_eq!(
            script.statements,
            vec![
                r#"CREATE ROLE "crm_app" WITH LOGIN PASSWORD 's3cr''et';"#,
                r#"GRANT ALL PRIVILEGES ON DATABASE "crm" TO "crm_app";"#,
                r#"GRANT USAGE ON SCHEMA "public" TO "crm_app";"#,
                r#"GRANT ALL PRIVILEGES ON ALL TABLES IN SCHEMA "public" TO "crm_app";"#,
                r#"GRANT ALL PRIVILEGES ON ALL SEQUENCES IN SCHEMA "public" TO "crm_app";"#,
                r#"ALTER DEFAULT PRIVILEGES IN SCHEMA "public" GRANT ALL PRIVILEGES ON TABLES TO "crm_app";"#,
                r#"ALTER DEFAULT PRIVILEGES IN SCHEMA "public" GRANT ALL PRIVILEGES ON SEQUENCES TO "crm_app";"#,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_if_missing_wraps_creation_in_existence_check() -> anyhow::Result<()> {
        let script = ProvisionScript::build("crm", &config(RoleCreation::IfMissing))?;
        let create = &script.statements[0];

        assert!(create.starts_with("DO $provision$"));
        assert!(create.contains("WHERE rolname = 'crm_app'"));
        assert!(create.contains(r#"CREATE ROLE "crm_app" WITH LOGIN PASSWORD 's3cr''et';"#));
        assert!(create.contains(r#"ALTER ROLE "crm_app" WITH LOGIN PASSWORD 's3cr''et';"#));
        assert!(create.ends_with("$provision$;"));
        assert_eq!(script.statements.len(), 7);
        Ok(())
    }

    #[test]
    fn test_identifiers_are_quoted() {
        assert_eq!(quote_ident(r#"we"ird"#), r#""we""ird""#);
        assert_eq!(quote_literal("it's"), "'it''s'");
    }

    #[test]
    fn test_invalid_role_names_rejected() {
        for role in ["", "1app", "app-user", "app; DROP TABLE client", "app\"x"] {
            assert!(validate_role_name(role).is_err(), "accepted {:?}", role);
        }
        assert!(validate_role_name("_crm_app2").is_ok());
    }

    #[test]
    fn test_password_cannot_break_out_of_do_block() {
        let mut cfg = config(RoleCreation::IfMissing);
        cfg.password = "x$provision$y".into();
        assert!(ProvisionScript::build("crm", &cfg).is_err());
    }

    #[test]
    fn test_redacted_render_hides_password() -> anyhow::Result<()> {
        let script = ProvisionScript::build("crm", &config(RoleCreation::IfMissing))?;

        assert!(script.render().contains("'s3cr''et'"));
        let shown = script.render_redacted();
        assert!(!shown.contains("s3cr"));
        assert!(shown.contains("'********'"));
        assert!(!format!("{:?}", script).contains("s3cr"));
        Ok(())
    }
}
