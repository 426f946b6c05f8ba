/// Contact model
///
/// A person at a client. Owned by the client (`ON DELETE CASCADE`); emails are
/// unique across all contacts and the database enforces it.
use sqlx::PgPool;

use crate::errors::Result;
use crate::utils::table::TableRow;

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Contact {
    pub id: i32,
    pub client_id: i32,
    pub name: String,
    pub email: String,
    /// e.g. "payer"; empty for no particular role
    pub role: String,
}

#[derive(Debug, Clone)]
pub struct NewContact {
    pub client_id: i32,
    pub name: String,
    pub email: String,
    pub role: String,
}

impl Contact {
    pub async fn create(pool: &PgPool, data: NewContact) -> Result<Self> {
        let contact = sqlx::query_as::<_, Contact>(
            r#"
            INSERT INTO contact (client_id, name, email, role)
            VALUES ($1, $2, $3, $4)
            RETURNING id, client_id, name, email, role
            "#,
        )
        .bind(data.client_id)
        .bind(data.name)
        .bind(data.email.trim())
        .bind(data.role)
        .fetch_one(pool)
        .await?;

        Ok(contact)
    }

    /// Contacts with a role first, then by role name.
    pub async fn find_by_client(pool: &PgPool, client_id: i32) -> Result<Vec<Self>> {
        let contacts = sqlx::query_as::<_, Contact>(
            r#"
            SELECT id, client_id, name, email, role
            FROM contact
            WHERE client_id = $1
            ORDER BY (role = ''), role, id
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(contacts)
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>> {
        let contact = sqlx::query_as::<_, Contact>(
            "SELECT id, client_id, name, email, role FROM contact WHERE email = $1",
        )
        .bind(email.trim())
        .fetch_optional(pool)
        .await?;

        Ok(contact)
    }
}

impl TableRow for Contact {
    fn headers() -> Vec<&'static str> {
        vec!["id", "client_id", "name", "email", "role"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.client_id.to_string(),
            self.name.clone(),
            self.email.clone(),
            self.role.clone(),
        ]
    }
}
