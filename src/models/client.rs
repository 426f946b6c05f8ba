/// Client model and database operations
///
/// A client is the root entity of the CRM: contacts and payments are owned by
/// it and removed with it, events keep pointing at it until it is deleted.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE client (
///     id SERIAL PRIMARY KEY,
///     created TIMESTAMPTZ NOT NULL DEFAULT now(),
///     name TEXT NOT NULL,
///     nick TEXT NOT NULL DEFAULT '',
///     type client_type NOT NULL,
///     plan client_plan NOT NULL,
///     status client_status NOT NULL DEFAULT 'active',
///     notes TEXT NOT NULL DEFAULT '',
///     url TEXT,
///     team TEXT
/// );
/// ```
use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::PgPool;

use super::event::{EventType, NewEvent};
use super::Label;
use crate::errors::{AppError, Result};
use crate::utils::table::{TableRow, opt};

/// Communication channel the client is served on
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "client_type", rename_all = "lowercase")]
pub enum ClientType {
    Slack,
    Discord,
}

impl Label for ClientType {
    const ALL: &'static [Self] = &[ClientType::Slack, ClientType::Discord];

    fn as_str(&self) -> &'static str {
        match self {
            ClientType::Slack => "slack",
            ClientType::Discord => "discord",
        }
    }
}

/// Subscription tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, sqlx::Type)]
#[sqlx(type_name = "client_plan", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ClientPlan {
    Free,
    Extra,
    Pro,
}

impl Label for ClientPlan {
    const ALL: &'static [Self] = &[ClientPlan::Free, ClientPlan::Extra, ClientPlan::Pro];

    fn as_str(&self) -> &'static str {
        match self {
            ClientPlan::Free => "free",
            ClientPlan::Extra => "extra",
            ClientPlan::Pro => "pro",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "client_status", rename_all = "lowercase")]
pub enum ClientStatus {
    Active,
    Inactive,
}

impl Label for ClientStatus {
    const ALL: &'static [Self] = &[ClientStatus::Active, ClientStatus::Inactive];

    fn as_str(&self) -> &'static str {
        match self {
            ClientStatus::Active => "active",
            ClientStatus::Inactive => "inactive",
        }
    }
}

label_traits!(ClientType, ClientPlan, ClientStatus);

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Client {
    pub id: i32,
    pub created: DateTime<Utc>,
    pub name: String,
    /// Slack or Discord handle; partial matches find the client.
    pub nick: String,
    #[sqlx(rename = "type")]
    pub client_type: ClientType,
    pub plan: ClientPlan,
    pub status: ClientStatus,
    pub notes: String,
    pub url: Option<String>,
    /// Workspace / team identifier on the channel
    pub team: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewClient {
    pub name: String,
    pub nick: String,
    pub client_type: ClientType,
    pub plan: ClientPlan,
    pub notes: String,
    pub url: Option<String>,
    pub team: Option<String>,
}

/// Fields left `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct UpdateClient {
    pub name: Option<String>,
    pub nick: Option<String>,
    pub client_type: Option<ClientType>,
    pub plan: Option<ClientPlan>,
    pub status: Option<ClientStatus>,
    pub notes: Option<String>,
    pub url: Option<String>,
    pub team: Option<String>,
}

/// Payload of the events recorded for a plan change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PlanChange {
    pub from: ClientPlan,
    pub to: ClientPlan,
}

const CLIENT_COLUMNS: &str = "id, created, name, nick, type, plan, status, notes, url, team";

impl Client {
    /// Inserts a client and records the `plan_<tier>_created` event in the same
    /// transaction.
    pub async fn create(pool: &PgPool, data: NewClient) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            INSERT INTO client (name, nick, type, plan, notes, url, team)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(data.name)
        .bind(data.nick)
        .bind(data.client_type)
        .bind(data.plan)
        .bind(data.notes)
        .bind(data.url)
        .bind(data.team)
        .fetch_one(&mut *tx)
        .await?;

        NewEvent::for_client(EventType::plan_created(client.plan), client.id)
            .insert(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(client)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let client = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM client WHERE id = $1",
            CLIENT_COLUMNS
        ))
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(client)
    }

    /// Clients whose nick or name contains `pattern`, oldest first.
    pub async fn search(pool: &PgPool, pattern: &str) -> Result<Vec<Self>> {
        let like = format!("%{}%", escape_like(pattern.trim()));
        let clients = sqlx::query_as::<_, Client>(&format!(
            "SELECT {} FROM client WHERE nick ILIKE $1 OR name ILIKE $1 ORDER BY created",
            CLIENT_COLUMNS
        ))
        .bind(like)
        .fetch_all(pool)
        .await?;

        Ok(clients)
    }

    /// Applies the edit in one transaction. A plan change is logged as a
    /// cancellation of the old tier followed by creation of the new one, with
    /// both tiers in the event payload.
    pub async fn update(pool: &PgPool, id: i32, data: UpdateClient) -> Result<Self> {
        let mut tx = pool.begin().await?;

        let previous: ClientPlan =
            sqlx::query_scalar("SELECT plan FROM client WHERE id = $1 FOR UPDATE")
                .bind(id)
                .fetch_optional(&mut *tx)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("client {}", id)))?;

        let client = sqlx::query_as::<_, Client>(&format!(
            r#"
            UPDATE client
            SET name = COALESCE($2, name),
                nick = COALESCE($3, nick),
                type = COALESCE($4, type),
                plan = COALESCE($5, plan),
                status = COALESCE($6, status),
                notes = COALESCE($7, notes),
                url = COALESCE($8, url),
                team = COALESCE($9, team)
            WHERE id = $1
            RETURNING {}
            "#,
            CLIENT_COLUMNS
        ))
        .bind(id)
        .bind(data.name)
        .bind(data.nick)
        .bind(data.client_type)
        .bind(data.plan)
        .bind(data.status)
        .bind(data.notes)
        .bind(data.url)
        .bind(data.team)
        .fetch_one(&mut *tx)
        .await?;

        if previous != client.plan {
            let change = serde_json::to_value(PlanChange {
                from: previous,
                to: client.plan,
            })?;
            NewEvent::for_client(EventType::plan_cancelled(previous), id)
                .with_data(change.clone())
                .insert(&mut *tx)
                .await?;
            NewEvent::for_client(EventType::plan_created(client.plan), id)
                .with_data(change)
                .insert(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(client)
    }

    pub async fn change_plan(pool: &PgPool, id: i32, plan: ClientPlan) -> Result<Self> {
        Self::update(
            pool,
            id,
            UpdateClient {
                plan: Some(plan),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes the client with its contacts and payments. Returns false when
    /// no such client existed.
    pub async fn delete(pool: &PgPool, id: i32) -> Result<bool> {
        let result = sqlx::query("DELETE FROM client WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }
}

impl TableRow for Client {
    fn headers() -> Vec<&'static str> {
        vec!["id", "created", "name", "nick", "type", "plan", "status", "notes", "url", "team"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.created.format("%Y-%m-%d %H:%M").to_string(),
            self.name.clone(),
            self.nick.clone(),
            self.client_type.to_string(),
            self.plan.to_string(),
            self.status.to_string(),
            self.notes.clone(),
            opt(&self.url),
            opt(&self.team),
        ]
    }
}

fn escape_like(pattern: &str) -> String {
    pattern
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_labels_match_schema() {
        let labels: Vec<&str> = ClientPlan::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(labels, vec!["free", "extra", "pro"]);
        assert_eq!(ClientType::Discord.to_string(), "discord");
        assert_eq!(ClientStatus::Inactive.to_string(), "inactive");
    }

    #[test]
    fn test_parse_is_case_insensitive_and_closed() {
        assert_eq!("Slack".parse::<ClientType>().ok(), Some(ClientType::Slack));
        assert_eq!(" pro ".parse::<ClientPlan>().ok(), Some(ClientPlan::Pro));
        assert!("teams".parse::<ClientType>().is_err());
        assert!("premium".parse::<ClientPlan>().is_err());
    }

    #[test]
    fn test_plan_change_payload_uses_storage_labels() -> anyhow::Result<()> {
        let change = PlanChange {
            from: ClientPlan::Extra,
            to: ClientPlan::Pro,
        };
        assert_eq!(
            serde_json::to_value(change)?,
            serde_json::json!({ "from": "extra", "to": "pro" })
        );
        Ok(())
    }

    #[test]
    fn test_like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
    }
}
