/// Event log
///
/// Events are append-only. They reference a client and/or a contact weakly:
/// deleting either sets the reference to NULL and the event stays.
///
/// # Schema
///
/// ```sql
/// CREATE TABLE event (
///     id SERIAL PRIMARY KEY,
///     created TIMESTAMPTZ NOT NULL DEFAULT now(),
///     type event_type NOT NULL,
///     data JSONB NOT NULL DEFAULT '{}',
///     client_id INTEGER REFERENCES client (id) ON DELETE SET NULL,
///     contact_id INTEGER REFERENCES contact (id) ON DELETE SET NULL
/// );
/// ```
use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::{PgConnection, PgPool};

use super::Label;
use super::client::ClientPlan;
use crate::errors::Result;
use crate::utils::table::{TableRow, opt};

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "event_type", rename_all = "snake_case")]
pub enum EventType {
    PlanFreeCreated,
    PlanFreeCancelled,
    PlanExtraCreated,
    PlanExtraCancelled,
    PlanProCreated,
    PlanProCancelled,
    EmailSent,
    EmailReceived,
}

impl Label for EventType {
    const ALL: &'static [Self] = &[
        EventType::PlanFreeCreated,
        EventType::PlanFreeCancelled,
        EventType::PlanExtraCreated,
        EventType::PlanExtraCancelled,
        EventType::PlanProCreated,
        EventType::PlanProCancelled,
        EventType::EmailSent,
        EventType::EmailReceived,
    ];

    fn as_str(&self) -> &'static str {
        match self {
            EventType::PlanFreeCreated => "plan_free_created",
            EventType::PlanFreeCancelled => "plan_free_cancelled",
            EventType::PlanExtraCreated => "plan_extra_created",
            EventType::PlanExtraCancelled => "plan_extra_cancelled",
            EventType::PlanProCreated => "plan_pro_created",
            EventType::PlanProCancelled => "plan_pro_cancelled",
            EventType::EmailSent => "email_sent",
            EventType::EmailReceived => "email_received",
        }
    }
}

label_traits!(EventType);

impl EventType {
    pub fn plan_created(plan: ClientPlan) -> Self {
        match plan {
            ClientPlan::Free => EventType::PlanFreeCreated,
            ClientPlan::Extra => EventType::PlanExtraCreated,
            ClientPlan::Pro => EventType::PlanProCreated,
        }
    }

    pub fn plan_cancelled(plan: ClientPlan) -> Self {
        match plan {
            ClientPlan::Free => EventType::PlanFreeCancelled,
            ClientPlan::Extra => EventType::PlanExtraCancelled,
            ClientPlan::Pro => EventType::PlanProCancelled,
        }
    }
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Event {
    pub id: i32,
    pub created: DateTime<Utc>,
    #[sqlx(rename = "type")]
    pub event_type: EventType,
    /// Free-form payload
    pub data: JsonValue,
    pub client_id: Option<i32>,
    pub contact_id: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub event_type: EventType,
    pub data: JsonValue,
    pub client_id: Option<i32>,
    pub contact_id: Option<i32>,
}

impl NewEvent {
    pub fn for_client(event_type: EventType, client_id: i32) -> Self {
        NewEvent {
            event_type,
            data: JsonValue::Object(Default::default()),
            client_id: Some(client_id),
            contact_id: None,
        }
    }

    pub fn with_data(mut self, data: JsonValue) -> Self {
        self.data = data;
        self
    }

    /// Appends the event on an existing connection or transaction.
    pub async fn insert(self, conn: &mut PgConnection) -> Result<Event> {
        let event = sqlx::query_as::<_, Event>(
            r#"
            INSERT INTO event (type, data, client_id, contact_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id, created, type, data, client_id, contact_id
            "#,
        )
        .bind(self.event_type)
        .bind(self.data)
        .bind(self.client_id)
        .bind(self.contact_id)
        .fetch_one(conn)
        .await?;

        Ok(event)
    }
}

impl Event {
    pub async fn record(pool: &PgPool, data: NewEvent) -> Result<Self> {
        let mut conn = pool.acquire().await?;
        data.insert(&mut *conn).await
    }

    /// Most recent first.
    pub async fn find_by_client(pool: &PgPool, client_id: i32) -> Result<Vec<Self>> {
        let events = sqlx::query_as::<_, Event>(
            r#"
            SELECT id, created, type, data, client_id, contact_id
            FROM event
            WHERE client_id = $1
            ORDER BY created DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(events)
    }

    pub async fn find_by_id(pool: &PgPool, id: i32) -> Result<Option<Self>> {
        let event = sqlx::query_as::<_, Event>(
            "SELECT id, created, type, data, client_id, contact_id FROM event WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(event)
    }
}

impl TableRow for Event {
    fn headers() -> Vec<&'static str> {
        vec!["id", "created", "type", "client_id", "contact_id", "data"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.created.format("%Y-%m-%d %H:%M").to_string(),
            self.event_type.to_string(),
            opt(&self.client_id),
            opt(&self.contact_id),
            self.data.to_string(),
        ]
    }
}
