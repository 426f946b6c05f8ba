/// Client overview report
///
/// One row per client: its primary contact (contacts with a role win), the most
/// recent payment, and payment totals. Active clients come first.
use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::client::ClientStatus;
use super::payment::PaymentType;
use crate::errors::Result;
use crate::utils::table::{TableRow, opt};

const CLIENT_SUMMARY: &str = r#"
WITH
ranked_contacts AS (
    SELECT
        ct.client_id,
        ct.name AS contact_name,
        ct.email AS contact_email,
        ROW_NUMBER() OVER (PARTITION BY ct.client_id ORDER BY (ct.role = ''), ct.role, ct.id) AS rn
    FROM contact ct
),
ranked_payments AS (
    SELECT
        p.client_id,
        p.created,
        p.amount,
        p.plan,
        p.type,
        ROW_NUMBER() OVER (PARTITION BY p.client_id ORDER BY p.created DESC, p.id DESC) AS rn
    FROM payment p
),
payment_totals AS (
    SELECT
        client_id,
        COUNT(*) AS total_num_payments,
        SUM(amount) AS total_amount_received
    FROM payment
    GROUP BY client_id
)
SELECT
    c.id,
    c.name AS client_name,
    c.status,
    rc.contact_name,
    rc.contact_email,
    rp.created::date AS last_pay_date,
    COALESCE(rp.amount, 0) AS last_pay,
    COALESCE(pt.total_num_payments, 0) AS payments,
    COALESCE(pt.total_amount_received, 0) AS total,
    rp.type AS payment_type,
    rp.plan
FROM client c
LEFT JOIN ranked_contacts rc ON rc.client_id = c.id AND rc.rn = 1
LEFT JOIN ranked_payments rp ON rp.client_id = c.id AND rp.rn = 1
LEFT JOIN payment_totals pt ON pt.client_id = c.id
ORDER BY c.status, c.created
"#;

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClientSummary {
    pub id: i32,
    pub client_name: String,
    pub status: ClientStatus,
    pub contact_name: Option<String>,
    pub contact_email: Option<String>,
    pub last_pay_date: Option<NaiveDate>,
    pub last_pay: Decimal,
    pub payments: i64,
    pub total: Decimal,
    pub payment_type: Option<PaymentType>,
    pub plan: Option<String>,
}

impl ClientSummary {
    pub async fn list(pool: &PgPool) -> Result<Vec<Self>> {
        let rows = sqlx::query_as::<_, ClientSummary>(CLIENT_SUMMARY)
            .fetch_all(pool)
            .await?;

        Ok(rows)
    }
}

impl TableRow for ClientSummary {
    fn headers() -> Vec<&'static str> {
        vec![
            "id",
            "client_name",
            "status",
            "contact_name",
            "contact_email",
            "last_pay_date",
            "last_pay",
            "payments",
            "total",
            "payment_type",
            "plan",
        ]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.client_name.clone(),
            self.status.to_string(),
            opt(&self.contact_name),
            opt(&self.contact_email),
            opt(&self.last_pay_date),
            self.last_pay.to_string(),
            self.payments.to_string(),
            self.total.to_string(),
            opt(&self.payment_type),
            opt(&self.plan),
        ]
    }
}
