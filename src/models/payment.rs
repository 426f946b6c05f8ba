/// Payment model
///
/// # Schema
///
/// ```sql
/// CREATE TABLE payment (
///     id SERIAL PRIMARY KEY,
///     created TIMESTAMPTZ NOT NULL DEFAULT now(),
///     client_id INTEGER NOT NULL REFERENCES client (id) ON DELETE CASCADE,
///     type payment_type NOT NULL,
///     amount NUMERIC(10, 2) NOT NULL CHECK (amount >= 0),
///     frequency payment_frequency NOT NULL,
///     plan TEXT NOT NULL DEFAULT ''
/// );
/// ```
///
/// `plan` is a free-text label such as `pro_49`, independent of `client_plan`.
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use super::Label;
use crate::errors::{AppError, Result};
use crate::utils::table::TableRow;

/// Payment method
#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_type", rename_all = "lowercase")]
pub enum PaymentType {
    Bmac,
    Paypal,
    Stripe,
}

impl Label for PaymentType {
    const ALL: &'static [Self] = &[PaymentType::Bmac, PaymentType::Paypal, PaymentType::Stripe];

    fn as_str(&self) -> &'static str {
        match self {
            PaymentType::Bmac => "bmac",
            PaymentType::Paypal => "paypal",
            PaymentType::Stripe => "stripe",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, sqlx::Type)]
#[sqlx(type_name = "payment_frequency", rename_all = "lowercase")]
pub enum PaymentFrequency {
    Monthly,
    Yearly,
}

impl Label for PaymentFrequency {
    const ALL: &'static [Self] = &[PaymentFrequency::Monthly, PaymentFrequency::Yearly];

    fn as_str(&self) -> &'static str {
        match self {
            PaymentFrequency::Monthly => "monthly",
            PaymentFrequency::Yearly => "yearly",
        }
    }
}

label_traits!(PaymentType, PaymentFrequency);

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Payment {
    pub id: i32,
    pub created: DateTime<Utc>,
    pub client_id: i32,
    #[sqlx(rename = "type")]
    pub payment_type: PaymentType,
    pub amount: Decimal,
    pub frequency: PaymentFrequency,
    pub plan: String,
}

#[derive(Debug, Clone)]
pub struct NewPayment {
    pub client_id: i32,
    pub payment_type: PaymentType,
    pub amount: Decimal,
    pub frequency: PaymentFrequency,
    pub plan: String,
}

impl NewPayment {
    /// Copies method, amount, frequency and plan from an earlier payment.
    pub fn repeat_of(previous: &Payment) -> Self {
        NewPayment {
            client_id: previous.client_id,
            payment_type: previous.payment_type,
            amount: previous.amount,
            frequency: previous.frequency,
            plan: previous.plan.clone(),
        }
    }
}

/// Parses an amount with at most two fraction digits.
pub fn parse_amount(value: &str) -> Result<Decimal> {
    let amount: Decimal = value
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidInput(format!("'{}' is not a valid amount", value)))?;
    if amount.is_sign_negative() {
        return Err(AppError::InvalidInput(format!("amount cannot be negative: {}", amount)));
    }
    if amount.scale() > 2 {
        return Err(AppError::InvalidInput(format!(
            "amount has more than two decimal places: {}",
            amount
        )));
    }
    Ok(amount)
}

const PAYMENT_COLUMNS: &str = "id, created, client_id, type, amount, frequency, plan";

impl Payment {
    pub async fn create(pool: &PgPool, data: NewPayment) -> Result<Self> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            r#"
            INSERT INTO payment (client_id, type, amount, frequency, plan)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {}
            "#,
            PAYMENT_COLUMNS
        ))
        .bind(data.client_id)
        .bind(data.payment_type)
        .bind(data.amount)
        .bind(data.frequency)
        .bind(data.plan)
        .fetch_one(pool)
        .await?;

        Ok(payment)
    }

    /// Oldest first.
    pub async fn find_by_client(pool: &PgPool, client_id: i32) -> Result<Vec<Self>> {
        let payments = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payment WHERE client_id = $1 ORDER BY created, id",
            PAYMENT_COLUMNS
        ))
        .bind(client_id)
        .fetch_all(pool)
        .await?;

        Ok(payments)
    }

    pub async fn latest_for_client(pool: &PgPool, client_id: i32) -> Result<Option<Self>> {
        let payment = sqlx::query_as::<_, Payment>(&format!(
            "SELECT {} FROM payment WHERE client_id = $1 ORDER BY created DESC, id DESC LIMIT 1",
            PAYMENT_COLUMNS
        ))
        .bind(client_id)
        .fetch_optional(pool)
        .await?;

        Ok(payment)
    }
}

impl TableRow for Payment {
    fn headers() -> Vec<&'static str> {
        vec!["id", "created", "client_id", "type", "amount", "frequency", "plan"]
    }

    fn cells(&self) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.created.format("%Y-%m-%d").to_string(),
            self.client_id.to_string(),
            self.payment_type.to_string(),
            self.amount.to_string(),
            self.frequency.to_string(),
            self.plan.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_amount() -> anyhow::Result<()> {
        assert_eq!(parse_amount("49")?, Decimal::new(49, 0));
        assert_eq!(parse_amount(" 9.99 ")?, Decimal::new(999, 2));
        assert!(parse_amount("-1").is_err());
        assert!(parse_amount("1.005").is_err());
        assert!(parse_amount("forty").is_err());
        Ok(())
    }

    #[test]
    fn test_repeat_of_copies_terms() {
        let previous = Payment {
            id: 3,
            created: Utc.with_ymd_and_hms(2024, 1, 5, 12, 0, 0).unwrap(),
            client_id: 11,
            payment_type: PaymentType::Stripe,
            amount: Decimal::new(4900, 2),
            frequency: PaymentFrequency::Monthly,
            plan: "pro_49".to_string(),
        };

        let next = NewPayment::repeat_of(&previous);
        assert_eq!(next.client_id, 11);
        assert_eq!(next.payment_type, PaymentType::Stripe);
        assert_eq!(next.amount, Decimal::new(4900, 2));
        assert_eq!(next.plan, "pro_49");
    }

    #[test]
    fn test_payment_labels() {
        assert_eq!("PayPal".parse::<PaymentType>().ok(), Some(PaymentType::Paypal));
        assert_eq!(PaymentFrequency::Yearly.to_string(), "yearly");
        assert!("weekly".parse::<PaymentFrequency>().is_err());
    }
}
