//! CRM models and database operations
//!
//! Each table in `schema/crm.sql` has a row struct and a `New*` input struct.
//! Every closed set in the schema is a Postgres enum mirrored by a Rust enum
//! here, so out-of-set values are rejected by the database and unrepresentable
//! on this side.

/// `Display` and `FromStr` through the enum's [`Label`] set.
macro_rules! label_traits {
    ($($ty:ty),*) => {
        $(
            impl std::fmt::Display for $ty {
                fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                    f.write_str($crate::models::Label::as_str(self))
                }
            }

            impl std::str::FromStr for $ty {
                type Err = $crate::errors::AppError;

                fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
                    $crate::models::parse_label(s)
                }
            }
        )*
    };
}

pub mod client;
pub mod contact;
pub mod event;
pub mod payment;
pub mod summary;

pub use client::{Client, ClientPlan, ClientStatus, ClientType, NewClient, PlanChange, UpdateClient};
pub use contact::{Contact, NewContact};
pub use event::{Event, EventType, NewEvent};
pub use payment::{NewPayment, Payment, PaymentFrequency, PaymentType};
pub use summary::ClientSummary;

use crate::errors::AppError;

/// A Postgres enum label set.
pub trait Label: Sized + Copy + 'static {
    const ALL: &'static [Self];

    fn as_str(&self) -> &'static str;
}

/// Parses a storage label, case-insensitively, into one of `T::ALL`.
pub fn parse_label<T: Label>(value: &str) -> Result<T, AppError> {
    let wanted = value.trim();
    T::ALL
        .iter()
        .copied()
        .find(|candidate| candidate.as_str().eq_ignore_ascii_case(wanted))
        .ok_or_else(|| {
            let choices: Vec<&str> = T::ALL.iter().map(|c| c.as_str()).collect();
            AppError::InvalidInput(format!(
                "'{}' is not one of: {}",
                value,
                choices.join(", ")
            ))
        })
}
