//! Operational tooling for the CRM database
//!
//! Validates connection configuration, takes full logical backups with
//! `pg_dump`, provisions a least-privilege application role through `psql`,
//! and carries the CRM schema and the client/contact/payment commands that
//! work against it.

pub mod backup;
pub mod config;
pub mod crm;
pub mod errors;
pub mod models;
pub mod provision;
pub mod schema;
pub mod utils;
