// Shared setup for tests that need a live PostgreSQL server.
//
// Set DIRTY_TEST_DATABASE_URL to a database the test user may create schemas
// and roles in. Each test gets its own schema; tests without the variable
// return early.
#![allow(dead_code)]

use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Connection, Executor, PgConnection};
use std::sync::atomic::{AtomicUsize, Ordering};

use dirttool::config::ConnectionConfig;
use dirttool::schema;

pub const TEST_DATABASE_URL: &str = "DIRTY_TEST_DATABASE_URL";

static COUNTER: AtomicUsize = AtomicUsize::new(0);

pub struct TestDb {
    pub url: String,
    pub schema: String,
    pub pool: PgPool,
}

pub fn unique_name(prefix: &str) -> String {
    format!(
        "{}_{}_{}",
        prefix,
        std::process::id(),
        COUNTER.fetch_add(1, Ordering::SeqCst)
    )
}

/// Fresh schema with the CRM DDL applied, or `None` without a test database.
pub async fn setup() -> Option<TestDb> {
    let db = empty_schema().await?;
    schema::apply(&db.pool).await.expect("apply CRM schema");
    Some(db)
}

/// Fresh, empty schema with the pool's search_path pointing at it.
pub async fn empty_schema() -> Option<TestDb> {
    let url = match std::env::var(TEST_DATABASE_URL) {
        Ok(url) => url,
        Err(_) => {
            eprintln!("{} not set, skipping", TEST_DATABASE_URL);
            return None;
        }
    };
    let schema = unique_name("dirttool_test");

    let mut admin = PgConnection::connect(&url).await.expect("connect to test database");
    admin
        .execute(format!("CREATE SCHEMA \"{}\"", schema).as_str())
        .await
        .expect("create test schema");
    admin.close().await.expect("close admin connection");

    let search_path = schema.clone();
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .after_connect(move |conn, _meta| {
            let statement = format!("SET search_path TO \"{}\"", search_path);
            Box::pin(async move {
                conn.execute(statement.as_str()).await?;
                Ok(())
            })
        })
        .connect(&url)
        .await
        .expect("connect test pool");

    Some(TestDb { url, schema, pool })
}

impl TestDb {
    pub async fn teardown(self) {
        self.pool
            .execute(format!("DROP SCHEMA \"{}\" CASCADE", self.schema).as_str())
            .await
            .expect("drop test schema");
        self.pool.close().await;
    }
}

/// Connection settings for the external tools, taken from the test URL.
pub fn connection_config(url: &str) -> ConnectionConfig {
    let parsed = url::Url::parse(url).expect("valid test database URL");
    let port = parsed.port().unwrap_or(5432).to_string();
    let values = [
        ("DIRTY_USER", parsed.username().to_string()),
        ("DIRTY_PASS", parsed.password().unwrap_or_default().to_string()),
        ("DIRTY_HOST", parsed.host_str().unwrap_or("localhost").to_string()),
        ("DIRTY_PORT", port),
        ("DIRTY_DB", parsed.path().trim_start_matches('/').to_string()),
    ];
    ConnectionConfig::from_lookup(|key: &str| {
        values
            .iter()
            .find(|(name, _)| *name == key)
            .map(|(_, value)| value.clone())
    })
    .expect("test database URL names user, password, host and database")
}
