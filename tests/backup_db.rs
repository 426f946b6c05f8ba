mod common;

use dirttool::backup::{PgDump, perform_backup};
use dirttool::config::BackupConfig;
use dirttool::models::{Client, ClientPlan, ClientType, NewClient};
use dirttool::utils::find_pg_dump_executable;

#[tokio::test]
async fn real_pg_dump_writes_a_self_contained_insert_script() {
    let Some(db) = common::setup().await else { return };
    let pg_dump = match find_pg_dump_executable() {
        Ok(path) => path,
        Err(e) => {
            eprintln!("{}, skipping", e);
            db.teardown().await;
            return;
        }
    };

    Client::create(
        &db.pool,
        NewClient {
            name: "Acme Corp".into(),
            nick: "acme".into(),
            client_type: ClientType::Slack,
            plan: ClientPlan::Extra,
            notes: "it's a test".into(),
            url: None,
            team: None,
        },
    )
    .await
    .expect("create client");

    let connection = common::connection_config(&db.url);
    let out = tempfile::TempDir::new().expect("output dir");
    let backup_config = BackupConfig {
        backup_dir: out.path().to_path_buf(),
        ..Default::default()
    };
    let artifact = perform_backup(
        &PgDump,
        &pg_dump,
        &connection,
        &backup_config,
        chrono::Local::now(),
    )
    .expect("pg_dump export");

    let content = std::fs::read_to_string(&artifact).expect("read artifact");
    let dbname = &connection.dbname;
    assert!(
        content.lines().any(|l| l.starts_with("DROP DATABASE IF EXISTS") && l.contains(dbname.as_str())),
        "no DROP DATABASE line for {}",
        dbname
    );
    assert!(
        content.lines().any(|l| l.starts_with("CREATE DATABASE") && l.contains(dbname.as_str())),
        "no CREATE DATABASE line for {}",
        dbname
    );
    assert!(content.contains(&format!("INSERT INTO {}.client VALUES", db.schema)));
    assert!(content.contains("'Acme Corp'"));
    assert!(content.contains("'it''s a test'"));
    assert!(
        !content
            .lines()
            .any(|l| l.starts_with("COPY ") && l.trim_end().ends_with("FROM stdin;")),
        "artifact uses COPY blocks"
    );

    db.teardown().await;
}
