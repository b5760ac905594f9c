//! Remote pipeline runs against mock downstream actions

use crate::config_toml;
use contact_harvest::config::parse_config;
use contact_harvest::pipeline::{ExecutionMode, Pipeline, Stages};
use contact_harvest::storage::{Persistence, SqliteStorage};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn remote_pipeline(server: &MockServer, db: &std::path::Path) -> Pipeline {
    let extra = format!(
        r#"
[dispatch]
base-url = "{}/api"
api-key = "secret"
batch-size = 2
"#,
        server.uri()
    );
    let config = parse_config(&config_toml(db, &extra)).expect("config is valid");
    Pipeline::new(config, "remote-hash")
}

async fn mount_scrape(server: &MockServer, urls: &[&str], response: ResponseTemplate) {
    Mock::given(method("POST"))
        .and(path("/api/scrape-action"))
        .and(header("x-functions-key", "secret"))
        .and(body_json(json!({ "urls": urls })))
        .respond_with(response)
        .expect(1)
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_failed_batch_keeps_sibling_results() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("harvest.db");

    mount_scrape(
        &server,
        &["https://a.test", "https://b.test"],
        ResponseTemplate::new(200).set_body_json(json!(["x@a.test", "y@b.test"])),
    )
    .await;
    mount_scrape(
        &server,
        &["https://c.test", "https://d.test"],
        ResponseTemplate::new(500),
    )
    .await;
    mount_scrape(
        &server,
        &["https://e.test"],
        ResponseTemplate::new(200).set_body_json(json!({ "emails": ["Z@E.test", "x@a.test"] })),
    )
    .await;

    let mut storage = SqliteStorage::new(&db).unwrap();
    for target in ["a.test", "b.test", "c.test", "d.test", "e.test"] {
        storage.add_target(target).unwrap();
    }

    let pipeline = remote_pipeline(&server, &db);
    assert_eq!(pipeline.mode(), ExecutionMode::Remote);
    let report = pipeline.run(&mut storage).await.unwrap();

    assert_eq!(report.batches_ok, 2);
    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.emails_found, 3);
    assert_eq!(report.emails_recorded, 3);
    assert_eq!(
        storage.list_emails().unwrap(),
        vec!["x@a.test", "y@b.test", "z@e.test"]
    );
    assert!(storage.list_pending_targets().unwrap().is_empty());
}

#[tokio::test]
async fn test_remote_search_records_origins() {
    let server = MockServer::start().await;
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("harvest.db");

    Mock::given(method("POST"))
        .and(path("/api/search-action"))
        .and(body_json(json!({ "queries": ["dentists", "plumbers"] })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            "https://Dental.test/team?x=1",
            "https://dental.test/",
            "https://plumb.test",
            "not a url"
        ])))
        .expect(1)
        .mount(&server)
        .await;

    let mut storage = SqliteStorage::new(&db).unwrap();
    storage.add_query("dentists").unwrap();
    storage.add_query("plumbers").unwrap();

    let report = remote_pipeline(&server, &db)
        .with_stages(Stages::SearchOnly)
        .run(&mut storage)
        .await
        .unwrap();

    assert_eq!(report.batches_ok, 1);
    assert_eq!(report.origins_found, 2);
    let mut pending = storage.list_pending_targets().unwrap();
    pending.sort();
    assert_eq!(pending, vec!["https://dental.test", "https://plumb.test"]);
    assert!(storage.list_pending_queries().unwrap().is_empty());
}

#[tokio::test]
async fn test_unreachable_actions_complete_with_counters() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("harvest.db");
    let extra = r#"
[dispatch]
base-url = "http://127.0.0.1:9/api"
"#;
    let config = parse_config(&crate::config_toml(&db, extra)).unwrap();

    let mut storage = SqliteStorage::new(&db).unwrap();
    storage.add_target("https://a.test").unwrap();

    let report = Pipeline::new(config, "hash").run(&mut storage).await.unwrap();

    assert_eq!(report.batches_failed, 1);
    assert_eq!(report.emails_found, 0);
    assert!(storage.list_emails().unwrap().is_empty());
}
