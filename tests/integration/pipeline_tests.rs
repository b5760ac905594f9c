//! Local pipeline runs: config file, search endpoint, websites, database

use crate::config_toml;
use contact_harvest::config::load_config_with_hash;
use contact_harvest::output::{generate_markdown_summary, generate_summary};
use contact_harvest::pipeline::{ExecutionMode, Pipeline, Stages};
use contact_harvest::storage::{open_storage, Persistence, RunStatus};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_html(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html"),
        )
        .mount(server)
        .await;
}

/// Writes a local-mode config whose search endpoint is the mock server
fn write_config(dir: &std::path::Path, server: &MockServer) -> std::path::PathBuf {
    let db = dir.join("harvest.db");
    let extra = format!(
        r#"
[search]
endpoint = "{}/html/"
"#,
        server.uri()
    );
    let config_path = dir.join("harvest.toml");
    std::fs::write(&config_path, config_toml(&db, &extra)).unwrap();
    config_path
}

#[tokio::test]
async fn test_end_to_end_query_to_emails() {
    let server = MockServer::start().await;
    let base = server.uri();

    // Search endpoint returns a redirect-wrapped hit on the mock site
    Mock::given(method("GET"))
        .and(path("/html/"))
        .and(query_param("q", "dentists"))
        .respond_with(ResponseTemplate::new(200).set_body_string(format!(
            r#"<a class="result__a" href="https://duckduckgo.com/l/?uddg={}%2Fservices%3Fid%3D3">Clinic</a>"#,
            base.replace(':', "%3A").replace('/', "%2F")
        )))
        .expect(1)
        .mount(&server)
        .await;

    mount_html(
        &server,
        "/",
        r#"<a href="/contact">Contact</a><a href="/pricing">Pricing</a>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/contact",
        "<p>Appointments: desk@clinic.test</p>".to_string(),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);
    let (config, hash) = load_config_with_hash(&config_path).unwrap();
    let db_path = std::path::PathBuf::from(&config.output.database_path);
    let summary_path = std::path::PathBuf::from(&config.output.summary_path);

    let mut storage = open_storage(&db_path).unwrap();
    storage.add_query("dentists").unwrap();

    let pipeline = Pipeline::new(config, hash.clone());
    assert_eq!(pipeline.mode(), ExecutionMode::Local);
    let report = pipeline.run(&mut storage).await.unwrap();

    assert_eq!(report.queries_ok, 1);
    assert_eq!(report.origins_found, 1);
    assert_eq!(report.seeds_ok, 1);
    assert_eq!(report.pages_ok, 2);
    assert_eq!(storage.list_emails().unwrap(), vec!["desk@clinic.test"]);
    assert_eq!(storage.list_targets().unwrap(), vec![base.clone()]);

    let run = storage.get_latest_run().unwrap().unwrap();
    assert_eq!(run.status, RunStatus::Completed);
    assert_eq!(run.config_hash, hash);

    let summary = generate_summary(&storage).unwrap();
    generate_markdown_summary(&summary, &summary_path).unwrap();
    let markdown = std::fs::read_to_string(&summary_path).unwrap();
    assert!(markdown.contains("- desk@clinic.test"));
}

#[tokio::test]
async fn test_failed_query_and_seed_are_contained() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/html/"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;
    mount_html(&server, "/", "<p>x@a.test</p>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (config, hash) = load_config_with_hash(&write_config(dir.path(), &server)).unwrap();
    let mut storage = open_storage(std::path::Path::new(&config.output.database_path)).unwrap();
    storage.add_query("blocked").unwrap();
    storage.add_target(&server.uri()).unwrap();
    storage.add_target("http://127.0.0.1:9").unwrap();

    let report = Pipeline::new(config, hash).run(&mut storage).await.unwrap();

    assert_eq!(report.queries_failed, 1);
    assert_eq!(report.seeds_ok, 1);
    assert_eq!(report.seeds_failed, 1);
    assert!(report.has_failures());
    assert_eq!(storage.list_emails().unwrap(), vec!["x@a.test"]);
    assert_eq!(
        storage.get_latest_run().unwrap().unwrap().status,
        RunStatus::Completed
    );
}

#[tokio::test]
async fn test_crawl_only_keeps_queries_pending() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<p>x@a.test</p>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let (config, hash) = load_config_with_hash(&write_config(dir.path(), &server)).unwrap();
    let mut storage = open_storage(std::path::Path::new(&config.output.database_path)).unwrap();
    storage.add_query("later").unwrap();
    storage.add_target(&server.uri()).unwrap();

    let report = Pipeline::new(config, hash)
        .with_stages(Stages::CrawlOnly)
        .run(&mut storage)
        .await
        .unwrap();

    assert_eq!(report.queries_ok, 0);
    assert_eq!(report.seeds_ok, 1);
    assert_eq!(storage.list_pending_queries().unwrap(), vec!["later"]);
}

#[tokio::test]
async fn test_second_run_records_nothing_new() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<p>x@a.test</p>".to_string()).await;

    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(dir.path(), &server);

    for expected_new in [1, 0] {
        let (config, hash) = load_config_with_hash(&config_path).unwrap();
        let mut storage =
            open_storage(std::path::Path::new(&config.output.database_path)).unwrap();
        storage.add_target(&server.uri()).unwrap();

        let report = Pipeline::new(config, hash).run(&mut storage).await.unwrap();
        assert_eq!(report.emails_found, 1);
        assert_eq!(report.emails_recorded, expected_new);
    }
}
