//! Crawl worker against mock websites

use contact_harvest::config::{ClientConfig, CrawlConfig};
use contact_harvest::crawler::{build_http_client, CrawlWorker, HttpPageFetcher};
use contact_harvest::state::SeedOutcome;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn worker() -> CrawlWorker {
    let client = build_http_client(&ClientConfig::default()).expect("client builds");
    CrawlWorker::from_config(
        Arc::new(HttpPageFetcher::new(client)),
        &CrawlConfig::default(),
    )
}

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

#[tokio::test]
async fn test_crawl_follows_contact_links_only() {
    let server = MockServer::start().await;
    let base = server.uri();

    mount_html(
        &server,
        "/",
        r#"<html><body>
            <a href="/contact-us">Contact</a>
            <a href="/about">About</a>
            <a href="/blog">Blog</a>
            <a href="https://evil.test/contact">Elsewhere</a>
            <p>Sales: SALES@Site.test</p>
        </body></html>"#
            .to_string(),
    )
    .await;
    mount_html(
        &server,
        "/contact-us",
        r#"<a href="mailto:hello@site.test?subject=Hi">Write us</a>"#.to_string(),
    )
    .await;
    mount_html(
        &server,
        "/about",
        "<p>Founded by ceo@site.test</p><img src='logo@2x.png'>".to_string(),
    )
    .await;
    mount_html(&server, "/blog", "<p>blogger@site.test</p>".to_string()).await;

    let report = worker().crawl_seed(&base).await;

    assert_eq!(report.outcome, SeedOutcome::Completed);
    assert_eq!(report.pages_fetched, 3);
    assert_eq!(report.pages_failed, 0);

    let mut emails: Vec<_> = report.emails.into_iter().collect();
    emails.sort();
    assert_eq!(
        emails,
        vec!["ceo@site.test", "hello@site.test", "sales@site.test"]
    );
}

#[tokio::test]
async fn test_crawl_isolates_unreachable_seed() {
    let server = MockServer::start().await;
    mount_html(&server, "/", "<p>x@a.test</p>".to_string()).await;

    let seeds = vec![server.uri(), "http://127.0.0.1:9".to_string()];
    let summary = worker().crawl(&seeds).await;

    assert_eq!(summary.seeds_ok, 1);
    assert_eq!(summary.seeds_failed, 1);
    assert_eq!(summary.emails.len(), 1);
    assert!(summary.emails.contains("x@a.test"));
}

#[tokio::test]
async fn test_crawl_seed_error_status_yields_empty_set() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let report = worker().crawl_seed(&server.uri()).await;

    assert_eq!(report.outcome, SeedOutcome::SeedUnreachable);
    assert!(report.emails.is_empty());
}

#[tokio::test]
async fn test_crawl_failed_contact_page_keeps_other_pages() {
    let server = MockServer::start().await;
    mount_html(
        &server,
        "/",
        r#"<a href="/contact">Contact</a><a href="/support">Support</a>"#.to_string(),
    )
    .await;
    Mock::given(method("GET"))
        .and(path("/contact"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_html(&server, "/support", "help@site.test".to_string()).await;

    let report = worker().crawl_seed(&server.uri()).await;

    assert_eq!(report.outcome, SeedOutcome::Completed);
    assert_eq!(report.pages_failed, 1);
    assert!(report.emails.contains("help@site.test"));
}
