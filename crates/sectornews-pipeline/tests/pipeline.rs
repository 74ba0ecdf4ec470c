//! End-to-end pipeline tests against a wiremock feed and a temp data dir.

use std::fmt::Write as _;

use chrono::{Duration, Utc};
use sectornews_core::KeywordCatalog;
use sectornews_feed::{FeedClient, FeedSettings};
use sectornews_pipeline::{collect, run, PipelineOptions};
use sectornews_store::BucketStore;
use wiremock::matchers::{method, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn catalog(pairs: &[(&str, Vec<&str>)]) -> KeywordCatalog {
    KeywordCatalog::new(pairs.iter().map(|(sector, keywords)| {
        (
            (*sector).to_string(),
            keywords.iter().map(|k| (*k).to_string()).collect::<Vec<_>>(),
        )
    }))
    .expect("valid catalog")
}

/// RSS body with one item per `(url, description)`, published yesterday.
fn feed(items: &[(&str, &str)]) -> String {
    let published = (Utc::now() - Duration::days(1)).to_rfc2822();
    let mut body = String::from(r#"<?xml version="1.0"?><rss version="2.0"><channel>"#);
    for (url, description) in items {
        write!(
            body,
            "<item><title>{description}</title><link>{url}</link>\
             <pubDate>{published}</pubDate>\
             <description>&lt;a href=\"{url}\"&gt;{description}&lt;/a&gt;</description>\
             <source url=\"https://wire.example\">Wire</source></item>"
        )
        .unwrap();
    }
    body.push_str("</channel></rss>");
    body
}

async fn mount_feed(server: &MockServer, keyword: &str, body: String) {
    Mock::given(method("GET"))
        .and(query_param("q", keyword))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

fn client(server: &MockServer) -> FeedClient {
    FeedClient::new(FeedSettings {
        base_url: format!("{}/rss/search", server.uri()),
        max_retries: 0,
        backoff_base_ms: 1,
        ..FeedSettings::default()
    })
    .expect("client construction should not fail")
}

#[tokio::test]
async fn failing_keyword_does_not_block_others() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(query_param("q", "chip"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    mount_feed(
        &server,
        "ai",
        feed(&[("https://n.example/ai-1", "Model launch delayed")]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(dir.path());
    let summary = collect(
        &client(&server),
        &catalog(&[("tech", vec!["chip", "ai"])]),
        &PipelineOptions::default(),
        &store,
    )
    .await;

    assert_eq!(summary.tasks, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].keyword, "chip");
    assert!(summary.failures[0].error.contains("500"));
    assert_eq!(summary.accepted(), 1);
    assert!(summary.failed_dates().is_empty());
}

#[tokio::test]
async fn identical_urls_are_merged_once() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "chip",
        feed(&[
            ("https://n.example/1", "Samsung unveils new chip factory"),
            ("https://n.example/1", "Samsung unveils new chip factory"),
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(dir.path());
    let summary = collect(
        &client(&server),
        &catalog(&[("tech", vec!["chip"])]),
        &PipelineOptions::default(),
        &store,
    )
    .await;

    assert_eq!(summary.fetched, 2);
    assert_eq!(summary.accepted(), 1);
    assert_eq!(summary.rejected_exact(), 1);
}

#[tokio::test]
async fn similar_descriptions_under_different_keywords_are_kept() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "chip",
        feed(&[("https://n.example/1", "Samsung unveils new chip factory")]),
    )
    .await;
    mount_feed(
        &server,
        "foundry",
        feed(&[("https://n.example/2", "Samsung unveils chip factory today")]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(dir.path());
    let summary = collect(
        &client(&server),
        &catalog(&[("tech", vec!["chip", "foundry"])]),
        &PipelineOptions::default(),
        &store,
    )
    .await;

    assert_eq!(summary.accepted(), 2);
    assert_eq!(summary.rejected_similar(), 0);
}

#[tokio::test]
async fn near_duplicate_under_same_keyword_is_dropped() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "chip",
        feed(&[
            ("https://a.example/1", "Samsung unveils new chip factory in Pyeongtaek"),
            ("https://b.example/2", "Samsung unveils new chip factory in Pyeongtaek today"),
        ]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(dir.path());
    let summary = collect(
        &client(&server),
        &catalog(&[("tech", vec!["chip"])]),
        &PipelineOptions::default(),
        &store,
    )
    .await;

    assert_eq!(summary.accepted(), 1);
    assert_eq!(summary.rejected_similar(), 1);
}

#[tokio::test]
async fn run_writes_tables_and_is_idempotent() {
    let server = MockServer::start().await;
    mount_feed(
        &server,
        "chip",
        feed(&[
            ("https://n.example/1", "Chip exports rise for third month"),
            ("https://n.example/2", "Foundry wins automotive contract"),
        ]),
    )
    .await;
    mount_feed(
        &server,
        "battery",
        feed(&[("https://n.example/3", "Battery plant opens in Ulsan")]),
    )
    .await;

    let dir = tempfile::tempdir().unwrap();
    let store = BucketStore::new(dir.path().join("news"));
    let summary_dir = dir.path().join("summary");
    let client = client(&server);
    let catalog = catalog(&[("tech", vec!["chip"]), ("auto", vec!["battery"])]);
    let options = PipelineOptions::default();

    let first = run(&client, &catalog, &options, &store, &summary_dir)
        .await
        .expect("first run should succeed");
    let second = run(&client, &catalog, &options, &store, &summary_dir)
        .await
        .expect("second run should succeed");

    assert_eq!(first.collect.accepted(), 3);
    assert_eq!(second.collect.accepted(), 0);
    assert_eq!(second.collect.rejected_exact(), 3);
    assert_eq!(first.tables, second.tables);

    let sector_total: usize = second.tables.sector_counts.iter().map(|r| r.count).sum();
    let keyword_total: usize = second.tables.keyword_counts.iter().map(|r| r.count).sum();
    assert_eq!(sector_total, 3);
    assert_eq!(keyword_total, 3);

    let sector_csv = std::fs::read_to_string(summary_dir.join("sector.csv")).unwrap();
    assert!(sector_csv.starts_with("date,sector,count\n"));
    assert!(sector_csv.contains(",auto,1\n"));
    assert!(sector_csv.contains(",tech,2\n"));
}
