mod helpers;

use std::sync::Arc;
use std::time::Duration;

use linkmender::{
    audit::{AuditError, Auditor},
    content::{FieldValue, MemoryContentStore},
    probe::Prober,
    repositories::BrokenLinkRepository,
};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path},
};

use helpers::{RecordingNotifier, audit_config, record, test_pool};

async fn mock_site() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/dead.png"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/alive"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .mount(&server)
        .await;
    server
}

#[tokio::test]
async fn audit_records_only_the_broken_reference() {
    let server = mock_site().await;
    let dead = format!("{}/dead.png", server.uri());
    let alive = format!("{}/alive", server.uri());

    let body = format!(r#"Intro <img src="{dead}"/> and <a href="{alive}">fine</a>."#);
    let store = MemoryContentStore::new([record(
        42,
        &body,
        vec![(
            "sidebar".to_string(),
            FieldValue::Single(format!("see {alive}")),
        )],
    )]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    let notifier = RecordingNotifier::new();
    let auditor = Auditor::new(
        store,
        repo.clone(),
        notifier.clone(),
        Prober::new(Duration::from_secs(5)),
    );

    let config = audit_config();
    let summary = auditor.run(&config).await.unwrap();
    assert_eq!(summary.records_scanned, 1);
    assert_eq!(summary.urls_checked, 3);
    assert_eq!(summary.broken_links, 1);

    let rows = repo.list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].content_id, 42);
    assert_eq!(rows[0].url, dead);
    assert_eq!(rows[0].source_url, "http://site.example/42");

    let deliveries = notifier.deliveries().await;
    assert_eq!(deliveries.len(), 1);
    let (recipient, subject, body) = &deliveries[0];
    assert_eq!(recipient, &config.notification_email);
    assert_eq!(subject, "Broken Links Found");
    assert!(body.contains("1 broken links"));
}

#[tokio::test]
async fn rerun_replaces_rather_than_accumulates() {
    let server = mock_site().await;
    let dead = format!("{}/dead.png", server.uri());

    let store = MemoryContentStore::new([record(
        7,
        &format!("broken: {dead}"),
        Vec::new(),
    )]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    let auditor = Auditor::new(
        store,
        repo.clone(),
        RecordingNotifier::new(),
        Prober::new(Duration::from_secs(5)),
    );

    let config = audit_config();
    auditor.run(&config).await.unwrap();
    auditor.run(&config).await.unwrap();

    // Full-replace semantics: the table reflects the second run only.
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn duplicate_occurrences_in_one_record_are_recorded_twice() {
    let server = mock_site().await;
    let dead = format!("{}/dead.png", server.uri());

    let store = MemoryContentStore::new([record(
        3,
        &format!("first {dead} and again {dead}"),
        Vec::new(),
    )]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    let auditor = Auditor::new(
        store,
        repo.clone(),
        RecordingNotifier::new(),
        Prober::new(Duration::from_secs(5)),
    );

    let summary = auditor.run(&audit_config()).await.unwrap();
    assert_eq!(summary.broken_links, 2);
    assert_eq!(repo.count().await.unwrap(), 2);
}

#[tokio::test]
async fn store_failure_surfaces_as_run_level_error() {
    // A closed pool makes the first write fail; the run must abort with a
    // store error instead of panicking or reporting a summary.
    let pool = test_pool().await;
    let repo = BrokenLinkRepository::new(pool.clone());
    pool.close().await;

    let store = MemoryContentStore::new([record(1, "plain body", Vec::new())]);
    let auditor = Auditor::new(
        store,
        repo,
        RecordingNotifier::new(),
        Prober::new(Duration::from_secs(5)),
    );

    let result = auditor.run(&audit_config()).await;
    assert!(matches!(result, Err(AuditError::Store(_))));
}

#[tokio::test]
async fn concurrent_trigger_is_rejected_not_interleaved() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(404).set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let slow = format!("{}/slow", server.uri());
    let store = MemoryContentStore::new([record(1, &format!("link {slow}"), Vec::new())]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    let auditor = Arc::new(Auditor::new(
        store,
        repo.clone(),
        RecordingNotifier::new(),
        Prober::new(Duration::from_secs(5)),
    ));

    let config = audit_config();
    let first = {
        let auditor = auditor.clone();
        let config = config.clone();
        tokio::spawn(async move { auditor.run(&config).await })
    };
    // Give the first run time to take the lock and start its sweep.
    tokio::time::sleep(Duration::from_millis(100)).await;
    let second = auditor.run(&config).await;

    assert!(matches!(second, Err(AuditError::AlreadyRunning)));

    let first = first.await.unwrap().unwrap();
    assert_eq!(first.broken_links, 1);
    // The rejected trigger cleared nothing mid-sweep.
    assert_eq!(repo.count().await.unwrap(), 1);
}
