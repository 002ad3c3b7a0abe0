mod helpers;

use chrono::Utc;
use linkmender::{
    content::{ContentStore, FieldValue, MemoryContentStore},
    remediation::{RemediationError, remove_link},
    repositories::BrokenLinkRepository,
};

use helpers::{record, test_pool};

const DEAD: &str = "http://dead.example/gone.png";

#[tokio::test]
async fn removes_link_from_body_and_fields_and_clears_rows() {
    let body = format!(r#"<p><a href="{DEAD}">Old link</a></p>"#);
    let store = MemoryContentStore::new([record(
        7,
        &body,
        vec![
            ("teaser".to_string(), FieldValue::Single(format!("read {DEAD} now"))),
            (
                "gallery".to_string(),
                FieldValue::Many(vec![
                    format!(r#"<img src="{DEAD}"/>"#),
                    "untouched entry".to_string(),
                ]),
            ),
        ],
    )]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    let now = Utc::now();
    repo.insert(7, DEAD, "http://site.example/7", now).await.unwrap();
    repo.insert(7, DEAD, "http://site.example/7", now).await.unwrap();
    repo.insert(8, DEAD, "http://site.example/8", now).await.unwrap();

    let removed = remove_link(store.as_ref(), &repo, 7, DEAD).await.unwrap();
    assert!(removed);

    let edited = store.get(7).await.unwrap().unwrap();
    assert_eq!(edited.body, "<p>Old link</p>");
    assert_eq!(
        edited.fields[0].1,
        FieldValue::Single("read  now".to_string())
    );
    assert_eq!(
        edited.fields[1].1,
        FieldValue::Many(vec![String::new(), "untouched entry".to_string()])
    );

    // Only record 7's rows are gone; record 8 still reports the link.
    assert_eq!(repo.count().await.unwrap(), 1);
    assert_eq!(repo.list_all().await.unwrap()[0].content_id, 8);
}

#[tokio::test]
async fn missing_content_reports_not_found_without_side_effects() {
    let store = MemoryContentStore::new([]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    repo.insert(9, DEAD, "http://site.example/9", Utc::now())
        .await
        .unwrap();

    let result = remove_link(store.as_ref(), &repo, 9, DEAD).await;
    assert!(matches!(result, Err(RemediationError::ContentNotFound(9))));
    assert_eq!(repo.count().await.unwrap(), 1);
}

#[tokio::test]
async fn absent_url_returns_false_and_keeps_rows() {
    let store = MemoryContentStore::new([record(5, "clean body", Vec::new())]);
    let repo = BrokenLinkRepository::new(test_pool().await);
    repo.insert(5, DEAD, "http://site.example/5", Utc::now())
        .await
        .unwrap();

    let removed = remove_link(store.as_ref(), &repo, 5, DEAD).await.unwrap();
    assert!(!removed);
    assert_eq!(repo.count().await.unwrap(), 1);

    let untouched = store.get(5).await.unwrap().unwrap();
    assert_eq!(untouched.body, "clean body");
}
