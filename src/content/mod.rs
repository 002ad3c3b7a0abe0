//! Abstract interface to the external content store.
//!
//! The audit never owns content; it reads records and, during remediation,
//! writes back edited bodies and field values. The only schema it assumes
//! is "a body text blob, a permalink, and named fields that are single- or
//! multi-valued strings". `MemoryContentStore` is the adapter used by
//! tests and the demo wiring; production deployments plug in their own.

use std::collections::BTreeMap;
use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::RwLock;

/// A named field's value on a content record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Single(String),
    Many(Vec<String>),
}

impl FieldValue {
    /// View the value as a slice of strings, flattening the two shapes.
    pub fn values(&self) -> &[String] {
        match self {
            Self::Single(value) => std::slice::from_ref(value),
            Self::Many(values) => values,
        }
    }
}

/// A content record as seen by the audit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: i64,
    pub body: String,
    /// Human-facing permalink, recorded alongside each broken link so the
    /// operator can jump to the offending page.
    pub permalink: String,
    pub fields: Vec<(String, FieldValue)>,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ContentStore: Send + Sync {
    /// All published records, the full audit universe.
    async fn list_published(&self) -> Result<Vec<ContentRecord>>;

    /// Fetch one record by id.
    async fn get(&self, id: i64) -> Result<Option<ContentRecord>>;

    /// Replace a record's body text.
    async fn update_body(&self, id: i64, body: &str) -> Result<()>;

    /// Replace one named field's value.
    async fn update_field(&self, id: i64, name: &str, value: FieldValue) -> Result<()>;

    /// Permalink for a record, if it exists.
    async fn permalink_of(&self, id: i64) -> Result<Option<String>>;
}

/// In-memory content store adapter.
#[derive(Default)]
pub struct MemoryContentStore {
    records: RwLock<BTreeMap<i64, ContentRecord>>,
}

impl MemoryContentStore {
    pub fn new(records: impl IntoIterator<Item = ContentRecord>) -> Arc<Self> {
        let records = records.into_iter().map(|r| (r.id, r)).collect();
        Arc::new(Self {
            records: RwLock::new(records),
        })
    }
}

#[async_trait]
impl ContentStore for MemoryContentStore {
    async fn list_published(&self) -> Result<Vec<ContentRecord>> {
        Ok(self.records.read().await.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> Result<Option<ContentRecord>> {
        Ok(self.records.read().await.get(&id).cloned())
    }

    async fn update_body(&self, id: i64, body: &str) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("content record {id} not found"))?;
        record.body = body.to_string();
        Ok(())
    }

    async fn update_field(&self, id: i64, name: &str, value: FieldValue) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .get_mut(&id)
            .ok_or_else(|| anyhow::anyhow!("content record {id} not found"))?;
        match record.fields.iter_mut().find(|(n, _)| n == name) {
            Some((_, existing)) => *existing = value,
            None => record.fields.push((name.to_string(), value)),
        }
        Ok(())
    }

    async fn permalink_of(&self, id: i64) -> Result<Option<String>> {
        Ok(self
            .records
            .read()
            .await
            .get(&id)
            .map(|r| r.permalink.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: i64) -> ContentRecord {
        ContentRecord {
            id,
            body: format!("body {id}"),
            permalink: format!("http://site.example/{id}"),
            fields: vec![(
                "gallery".to_string(),
                FieldValue::Many(vec!["a".to_string(), "b".to_string()]),
            )],
        }
    }

    #[tokio::test]
    async fn memory_store_round_trip() {
        let store = MemoryContentStore::new([record(1), record(2)]);

        let listed = store.list_published().await.unwrap();
        assert_eq!(listed.len(), 2);

        store.update_body(1, "edited").await.unwrap();
        let fetched = store.get(1).await.unwrap().unwrap();
        assert_eq!(fetched.body, "edited");

        store
            .update_field(1, "gallery", FieldValue::Single("c".to_string()))
            .await
            .unwrap();
        let fetched = store.get(1).await.unwrap().unwrap();
        assert_eq!(
            fetched.fields[0].1,
            FieldValue::Single("c".to_string())
        );

        assert_eq!(
            store.permalink_of(2).await.unwrap().as_deref(),
            Some("http://site.example/2")
        );
        assert!(store.get(99).await.unwrap().is_none());
        assert!(store.update_body(99, "x").await.is_err());
    }

    #[test]
    fn field_value_flattening() {
        let single = FieldValue::Single("one".to_string());
        assert_eq!(single.values(), ["one".to_string()]);
        let many = FieldValue::Many(vec!["a".to_string(), "b".to_string()]);
        assert_eq!(many.values().len(), 2);
    }
}
