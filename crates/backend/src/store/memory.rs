//! In-memory document store.
//!
//! Same observable semantics as the `PostgreSQL` store, including create
//! conflicts and version checks. Used by the test suites and handy for
//! running the backend without a database.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use serde_json::Value;

use super::{Document, DocumentStore, Filter, Query, SortOrder, StoreError};

/// Document store held in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, BTreeMap<String, Document>>>,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock_poisoned() -> StoreError {
        StoreError::DataCorruption("memory store lock poisoned".to_owned())
    }
}

fn field_str<'a>(doc: &'a Document, field: &str) -> Option<&'a str> {
    doc.data.get(field).and_then(Value::as_str)
}

fn matches(doc: &Document, filter: &Filter) -> bool {
    match filter {
        Filter::Eq(field, value) => doc.data.get(field) == Some(value),
        Filter::Gte(field, value) => field_str(doc, field).is_some_and(|v| v >= value.as_str()),
        Filter::Lte(field, value) => field_str(doc, field).is_some_and(|v| v <= value.as_str()),
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::lock_poisoned())?;
        Ok(collections
            .get(collection)
            .and_then(|docs| docs.get(id))
            .cloned())
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_poisoned())?;
        let docs = collections.entry(collection.to_owned()).or_default();
        if docs.contains_key(id) {
            return Err(StoreError::Conflict(id.to_owned()));
        }
        let doc = Document {
            id: id.to_owned(),
            version: 1,
            data,
        };
        docs.insert(id.to_owned(), doc.clone());
        Ok(doc)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        expected_version: i64,
        data: Value,
    ) -> Result<Document, StoreError> {
        let mut collections = self.collections.write().map_err(|_| Self::lock_poisoned())?;
        let doc = collections
            .get_mut(collection)
            .and_then(|docs| docs.get_mut(id))
            .ok_or(StoreError::NotFound)?;
        if doc.version != expected_version {
            return Err(StoreError::VersionConflict {
                id: id.to_owned(),
                expected: expected_version,
            });
        }
        doc.version += 1;
        doc.data = data;
        Ok(doc.clone())
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let collections = self.collections.read().map_err(|_| Self::lock_poisoned())?;
        let mut results: Vec<Document> = collections
            .get(collection)
            .map(|docs| {
                docs.values()
                    .filter(|doc| query.filters.iter().all(|f| matches(doc, f)))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some((field, order)) = &query.order_by {
            results.sort_by(|a, b| {
                let ka = field_str(a, field).unwrap_or_default();
                let kb = field_str(b, field).unwrap_or_default();
                match order {
                    SortOrder::Ascending => ka.cmp(kb),
                    SortOrder::Descending => kb.cmp(ka),
                }
            });
        }

        if let Some(limit) = query.limit {
            results.truncate(usize::try_from(limit).unwrap_or(usize::MAX));
        }

        Ok(results)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn test_get_absent() {
        let store = MemoryStore::new();
        let doc = store.get("profiles", "missing").await.expect("get");
        assert!(doc.is_none());
    }

    #[tokio::test]
    async fn test_create_then_get() {
        let store = MemoryStore::new();
        let created = store
            .create("profiles", "acct_1", json!({"firstName": "Ana"}))
            .await
            .expect("create");
        assert_eq!(created.version, 1);

        let fetched = store
            .get("profiles", "acct_1")
            .await
            .expect("get")
            .expect("present");
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn test_create_conflict() {
        let store = MemoryStore::new();
        store
            .create("profiles", "acct_1", json!({}))
            .await
            .expect("first create");
        let err = store
            .create("profiles", "acct_1", json!({}))
            .await
            .expect_err("duplicate create");
        assert!(matches!(err, StoreError::Conflict(id) if id == "acct_1"));
    }

    #[tokio::test]
    async fn test_update_version_check() {
        let store = MemoryStore::new();
        store
            .create("analytics", "s_2024-01-01", json!({"totalViews": 1}))
            .await
            .expect("create");

        let updated = store
            .update("analytics", "s_2024-01-01", 1, json!({"totalViews": 2}))
            .await
            .expect("update");
        assert_eq!(updated.version, 2);

        // Re-using the stale version must fail.
        let err = store
            .update("analytics", "s_2024-01-01", 1, json!({"totalViews": 3}))
            .await
            .expect_err("stale update");
        assert!(matches!(err, StoreError::VersionConflict { expected: 1, .. }));
    }

    #[tokio::test]
    async fn test_update_missing() {
        let store = MemoryStore::new();
        let err = store
            .update("analytics", "missing", 1, json!({}))
            .await
            .expect_err("missing update");
        assert!(matches!(err, StoreError::NotFound));
    }

    #[tokio::test]
    async fn test_query_filters_order_limit() {
        let store = MemoryStore::new();
        for (id, date, views) in [
            ("s_2024-01-01", "2024-01-01", 5),
            ("s_2024-01-02", "2024-01-02", 3),
            ("s_2024-01-03", "2024-01-03", 7),
            ("t_2024-01-02", "2024-01-02", 9),
        ] {
            let store_id = if id.starts_with('s') { "s" } else { "t" };
            store
                .create(
                    "analytics",
                    id,
                    json!({"storeId": store_id, "date": date, "totalViews": views}),
                )
                .await
                .expect("create");
        }

        let results = store
            .query(
                "analytics",
                Query::new()
                    .filter_eq("storeId", "s")
                    .filter_gte("date", "2024-01-02")
                    .filter_lte("date", "2024-01-03")
                    .order_by("date", SortOrder::Descending),
            )
            .await
            .expect("query");

        let dates: Vec<&str> = results
            .iter()
            .filter_map(|d| d.data.get("date").and_then(Value::as_str))
            .collect();
        assert_eq!(dates, vec!["2024-01-03", "2024-01-02"]);

        let limited = store
            .query(
                "analytics",
                Query::new().filter_eq("storeId", "s").limit(1),
            )
            .await
            .expect("query");
        assert_eq!(limited.len(), 1);
    }
}
