//! Document store client.
//!
//! The backing persistence for all core services is a collection of
//! uniquely-keyed JSON documents with per-document optimistic versioning.
//! There are no cross-document transactions and no arithmetic-increment
//! primitive; concurrent writers coordinate through the version check on
//! [`DocumentStore::update`].
//!
//! Two implementations exist: [`PostgresStore`] (a single JSONB table) for
//! production and [`MemoryStore`] for tests and local development.

use async_trait::async_trait;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::{PostgresStore, create_pool};

/// Errors that can occur during document store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or does not match the expected shape.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested document was not found.
    #[error("not found")]
    NotFound,

    /// A document with this id already exists in the collection.
    #[error("document already exists: {0}")]
    Conflict(String),

    /// The document was modified since it was read.
    #[error("stale version for {id}: expected {expected}")]
    VersionConflict {
        /// Document id whose update was rejected.
        id: String,
        /// Version the writer expected to find.
        expected: i64,
    },
}

/// A stored document: an opaque JSON body plus its identity and version.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Unique id within its collection.
    pub id: String,
    /// Monotonically increasing version, starting at 1 on create.
    pub version: i64,
    /// The document body.
    pub data: Value,
}

impl Document {
    /// Decode the document body into a typed model.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::DataCorruption` if the body does not match `T`.
    pub fn decode<T: DeserializeOwned>(&self) -> Result<T, StoreError> {
        serde_json::from_value(self.data.clone())
            .map_err(|e| StoreError::DataCorruption(format!("document {}: {e}", self.id)))
    }
}

/// Encode a typed model into a document body.
///
/// # Errors
///
/// Returns `StoreError::DataCorruption` if the model cannot be represented
/// as JSON.
pub fn encode<T: Serialize>(model: &T) -> Result<Value, StoreError> {
    serde_json::to_value(model).map_err(|e| StoreError::DataCorruption(e.to_string()))
}

/// A filter on a top-level field of the document body.
#[derive(Debug, Clone)]
pub enum Filter {
    /// Field equals the given JSON value.
    Eq(String, Value),
    /// Field (as text) is lexicographically `>=` the given string.
    Gte(String, String),
    /// Field (as text) is lexicographically `<=` the given string.
    Lte(String, String),
}

/// Sort direction for [`Query::order_by`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

/// A query against one collection: field filters, optional ordering by a
/// top-level field, optional limit.
#[derive(Debug, Clone, Default)]
pub struct Query {
    /// Conjunction of field filters.
    pub filters: Vec<Filter>,
    /// Order results by this top-level field.
    pub order_by: Option<(String, SortOrder)>,
    /// Maximum number of documents to return.
    pub limit: Option<i64>,
}

impl Query {
    /// An empty query matching the whole collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an equality filter.
    #[must_use]
    pub fn filter_eq(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filters.push(Filter::Eq(field.to_owned(), value.into()));
        self
    }

    /// Add a `>=` filter on a string field.
    #[must_use]
    pub fn filter_gte(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Gte(field.to_owned(), value.into()));
        self
    }

    /// Add a `<=` filter on a string field.
    #[must_use]
    pub fn filter_lte(mut self, field: &str, value: impl Into<String>) -> Self {
        self.filters.push(Filter::Lte(field.to_owned(), value.into()));
        self
    }

    /// Order results by a field.
    #[must_use]
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some((field.to_owned(), order));
        self
    }

    /// Cap the number of results.
    #[must_use]
    pub const fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Keyed get/create/update/query over JSON documents.
///
/// `create` fails with [`StoreError::Conflict`] when the id exists; `update`
/// fails with [`StoreError::VersionConflict`] when the stored version no
/// longer matches `expected_version`. Those two errors are the only
/// concurrency signals the store provides.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Fetch a document by id, or `None` if absent.
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError>;

    /// Create a document with version 1.
    ///
    /// Fails with `Conflict` if a document with this id already exists.
    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError>;

    /// Replace a document body if its stored version still equals
    /// `expected_version`, bumping the version by one.
    ///
    /// Fails with `VersionConflict` on a stale version and `NotFound` if the
    /// document does not exist.
    async fn update(
        &self,
        collection: &str,
        id: &str,
        expected_version: i64,
        data: Value,
    ) -> Result<Document, StoreError>;

    /// Run a filtered query against a collection.
    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError>;
}
