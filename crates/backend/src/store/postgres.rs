//! `PostgreSQL` document store.
//!
//! All collections share one `document` table with a `(collection, id)`
//! primary key, a JSONB body, and a version column used for optimistic
//! concurrency. Queries are built at runtime because the body is schemaless;
//! field filters compare JSONB expressions.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::ExposeSecret;
use serde_json::Value;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};

use super::{Document, DocumentStore, Filter, Query, SortOrder, StoreError};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Document store backed by a single JSONB table.
#[derive(Debug, Clone)]
pub struct PostgresStore {
    pool: PgPool,
}

impl PostgresStore {
    /// Create a new store on top of an existing pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Access the underlying pool (readiness checks, migrations).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

fn row_to_document(row: &PgRow) -> Result<Document, StoreError> {
    Ok(Document {
        id: row.try_get("id")?,
        version: row.try_get("version")?,
        data: row.try_get("data")?,
    })
}

#[async_trait]
impl DocumentStore for PostgresStore {
    async fn get(&self, collection: &str, id: &str) -> Result<Option<Document>, StoreError> {
        let row = sqlx::query(
            r"
            SELECT id, version, data
            FROM document
            WHERE collection = $1 AND id = $2
            ",
        )
        .bind(collection)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(row_to_document).transpose()
    }

    async fn create(
        &self,
        collection: &str,
        id: &str,
        data: Value,
    ) -> Result<Document, StoreError> {
        let row = sqlx::query(
            r"
            INSERT INTO document (collection, id, version, data)
            VALUES ($1, $2, 1, $3)
            RETURNING id, version, data
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(&data)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict(id.to_owned());
            }
            StoreError::Database(e)
        })?;

        row_to_document(&row)
    }

    async fn update(
        &self,
        collection: &str,
        id: &str,
        expected_version: i64,
        data: Value,
    ) -> Result<Document, StoreError> {
        let row = sqlx::query(
            r"
            UPDATE document
            SET data = $4, version = version + 1, updated_at = now()
            WHERE collection = $1 AND id = $2 AND version = $3
            RETURNING id, version, data
            ",
        )
        .bind(collection)
        .bind(id)
        .bind(expected_version)
        .bind(&data)
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(r) => row_to_document(&r),
            // Distinguish a stale version from a missing document.
            None => match self.get(collection, id).await? {
                Some(_) => Err(StoreError::VersionConflict {
                    id: id.to_owned(),
                    expected: expected_version,
                }),
                None => Err(StoreError::NotFound),
            },
        }
    }

    async fn query(&self, collection: &str, query: Query) -> Result<Vec<Document>, StoreError> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new("SELECT id, version, data FROM document WHERE collection = ");
        builder.push_bind(collection);

        for filter in &query.filters {
            match filter {
                Filter::Eq(field, value) => {
                    builder.push(" AND data -> ");
                    builder.push_bind(field.as_str());
                    builder.push(" = ");
                    builder.push_bind(value);
                }
                Filter::Gte(field, value) => {
                    builder.push(" AND data ->> ");
                    builder.push_bind(field.as_str());
                    builder.push(" >= ");
                    builder.push_bind(value.as_str());
                }
                Filter::Lte(field, value) => {
                    builder.push(" AND data ->> ");
                    builder.push_bind(field.as_str());
                    builder.push(" <= ");
                    builder.push_bind(value.as_str());
                }
            }
        }

        if let Some((field, order)) = &query.order_by {
            builder.push(" ORDER BY data ->> ");
            builder.push_bind(field.as_str());
            builder.push(match order {
                SortOrder::Ascending => " ASC",
                SortOrder::Descending => " DESC",
            });
        }

        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit);
        }

        let rows = builder.build().fetch_all(&self.pool).await?;
        rows.iter().map(row_to_document).collect()
    }
}
