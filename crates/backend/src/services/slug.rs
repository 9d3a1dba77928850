//! Slug validation against live storefronts.
//!
//! Composes the pure format validator from `tiendita-core` with an
//! availability lookup: format problems are answered without touching the
//! store, and only a well-formed slug is checked against enabled
//! storefronts.

use std::sync::Arc;

use serde::Serialize;

use tiendita_core::{Slug, SlugFormatError};

use crate::store::{DocumentStore, Query, StoreError};

/// Why a slug was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SlugReason {
    Empty,
    TooShort,
    TooLong,
    Format,
    Taken,
}

impl SlugReason {
    /// Human-readable message for API responses.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::Empty => "Slug cannot be empty",
            Self::TooShort => "Slug must be at least 3 characters",
            Self::TooLong => "Slug must be at most 50 characters",
            Self::Format => {
                "Slug may only contain lowercase letters, digits, and single hyphens"
            }
            Self::Taken => "This slug is already taken",
        }
    }
}

impl From<SlugFormatError> for SlugReason {
    fn from(err: SlugFormatError) -> Self {
        match err {
            SlugFormatError::Empty => Self::Empty,
            SlugFormatError::TooShort => Self::TooShort,
            SlugFormatError::TooLong => Self::TooLong,
            SlugFormatError::Format => Self::Format,
        }
    }
}

/// Composite result of a slug validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlugCheck {
    /// Whether the slug is well-formed AND available.
    pub valid: bool,
    /// The normalized slug, present whenever the format check passed.
    pub slug: Option<Slug>,
    /// Rejection reason when `valid` is false.
    pub reason: Option<SlugReason>,
}

impl SlugCheck {
    const fn ok(slug: Slug) -> Self {
        Self {
            valid: true,
            slug: Some(slug),
            reason: None,
        }
    }

    const fn rejected(slug: Option<Slug>, reason: SlugReason) -> Self {
        Self {
            valid: false,
            slug,
            reason: Some(reason),
        }
    }
}

/// Service answering slug format + availability questions.
#[derive(Clone)]
pub struct SlugService {
    store: Arc<dyn DocumentStore>,
    storefronts_collection: String,
}

impl SlugService {
    /// Create a new slug service.
    pub fn new(store: Arc<dyn DocumentStore>, storefronts_collection: impl Into<String>) -> Self {
        Self {
            store,
            storefronts_collection: storefronts_collection.into(),
        }
    }

    /// Whether an enabled storefront already holds this slug.
    ///
    /// Limit 1 is sufficient: slugs are expected unique among enabled
    /// storefronts.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` when the lookup fails.
    pub async fn check_availability(&self, slug: &Slug) -> Result<bool, StoreError> {
        let hits = self
            .store
            .query(
                &self.storefronts_collection,
                Query::new()
                    .filter_eq("slug", slug.as_str())
                    .filter_eq("enabled", true)
                    .limit(1),
            )
            .await?;
        Ok(!hits.is_empty())
    }

    /// Run the format check, then the availability check.
    ///
    /// A format failure answers immediately without a store lookup.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` only when a well-formed slug's availability
    /// lookup fails.
    pub async fn validate(&self, raw: &str) -> Result<SlugCheck, StoreError> {
        let slug = match Slug::parse(raw) {
            Ok(slug) => slug,
            Err(e) => return Ok(SlugCheck::rejected(None, e.into())),
        };

        if self.check_availability(&slug).await? {
            return Ok(SlugCheck::rejected(Some(slug), SlugReason::Taken));
        }

        Ok(SlugCheck::ok(slug))
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use serde_json::{Value, json};

    use crate::store::{Document, MemoryStore};

    use super::*;

    async fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .create("storefronts", "store_1", json!({"slug": "mi-tienda", "enabled": true}))
            .await
            .expect("seed enabled storefront");
        store
            .create(
                "storefronts",
                "store_2",
                json!({"slug": "tienda-vieja", "enabled": false}),
            )
            .await
            .expect("seed disabled storefront");
        store
    }

    #[tokio::test]
    async fn test_availability() {
        let service = SlugService::new(seeded_store().await, "storefronts");

        let taken = Slug::parse("mi-tienda").expect("valid");
        assert!(service.check_availability(&taken).await.expect("lookup"));

        let free = Slug::parse("otra-tienda").expect("valid");
        assert!(!service.check_availability(&free).await.expect("lookup"));
    }

    #[tokio::test]
    async fn test_disabled_storefront_releases_slug() {
        let service = SlugService::new(seeded_store().await, "storefronts");
        let slug = Slug::parse("tienda-vieja").expect("valid");
        assert!(!service.check_availability(&slug).await.expect("lookup"));
    }

    #[tokio::test]
    async fn test_validate_taken() {
        let service = SlugService::new(seeded_store().await, "storefronts");
        let check = service.validate("  mi-tienda  ").await.expect("validate");
        assert!(!check.valid);
        assert_eq!(check.reason, Some(SlugReason::Taken));
        assert_eq!(check.slug.expect("normalized").as_str(), "mi-tienda");
    }

    #[tokio::test]
    async fn test_validate_ok() {
        let service = SlugService::new(seeded_store().await, "storefronts");
        let check = service.validate("nueva-tienda").await.expect("validate");
        assert!(check.valid);
        assert!(check.reason.is_none());
    }

    /// Store whose queries always fail, proving format rejections never
    /// reach the availability lookup.
    struct QueryFailStore;

    #[async_trait]
    impl DocumentStore for QueryFailStore {
        async fn get(&self, _: &str, _: &str) -> Result<Option<Document>, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn create(&self, _: &str, _: &str, _: Value) -> Result<Document, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn update(
            &self,
            _: &str,
            _: &str,
            _: i64,
            _: Value,
        ) -> Result<Document, StoreError> {
            Err(StoreError::NotFound)
        }

        async fn query(&self, _: &str, _: Query) -> Result<Vec<Document>, StoreError> {
            Err(StoreError::DataCorruption("query should not run".to_owned()))
        }
    }

    #[tokio::test]
    async fn test_format_failure_skips_lookup() {
        let service = SlugService::new(Arc::new(QueryFailStore), "storefronts");

        let too_long = "a".repeat(51);
        for (raw, reason) in [
            ("", SlugReason::Empty),
            ("ab", SlugReason::TooShort),
            (too_long.as_str(), SlugReason::TooLong),
            ("My-Slug", SlugReason::Format),
            ("my--slug", SlugReason::Format),
        ] {
            let check = service.validate(raw).await.expect("no lookup performed");
            assert!(!check.valid);
            assert_eq!(check.reason, Some(reason));
        }
    }
}
