//! Per-store daily view aggregation.
//!
//! Views are folded into one document per (store, UTC day). The document
//! store has no arithmetic increment, so the upsert runs as an optimistic
//! loop: read, apply the view, write back against the version that was
//! read, and on a create conflict or stale version re-read and reapply,
//! bounded to a handful of attempts with a short backoff. Two concurrent
//! visitors therefore both land in the counters instead of one silently
//! overwriting the other.
//!
//! Analytics must never block or fail the caller's primary action: apart
//! from an empty store id (a caller bug), every failure here is logged and
//! swallowed, and reads degrade to zero-valued results.

use std::sync::Arc;
use std::time::Duration;

use chrono::{Days, Utc};
use serde::Serialize;
use thiserror::Error;

use tiendita_core::StoreId;

use crate::models::AnalyticsRecord;
use crate::store::{DocumentStore, Query, SortOrder, StoreError, encode};

/// Bounded attempts for the optimistic upsert loop.
const MAX_UPSERT_ATTEMPTS: u32 = 5;
/// Base backoff between attempts, scaled linearly per retry.
const UPSERT_BACKOFF: Duration = Duration::from_millis(10);

/// The one `record_view` failure that is surfaced: an empty store id
/// indicates a caller bug, not a transient condition.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("store id is required")]
pub struct MissingStoreId;

/// Low-entropy client signals used to approximate a visitor identity when
/// the caller supplies no fingerprint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientSignal {
    pub user_agent: String,
    pub language: String,
    pub timezone_offset_minutes: i32,
    pub screen_width: u32,
    pub screen_height: u32,
    pub color_depth: u32,
}

impl ClientSignal {
    /// Fold the signals through a 32-bit rolling hash, base-36 encoded.
    ///
    /// Intentionally collision-tolerant and non-cryptographic: good enough
    /// to approximate unique visitors without persistent identifiers.
    #[must_use]
    pub fn fingerprint(&self) -> String {
        let folded = format!(
            "{}|{}|{}|{}x{}x{}",
            self.user_agent,
            self.language,
            self.timezone_offset_minutes,
            self.screen_width,
            self.screen_height,
            self.color_depth
        );
        to_base36(rolling_hash(&folded))
    }
}

/// 32-bit rolling hash over the characters of `s`.
fn rolling_hash(s: &str) -> u32 {
    let mut hash: u32 = 0;
    for ch in s.chars() {
        hash = hash.wrapping_mul(31).wrapping_add(ch as u32);
    }
    hash
}

/// Lowercase base-36 encoding of a u32.
fn to_base36(mut n: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if n == 0 {
        return "0".to_owned();
    }
    let mut out = Vec::new();
    while n > 0 {
        let digit = usize::try_from(n % 36).unwrap_or(0);
        out.push(DIGITS.get(digit).copied().unwrap_or(b'0'));
        n /= 36;
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}

/// Sums over a returned range of analytics records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsSummary {
    pub total_views: u64,
    pub unique_views: u64,
    /// Count of days that actually have a record; missing days inside the
    /// range are not synthesized as zero rows.
    pub days_with_data: usize,
}

/// A date-descending range of records plus their summary.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreAnalytics {
    pub documents: Vec<AnalyticsRecord>,
    pub summary: AnalyticsSummary,
}

/// Today's counters for one store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TodayAnalytics {
    pub total_views: u64,
    pub unique_views: u64,
}

/// Service aggregating storefront views.
#[derive(Clone)]
pub struct AnalyticsService {
    store: Arc<dyn DocumentStore>,
    analytics_collection: String,
}

impl AnalyticsService {
    /// Create a new analytics service.
    pub fn new(store: Arc<dyn DocumentStore>, analytics_collection: impl Into<String>) -> Self {
        Self {
            store,
            analytics_collection: analytics_collection.into(),
        }
    }

    /// Record one storefront view for today.
    ///
    /// Uses the supplied fingerprint, falling back to one derived from the
    /// client signal. Storage failures are swallowed after logging.
    ///
    /// # Errors
    ///
    /// Returns [`MissingStoreId`] when `store_id` is empty; nothing else.
    pub async fn record_view(
        &self,
        store_id: &StoreId,
        fingerprint: Option<String>,
        signal: &ClientSignal,
    ) -> Result<(), MissingStoreId> {
        if store_id.is_empty() {
            return Err(MissingStoreId);
        }

        let fingerprint = fingerprint
            .filter(|fp| !fp.is_empty())
            .unwrap_or_else(|| signal.fingerprint());
        let date = today_utc();
        let document_id = AnalyticsRecord::document_id(store_id, &date);

        for attempt in 0..MAX_UPSERT_ATTEMPTS {
            if attempt > 0 {
                tokio::time::sleep(UPSERT_BACKOFF * attempt).await;
            }

            match self
                .try_record(&document_id, store_id, &date, &fingerprint)
                .await
            {
                Ok(()) => return Ok(()),
                Err(e) if is_contention(&e) => {
                    tracing::debug!(
                        store_id = %store_id,
                        attempt,
                        "analytics upsert contention, retrying"
                    );
                }
                Err(e) => {
                    tracing::warn!(store_id = %store_id, error = %e, "failed to record view");
                    return Ok(());
                }
            }
        }

        tracing::warn!(
            store_id = %store_id,
            attempts = MAX_UPSERT_ATTEMPTS,
            "gave up recording view after repeated contention"
        );
        Ok(())
    }

    /// One read-apply-write attempt against the current document version.
    async fn try_record(
        &self,
        document_id: &str,
        store_id: &StoreId,
        date: &str,
        fingerprint: &str,
    ) -> Result<(), StoreError> {
        match self.store.get(&self.analytics_collection, document_id).await? {
            None => {
                let record = AnalyticsRecord::first_view(
                    store_id.clone(),
                    date.to_owned(),
                    fingerprint.to_owned(),
                );
                self.store
                    .create(&self.analytics_collection, document_id, encode(&record)?)
                    .await?;
            }
            Some(doc) => {
                let mut record: AnalyticsRecord = doc.decode()?;
                record.apply_view(fingerprint);
                self.store
                    .update(
                        &self.analytics_collection,
                        document_id,
                        doc.version,
                        encode(&record)?,
                    )
                    .await?;
            }
        }
        Ok(())
    }

    /// Fetch records for the inclusive range `[today-(days-1), today]`,
    /// date-descending, with summed totals.
    ///
    /// Degrades to an empty document list and a zero summary on any
    /// storage failure.
    pub async fn get_store_analytics(&self, store_id: &StoreId, days: u32) -> StoreAnalytics {
        match self.fetch_range(store_id, days.max(1)).await {
            Ok(analytics) => analytics,
            Err(e) => {
                tracing::warn!(store_id = %store_id, error = %e, "failed to fetch analytics range");
                StoreAnalytics::default()
            }
        }
    }

    async fn fetch_range(
        &self,
        store_id: &StoreId,
        days: u32,
    ) -> Result<StoreAnalytics, StoreError> {
        let today = Utc::now().date_naive();
        let start = today
            .checked_sub_days(Days::new(u64::from(days - 1)))
            .unwrap_or(today);

        let docs = self
            .store
            .query(
                &self.analytics_collection,
                Query::new()
                    .filter_eq("storeId", store_id.as_str())
                    .filter_gte("date", start.format("%Y-%m-%d").to_string())
                    .filter_lte("date", today.format("%Y-%m-%d").to_string())
                    .order_by("date", SortOrder::Descending),
            )
            .await?;

        let mut documents = Vec::with_capacity(docs.len());
        for doc in &docs {
            documents.push(doc.decode::<AnalyticsRecord>()?);
        }

        let summary = AnalyticsSummary {
            total_views: documents.iter().map(|d| d.total_views).sum(),
            unique_views: documents.iter().map(|d| d.unique_views).sum(),
            days_with_data: documents.len(),
        };

        Ok(StoreAnalytics { documents, summary })
    }

    /// Today's counters, `{0, 0}` both when no record exists and when the
    /// lookup fails.
    pub async fn get_today_analytics(&self, store_id: &StoreId) -> TodayAnalytics {
        let document_id = AnalyticsRecord::document_id(store_id, &today_utc());
        let record = match self.store.get(&self.analytics_collection, &document_id).await {
            Ok(Some(doc)) => doc.decode::<AnalyticsRecord>(),
            Ok(None) => return TodayAnalytics::default(),
            Err(e) => Err(e),
        };

        match record {
            Ok(record) => TodayAnalytics {
                total_views: record.total_views,
                unique_views: record.unique_views,
            },
            Err(e) => {
                tracing::warn!(store_id = %store_id, error = %e, "failed to fetch today's analytics");
                TodayAnalytics::default()
            }
        }
    }
}

const fn is_contention(e: &StoreError) -> bool {
    matches!(
        e,
        StoreError::Conflict(_) | StoreError::VersionConflict { .. }
    )
}

/// Current UTC calendar date as `%Y-%m-%d`.
fn today_utc() -> String {
    Utc::now().date_naive().format("%Y-%m-%d").to_string()
}
