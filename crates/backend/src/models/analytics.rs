//! Daily view-counter model.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tiendita_core::StoreId;

/// Cap on stored visitor fingerprints per (store, day) record. Novel
/// visitors past the cap still count toward `unique_views` but their
/// fingerprints are not persisted.
pub const FINGERPRINT_CAP: usize = 5000;

/// Per-store, per-UTC-day view counters with visitor deduplication.
///
/// The document id is `"{store_id}_{date}"`. A record is created lazily on
/// the first view of the day and only ever updated after that; counters are
/// monotonically non-decreasing and `unique_views <= total_views` always
/// holds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyticsRecord {
    pub store_id: StoreId,
    /// UTC calendar day, `%Y-%m-%d`.
    pub date: String,
    pub total_views: u64,
    pub unique_views: u64,
    /// Bounded set of visitor fingerprint hashes seen this day.
    #[serde(default)]
    pub fingerprints: BTreeSet<String>,
}

impl AnalyticsRecord {
    /// Document id for a (store, day) pair.
    #[must_use]
    pub fn document_id(store_id: &StoreId, date: &str) -> String {
        format!("{store_id}_{date}")
    }

    /// The first view of a (store, day) pair.
    #[must_use]
    pub fn first_view(store_id: StoreId, date: String, fingerprint: String) -> Self {
        Self {
            store_id,
            date,
            total_views: 1,
            unique_views: 1,
            fingerprints: BTreeSet::from([fingerprint]),
        }
    }

    /// Fold one view into the record.
    ///
    /// `total_views` always advances; `unique_views` advances only for a
    /// fingerprint not yet in the set. The set itself stops growing at
    /// [`FINGERPRINT_CAP`].
    pub fn apply_view(&mut self, fingerprint: &str) {
        let novel = !self.fingerprints.contains(fingerprint);
        if novel && self.fingerprints.len() < FINGERPRINT_CAP {
            self.fingerprints.insert(fingerprint.to_owned());
        }
        self.total_views += 1;
        if novel {
            self.unique_views += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_view() {
        let record = AnalyticsRecord::first_view(
            StoreId::new("s1"),
            "2024-03-01".to_owned(),
            "fp-a".to_owned(),
        );
        assert_eq!(record.total_views, 1);
        assert_eq!(record.unique_views, 1);
        assert!(record.fingerprints.contains("fp-a"));
    }

    #[test]
    fn test_apply_view_dedupes() {
        let mut record = AnalyticsRecord::first_view(
            StoreId::new("s1"),
            "2024-03-01".to_owned(),
            "fp-a".to_owned(),
        );

        record.apply_view("fp-b");
        assert_eq!(record.total_views, 2);
        assert_eq!(record.unique_views, 2);

        record.apply_view("fp-a");
        assert_eq!(record.total_views, 3);
        assert_eq!(record.unique_views, 2);
        assert!(record.unique_views <= record.total_views);
    }

    #[test]
    fn test_fingerprint_cap() {
        let mut record = AnalyticsRecord::first_view(
            StoreId::new("s1"),
            "2024-03-01".to_owned(),
            "fp-0".to_owned(),
        );
        for i in 1..FINGERPRINT_CAP {
            record.apply_view(&format!("fp-{i}"));
        }
        assert_eq!(record.fingerprints.len(), FINGERPRINT_CAP);

        // A novel visitor past the cap is counted but not stored.
        record.apply_view("fp-overflow");
        assert_eq!(record.fingerprints.len(), FINGERPRINT_CAP);
        assert_eq!(record.unique_views, FINGERPRINT_CAP as u64 + 1);
        assert!(!record.fingerprints.contains("fp-overflow"));
    }

    #[test]
    fn test_document_id() {
        assert_eq!(
            AnalyticsRecord::document_id(&StoreId::new("s1"), "2024-03-01"),
            "s1_2024-03-01"
        );
    }
}
