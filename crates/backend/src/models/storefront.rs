//! Storefront record.
//!
//! Storefronts are owned by the storefront-management flows outside this
//! core; the slug service only reads them to answer availability checks.

use serde::{Deserialize, Serialize};

/// The subset of a storefront document this core reads.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorefrontRecord {
    /// Normalized slug, expected unique among enabled storefronts.
    pub slug: String,
    /// Disabled storefronts release their slug.
    pub enabled: bool,
}
