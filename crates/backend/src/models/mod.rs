//! Domain models stored as document bodies.
//!
//! These types (de)serialize to the camelCase JSON kept in the document
//! store; the document id carries the identity, so models only hold fields.

pub mod analytics;
pub mod preferences;
pub mod profile;
pub mod storefront;

pub use analytics::AnalyticsRecord;
pub use preferences::{Preferences, Theme};
pub use profile::{Profile, Role};
pub use storefront::StorefrontRecord;
