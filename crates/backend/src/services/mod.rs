//! Core backend services.
//!
//! Each service is a cheap value built from the shared document store plus
//! the relevant slice of configuration; one invocation, one outcome.

pub mod analytics;
pub mod provisioner;
pub mod slug;

pub use analytics::{AnalyticsService, ClientSignal, StoreAnalytics, TodayAnalytics};
pub use provisioner::{ProfileProvisioner, ProvisionError, Provisioned};
pub use slug::{SlugCheck, SlugReason, SlugService};
