//! Tiendita core library.
//!
//! Shared domain types used by the backend services: type-safe string IDs,
//! validated email addresses, and storefront slug validation/generation.
//! Everything in this crate is pure — no I/O, no async.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::email::{Email, EmailError};
pub use types::id::{AccountId, PreferencesId, ProfileId, StoreId};
pub use types::slug::{Slug, SlugFormatError, generate_slug, suggest_slugs};
