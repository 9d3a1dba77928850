//! User profile model.

use serde::{Deserialize, Serialize};
use tiendita_core::Email;

/// Role of a profile within the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

/// A user profile, keyed by the originating account id (1:1, no synthetic
/// key — the document id IS the account id, which is what makes
/// provisioning idempotent).
///
/// Created exactly once per account; mutated later by account-management
/// flows outside this core, never deleted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub first_name: String,
    pub last_name: String,
    pub email: Email,
    pub email_verified: bool,
    pub role: Role,
    pub enabled: bool,
    pub active: bool,
}

impl Profile {
    /// Build a freshly provisioned profile with creation defaults.
    #[must_use]
    pub const fn provisioned(first_name: String, last_name: String, email: Email) -> Self {
        Self {
            first_name,
            last_name,
            email,
            email_verified: false,
            role: Role::User,
            enabled: true,
            active: true,
        }
    }
}
