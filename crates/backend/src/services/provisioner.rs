//! Profile provisioning on account creation.
//!
//! Account-created events are delivered at least once and unordered, so
//! provisioning is idempotent on the account id: the profile document is
//! keyed by it, an existing profile is a successful no-op, and a create
//! conflict (two redeliveries racing) is the already-provisioned case.
//!
//! The profile is the durable outcome. The preferences record is created
//! best-effort afterwards; its failure is logged and never rolls back or
//! fails the operation, since other flows recreate preferences lazily.

use std::sync::Arc;

use thiserror::Error;
use uuid::Uuid;

use tiendita_core::{AccountId, Email, ProfileId};

use crate::models::{Preferences, Profile};
use crate::store::{DocumentStore, StoreError, encode};

/// First name used when the event carries no usable full name.
const DEFAULT_FIRST_NAME: &str = "Usuario";

/// Errors surfaced by [`ProfileProvisioner::provision`].
#[derive(Debug, Error)]
pub enum ProvisionError {
    /// The event payload is malformed (missing id or email).
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    /// The document store failed.
    #[error(transparent)]
    Storage(#[from] StoreError),
}

/// Outcome of a provisioning call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Provisioned {
    /// Profile identity (always equals the account id).
    pub profile_id: ProfileId,
    /// Whether this call created the profile, as opposed to finding it
    /// already provisioned.
    pub created: bool,
}

/// Service that reacts to account-created events.
#[derive(Clone)]
pub struct ProfileProvisioner {
    store: Arc<dyn DocumentStore>,
    profiles_collection: String,
    preferences_collection: String,
    default_locale: String,
}

impl ProfileProvisioner {
    /// Create a new provisioner.
    pub fn new(
        store: Arc<dyn DocumentStore>,
        profiles_collection: impl Into<String>,
        preferences_collection: impl Into<String>,
        default_locale: impl Into<String>,
    ) -> Self {
        Self {
            store,
            profiles_collection: profiles_collection.into(),
            preferences_collection: preferences_collection.into(),
            default_locale: default_locale.into(),
        }
    }

    /// Provision a profile (and best-effort preferences) for a new account.
    ///
    /// Safe under redelivery: an existing profile, or a create conflict from
    /// a concurrent redelivery, both report success without a duplicate.
    ///
    /// # Errors
    ///
    /// Returns `InvalidPayload` when the account id or email is missing or
    /// malformed, and `Storage` when the profile read or create fails for
    /// any other reason.
    pub async fn provision(
        &self,
        account_id: &AccountId,
        email: &str,
        full_name: Option<&str>,
    ) -> Result<Provisioned, ProvisionError> {
        if account_id.is_empty() {
            return Err(ProvisionError::InvalidPayload(
                "account id is required".to_owned(),
            ));
        }
        let email = Email::parse(email)
            .map_err(|e| ProvisionError::InvalidPayload(format!("email: {e}")))?;

        let profile_id = ProfileId::new(account_id.as_str());

        // Idempotency check: redelivered events find the profile in place.
        if let Some(existing) = self
            .store
            .get(&self.profiles_collection, account_id.as_str())
            .await?
        {
            tracing::debug!(account_id = %account_id, "profile already provisioned");
            // Sanity-decode so corrupt documents surface instead of hiding
            // behind the no-op path.
            existing.decode::<Profile>()?;
            return Ok(Provisioned {
                profile_id,
                created: false,
            });
        }

        let (first_name, last_name) = parse_full_name(full_name);
        let profile = Profile::provisioned(first_name, last_name, email);

        match self
            .store
            .create(
                &self.profiles_collection,
                account_id.as_str(),
                encode(&profile)?,
            )
            .await
        {
            Ok(_) => {}
            // Two redeliveries raced; the other one won. Same end state.
            Err(StoreError::Conflict(_)) => {
                tracing::debug!(account_id = %account_id, "profile created concurrently");
                return Ok(Provisioned {
                    profile_id,
                    created: false,
                });
            }
            Err(e) => return Err(e.into()),
        }

        self.create_default_preferences(&profile_id).await;

        tracing::info!(account_id = %account_id, "profile provisioned");
        Ok(Provisioned {
            profile_id,
            created: true,
        })
    }

    /// Best-effort creation of the default preferences record.
    async fn create_default_preferences(&self, profile_id: &ProfileId) {
        let preferences = Preferences::defaults(profile_id.clone(), &self.default_locale);
        let preferences_id = Uuid::new_v4().to_string();

        let result = match encode(&preferences) {
            Ok(data) => {
                self.store
                    .create(&self.preferences_collection, &preferences_id, data)
                    .await
            }
            Err(e) => Err(e),
        };

        if let Err(e) = result {
            tracing::warn!(
                profile_id = %profile_id,
                error = %e,
                "failed to create default preferences; profile stands alone"
            );
        }
    }
}

/// Split a full name into (`first_name`, `last_name`).
///
/// First whitespace token becomes the first name (`"Usuario"` when the name
/// is absent or blank); the remaining tokens joined by single spaces become
/// the last name (empty when there is none).
fn parse_full_name(full_name: Option<&str>) -> (String, String) {
    let mut tokens = full_name.unwrap_or_default().split_whitespace();
    let first = tokens
        .next()
        .map_or_else(|| DEFAULT_FIRST_NAME.to_owned(), ToOwned::to_owned);
    let last = tokens.collect::<Vec<_>>().join(" ");
    (first, last)
}
