//! Account-created event consumer.
//!
//! Delivery is at-least-once and unordered, so the handler leans entirely
//! on the provisioner's idempotency; a redelivered event answers with the
//! same success shape as the first delivery.

use axum::{Json, Router, extract::State, routing::post};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiendita_core::{AccountId, ProfileId};

use crate::error::{AppError, Result};
use crate::services::ProvisionError;
use crate::state::AppState;

/// Build the events router.
pub fn router() -> Router<AppState> {
    Router::new().route("/events/account-created", post(account_created))
}

/// Payload of an account-created event.
///
/// Missing fields deserialize as empty so the provisioner can answer with
/// the bad-payload response shape instead of a framework rejection.
#[derive(Debug, Deserialize)]
pub struct AccountCreatedEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub email: String,
    pub name: Option<String>,
}

/// Response to an account-created event.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResponse {
    pub ok: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile_id: Option<ProfileId>,
}

/// Provision a profile for a freshly created account.
///
/// # Errors
///
/// Returns a bad-payload response when the id or email is missing and a
/// server-error response when the document store fails.
#[instrument(skip(state, event), fields(account_id = %event.id))]
pub async fn account_created(
    State(state): State<AppState>,
    Json(event): Json<AccountCreatedEvent>,
) -> Result<Json<EventResponse>> {
    let account_id = AccountId::new(event.id);
    let outcome = state
        .provisioner()
        .provision(&account_id, &event.email, event.name.as_deref())
        .await
        .map_err(|e| match e {
            ProvisionError::InvalidPayload(msg) => AppError::Validation(msg),
            ProvisionError::Storage(err) => AppError::Storage(err),
        })?;

    let message = if outcome.created {
        "profile provisioned"
    } else {
        "profile already provisioned"
    };

    Ok(Json(EventResponse {
        ok: true,
        message: message.to_owned(),
        profile_id: Some(outcome.profile_id),
    }))
}
