//! Slug-check and slug-suggestion API handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use tiendita_core::suggest_slugs;

use crate::error::Result;
use crate::services::SlugReason;
use crate::state::AppState;

/// Upper bound on suggestions per request.
const MAX_SUGGESTIONS: usize = 10;

/// Build the slug router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/slug/check", post(check))
        .route("/api/slug/suggest", get(suggest))
}

/// Request body for a slug check.
#[derive(Debug, Deserialize)]
pub struct SlugCheckRequest {
    #[serde(default)]
    pub slug: String,
}

/// Response for a slug check.
#[derive(Debug, Serialize)]
pub struct SlugCheckResponse {
    pub ok: bool,
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub slug: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<SlugReason>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Check a slug for format and availability.
///
/// # Errors
///
/// Returns a server-error response when the availability lookup fails;
/// format and taken rejections are 200s carrying a reason code.
#[instrument(skip(state), fields(slug = %body.slug))]
pub async fn check(
    State(state): State<AppState>,
    Json(body): Json<SlugCheckRequest>,
) -> Result<Json<SlugCheckResponse>> {
    let check = state.slugs().validate(&body.slug).await?;

    Ok(Json(SlugCheckResponse {
        ok: true,
        valid: check.valid,
        slug: check.slug.map(tiendita_core::Slug::into_string),
        message: check.reason.map(|r| r.message().to_owned()),
        reason: check.reason,
    }))
}

/// Query parameters for slug suggestions.
#[derive(Debug, Deserialize)]
pub struct SuggestParams {
    #[serde(default)]
    pub base: String,
    #[serde(default = "default_count")]
    pub count: usize,
}

const fn default_count() -> usize {
    3
}

/// Response for slug suggestions.
#[derive(Debug, Serialize)]
pub struct SuggestResponse {
    pub ok: bool,
    pub suggestions: Vec<String>,
}

/// Deterministic numbered suggestions for a base name.
///
/// Suggestions are NOT availability-checked; the client re-validates the
/// one the user picks through the check endpoint.
#[instrument(fields(base = %params.base))]
pub async fn suggest(Query(params): Query<SuggestParams>) -> Json<SuggestResponse> {
    let count = params.count.min(MAX_SUGGESTIONS);
    Json(SuggestResponse {
        ok: true,
        suggestions: suggest_slugs(&params.base, count),
    })
}
