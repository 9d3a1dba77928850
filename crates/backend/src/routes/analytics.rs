//! Analytics API handlers.
//!
//! Recording a view must never fail the caller's page load: the handler
//! answers 204 even when storage is down. The one exception is an empty
//! store id, which is a caller bug and answers 400.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use tiendita_core::StoreId;

use crate::error::{AppError, Result};
use crate::services::{ClientSignal, StoreAnalytics, TodayAnalytics};
use crate::state::AppState;

/// Build the analytics router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/stores/{store_id}/views", post(record_view))
        .route("/api/stores/{store_id}/analytics", get(store_analytics))
        .route("/api/stores/{store_id}/analytics/today", get(today_analytics))
}

/// Optional body for a view event: an explicit fingerprint, or the client
/// signals gathered browser-side to derive one from.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecordViewRequest {
    pub fingerprint: Option<String>,
    pub user_agent: Option<String>,
    pub language: Option<String>,
    #[serde(default)]
    pub timezone_offset: i32,
    #[serde(default)]
    pub screen_width: u32,
    #[serde(default)]
    pub screen_height: u32,
    #[serde(default)]
    pub color_depth: u32,
}

fn header_str(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(ToOwned::to_owned)
}

/// Build the client signal, preferring body fields over request headers.
fn client_signal(headers: &HeaderMap, body: &RecordViewRequest) -> ClientSignal {
    ClientSignal {
        user_agent: body
            .user_agent
            .clone()
            .or_else(|| header_str(headers, header::USER_AGENT))
            .unwrap_or_default(),
        language: body
            .language
            .clone()
            .or_else(|| header_str(headers, header::ACCEPT_LANGUAGE))
            .unwrap_or_default(),
        timezone_offset_minutes: body.timezone_offset,
        screen_width: body.screen_width,
        screen_height: body.screen_height,
        color_depth: body.color_depth,
    }
}

/// Record one storefront view.
///
/// # Errors
///
/// Returns a bad-payload response only for an empty store id.
#[instrument(skip(state, headers, body), fields(store_id = %store_id))]
pub async fn record_view(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    headers: HeaderMap,
    body: Option<Json<RecordViewRequest>>,
) -> Result<StatusCode> {
    let body = body.map(|Json(b)| b).unwrap_or_default();
    let signal = client_signal(&headers, &body);
    let store_id = StoreId::new(store_id);

    state
        .analytics()
        .record_view(&store_id, body.fingerprint, &signal)
        .await
        .map_err(|e| AppError::Validation(e.to_string()))?;

    Ok(StatusCode::NO_CONTENT)
}

/// Query parameters for the analytics range endpoint.
#[derive(Debug, Deserialize)]
pub struct RangeParams {
    #[serde(default = "default_days")]
    pub days: u32,
}

const fn default_days() -> u32 {
    7
}

/// Records and summary for the inclusive range ending today.
#[instrument(skip(state), fields(store_id = %store_id))]
pub async fn store_analytics(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
    Query(params): Query<RangeParams>,
) -> Json<StoreAnalytics> {
    let store_id = StoreId::new(store_id);
    Json(state.analytics().get_store_analytics(&store_id, params.days).await)
}

/// Today's counters for one store.
#[instrument(skip(state), fields(store_id = %store_id))]
pub async fn today_analytics(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Json<TodayAnalytics> {
    let store_id = StoreId::new(store_id);
    Json(state.analytics().get_today_analytics(&store_id).await)
}
