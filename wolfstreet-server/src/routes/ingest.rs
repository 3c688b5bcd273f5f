//! Conference-from-URL endpoints

use axum::{Json, Router, extract::State, routing::post};
use serde::Deserialize;

use wolfstreet_core::TravelDays;
use wolfstreet_core::ingest::{ConferenceFields, IngestRequest, ParseResult, save_ingested};
use wolfstreet_core::linker::EditOutcome;

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/ingest", post(ingest))
        .route("/ingest/save", post(save))
}

#[derive(Deserialize)]
pub struct SaveRequest {
    /// Existing conference to overwrite; a new one is created when absent
    #[serde(default)]
    pub conference_id: Option<String>,
    pub fields: ConferenceFields,
    pub source_url: String,
    #[serde(default)]
    pub travel: Option<TravelDays>,
}

/// POST /ingest - Parse a conference page
async fn ingest(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Json(req): Json<IngestRequest>,
) -> Result<Json<ParseResult>, AppError> {
    Ok(Json(state.ingest.parse(&req.url).await?))
}

/// POST /ingest/save - Save reviewed fields and link the calendar
async fn save(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<SaveRequest>,
) -> Result<Json<EditOutcome>, AppError> {
    let outcome = save_ingested(
        &state.store,
        &user.user_id,
        req.conference_id.as_deref(),
        req.fields,
        &req.source_url,
        req.travel,
    )?;
    Ok(Json(outcome))
}
