//! Conference endpoints

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};

use wolfstreet_core::linker::{CreateOutcome, EditOutcome, LinkOutcome, Linker};
use wolfstreet_core::{Conference, ConferenceDraft, ConferencePatch, TravelDays};

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/conferences", get(list_conferences).post(create_conference))
        .route("/conferences/{id}", get(get_conference).patch(edit_conference))
        .route("/conferences/{id}/calendar-event", post(create_calendar_event))
        .route("/conferences/{id}/link", post(link_calendar_event))
}

/// Request body for creating a conference
#[derive(Deserialize)]
pub struct CreateConferenceRequest {
    #[serde(flatten)]
    pub draft: ConferenceDraft,
    #[serde(default)]
    pub travel: Option<TravelDays>,
}

/// Request body for editing a conference
#[derive(Deserialize)]
pub struct EditConferenceRequest {
    #[serde(flatten)]
    pub patch: ConferencePatch,
    #[serde(default)]
    pub travel: Option<TravelDays>,
}

#[derive(Deserialize, Default)]
pub struct CalendarEventRequest {
    #[serde(default)]
    pub travel: Option<TravelDays>,
}

#[derive(Deserialize)]
pub struct LinkRequest {
    pub calendar_event_id: String,
}

#[derive(Serialize)]
pub struct LinkResponse {
    pub conference: Conference,
}

/// GET /conferences - List the caller's conferences
async fn list_conferences(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<Conference>>, AppError> {
    Ok(Json(state.store.list_conferences(&user.user_id)?))
}

/// POST /conferences - Create a conference and its calendar event
async fn create_conference(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<CreateConferenceRequest>,
) -> Result<(StatusCode, Json<CreateOutcome>), AppError> {
    let outcome = Linker::new(&state.store, &user.user_id).create_conference(&req.draft, req.travel)?;
    Ok((StatusCode::CREATED, Json(outcome)))
}

/// GET /conferences/:id
async fn get_conference(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<Conference>, AppError> {
    Ok(Json(state.store.get_conference(&user.user_id, &id)?))
}

/// PATCH /conferences/:id - Edit and carry the change over to the calendar
async fn edit_conference(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<EditConferenceRequest>,
) -> Result<Json<EditOutcome>, AppError> {
    let outcome = Linker::new(&state.store, &user.user_id).edit_conference(&id, &req.patch, req.travel)?;
    Ok(Json(outcome))
}

/// POST /conferences/:id/calendar-event - Ensure the conference has a calendar event
async fn create_calendar_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<CalendarEventRequest>,
) -> Result<Json<LinkOutcome>, AppError> {
    let outcome = Linker::new(&state.store, &user.user_id)
        .create_calendar_event_for_conference(&id, req.travel)?;
    Ok(Json(outcome))
}

/// POST /conferences/:id/link - Link an existing calendar event
async fn link_calendar_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<LinkRequest>,
) -> Result<Json<LinkResponse>, AppError> {
    Linker::new(&state.store, &user.user_id).link_existing_calendar_event(&id, &req.calendar_event_id)?;
    Ok(Json(LinkResponse {
        conference: state.store.get_conference(&user.user_id, &id)?,
    }))
}
