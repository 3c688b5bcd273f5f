//! Calendar event endpoints

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, put},
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use wolfstreet_core::linker::Linker;
use wolfstreet_core::{
    CalendarEvent, CalendarEventPatch, Conference, NewCalendarEvent, TravelDays, WolfStreetError,
};

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/calendar-events", get(list_events).post(create_event))
        .route(
            "/calendar-events/{id}",
            get(get_event).patch(update_event).delete(delete_event),
        )
        .route("/calendar-events/{id}/travel", put(set_travel))
}

#[derive(Deserialize)]
pub struct ListQuery {
    /// Only events starting on or after this day
    pub from: Option<NaiveDate>,
}

/// Request body for editing an event
#[derive(Deserialize)]
pub struct UpdateEventRequest {
    #[serde(flatten)]
    pub patch: CalendarEventPatch,
    /// Also carry the edit onto the linked conference
    #[serde(default)]
    pub propagate_to_conference: bool,
}

#[derive(Serialize)]
pub struct UpdateEventResponse {
    pub event: CalendarEvent,
    pub conference: Option<Conference>,
}

/// GET /calendar-events - List the caller's events, ascending
async fn list_events(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    Ok(Json(state.store.list_calendar_events(&user.user_id, query.from)?))
}

/// POST /calendar-events
async fn create_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(event): Json<NewCalendarEvent>,
) -> Result<(StatusCode, Json<CalendarEvent>), AppError> {
    let created = state.store.insert_calendar_event(&user.user_id, &event)?;
    tracing::info!(event_id = %created.id, "calendar event created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// GET /calendar-events/:id
async fn get_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<Json<CalendarEvent>, AppError> {
    Ok(Json(state.store.get_calendar_event(&user.user_id, &id)?))
}

/// PATCH /calendar-events/:id
async fn update_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<UpdateEventResponse>, AppError> {
    let event = state.store.update_calendar_event(&user.user_id, &id, &req.patch)?;

    let conference = if req.propagate_to_conference {
        match state.store.conference_linked_to(&user.user_id, &id)? {
            Some(conference) => Some(
                Linker::new(&state.store, &user.user_id)
                    .update_conference_from_calendar_event(&conference.id, &req.patch)?,
            ),
            None => None,
        }
    } else {
        None
    };

    Ok(Json(UpdateEventResponse { event, conference }))
}

/// DELETE /calendar-events/:id - Delete and unlink any conference
async fn delete_event(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
) -> Result<StatusCode, AppError> {
    state.store.delete_calendar_event(&user.user_id, &id)?;
    Ok(StatusCode::NO_CONTENT)
}

/// PUT /calendar-events/:id/travel - Re-pad a conference event
async fn set_travel(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Path(id): Path<String>,
    Json(travel): Json<TravelDays>,
) -> Result<Json<CalendarEvent>, AppError> {
    let conference = state
        .store
        .conference_linked_to(&user.user_id, &id)?
        .ok_or_else(|| {
            WolfStreetError::Validation("Calendar event is not linked to a conference".into())
        })?;

    let event = Linker::new(&state.store, &user.user_id).update_calendar_event_with_travel_days(
        &id,
        &conference,
        Some(travel),
    )?;
    Ok(Json(event))
}
