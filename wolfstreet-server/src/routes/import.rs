//! Bulk import of conference-like calendar events

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;

use wolfstreet_core::import::{import_candidates, import_selected};
use wolfstreet_core::{CalendarEvent, Conference};

use crate::routes::{AppError, CurrentUser};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/import/candidates", get(candidates))
        .route("/import", post(import))
}

#[derive(Deserialize)]
pub struct ImportRequest {
    pub event_ids: Vec<String>,
}

/// GET /import/candidates
async fn candidates(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> Result<Json<Vec<CalendarEvent>>, AppError> {
    let today = Utc::now().date_naive();
    Ok(Json(import_candidates(&state.store, &user.user_id, today)?))
}

/// POST /import - Create linked conferences for the selected events
async fn import(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(req): Json<ImportRequest>,
) -> Result<(StatusCode, Json<Vec<Conference>>), AppError> {
    let today = Utc::now().date_naive();
    let imported = import_selected(&state.store, &user.user_id, today, &req.event_ids)?;
    tracing::info!(count = imported.len(), "conferences imported");
    Ok((StatusCode::CREATED, Json(imported)))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use chrono::{Duration, Utc};
    use serde_json::json;

    use crate::routes::app;
    use crate::routes::test_support::{USER, send, state};

    #[tokio::test]
    async fn imports_selected_candidates_once() {
        let state = state();
        let day = (Utc::now().date_naive() + Duration::days(14)).to_string();

        for (title, kind) in [("Cyber Summit", "meeting"), ("Dentist", "reminder")] {
            send(
                app(state.clone()),
                "POST",
                "/calendar-events",
                Some(USER),
                Some(json!({ "title": title, "start_date": day, "event_type": kind })),
            )
            .await;
        }

        let (_, candidates) =
            send(app(state.clone()), "GET", "/import/candidates", Some(USER), None).await;
        let candidates = candidates.as_array().unwrap();
        assert_eq!(candidates.len(), 1);
        let id = candidates[0]["id"].as_str().unwrap().to_string();

        let (status, imported) = send(
            app(state.clone()),
            "POST",
            "/import",
            Some(USER),
            Some(json!({ "event_ids": [id] })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(imported[0]["name"], "Cyber Summit");
        assert_eq!(imported[0]["calendar_event_id"], json!(id));

        let (status, _) = send(
            app(state.clone()),
            "POST",
            "/import",
            Some(USER),
            Some(json!({ "event_ids": [id] })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, conferences) = send(app(state), "GET", "/conferences", Some(USER), None).await;
        assert_eq!(conferences.as_array().unwrap().len(), 1);
    }
}
