//! Outlook proxy endpoint

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};

use wolfstreet_core::outlook::protocol::OutlookRequest;
use wolfstreet_provider_outlook::OutlookReply;

use crate::routes::CurrentUser;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/functions/outlook-calendar", post(outlook_calendar))
}

/// POST /functions/outlook-calendar - Dispatch on `action`
async fn outlook_calendar(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(request): Json<OutlookRequest>,
) -> (StatusCode, Json<OutlookReply>) {
    tracing::debug!(user_id = %user.user_id, "outlook proxy request");
    let reply = state.outlook.handle(request).await;

    let status = if reply.is_not_configured() {
        StatusCode::SERVICE_UNAVAILABLE
    } else if reply.is_error() {
        StatusCode::BAD_GATEWAY
    } else {
        StatusCode::OK
    };

    (status, Json(reply))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::app;
    use crate::routes::test_support::{USER, send, state};

    #[tokio::test]
    async fn missing_credentials_report_not_configured() {
        let (status, body) = send(
            app(state()),
            "POST",
            "/functions/outlook-calendar",
            Some(USER),
            Some(json!({ "action": "auth_url" })),
        )
        .await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"], "not_configured");
        assert!(body["message"].as_str().unwrap().starts_with("Outlook integration requires setup"));
    }

    #[tokio::test]
    async fn proxy_requires_a_caller() {
        let (status, _) = send(
            app(state()),
            "POST",
            "/functions/outlook-calendar",
            None,
            Some(json!({ "action": "auth_url" })),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
