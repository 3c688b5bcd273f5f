pub mod calendar_events;
pub mod conferences;
pub mod import;
pub mod ingest;
pub mod invites;
pub mod outlook;
pub mod profiles;

use axum::{
    Json, Router,
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use wolfstreet_core::session::USER_HEADER;
use wolfstreet_core::{Profile, WolfStreetError};

use crate::state::AppState;

/// Every route, with CORS open for browser clients.
pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .merge(profiles::router())
        .merge(conferences::router())
        .merge(calendar_events::router())
        .merge(import::router())
        .merge(ingest::router())
        .merge(invites::router())
        .merge(outlook::router())
        .with_state(state)
        .layer(cors)
}

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Debug, thiserror::Error)]
pub enum Unauthenticated {
    #[error("Missing x-user-id header")]
    MissingHeader,
    #[error("No profile for user {0}")]
    UnknownUser(String),
}

/// Convert anyhow errors to HTTP responses
pub struct AppError(anyhow::Error);

impl AppError {
    fn status(&self) -> StatusCode {
        if self.0.downcast_ref::<Unauthenticated>().is_some() {
            return StatusCode::UNAUTHORIZED;
        }

        match self.0.downcast_ref::<WolfStreetError>() {
            Some(WolfStreetError::Validation(_)) => StatusCode::BAD_REQUEST,
            Some(WolfStreetError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Some(WolfStreetError::NotApproved | WolfStreetError::Forbidden(_)) => {
                StatusCode::FORBIDDEN
            }
            Some(WolfStreetError::SetupRequired(_)) => StatusCode::SERVICE_UNAVAILABLE,
            Some(WolfStreetError::SessionExpired | WolfStreetError::NotConnected) => {
                StatusCode::UNAUTHORIZED
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %format!("{:#}", self.0), "request failed");
        }

        let body = Json(ErrorResponse {
            error: self.0.to_string(),
        });
        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self(err.into())
    }
}

/// Whoever the `x-user-id` header names, approved or not.
pub struct Caller(pub Profile);

impl FromRequestParts<AppState> for Caller {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let user_id = parts
            .headers
            .get(USER_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .ok_or(Unauthenticated::MissingHeader)?;

        match state.store.get_profile(user_id) {
            Ok(profile) => Ok(Caller(profile)),
            Err(WolfStreetError::NotFound { .. }) => {
                Err(Unauthenticated::UnknownUser(user_id.to_string()).into())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// An approved caller. Every data route requires one.
pub struct CurrentUser(pub Profile);

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Caller(profile) = Caller::from_request_parts(parts, state).await?;
        profile.require_approved()?;
        Ok(CurrentUser(profile))
    }
}

/// An approved caller with the admin flag.
pub struct AdminUser(pub Profile);

impl FromRequestParts<AppState> for AdminUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, AppError> {
        let Caller(profile) = Caller::from_request_parts(parts, state).await?;
        profile.require_admin()?;
        Ok(AdminUser(profile))
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use std::sync::Arc;
    use tower::ServiceExt;
    use wolfstreet_core::Store;
    use wolfstreet_core::config::AppConfig;
    use wolfstreet_provider_outlook::OutlookService;

    use super::USER_HEADER;
    use crate::state::AppState;

    pub const USER: &str = "user-1";

    /// State over an in-memory store holding one approved user.
    pub fn state_with(config: AppConfig) -> AppState {
        let store = Store::open_in_memory().unwrap();
        store.upsert_profile(USER, "ana@wolfstreet.app", Some("Ana")).unwrap();
        store.set_approval(USER, true).unwrap();

        AppState::new(Arc::new(config), Arc::new(store), OutlookService::new(None))
    }

    pub fn state() -> AppState {
        state_with(AppConfig::default())
    }

    pub async fn send(
        app: Router,
        method: &str,
        uri: &str,
        user: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut request = Request::builder().method(method).uri(uri);
        if let Some(user) = user {
            request = request.header(USER_HEADER, user);
        }

        let request = match body {
            Some(body) => request
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => request.body(Body::empty()).unwrap(),
        };

        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, json)
    }
}
