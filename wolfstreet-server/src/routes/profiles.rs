//! Sign-up, the caller's profile and admin approval

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::Deserialize;

use wolfstreet_core::Profile;

use crate::routes::{AdminUser, AppError, Caller};
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/profiles", post(register))
        .route("/me", get(me))
        .route("/admin/profiles", get(list_profiles))
        .route("/admin/profiles/{id}/approval", post(set_approval))
        .route("/admin/profiles/{id}/admin", post(set_admin))
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub user_id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
}

#[derive(Deserialize)]
pub struct ApprovalRequest {
    pub approved: bool,
}

#[derive(Deserialize)]
pub struct AdminRequest {
    pub admin: bool,
}

/// POST /profiles - Sign up. New profiles await approval.
async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Profile>), AppError> {
    let profile = state
        .store
        .upsert_profile(&req.user_id, &req.email, req.full_name.as_deref())?;
    tracing::info!(user_id = %profile.user_id, approved = profile.is_approved, "profile registered");
    Ok((StatusCode::CREATED, Json(profile)))
}

/// GET /me - The caller's profile, approved or not
async fn me(Caller(profile): Caller) -> Json<Profile> {
    Json(profile)
}

/// GET /admin/profiles
async fn list_profiles(
    State(state): State<AppState>,
    AdminUser(_admin): AdminUser,
) -> Result<Json<Vec<Profile>>, AppError> {
    Ok(Json(state.store.list_profiles()?))
}

/// POST /admin/profiles/:id/approval
async fn set_approval(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<ApprovalRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = state.store.set_approval(&id, req.approved)?;
    tracing::info!(admin = %admin.user_id, user_id = %id, approved = req.approved, "approval changed");
    Ok(Json(profile))
}

/// POST /admin/profiles/:id/admin
async fn set_admin(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    Path(id): Path<String>,
    Json(req): Json<AdminRequest>,
) -> Result<Json<Profile>, AppError> {
    let profile = state.store.set_admin(&id, req.admin)?;
    tracing::info!(admin = %admin.user_id, user_id = %id, is_admin = req.admin, "admin flag changed");
    Ok(Json(profile))
}

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use crate::routes::app;
    use crate::routes::test_support::{USER, send, state};

    #[tokio::test]
    async fn sign_up_then_admin_approval() {
        let state = state();
        state.store.set_admin(USER, true).unwrap();

        let (status, profile) = send(
            app(state.clone()),
            "POST",
            "/profiles",
            None,
            Some(json!({ "user_id": "user-2", "email": "bo@wolfstreet.app" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(profile["is_approved"], false);

        let (status, me) = send(app(state.clone()), "GET", "/me", Some("user-2"), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["email"], "bo@wolfstreet.app");

        let (status, _) = send(app(state.clone()), "GET", "/admin/profiles", Some("user-2"), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, approved) = send(
            app(state.clone()),
            "POST",
            "/admin/profiles/user-2/approval",
            Some(USER),
            Some(json!({ "approved": true })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(approved["is_approved"], true);

        let (status, _) = send(app(state), "GET", "/conferences", Some("user-2"), None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn approved_non_admin_cannot_list_profiles() {
        let (status, body) = send(app(state()), "GET", "/admin/profiles", Some(USER), None).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Forbidden: admin access required");
    }

    #[tokio::test]
    async fn approving_unknown_profile_is_not_found() {
        let state = state();
        state.store.set_admin(USER, true).unwrap();

        let (status, _) = send(
            app(state),
            "POST",
            "/admin/profiles/ghost/approval",
            Some(USER),
            Some(json!({ "approved": true })),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
