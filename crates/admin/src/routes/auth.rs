//! Mock sign-in for the admin console.
//!
//! There is no password step: posting the email of an active admin signs
//! that admin in. The session ID is cycled on sign-in.

use axum::{Json, extract::State, http::StatusCode};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use shopfront_core::admin::AdminUser;
use shopfront_core::Email;
use tower_sessions::Session;
use tracing::instrument;

use crate::db::StoreError;
use crate::error::{AppError, Result, clear_sentry_user, set_sentry_user};
use crate::middleware::{
    OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin,
};
use crate::models::CurrentAdmin;
use crate::state::AppState;

/// Sign-in request body.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
}

/// Admin user as returned by the API, with resolved permissions.
#[derive(Debug, Serialize)]
pub struct AdminUserResponse {
    #[serde(flatten)]
    pub user: AdminUser,
    pub effective_permissions: Vec<String>,
}

impl From<AdminUser> for AdminUserResponse {
    fn from(user: AdminUser) -> Self {
        Self {
            effective_permissions: user.effective_permissions(),
            user,
        }
    }
}

/// Sign in as the admin with the posted email.
///
/// Malformed emails are a 400, unknown ones a 401 and inactive or
/// suspended accounts a 403.
#[instrument(skip(state, session, body))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(body): Json<LoginRequest>,
) -> Result<Json<AdminUserResponse>> {
    let email = Email::parse(&body.email).map_err(|e| AppError::BadRequest(e.to_string()))?;

    let user = match state
        .store()
        .admin_users()
        .record_login(&email, Utc::now())
        .await
    {
        Ok(user) => user,
        Err(StoreError::NotFound) => {
            tracing::warn!(email = %email, "Sign-in for unknown admin");
            return Err(AppError::Unauthorized("unknown admin account".to_string()));
        }
        Err(e) => return Err(e.into()),
    };

    session.cycle_id().await?;
    set_current_admin(&session, &CurrentAdmin::from(&user)).await?;
    set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));

    tracing::info!(admin_id = %user.id, role = %user.role, "Admin signed in");
    Ok(Json(user.into()))
}

/// Sign out. Succeeds whether or not anyone was signed in.
#[instrument(skip(state, session, admin))]
pub async fn logout(
    State(state): State<AppState>,
    session: Session,
    OptionalAdminAuth(admin): OptionalAdminAuth,
) -> Result<StatusCode> {
    if let Some(admin) = admin {
        state
            .store()
            .admin_users()
            .record_logout(admin.id, Utc::now())
            .await;
        tracing::info!(admin_id = %admin.id, "Admin signed out");
    }

    clear_current_admin(&session).await?;
    session.flush().await?;
    clear_sentry_user();

    Ok(StatusCode::NO_CONTENT)
}

/// The signed-in admin.
#[instrument(skip(admin))]
pub async fn me(admin: RequireAdminAuth) -> Json<AdminUserResponse> {
    Json(admin.0.into())
}
