//! Authentication extractors for admin.
//!
//! The session only identifies the admin; every request re-reads the stored
//! user so role changes, deactivation and deletion take effect immediately.

use axum::{extract::FromRequestParts, http::request::Parts};
use shopfront_core::admin::AdminUser;
use tower_sessions::Session;

use crate::error::{AppError, Result, set_sentry_user};
use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Extractor that requires a signed-in, active admin.
///
/// Rejects with 401 when no admin is signed in, or when the signed-in
/// account has since been deleted or deactivated.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(admin: RequireAdminAuth) -> Result<String> {
///     let admin = admin.require(permissions::USERS_VIEW)?;
///     Ok(format!("Hello, {}!", admin.name))
/// }
/// ```
pub struct RequireAdminAuth(pub AdminUser);

impl RequireAdminAuth {
    /// The admin, provided they hold `permission`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Forbidden` if the permission is missing.
    pub fn require(&self, permission: &str) -> Result<&AdminUser> {
        if self.0.can(permission) {
            Ok(&self.0)
        } else {
            tracing::warn!(admin_id = %self.0.id, permission, "Permission denied");
            Err(AppError::Forbidden(format!(
                "missing permission {permission}"
            )))
        }
    }
}

impl FromRequestParts<AppState> for RequireAdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> std::result::Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        let current: CurrentAdmin = session
            .get(session_keys::CURRENT_ADMIN)
            .await?
            .ok_or_else(|| AppError::Unauthorized("sign in required".to_string()))?;

        let user = match state.store().admin_users().get_by_id(current.id).await {
            Ok(user) if user.is_active() => user,
            _ => {
                clear_current_admin(session).await?;
                return Err(AppError::Unauthorized(
                    "account is no longer active".to_string(),
                ));
            }
        };

        set_sentry_user(user.id.as_i32(), Some(user.email.as_str()));
        Ok(Self(user))
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this never rejects and does not consult the store.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &S,
    ) -> std::result::Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Helper to set the current admin in the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Helper to clear the current admin from the session.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_current_admin(
    session: &Session,
) -> std::result::Result<(), tower_sessions::session::Error> {
    session
        .remove::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
        .await?;
    Ok(())
}
