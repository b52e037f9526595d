//! Admin user management API.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde::Deserialize;
use shopfront_core::admin::{AdminActivity, AdminUserFilter, permissions};
use shopfront_core::query::{Page, PageRequest, paginate};
use shopfront_core::{AdminRole, AdminStatus, AdminUserId};
use tracing::instrument;

use super::auth::AdminUserResponse;
use crate::db::{AdminUserChanges, NewAdminUser};
use crate::error::{AppError, Result};
use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Admin user listing query parameters. Blank values are ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub role: Option<String>,
    pub status: Option<String>,
    pub q: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
}

impl ListParams {
    /// Split into a filter and a page request.
    ///
    /// # Errors
    ///
    /// Returns `AppError::BadRequest` for an unknown role or status.
    pub fn resolve(&self) -> Result<(AdminUserFilter, PageRequest)> {
        let role = non_blank(self.role.as_deref())
            .map(str::parse::<AdminRole>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let status = non_blank(self.status.as_deref())
            .map(str::parse::<AdminStatus>)
            .transpose()
            .map_err(AppError::BadRequest)?;
        let filter = AdminUserFilter {
            role,
            status,
            search: non_blank(self.q.as_deref()).map(String::from),
        };

        let number = |raw: Option<&str>| non_blank(raw).and_then(|s| s.parse::<u32>().ok());
        let page = PageRequest::new(number(self.page.as_deref()), number(self.limit.as_deref()));
        Ok((filter, page))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// List admin users.
#[instrument(skip(state, admin))]
pub async fn index(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Query(params): Query<ListParams>,
) -> Result<Json<Page<AdminUserResponse>>> {
    admin.require(permissions::USERS_VIEW)?;
    let (filter, page) = params.resolve()?;

    let users = state.store().admin_users().list(&filter).await;
    Ok(Json(paginate(users, page).map(AdminUserResponse::from)))
}

/// Create an admin user.
#[instrument(skip(state, admin, body))]
pub async fn create(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Json(body): Json<NewAdminUser>,
) -> Result<(StatusCode, Json<AdminUserResponse>)> {
    let actor = admin.require(permissions::USERS_MANAGE)?;
    let user = state
        .store()
        .admin_users()
        .create(actor, body, Utc::now())
        .await?;
    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Admin user detail.
#[instrument(skip(state, admin))]
pub async fn show(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<Json<AdminUserResponse>> {
    admin.require(permissions::USERS_VIEW)?;
    let user = state.store().admin_users().get_by_id(id).await?;
    Ok(Json(user.into()))
}

/// Update name, role, status or permissions.
#[instrument(skip(state, admin, body))]
pub async fn update(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
    Json(body): Json<AdminUserChanges>,
) -> Result<Json<AdminUserResponse>> {
    let actor = admin.require(permissions::USERS_MANAGE)?;
    let user = state
        .store()
        .admin_users()
        .update(actor, id, body, Utc::now())
        .await?;
    Ok(Json(user.into()))
}

/// Delete an admin user.
#[instrument(skip(state, admin))]
pub async fn delete(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<StatusCode> {
    let actor = admin.require(permissions::USERS_MANAGE)?;
    state
        .store()
        .admin_users()
        .delete(actor, id, Utc::now())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// Activity by or about an admin user, newest first.
#[instrument(skip(state, admin))]
pub async fn activity(
    State(state): State<AppState>,
    admin: RequireAdminAuth,
    Path(id): Path<AdminUserId>,
) -> Result<Json<Vec<AdminActivity>>> {
    admin.require(permissions::USERS_VIEW)?;
    Ok(Json(state.store().admin_users().activity(id).await?))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_params() {
        let params = ListParams {
            role: Some("editor".to_string()),
            q: Some("  ".to_string()),
            page: Some("2".to_string()),
            limit: Some("abc".to_string()),
            ..ListParams::default()
        };
        let (filter, page) = params.resolve().unwrap();
        assert_eq!(filter.role, Some(AdminRole::Editor));
        assert!(filter.search.is_none());
        assert_eq!(page.page(), 2);
        assert_eq!(page.limit(), PageRequest::DEFAULT_LIMIT);
    }

    #[test]
    fn test_resolve_rejects_unknown_status() {
        let params = ListParams {
            status: Some("archived".to_string()),
            ..ListParams::default()
        };
        assert!(matches!(params.resolve(), Err(AppError::BadRequest(_))));
    }
}
