//! Admin console users, roles and permissions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{AdminRole, AdminStatus, AdminUserId, Email};

/// Capability strings granted to admin users.
pub mod permissions {
    pub const USERS_VIEW: &str = "users.view";
    pub const USERS_MANAGE: &str = "users.manage";
    pub const PRODUCTS_VIEW: &str = "products.view";
    pub const PRODUCTS_EDIT: &str = "products.edit";
    pub const PRODUCTS_MANAGE: &str = "products.manage";
    pub const CATEGORIES_VIEW: &str = "categories.view";
    pub const CATEGORIES_EDIT: &str = "categories.edit";
    pub const CATEGORIES_MANAGE: &str = "categories.manage";
    pub const ORDERS_VIEW: &str = "orders.view";
    pub const ORDERS_MANAGE: &str = "orders.manage";
    pub const SETTINGS_MANAGE: &str = "settings.manage";

    /// Every known permission.
    pub const ALL: [&str; 11] = [
        USERS_VIEW,
        USERS_MANAGE,
        PRODUCTS_VIEW,
        PRODUCTS_EDIT,
        PRODUCTS_MANAGE,
        CATEGORIES_VIEW,
        CATEGORIES_EDIT,
        CATEGORIES_MANAGE,
        ORDERS_VIEW,
        ORDERS_MANAGE,
        SETTINGS_MANAGE,
    ];
}

impl AdminRole {
    /// Permissions a new user with this role receives.
    #[must_use]
    pub fn default_permissions(self) -> Vec<String> {
        use permissions::{
            ALL, CATEGORIES_EDIT, CATEGORIES_MANAGE, CATEGORIES_VIEW, ORDERS_MANAGE, ORDERS_VIEW,
            PRODUCTS_EDIT, PRODUCTS_MANAGE, PRODUCTS_VIEW, USERS_MANAGE, USERS_VIEW,
        };

        let granted: &[&str] = match self {
            Self::SuperAdmin => &ALL,
            Self::Admin => &[
                USERS_VIEW,
                USERS_MANAGE,
                PRODUCTS_VIEW,
                PRODUCTS_EDIT,
                PRODUCTS_MANAGE,
                CATEGORIES_VIEW,
                CATEGORIES_EDIT,
                CATEGORIES_MANAGE,
                ORDERS_VIEW,
                ORDERS_MANAGE,
            ],
            Self::Manager => &[
                PRODUCTS_VIEW,
                PRODUCTS_EDIT,
                PRODUCTS_MANAGE,
                CATEGORIES_VIEW,
                CATEGORIES_EDIT,
                CATEGORIES_MANAGE,
                ORDERS_VIEW,
                ORDERS_MANAGE,
            ],
            Self::Editor => &[PRODUCTS_VIEW, PRODUCTS_EDIT, CATEGORIES_VIEW, CATEGORIES_EDIT],
            Self::Viewer => &[PRODUCTS_VIEW, CATEGORIES_VIEW, ORDERS_VIEW],
        };
        granted.iter().map(ToString::to_string).collect()
    }
}

/// An admin console user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUser {
    pub id: AdminUserId,
    pub name: String,
    pub email: Email,
    pub role: AdminRole,
    #[serde(default)]
    pub status: AdminStatus,
    /// Explicit grants; empty means the role defaults apply.
    #[serde(default)]
    pub permissions: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub last_login_at: Option<DateTime<Utc>>,
}

impl AdminUser {
    /// Whether the user holds `permission`.
    ///
    /// Super admins hold every permission regardless of explicit grants.
    /// Inactive and suspended users hold none.
    #[must_use]
    pub fn can(&self, permission: &str) -> bool {
        if self.status != AdminStatus::Active {
            return false;
        }
        if self.role == AdminRole::SuperAdmin {
            return true;
        }
        if self.permissions.is_empty() {
            return self
                .role
                .default_permissions()
                .iter()
                .any(|p| p == permission);
        }
        self.permissions.iter().any(|p| p == permission)
    }

    /// Effective permission list.
    #[must_use]
    pub fn effective_permissions(&self) -> Vec<String> {
        if self.permissions.is_empty() || self.role == AdminRole::SuperAdmin {
            self.role.default_permissions()
        } else {
            self.permissions.clone()
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        self.status == AdminStatus::Active
    }
}

/// One audit entry for an admin action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminActivity {
    /// Admin who performed the action.
    pub admin_id: AdminUserId,
    /// Admin the action was about, if any.
    pub target_id: Option<AdminUserId>,
    pub action: String,
    pub detail: String,
    pub at: DateTime<Utc>,
}

/// Filter for admin user listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminUserFilter {
    pub role: Option<AdminRole>,
    pub status: Option<AdminStatus>,
    /// Case-insensitive match against name and email.
    pub search: Option<String>,
}

impl AdminUserFilter {
    #[must_use]
    pub fn matches(&self, user: &AdminUser) -> bool {
        if self.role.is_some_and(|role| role != user.role) {
            return false;
        }
        if self.status.is_some_and(|status| status != user.status) {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                user.name.to_lowercase().contains(&needle) || user.email.as_str().contains(&needle)
            }
            None => true,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn user(role: AdminRole) -> AdminUser {
        AdminUser {
            id: AdminUserId::new(1),
            name: "Jordan Lee".to_string(),
            email: Email::parse("jordan@shopfront.test").unwrap(),
            role,
            status: AdminStatus::Active,
            permissions: Vec::new(),
            created_at: DateTime::from_timestamp(1_700_000_000, 0).unwrap(),
            last_login_at: None,
        }
    }

    #[test]
    fn test_role_defaults() {
        let viewer = user(AdminRole::Viewer);
        assert!(viewer.can(permissions::PRODUCTS_VIEW));
        assert!(!viewer.can(permissions::PRODUCTS_EDIT));

        let editor = user(AdminRole::Editor);
        assert!(editor.can(permissions::CATEGORIES_EDIT));
        assert!(!editor.can(permissions::ORDERS_MANAGE));

        let manager = user(AdminRole::Manager);
        assert!(manager.can(permissions::ORDERS_MANAGE));
        assert!(!manager.can(permissions::USERS_MANAGE));

        let admin = user(AdminRole::Admin);
        assert!(admin.can(permissions::USERS_MANAGE));
        assert!(!admin.can(permissions::SETTINGS_MANAGE));

        assert!(user(AdminRole::SuperAdmin).can(permissions::SETTINGS_MANAGE));
    }

    #[test]
    fn test_explicit_permissions_override_role() {
        let mut editor = user(AdminRole::Editor);
        editor.permissions = vec![permissions::ORDERS_VIEW.to_string()];
        assert!(editor.can(permissions::ORDERS_VIEW));
        assert!(!editor.can(permissions::PRODUCTS_EDIT));
    }

    #[test]
    fn test_suspended_user_has_no_permissions() {
        let mut admin = user(AdminRole::SuperAdmin);
        admin.status = AdminStatus::Suspended;
        assert!(!admin.can(permissions::PRODUCTS_VIEW));
    }

    #[test]
    fn test_filter() {
        let u = user(AdminRole::Manager);
        assert!(AdminUserFilter::default().matches(&u));
        assert!(
            AdminUserFilter {
                search: Some("JORDAN".to_string()),
                role: Some(AdminRole::Manager),
                ..AdminUserFilter::default()
            }
            .matches(&u)
        );
        assert!(
            !AdminUserFilter {
                status: Some(AdminStatus::Inactive),
                ..AdminUserFilter::default()
            }
            .matches(&u)
        );
        assert!(
            AdminUserFilter {
                search: Some("shopfront.test".to_string()),
                ..AdminUserFilter::default()
            }
            .matches(&u)
        );
    }
}
