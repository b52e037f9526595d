//! Admin user repository.
//!
//! Enforces the account rules the console depends on: unique emails, known
//! permissions, super admin protection and the audit trail.

use chrono::{DateTime, Utc};
use serde::Deserialize;
use shopfront_core::admin::{AdminActivity, AdminUser, AdminUserFilter, permissions};
use shopfront_core::{AdminRole, AdminStatus, AdminUserId, Email};

use super::{AdminStore, StoreData, StoreError};

/// Input for creating an admin user.
#[derive(Debug, Clone, Deserialize)]
pub struct NewAdminUser {
    pub name: String,
    pub email: String,
    pub role: AdminRole,
    #[serde(default)]
    pub status: AdminStatus,
    /// Explicit grants; leave empty to use the role defaults.
    #[serde(default)]
    pub permissions: Vec<String>,
}

/// Partial update of an admin user. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AdminUserChanges {
    pub name: Option<String>,
    pub role: Option<AdminRole>,
    pub status: Option<AdminStatus>,
    pub permissions: Option<Vec<String>>,
}

impl AdminUserChanges {
    const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.role.is_none()
            && self.status.is_none()
            && self.permissions.is_none()
    }

    fn changed_fields(&self) -> String {
        let fields = [
            ("name", self.name.is_some()),
            ("role", self.role.is_some()),
            ("status", self.status.is_some()),
            ("permissions", self.permissions.is_some()),
        ];
        fields
            .iter()
            .filter(|(_, changed)| *changed)
            .map(|(field, _)| *field)
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Repository for admin user operations.
pub struct AdminUserRepository<'a> {
    store: &'a AdminStore,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new repository over the given store.
    #[must_use]
    pub const fn new(store: &'a AdminStore) -> Self {
        Self { store }
    }

    /// All users matching `filter`, in id order.
    pub async fn list(&self, filter: &AdminUserFilter) -> Vec<AdminUser> {
        let data = self.store.inner.read().await;
        data.users
            .iter()
            .filter(|u| filter.matches(u))
            .cloned()
            .collect()
    }

    /// Get an admin user by ID.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if no user has this ID.
    pub async fn get_by_id(&self, id: AdminUserId) -> Result<AdminUser, StoreError> {
        let data = self.store.inner.read().await;
        data.user(id).cloned().ok_or(StoreError::NotFound)
    }

    /// Create a new admin user on behalf of `actor`.
    ///
    /// # Errors
    ///
    /// - `Invalid` for a blank name, a malformed email or an unknown permission
    /// - `Forbidden` if a non super admin grants the super admin role, or
    ///   any permission the actor does not hold
    /// - `Conflict` if the email is already in use
    pub async fn create(
        &self,
        actor: &AdminUser,
        new: NewAdminUser,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, StoreError> {
        let name = validate_name(&new.name)?;
        let email = Email::parse(&new.email).map_err(|e| StoreError::Invalid(e.to_string()))?;
        validate_permissions(&new.permissions)?;
        if new.role == AdminRole::SuperAdmin && actor.role != AdminRole::SuperAdmin {
            return Err(StoreError::Forbidden(
                "only a super admin can grant the super_admin role".to_string(),
            ));
        }
        check_grantable(actor, new.role, &new.permissions)?;

        let mut data = self.store.inner.write().await;
        if data.users.iter().any(|u| u.email == email) {
            return Err(StoreError::Conflict(format!(
                "email {email} is already in use"
            )));
        }

        let user = AdminUser {
            id: AdminUserId::new(data.next_id),
            name,
            email,
            role: new.role,
            status: new.status,
            permissions: new.permissions,
            created_at: now,
            last_login_at: None,
        };
        data.next_id += 1;
        data.users.push(user.clone());
        data.log(
            actor.id,
            Some(user.id),
            "admin_user.created",
            format!("Created {} as {}", user.email, user.role),
            now,
        );

        tracing::info!(admin_id = %actor.id, user_id = %user.id, "Admin user created");
        Ok(user)
    }

    /// Apply `changes` to user `id` on behalf of `actor`.
    ///
    /// Changing the role without sending permissions drops explicit grants
    /// so the new role's defaults apply.
    ///
    /// # Errors
    ///
    /// - `NotFound` if the user does not exist
    /// - `Invalid` for an empty update, a blank name or an unknown permission
    /// - `Forbidden` if a non super admin touches super admins or grants a
    ///   permission they do not hold, or an admin deactivates themselves
    /// - `Conflict` if the last active super admin would lose that standing
    pub async fn update(
        &self,
        actor: &AdminUser,
        id: AdminUserId,
        changes: AdminUserChanges,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, StoreError> {
        if changes.is_empty() {
            return Err(StoreError::Invalid("no changes requested".to_string()));
        }
        let name = changes.name.as_deref().map(validate_name).transpose()?;
        if let Some(granted) = &changes.permissions {
            validate_permissions(granted)?;
        }
        let actor_is_super = actor.role == AdminRole::SuperAdmin;
        if changes.role == Some(AdminRole::SuperAdmin) && !actor_is_super {
            return Err(StoreError::Forbidden(
                "only a super admin can grant the super_admin role".to_string(),
            ));
        }
        if id == actor.id && changes.status.is_some_and(|s| s != AdminStatus::Active) {
            return Err(StoreError::Forbidden(
                "cannot deactivate your own account".to_string(),
            ));
        }

        let mut data = self.store.inner.write().await;
        let current = data.user(id).ok_or(StoreError::NotFound)?;
        if current.role == AdminRole::SuperAdmin && !actor_is_super {
            return Err(StoreError::Forbidden(
                "only a super admin can modify a super admin".to_string(),
            ));
        }

        let was_active_super = is_active_super(current);
        let previous_role = current.role;
        let role = changes.role.unwrap_or(current.role);
        let status = changes.status.unwrap_or(current.status);
        if changes.permissions.is_some() || role != previous_role {
            check_grantable(actor, role, changes.permissions.as_deref().unwrap_or_default())?;
        }
        let stays_active_super = role == AdminRole::SuperAdmin && status == AdminStatus::Active;
        if was_active_super && !stays_active_super && data.active_super_admins() <= 1 {
            return Err(StoreError::Conflict(
                "cannot demote or deactivate the last active super admin".to_string(),
            ));
        }

        let fields = changes.changed_fields();
        let user = data.user_mut(id).ok_or(StoreError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        user.role = role;
        user.status = status;
        match changes.permissions {
            Some(granted) => user.permissions = granted,
            None if role != previous_role => user.permissions.clear(),
            None => {}
        }
        let updated = user.clone();

        data.log(
            actor.id,
            Some(id),
            "admin_user.updated",
            format!("Updated {fields} of {}", updated.email),
            now,
        );

        tracing::info!(admin_id = %actor.id, user_id = %id, fields = %fields, "Admin user updated");
        Ok(updated)
    }

    /// Delete user `id` on behalf of `actor`, returning the removed record.
    ///
    /// # Errors
    ///
    /// - `Forbidden` when deleting oneself, or a super admin without being one
    /// - `NotFound` if the user does not exist
    /// - `Conflict` if the user is the last active super admin
    pub async fn delete(
        &self,
        actor: &AdminUser,
        id: AdminUserId,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, StoreError> {
        if id == actor.id {
            return Err(StoreError::Forbidden(
                "cannot delete your own account".to_string(),
            ));
        }

        let mut data = self.store.inner.write().await;
        let target = data.user(id).ok_or(StoreError::NotFound)?.clone();
        if target.role == AdminRole::SuperAdmin && actor.role != AdminRole::SuperAdmin {
            return Err(StoreError::Forbidden(
                "only a super admin can delete a super admin".to_string(),
            ));
        }
        if is_active_super(&target) && data.active_super_admins() <= 1 {
            return Err(StoreError::Conflict(
                "cannot delete the last active super admin".to_string(),
            ));
        }

        data.users.retain(|u| u.id != id);
        data.log(
            actor.id,
            Some(id),
            "admin_user.deleted",
            format!("Deleted {}", target.email),
            now,
        );

        tracing::info!(admin_id = %actor.id, user_id = %id, "Admin user deleted");
        Ok(target)
    }

    /// Record a sign-in and return the refreshed user.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown email, `Forbidden` for an inactive
    /// or suspended account.
    pub async fn record_login(
        &self,
        email: &Email,
        now: DateTime<Utc>,
    ) -> Result<AdminUser, StoreError> {
        let mut data = self.store.inner.write().await;
        let user = data
            .users
            .iter_mut()
            .find(|u| &u.email == email)
            .ok_or(StoreError::NotFound)?;
        if !user.is_active() {
            return Err(StoreError::Forbidden(format!("account is {}", user.status)));
        }
        user.last_login_at = Some(now);
        let user = user.clone();

        data.log(user.id, None, "auth.login", "Signed in".to_string(), now);
        Ok(user)
    }

    /// Record a sign-out. Unknown users are ignored.
    pub async fn record_logout(&self, id: AdminUserId, now: DateTime<Utc>) {
        let mut data = self.store.inner.write().await;
        if data.user(id).is_some() {
            data.log(id, None, "auth.logout", "Signed out".to_string(), now);
        }
    }

    /// Activity performed by or about user `id`, newest first.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::NotFound` if the user does not exist.
    pub async fn activity(&self, id: AdminUserId) -> Result<Vec<AdminActivity>, StoreError> {
        let data = self.store.inner.read().await;
        data.user(id).ok_or(StoreError::NotFound)?;
        Ok(data
            .activity
            .iter()
            .rev()
            .filter(|a| a.admin_id == id || a.target_id == Some(id))
            .cloned()
            .collect())
    }
}

impl StoreData {
    fn user(&self, id: AdminUserId) -> Option<&AdminUser> {
        self.users.iter().find(|u| u.id == id)
    }

    fn user_mut(&mut self, id: AdminUserId) -> Option<&mut AdminUser> {
        self.users.iter_mut().find(|u| u.id == id)
    }

    fn active_super_admins(&self) -> usize {
        self.users.iter().filter(|u| is_active_super(u)).count()
    }

    fn log(
        &mut self,
        admin_id: AdminUserId,
        target_id: Option<AdminUserId>,
        action: &str,
        detail: String,
        at: DateTime<Utc>,
    ) {
        if self.activity.len() >= self.activity_limit {
            self.activity.pop_front();
        }
        self.activity.push_back(AdminActivity {
            admin_id,
            target_id,
            action: action.to_string(),
            detail,
            at,
        });
    }
}

fn is_active_super(user: &AdminUser) -> bool {
    user.role == AdminRole::SuperAdmin && user.is_active()
}

fn validate_name(name: &str) -> Result<String, StoreError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(StoreError::Invalid("name is required".to_string()));
    }
    Ok(name.to_string())
}

fn validate_permissions(granted: &[String]) -> Result<(), StoreError> {
    match granted
        .iter()
        .find(|p| !permissions::ALL.contains(&p.as_str()))
    {
        Some(unknown) => Err(StoreError::Invalid(format!(
            "unknown permission: {unknown}"
        ))),
        None => Ok(()),
    }
}

/// Reject grants beyond the actor's own permissions.
///
/// Empty `granted` means the role defaults apply, so those are checked
/// instead. Super admins may grant anything.
fn check_grantable(
    actor: &AdminUser,
    role: AdminRole,
    granted: &[String],
) -> Result<(), StoreError> {
    if actor.role == AdminRole::SuperAdmin {
        return Ok(());
    }
    let effective = if granted.is_empty() {
        role.default_permissions()
    } else {
        granted.to_vec()
    };
    match effective.iter().find(|p| !actor.can(p)) {
        Some(missing) => Err(StoreError::Forbidden(format!(
            "cannot grant {missing}, which you do not hold"
        ))),
        None => Ok(()),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use shopfront_core::fixtures::Fixtures;

    use super::*;

    fn store() -> AdminStore {
        AdminStore::new(Fixtures::sample().unwrap().admin_users)
    }

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_760_000_000, 0).unwrap()
    }

    async fn user(store: &AdminStore, id: i32) -> AdminUser {
        store
            .admin_users()
            .get_by_id(AdminUserId::new(id))
            .await
            .unwrap()
    }

    fn new_user(email: &str, role: AdminRole) -> NewAdminUser {
        NewAdminUser {
            name: "Sam Rivera".to_string(),
            email: email.to_string(),
            role,
            status: AdminStatus::Active,
            permissions: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_list_filters() {
        let store = store();
        let repo = store.admin_users();
        assert_eq!(repo.list(&AdminUserFilter::default()).await.len(), 6);

        let editors = repo
            .list(&AdminUserFilter {
                role: Some(AdminRole::Editor),
                ..AdminUserFilter::default()
            })
            .await;
        let ids: Vec<i32> = editors.iter().map(|u| u.id.as_i32()).collect();
        assert_eq!(ids, vec![4, 6]);
    }

    #[tokio::test]
    async fn test_create_assigns_next_id_and_logs() {
        let store = store();
        let morgan = user(&store, 2).await;
        let repo = store.admin_users();

        let created = repo
            .create(&morgan, new_user("Sam@Shopfront.test", AdminRole::Editor), now())
            .await
            .unwrap();
        assert_eq!(created.id, AdminUserId::new(7));
        assert_eq!(created.email.as_str(), "sam@shopfront.test");

        let activity = repo.activity(created.id).await.unwrap();
        assert_eq!(activity.len(), 1);
        assert_eq!(activity[0].action, "admin_user.created");
        assert_eq!(activity[0].admin_id, morgan.id);
    }

    #[tokio::test]
    async fn test_create_rejections() {
        let store = store();
        let morgan = user(&store, 2).await;
        let repo = store.admin_users();

        let err = repo
            .create(&morgan, new_user("casey@shopfront.test", AdminRole::Viewer), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let err = repo
            .create(&morgan, new_user("new@shopfront.test", AdminRole::SuperAdmin), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let mut bad = new_user("new@shopfront.test", AdminRole::Viewer);
        bad.permissions = vec!["orders.delete".to_string()];
        let err = repo.create(&morgan, bad, now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(msg) if msg.contains("orders.delete")));

        let mut blank = new_user("new@shopfront.test", AdminRole::Viewer);
        blank.name = "   ".to_string();
        let err = repo.create(&morgan, blank, now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_update_role_change_resets_explicit_permissions() {
        let store = store();
        let morgan = user(&store, 2).await;
        let repo = store.admin_users();

        let casey = repo
            .update(
                &morgan,
                AdminUserId::new(4),
                AdminUserChanges {
                    role: Some(AdminRole::Manager),
                    ..AdminUserChanges::default()
                },
                now(),
            )
            .await
            .unwrap();
        assert_eq!(casey.role, AdminRole::Manager);
        assert!(casey.permissions.is_empty());
        assert!(casey.can(permissions::ORDERS_MANAGE));

        let err = repo
            .update(&morgan, casey.id, AdminUserChanges::default(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Invalid(_)));
    }

    #[tokio::test]
    async fn test_cannot_grant_unheld_permissions() {
        let store = store();
        let avery = user(&store, 1).await;
        let morgan = user(&store, 2).await;
        let repo = store.admin_users();
        let everything: Vec<String> = permissions::ALL.iter().map(ToString::to_string).collect();

        let err = repo
            .update(
                &morgan,
                morgan.id,
                AdminUserChanges {
                    permissions: Some(everything.clone()),
                    ..AdminUserChanges::default()
                },
                now(),
            )
            .await
            .unwrap_err();
        assert!(
            matches!(err, StoreError::Forbidden(msg) if msg.contains(permissions::SETTINGS_MANAGE))
        );
        assert!(!user(&store, 2).await.can(permissions::SETTINGS_MANAGE));

        let mut new = new_user("sam@shopfront.test", AdminRole::Editor);
        new.permissions = vec![permissions::SETTINGS_MANAGE.to_string()];
        let err = repo.create(&morgan, new.clone(), now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        // Grants the actor holds are fine, and super admins may grant anything.
        let mut editor = new_user("kim@shopfront.test", AdminRole::Editor);
        editor.permissions = vec![permissions::ORDERS_MANAGE.to_string()];
        repo.create(&morgan, editor, now()).await.unwrap();
        let sam = repo.create(&avery, new, now()).await.unwrap();
        assert!(sam.can(permissions::SETTINGS_MANAGE));
    }

    #[tokio::test]
    async fn test_super_admin_protection() {
        let store = store();
        let avery = user(&store, 1).await;
        let morgan = user(&store, 2).await;
        let repo = store.admin_users();

        let rename = AdminUserChanges {
            name: Some("Avery C.".to_string()),
            ..AdminUserChanges::default()
        };
        let err = repo
            .update(&morgan, avery.id, rename, now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let demote = AdminUserChanges {
            role: Some(AdminRole::Admin),
            ..AdminUserChanges::default()
        };
        let err = repo
            .update(&avery, avery.id, demote.clone(), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        // A second active super admin makes the demotion safe.
        repo.create(&avery, new_user("blake@shopfront.test", AdminRole::SuperAdmin), now())
            .await
            .unwrap();
        let demoted = repo.update(&avery, avery.id, demote, now()).await.unwrap();
        assert_eq!(demoted.role, AdminRole::Admin);
    }

    #[tokio::test]
    async fn test_delete_rules() {
        let store = store();
        let avery = user(&store, 1).await;
        let repo = store.admin_users();

        let err = repo.delete(&avery, avery.id, now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Forbidden(_)));

        let err = repo
            .delete(&avery, AdminUserId::new(99), now())
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::NotFound));

        let mut dormant = new_user("blake@shopfront.test", AdminRole::SuperAdmin);
        dormant.status = AdminStatus::Inactive;
        let blake = repo.create(&avery, dormant, now()).await.unwrap();
        let err = repo.delete(&blake, avery.id, now()).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));

        let removed = repo.delete(&avery, AdminUserId::new(4), now()).await.unwrap();
        assert_eq!(removed.email.as_str(), "casey@shopfront.test");
        assert!(matches!(
            repo.get_by_id(AdminUserId::new(4)).await,
            Err(StoreError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_login_and_activity_order() {
        let store = store();
        let repo = store.admin_users();

        let jamie = Email::parse("jamie@shopfront.test").unwrap();
        assert!(matches!(
            repo.record_login(&jamie, now()).await,
            Err(StoreError::Forbidden(_))
        ));
        let nobody = Email::parse("nobody@shopfront.test").unwrap();
        assert!(matches!(
            repo.record_login(&nobody, now()).await,
            Err(StoreError::NotFound)
        ));

        let avery = Email::parse("avery@shopfront.test").unwrap();
        let signed_in = repo.record_login(&avery, now()).await.unwrap();
        assert_eq!(signed_in.last_login_at, Some(now()));
        repo.record_logout(signed_in.id, now()).await;

        let actions: Vec<String> = repo
            .activity(signed_in.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(actions, vec!["auth.logout", "auth.login"]);
    }

    #[tokio::test]
    async fn test_activity_keeps_newest_records() {
        let store = AdminStore::with_activity_limit(Fixtures::sample().unwrap().admin_users, 3);
        let repo = store.admin_users();
        let avery = Email::parse("avery@shopfront.test").unwrap();
        let signed_in = repo.record_login(&avery, now()).await.unwrap();
        for _ in 0..3 {
            repo.record_logout(signed_in.id, now()).await;
        }

        let actions: Vec<String> = repo
            .activity(signed_in.id)
            .await
            .unwrap()
            .into_iter()
            .map(|a| a.action)
            .collect();
        assert_eq!(actions, vec!["auth.logout"; 3]);
    }
}
