//! In-memory admin data store.
//!
//! Admin users are seeded from fixtures at startup and every change lives
//! only in process memory. Repositories borrow the store and hold its lock
//! for the duration of one operation, so each mutation and its activity
//! record land together. Only the newest [`ACTIVITY_LIMIT`] activity records
//! are kept.

pub mod admin_users;

use std::collections::VecDeque;
use std::sync::Arc;

use shopfront_core::admin::{AdminActivity, AdminUser};
use thiserror::Error;
use tokio::sync::RwLock;

pub use admin_users::{AdminUserChanges, AdminUserRepository, NewAdminUser};

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Operation would break a uniqueness or safety rule.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Acting admin is not allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Submitted data failed validation.
    #[error("invalid input: {0}")]
    Invalid(String),
}

/// Number of activity records retained; older ones are dropped first.
pub const ACTIVITY_LIMIT: usize = 5_000;

/// Shared handle to the admin data.
#[derive(Clone, Default)]
pub struct AdminStore {
    inner: Arc<RwLock<StoreData>>,
}

#[derive(Default)]
struct StoreData {
    users: Vec<AdminUser>,
    activity: VecDeque<AdminActivity>,
    activity_limit: usize,
    next_id: i32,
}

impl AdminStore {
    /// Seed the store with `users`, kept in id order.
    #[must_use]
    pub fn new(users: Vec<AdminUser>) -> Self {
        Self::with_activity_limit(users, ACTIVITY_LIMIT)
    }

    fn with_activity_limit(mut users: Vec<AdminUser>, activity_limit: usize) -> Self {
        users.sort_by_key(|u| u.id);
        let next_id = users.iter().map(|u| u.id.as_i32()).max().unwrap_or(0) + 1;
        Self {
            inner: Arc::new(RwLock::new(StoreData {
                users,
                activity: VecDeque::new(),
                activity_limit,
                next_id,
            })),
        }
    }

    /// Repository for admin users and their activity.
    #[must_use]
    pub const fn admin_users(&self) -> AdminUserRepository<'_> {
        AdminUserRepository::new(self)
    }
}
