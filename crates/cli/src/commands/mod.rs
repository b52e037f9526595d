//! Command implementations. Each writes its output to the given writer.

pub mod admin;
pub mod catalog;

use shopfront_core::fixtures::FixtureError;
use thiserror::Error;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Fixtures could not be read or parsed.
    #[error(transparent)]
    Fixtures(#[from] FixtureError),

    /// Invalid role.
    #[error("Invalid role: {0}. Valid roles: super_admin, admin, manager, editor, viewer")]
    InvalidRole(String),

    /// Validation found errors.
    #[error("{0} fixture error(s) found")]
    ValidationFailed(usize),

    /// Writing output failed.
    #[error("output error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON encoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
