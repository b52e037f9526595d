//! Admin user commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli admin list
//! sf-cli admin list --role editor
//! ```

use std::io::Write;

use shopfront_core::AdminRole;
use shopfront_core::admin::AdminUserFilter;
use shopfront_core::fixtures::Fixtures;
use tabled::{builder::Builder, settings::Style};

use super::CliError;

/// Print admin users from the fixtures, optionally limited to one role.
///
/// # Errors
///
/// Returns `CliError::InvalidRole` for an unknown role, or an I/O error if
/// writing fails.
pub fn list(fixtures: &Fixtures, role: Option<&str>, out: &mut impl Write) -> Result<(), CliError> {
    let role = role
        .map(|r| {
            r.trim()
                .parse::<AdminRole>()
                .map_err(|_| CliError::InvalidRole(r.to_owned()))
        })
        .transpose()?;
    let filter = AdminUserFilter {
        role,
        ..AdminUserFilter::default()
    };

    let mut builder = Builder::default();
    builder.push_record(["ID", "Name", "Email", "Role", "Status", "Last login"]);
    let mut shown = 0;
    for user in fixtures.admin_users.iter().filter(|u| filter.matches(u)) {
        builder.push_record([
            user.id.to_string(),
            user.name.clone(),
            user.email.to_string(),
            user.role.to_string(),
            user.status.to_string(),
            user.last_login_at
                .map_or_else(|| "never".to_string(), |at| at.format("%Y-%m-%d %H:%M").to_string()),
        ]);
        shown += 1;
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    writeln!(out, "{table}")?;
    writeln!(out, "{shown} admin user(s)")?;
    Ok(())
}
