//! Shopfront CLI - Catalog and admin tools over the fixture data.
//!
//! # Usage
//!
//! ```bash
//! # Query the catalog like the storefront listing does
//! sf-cli catalog query --category audio --sort price-low --limit 5
//!
//! # Same, as JSON
//! sf-cli catalog query --search wool --json
//!
//! # Check fixtures for broken references and defaulted fields
//! sf-cli catalog validate
//!
//! # List admin users, optionally by role
//! sf-cli admin list --role editor
//!
//! # Use fixtures from a directory instead of the bundled sample data
//! sf-cli --fixtures ./data catalog validate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shopfront_core::fixtures::Fixtures;

mod commands;

use commands::CliError;
use commands::catalog::QueryArgs;

#[derive(Parser)]
#[command(name = "sf-cli")]
#[command(author, version, about = "Shopfront CLI tools")]
struct Cli {
    /// Directory holding catalog.yaml and admin_users.yaml
    /// (default: bundled sample data)
    #[arg(long, global = true, value_name = "DIR")]
    fixtures: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Query and check the product catalog
    Catalog {
        #[command(subcommand)]
        action: CatalogAction,
    },
    /// Inspect admin users
    Admin {
        #[command(subcommand)]
        action: AdminAction,
    },
}

#[derive(Subcommand)]
enum CatalogAction {
    /// Run the product query pipeline
    Query(QueryArgs),
    /// Report fixture problems
    Validate,
}

#[derive(Subcommand)]
enum AdminAction {
    /// List admin users
    List {
        /// Only show this role (`super_admin`, `admin`, `manager`, `editor`, `viewer`)
        #[arg(short, long)]
        role: Option<String>,
    },
}

fn main() {
    // Logs go to stderr so command output stays pipeable
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "shopfront_cli=info".into()),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let fixtures = Fixtures::load(cli.fixtures.as_deref())?;
    let mut out = std::io::stdout().lock();

    match cli.command {
        Commands::Catalog { action } => match action {
            CatalogAction::Query(args) => commands::catalog::query(&fixtures, &args, &mut out)?,
            CatalogAction::Validate => commands::catalog::validate(&fixtures, &mut out)?,
        },
        Commands::Admin { action } => match action {
            AdminAction::List { role } => {
                commands::admin::list(&fixtures, role.as_deref(), &mut out)?;
            }
        },
    }
    Ok(())
}
