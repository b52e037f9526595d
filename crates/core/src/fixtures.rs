//! Fixture loading and validation for the Mock Data Store.
//!
//! Fixtures are two YAML documents: `catalog.yaml` (brands, categories,
//! products) and `admin_users.yaml`. A sample set is compiled into the
//! crate; a directory holding both files may replace it at startup.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::admin::AdminUser;
use crate::catalog::{Brand, Catalog, Category, Product};
use crate::types::AdminRole;

/// Bundled sample catalog.
pub const SAMPLE_CATALOG: &str = include_str!("../fixtures/catalog.yaml");

/// Bundled sample admin users.
pub const SAMPLE_ADMIN_USERS: &str = include_str!("../fixtures/admin_users.yaml");

/// File name of the catalog fixture inside a fixtures directory.
pub const CATALOG_FILE: &str = "catalog.yaml";

/// File name of the admin user fixture inside a fixtures directory.
pub const ADMIN_USERS_FILE: &str = "admin_users.yaml";

/// Errors that can occur while loading fixtures.
#[derive(Debug, Error)]
pub enum FixtureError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid YAML in {file}: {source}")]
    Yaml {
        file: String,
        #[source]
        source: serde_yaml::Error,
    },
}

#[derive(Debug, Default, Deserialize)]
struct CatalogDocument {
    #[serde(default)]
    brands: Vec<Brand>,
    #[serde(default)]
    categories: Vec<Category>,
    #[serde(default)]
    products: Vec<Product>,
}

#[derive(Debug, Default, Deserialize)]
struct AdminUsersDocument {
    #[serde(default)]
    admin_users: Vec<AdminUser>,
}

/// Everything the Mock Data Store holds.
#[derive(Debug, Clone, Default)]
pub struct Fixtures {
    pub catalog: Catalog,
    pub admin_users: Vec<AdminUser>,
}

impl Fixtures {
    /// Parse the bundled sample data.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled YAML does not parse.
    pub fn sample() -> Result<Self, FixtureError> {
        Self::from_yaml(SAMPLE_CATALOG, SAMPLE_ADMIN_USERS)
    }

    /// Parse fixtures from YAML text.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Yaml`] naming the document that failed.
    pub fn from_yaml(catalog: &str, admin_users: &str) -> Result<Self, FixtureError> {
        Ok(Self {
            catalog: parse_catalog(catalog, CATALOG_FILE)?,
            admin_users: parse_admin_users(admin_users, ADMIN_USERS_FILE)?,
        })
    }

    /// Load fixtures from `dir`, or the bundled sample data when `dir` is
    /// `None`.
    ///
    /// # Errors
    ///
    /// Returns an error if either file cannot be read or parsed.
    pub fn load(dir: Option<&Path>) -> Result<Self, FixtureError> {
        let Some(dir) = dir else {
            return Self::sample();
        };

        let catalog_path = dir.join(CATALOG_FILE);
        let admins_path = dir.join(ADMIN_USERS_FILE);
        let catalog = read(&catalog_path)?;
        let admins = read(&admins_path)?;

        Ok(Self {
            catalog: parse_catalog(&catalog, &catalog_path.display().to_string())?,
            admin_users: parse_admin_users(&admins, &admins_path.display().to_string())?,
        })
    }
}

fn read(path: &Path) -> Result<String, FixtureError> {
    std::fs::read_to_string(path).map_err(|source| FixtureError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn parse_catalog(yaml: &str, file: &str) -> Result<Catalog, FixtureError> {
    let doc: CatalogDocument = serde_yaml::from_str(yaml).map_err(|source| FixtureError::Yaml {
        file: file.to_string(),
        source,
    })?;
    Ok(Catalog::new(doc.products, doc.categories, doc.brands))
}

fn parse_admin_users(yaml: &str, file: &str) -> Result<Vec<AdminUser>, FixtureError> {
    let doc: AdminUsersDocument =
        serde_yaml::from_str(yaml).map_err(|source| FixtureError::Yaml {
            file: file.to_string(),
            source,
        })?;
    Ok(doc.admin_users)
}

/// How serious a fixture issue is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    /// A display field will be filled from a default.
    Info,
    /// Data that loads but is probably wrong.
    Warning,
    /// Data that breaks lookups.
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        })
    }
}

/// One finding from [`validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FixtureIssue {
    pub severity: Severity,
    /// Record the issue is about, e.g. `product:wool-beanie`.
    pub record: String,
    pub message: String,
}

impl FixtureIssue {
    fn new(severity: Severity, record: String, message: impl Into<String>) -> Self {
        Self {
            severity,
            record,
            message: message.into(),
        }
    }
}

/// Check fixtures for broken references, duplicates and defaulted fields.
///
/// Issues are ordered by severity, most serious first.
#[must_use]
pub fn validate(fixtures: &Fixtures) -> Vec<FixtureIssue> {
    let catalog = &fixtures.catalog;
    let mut issues = Vec::new();

    let mut slugs = HashSet::new();
    let mut ids = HashSet::new();
    for product in catalog.products() {
        let record = format!("product:{}", product.slug);

        if !slugs.insert(product.slug.as_str()) {
            issues.push(FixtureIssue::new(Severity::Error, record.clone(), "duplicate slug"));
        }
        if !ids.insert(product.id) {
            issues.push(FixtureIssue::new(
                Severity::Error,
                record.clone(),
                format!("duplicate id {}", product.id),
            ));
        }

        match (product.category_id, product.category_slug.as_deref()) {
            (None, None) => issues.push(FixtureIssue::new(
                Severity::Warning,
                record.clone(),
                "no category",
            )),
            (Some(id), _) if catalog.category_by_id(id).is_none() => {
                issues.push(FixtureIssue::new(
                    Severity::Error,
                    record.clone(),
                    format!("unknown category id {id}"),
                ));
            }
            (None, Some(slug)) => issues.push(FixtureIssue::new(
                Severity::Error,
                record.clone(),
                format!("unknown category slug {slug}"),
            )),
            _ => {}
        }

        if let Some(brand) = product.brand_id
            && catalog.brand_by_id(brand).is_none()
        {
            issues.push(FixtureIssue::new(
                Severity::Error,
                record.clone(),
                format!("unknown brand id {brand}"),
            ));
        }

        if let Some(rating) = product.rating
            && product.valid_rating().is_none()
        {
            issues.push(FixtureIssue::new(
                Severity::Error,
                record.clone(),
                format!("rating {rating} is not between 0 and 5"),
            ));
        }

        if product.original_price.is_some_and(|o| o <= product.price) {
            issues.push(FixtureIssue::new(
                Severity::Warning,
                record.clone(),
                "original price is not above price",
            ));
        }

        let mut skus = HashSet::new();
        for variant in &product.variants {
            if !skus.insert(variant.sku.as_str()) {
                issues.push(FixtureIssue::new(
                    Severity::Error,
                    record.clone(),
                    format!("duplicate variant sku {}", variant.sku),
                ));
            }
        }

        let defaulted: Vec<&str> = [
            (product.images.is_empty(), "images"),
            (product.rating.is_none(), "rating"),
            (product.reviews.is_none(), "reviews"),
            (product.stock_status.is_none(), "stock_status"),
        ]
        .into_iter()
        .filter_map(|(missing, field)| missing.then_some(field))
        .collect();
        if !defaulted.is_empty() {
            issues.push(FixtureIssue::new(
                Severity::Info,
                record,
                format!("display default used for {}", defaulted.join(", ")),
            ));
        }
    }

    let mut category_slugs = HashSet::new();
    for category in catalog.categories() {
        let record = format!("category:{}", category.slug);
        if !category_slugs.insert(category.slug.as_str()) {
            issues.push(FixtureIssue::new(Severity::Error, record.clone(), "duplicate slug"));
        }
        if let Some(parent) = category.parent_id
            && catalog.category_by_id(parent).is_none()
        {
            issues.push(FixtureIssue::new(
                Severity::Error,
                record.clone(),
                format!("unknown parent id {parent}"),
            ));
        }
        let live = catalog.live_product_count(category.id);
        if category.product_count > 0
            && usize::try_from(category.product_count).is_ok_and(|count| count != live)
        {
            issues.push(FixtureIssue::new(
                Severity::Info,
                record,
                format!(
                    "product_count {} differs from {live} products in catalog",
                    category.product_count
                ),
            ));
        }
    }

    let mut emails: HashMap<&str, usize> = HashMap::new();
    for admin in &fixtures.admin_users {
        *emails.entry(admin.email.as_str()).or_default() += 1;
    }
    for (email, count) in emails {
        if count > 1 {
            issues.push(FixtureIssue::new(
                Severity::Error,
                format!("admin:{email}"),
                "duplicate email",
            ));
        }
    }
    if !fixtures
        .admin_users
        .iter()
        .any(|a| a.role == AdminRole::SuperAdmin && a.is_active())
    {
        issues.push(FixtureIssue::new(
            Severity::Warning,
            "admin_users".to_string(),
            "no active super admin",
        ));
    }

    issues.sort_by(|a, b| b.severity.cmp(&a.severity).then_with(|| a.record.cmp(&b.record)));
    issues
}
