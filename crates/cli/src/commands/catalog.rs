//! Catalog commands.
//!
//! # Usage
//!
//! ```bash
//! sf-cli catalog query --category audio --min-price 50 --sort rating
//! sf-cli catalog validate
//! ```

use std::io::Write;

use clap::Args;
use shopfront_core::fixtures::{self, Fixtures, Severity};
use shopfront_core::query::{self, PageRequest, QueryParams, QueryResult};
use tabled::{builder::Builder, settings::Style};

use super::CliError;

/// Filters, sort and paging for `catalog query`.
///
/// Values are passed through the same lenient parsing as storefront URLs,
/// so an unparseable number is ignored rather than rejected.
#[derive(Debug, Default, Args)]
pub struct QueryArgs {
    /// Category slug or id
    #[arg(long)]
    pub category: Option<String>,
    /// Brand slug or id
    #[arg(long)]
    pub brand: Option<String>,
    /// Lowest price, inclusive
    #[arg(long)]
    pub min_price: Option<String>,
    /// Highest price, inclusive
    #[arg(long)]
    pub max_price: Option<String>,
    /// Minimum rating
    #[arg(long)]
    pub rating: Option<String>,
    /// Sort key (newest, price-low, price-high, rating, popular, name-asc, name-desc)
    #[arg(long)]
    pub sort: Option<String>,
    /// Page number, starting at 1
    #[arg(long)]
    pub page: Option<String>,
    /// Products per page (max 100)
    #[arg(long)]
    pub limit: Option<String>,
    /// Case-insensitive search over name and descriptions
    #[arg(long)]
    pub search: Option<String>,
    /// Print the page as JSON instead of a table
    #[arg(long)]
    pub json: bool,
}

impl QueryArgs {
    fn params(&self) -> QueryParams {
        QueryParams {
            category: self.category.clone(),
            brand: self.brand.clone(),
            min_price: self.min_price.clone(),
            max_price: self.max_price.clone(),
            rating: self.rating.clone(),
            q: self.search.clone(),
            sort: self.sort.clone(),
            page: self.page.clone(),
            limit: self.limit.clone(),
            ..QueryParams::default()
        }
    }
}

/// Run the query pipeline and print one page.
///
/// # Errors
///
/// Returns an error if writing the output fails.
pub fn query(fixtures: &Fixtures, args: &QueryArgs, out: &mut impl Write) -> Result<(), CliError> {
    let catalog = &fixtures.catalog;
    let query = args.params().into_query(catalog, PageRequest::DEFAULT_LIMIT);
    let result = query::run(catalog.products(), &query);
    tracing::debug!(?query, total = result.total, "Catalog query");

    if args.json {
        serde_json::to_writer_pretty(&mut *out, &result)?;
        writeln!(out)?;
    } else {
        write_table(&result, out)?;
    }
    Ok(())
}

fn write_table(result: &QueryResult, out: &mut impl Write) -> Result<(), CliError> {
    let mut builder = Builder::default();
    builder.push_record(["ID", "Slug", "Name", "Price", "Rating", "Stock", "Category"]);
    for product in &result.data {
        builder.push_record([
            product.id.to_string(),
            product.slug.clone(),
            product.name.clone(),
            product.price_display.clone(),
            format!("{:.1}", product.rating),
            product.stock_status.label().to_string(),
            product.category_slug.clone().unwrap_or_default(),
        ]);
    }

    let mut table = builder.build();
    table.with(Style::modern_rounded());
    writeln!(out, "{table}")?;
    writeln!(
        out,
        "page {} of {} ({} matching products)",
        result.page, result.pages, result.total
    )?;
    Ok(())
}

/// Print fixture issues, most serious first.
///
/// # Errors
///
/// Returns `CliError::ValidationFailed` if any issue has error severity.
pub fn validate(fixtures: &Fixtures, out: &mut impl Write) -> Result<(), CliError> {
    let issues = fixtures::validate(fixtures);
    if issues.is_empty() {
        writeln!(out, "no issues found")?;
        return Ok(());
    }

    let mut builder = Builder::default();
    builder.push_record(["Severity", "Record", "Issue"]);
    for issue in &issues {
        builder.push_record([
            issue.severity.to_string(),
            issue.record.clone(),
            issue.message.clone(),
        ]);
    }
    let mut table = builder.build();
    table.with(Style::modern_rounded());
    writeln!(out, "{table}")?;

    let count = |severity: Severity| issues.iter().filter(|i| i.severity == severity).count();
    let errors = count(Severity::Error);
    writeln!(
        out,
        "{errors} error(s), {} warning(s), {} info",
        count(Severity::Warning),
        count(Severity::Info)
    )?;

    if errors > 0 {
        return Err(CliError::ValidationFailed(errors));
    }
    Ok(())
}
