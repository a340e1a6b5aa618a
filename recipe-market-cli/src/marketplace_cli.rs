//! Recipe Market CLI commands

use anyhow::{anyhow, Context, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tabled::{
    settings::{object::Rows, Alignment, Modify, Style},
    Table, Tabled,
};
use tracing::info;

use recipe_market_core::bundle::BundleRegistry;
use recipe_market_core::codec::{Delimiter, MarketplaceReader, MarketplaceWriter};
use recipe_market_core::config::MarketplaceConfig;
use recipe_market_core::environment::{BundleEnvironment, Environment, StaticEnvironment};
use recipe_market_core::marketplace::{format_effort, Category, RecipeListing, RecipeMarketplace};
use recipe_market_core::printer::{MarketplacePrinter, PrinterOptions};
use recipe_market_core::validator::{
    CompletenessValidator, ContentValidator, ValidationResult, BREADCRUMB_SEPARATOR,
};

fn load_catalog(path: &Path) -> Result<RecipeMarketplace> {
    read_catalog(MarketplaceReader::new(), path)
}

/// Load a catalog whose bundles are built by the registry's loaders
fn load_resolvable_catalog(path: &Path, registry: &BundleRegistry) -> Result<RecipeMarketplace> {
    read_catalog(MarketplaceReader::with_registry(registry), path)
}

fn read_catalog(reader: MarketplaceReader<'_>, path: &Path) -> Result<RecipeMarketplace> {
    reader
        .read_path(path)
        .with_context(|| format!("Failed to load catalog: {}", path.display()))
}

/// Directory relative `file` bundles resolve against when no root is configured
fn catalog_dir(path: &Path) -> PathBuf {
    path.parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."))
}

/// Every listing with its category breadcrumb, in pre-order
fn entries<'a>(
    category: &'a Category,
    path: &mut Vec<&'a str>,
    out: &mut Vec<(String, &'a RecipeListing)>,
) {
    let location = path.join(BREADCRUMB_SEPARATOR);
    for listing in category.recipes() {
        out.push((location.clone(), listing));
    }
    for child in category.categories() {
        path.push(&child.display_name);
        entries(child, path, out);
        path.pop();
    }
}

fn listing_json(location: &str, listing: &RecipeListing) -> serde_json::Value {
    serde_json::json!({
        "name": listing.name,
        "displayName": listing.display_name,
        "description": listing.description,
        "category": location,
        "estimatedEffortPerOccurrence": listing
            .estimated_effort_per_occurrence
            .as_ref()
            .map(format_effort),
        "options": listing.options.iter().map(|o| serde_json::json!({
            "name": o.name,
            "displayName": o.display_name,
            "description": o.description,
        })).collect::<Vec<_>>(),
        "bundle": listing.bundle.as_ref().map(|b| serde_json::json!({
            "ecosystem": b.ecosystem(),
            "packageName": b.package_name,
            "version": b.version,
            "team": b.team,
        })),
    })
}

pub fn print_command(catalog: &Path, options: PrinterOptions, category: &[String]) -> Result<()> {
    let marketplace = load_catalog(catalog)?;
    let start = marketplace
        .root()
        .find_category(category)
        .ok_or_else(|| anyhow!("No category '{}' in catalog", category.join("/")))?;

    print!("{}", MarketplacePrinter::new(options).print(start));
    Ok(())
}

/// Table row for listings
#[derive(Tabled)]
struct ListingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Display Name")]
    display_name: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Bundle")]
    bundle: String,
    #[tabled(rename = "Effort")]
    effort: String,
}

pub fn list_command(catalog: &Path, json: bool) -> Result<()> {
    let marketplace = load_catalog(catalog)?;
    let mut rows = Vec::new();
    entries(marketplace.root(), &mut Vec::new(), &mut rows);

    if json {
        let listings: Vec<serde_json::Value> = rows
            .iter()
            .map(|(location, listing)| listing_json(location, listing))
            .collect();
        println!("{}", serde_json::to_string_pretty(&listings)?);
        return Ok(());
    }

    if rows.is_empty() {
        println!("No recipes in catalog.");
        return Ok(());
    }

    println!("\n{} recipe(s):\n", rows.len());
    let table_rows: Vec<ListingRow> = rows
        .iter()
        .map(|(location, listing)| ListingRow {
            name: listing.name.clone(),
            display_name: listing.display_name.clone(),
            category: location.clone(),
            bundle: listing
                .bundle
                .as_ref()
                .map(ToString::to_string)
                .unwrap_or_default(),
            effort: listing
                .estimated_effort_per_occurrence
                .as_ref()
                .map(format_effort)
                .unwrap_or_default(),
        })
        .collect();

    let table = Table::new(&table_rows)
        .with(Style::rounded())
        .with(Modify::new(Rows::first()).with(Alignment::center()))
        .to_string();
    println!("{table}");
    Ok(())
}

pub fn find_command(catalog: &Path, name: &str, json: bool) -> Result<()> {
    let marketplace = load_catalog(catalog)?;
    let mut rows = Vec::new();
    entries(marketplace.root(), &mut Vec::new(), &mut rows);

    // Same first-in-pre-order match as `find_recipe`
    let Some((location, listing)) = rows.iter().find(|(_, l)| l.name == name) else {
        eprintln!("Recipe '{name}' not found in {}", catalog.display());
        std::process::exit(1);
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&listing_json(location, listing))?
        );
        return Ok(());
    }

    println!("{}", listing.display_name);
    println!("  Name:        {}", listing.name);
    if !location.is_empty() {
        println!("  Category:    {location}");
    }
    if !listing.description.is_empty() {
        println!("  Description: {}", listing.description);
    }
    if let Some(effort) = &listing.estimated_effort_per_occurrence {
        println!("  Effort:      {}", format_effort(effort));
    }
    if let Some(bundle) = &listing.bundle {
        println!("  Bundle:      {bundle}");
        if let Some(team) = &bundle.team {
            println!("  Team:        {team}");
        }
    }
    if !listing.options.is_empty() {
        println!("  Options:");
        for option in &listing.options {
            let label = option.name.as_deref().unwrap_or("<unnamed>");
            match &option.description {
                Some(description) => println!("    - {label}: {description}"),
                None => println!("    - {label}"),
            }
        }
    }
    Ok(())
}

pub fn validate_command(
    config: &MarketplaceConfig,
    catalog: &Path,
    environment: Option<&Path>,
    resolve: bool,
    json: bool,
) -> Result<()> {
    let registry = config.registry(&catalog_dir(catalog));
    let marketplace = if resolve {
        load_resolvable_catalog(catalog, &registry)?
    } else {
        load_catalog(catalog)?
    };
    info!("Validating {} recipes", marketplace.recipe_count());

    let mut result = ContentValidator::new().validate(marketplace.root());

    if let Some(path) = environment {
        let environment = StaticEnvironment::from_path(path)
            .with_context(|| format!("Failed to load environment: {}", path.display()))?;
        result.merge(completeness(&marketplace, &environment));
    } else if resolve {
        let environment = BundleEnvironment::from_marketplace(&registry, &marketplace);
        result.merge(completeness(&marketplace, &environment));
    }

    if json {
        let output = serde_json::json!({
            "catalog": catalog,
            "recipes": marketplace.recipe_count(),
            "issueCount": result.len(),
            "issues": result.issues,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        print_validation_results(&result, marketplace.recipe_count());
    }

    if !result.is_valid() {
        std::process::exit(1);
    }
    Ok(())
}

fn completeness(marketplace: &RecipeMarketplace, environment: &dyn Environment) -> ValidationResult {
    CompletenessValidator::new().validate(marketplace, environment)
}

fn print_validation_results(result: &ValidationResult, recipes: usize) {
    if result.is_valid() {
        println!("✅ {recipes} recipe(s) validated, no issues found");
        return;
    }

    for issue in &result.issues {
        if issue.location.is_empty() {
            println!("❌ {} [{}]: {}", issue.recipe, issue.rule_id, issue.message);
        } else {
            println!(
                "❌ {} ({}) [{}]: {}",
                issue.recipe, issue.location, issue.rule_id, issue.message
            );
        }
    }
    println!("\n{} issue(s) in {recipes} recipe(s)", result.len());
}

pub fn normalize_command(catalog: &Path, output: Option<&Path>, delimiter: Delimiter) -> Result<()> {
    let marketplace = load_catalog(catalog)?;
    let writer = MarketplaceWriter::with_delimiter(delimiter);

    match output {
        Some(path) => {
            writer
                .write_path(marketplace.root(), path)
                .with_context(|| format!("Failed to write catalog: {}", path.display()))?;
            eprintln!(
                "Wrote {} recipe(s) to {}",
                marketplace.recipe_count(),
                path.display()
            );
        }
        None => print!("{}", writer.write_string(marketplace.root())?),
    }
    Ok(())
}

pub async fn describe_command(
    config: &MarketplaceConfig,
    catalog: &Path,
    name: &str,
    json: bool,
) -> Result<()> {
    let registry = Arc::new(config.registry(&catalog_dir(catalog)));
    let marketplace = load_resolvable_catalog(catalog, &registry)?;
    let listing = marketplace
        .find_recipe(name)
        .ok_or_else(|| anyhow!("Recipe '{name}' not found in {}", catalog.display()))?;
    let bundle = listing.require_bundle()?.clone();

    let reader = registry.reader_async(bundle).await;
    let descriptor = reader
        .describe(listing)
        .with_context(|| format!("Failed to describe recipe '{name}'"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(&descriptor)?);
        return Ok(());
    }

    println!("{}", descriptor.display_name);
    println!("  Name:        {}", descriptor.name);
    println!("  Bundle:      {}", reader.bundle());
    if !descriptor.description.is_empty() {
        println!("  Description: {}", descriptor.description);
    }
    if let Some(effort) = &descriptor.estimated_effort_per_occurrence {
        println!("  Effort:      {effort}");
    }
    if !descriptor.options.is_empty() {
        println!("  Options:");
        for option in &descriptor.options {
            let required = if option.required { " (required)" } else { "" };
            match &option.description {
                Some(description) => println!("    - {}{required}: {description}", option.name),
                None => println!("    - {}{required}", option.name),
            }
        }
    }
    Ok(())
}
