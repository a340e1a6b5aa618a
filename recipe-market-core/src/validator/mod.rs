//! Catalog Validator - completeness and content checks for a marketplace
//!
//! Two independent passes, both accumulating every issue rather than
//! stopping at the first:
//!
//! - [`CompletenessValidator`] compares the catalog's recipe names with the
//!   recipes an [`Environment`] actually provides.
//! - [`ContentValidator`] runs pluggable [`ListingRule`]s over every listing,
//!   tracking the category breadcrumb so issues can say where they were found.

use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, info};

pub mod rules;

#[cfg(test)]
mod tests;

use crate::bundle::Bundle;
use crate::environment::Environment;
use crate::marketplace::{Category, RecipeListing, RecipeMarketplace};
use rules::*;

/// Separator between category names in an issue location
pub const BREADCRUMB_SEPARATOR: &str = " > ";

/// A problem found in the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    /// Unique identifier for the rule that raised this issue
    pub rule_id: &'static str,
    /// Name of the recipe concerned
    pub recipe: String,
    /// Category breadcrumb of the listing; empty at the root or when unknown
    pub location: String,
    /// Human-readable description
    pub message: String,
}

/// All issues from one or more validation passes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ValidationResult {
    pub issues: Vec<ValidationIssue>,
}

impl ValidationResult {
    pub fn is_valid(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn len(&self) -> usize {
        self.issues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }

    /// Append the issues of another pass
    pub fn merge(&mut self, other: ValidationResult) {
        self.issues.extend(other.issues);
    }

    /// Issues raised by one rule
    pub fn by_rule<'a>(&'a self, rule_id: &'a str) -> impl Iterator<Item = &'a ValidationIssue> {
        self.issues.iter().filter(move |i| i.rule_id == rule_id)
    }
}

/// A check applied to each listing
pub trait ListingRule: Send + Sync {
    /// Check one listing; `location` is its category breadcrumb
    fn check(&self, listing: &RecipeListing, location: &str) -> Vec<ValidationIssue>;

    /// Rule identifier
    fn rule_id(&self) -> &'static str;

    /// Rule description
    fn description(&self) -> &'static str;
}

/// Checks listing display names and descriptions
pub struct ContentValidator {
    rules: Vec<Box<dyn ListingRule>>,
}

impl ContentValidator {
    /// Create validator with the default content rules
    pub fn new() -> Self {
        let rules: Vec<Box<dyn ListingRule>> =
            vec![Box::new(DisplayNameRule), Box::new(DescriptionRule)];
        Self { rules }
    }

    /// Create validator with a custom rule set
    pub fn with_rules(rules: Vec<Box<dyn ListingRule>>) -> Self {
        Self { rules }
    }

    pub fn add_rule(&mut self, rule: Box<dyn ListingRule>) {
        self.rules.push(rule);
    }

    /// Identifiers and descriptions of the active rules
    pub fn rules(&self) -> Vec<(&'static str, &'static str)> {
        self.rules
            .iter()
            .map(|r| (r.rule_id(), r.description()))
            .collect()
    }

    /// Validate every listing beneath `category`
    pub fn validate(&self, category: &Category) -> ValidationResult {
        let mut result = ValidationResult::default();
        let mut breadcrumb = Vec::new();
        if !category.is_root() {
            breadcrumb.push(category.display_name.as_str());
        }
        self.walk(category, &mut breadcrumb, &mut result);

        info!(
            "Content validation found {} issue(s) in {} recipes",
            result.len(),
            category.recipe_count()
        );
        result
    }

    fn walk<'a>(
        &self,
        category: &'a Category,
        breadcrumb: &mut Vec<&'a str>,
        result: &mut ValidationResult,
    ) {
        let location = breadcrumb.join(BREADCRUMB_SEPARATOR);
        for listing in category.recipes() {
            debug!(recipe = %listing.name, location = %location, "Checking listing");
            for rule in &self.rules {
                result.issues.extend(rule.check(listing, &location));
            }
        }

        for child in category.categories() {
            breadcrumb.push(&child.display_name);
            self.walk(child, breadcrumb, result);
            breadcrumb.pop();
        }
    }
}

impl Default for ContentValidator {
    fn default() -> Self {
        Self::new()
    }
}

/// Compares catalog contents with what an environment provides
#[derive(Debug, Default, Clone, Copy)]
pub struct CompletenessValidator;

impl CompletenessValidator {
    pub const PHANTOM_ENTRY: &'static str = "phantom-entry";
    pub const MISSING_FROM_CATALOG: &'static str = "missing-from-catalog";
    pub const UNRESOLVABLE_BUNDLE: &'static str = "unresolvable-bundle";

    pub fn new() -> Self {
        Self
    }

    /// Report catalog names the environment lacks, then environment names
    /// the catalog lacks, each in sorted order
    ///
    /// A catalog-only name whose bundle the environment could not consult is
    /// reported as `unresolvable-bundle` with the failure, not as a phantom.
    pub fn validate(
        &self,
        marketplace: &RecipeMarketplace,
        environment: &dyn Environment,
    ) -> ValidationResult {
        let cataloged: BTreeSet<&str> = marketplace
            .all_recipes()
            .into_iter()
            .map(|listing| listing.name.as_str())
            .collect();
        let descriptors = environment.recipe_descriptors();
        let available: BTreeSet<&str> = descriptors.iter().map(|d| d.name.as_str()).collect();

        debug!(
            cataloged = cataloged.len(),
            available = available.len(),
            "Comparing catalog with environment"
        );

        let unavailable: BTreeMap<Bundle, String> =
            environment.unavailable_bundles().into_iter().collect();

        let mut result = ValidationResult::default();
        for name in cataloged.difference(&available) {
            let failure = marketplace
                .find_recipe(name)
                .and_then(|listing| listing.bundle.as_ref())
                .and_then(|bundle| unavailable.get_key_value(bundle));
            if let Some((bundle, reason)) = failure {
                result.issues.push(ValidationIssue {
                    rule_id: Self::UNRESOLVABLE_BUNDLE,
                    recipe: name.to_string(),
                    location: String::new(),
                    message: format!(
                        "Recipe '{name}' could not be checked against bundle {bundle}; \
                         fix the bundle before changing the catalog: {reason}"
                    ),
                });
                continue;
            }
            result.issues.push(ValidationIssue {
                rule_id: Self::PHANTOM_ENTRY,
                recipe: name.to_string(),
                location: String::new(),
                message: format!(
                    "Recipe '{name}' is in the catalog but not in the environment; \
                     remove it from the catalog or add it to the environment"
                ),
            });
        }
        for name in available.difference(&cataloged) {
            result.issues.push(ValidationIssue {
                rule_id: Self::MISSING_FROM_CATALOG,
                recipe: name.to_string(),
                location: String::new(),
                message: format!(
                    "Recipe '{name}' is in the environment but missing from the catalog; \
                     regenerate the catalog"
                ),
            });
        }

        info!("Completeness validation found {} issue(s)", result.len());
        result
    }
}
