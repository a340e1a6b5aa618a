//! Content rules for catalog listings

use super::{ListingRule, ValidationIssue};
use crate::marketplace::RecipeListing;

/// Whether `text` starts like a sentence
///
/// The first character must be upper-case, unless it is a non-letter marker
/// such as a quote or backtick, in which case the second one must be.
pub fn is_sentence_cased(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_uppercase() => true,
        Some(first) if !first.is_alphabetic() => chars.next().is_some_and(char::is_uppercase),
        _ => false,
    }
}

fn issue(
    rule: &dyn ListingRule,
    listing: &RecipeListing,
    location: &str,
    message: String,
) -> ValidationIssue {
    ValidationIssue {
        rule_id: rule.rule_id(),
        recipe: listing.name.clone(),
        location: location.to_string(),
        message,
    }
}

/// Rule: display name is present, sentence-cased and has no trailing period
pub struct DisplayNameRule;

impl ListingRule for DisplayNameRule {
    fn rule_id(&self) -> &'static str {
        "display-name"
    }

    fn description(&self) -> &'static str {
        "Display names must be non-empty, sentence-cased and not end with a period"
    }

    fn check(&self, listing: &RecipeListing, location: &str) -> Vec<ValidationIssue> {
        let display_name = listing.display_name.as_str();
        if display_name.is_empty() {
            return vec![issue(
                self,
                listing,
                location,
                "Display name is empty".to_string(),
            )];
        }

        let mut issues = Vec::new();
        if display_name.ends_with('.') {
            issues.push(issue(
                self,
                listing,
                location,
                format!("Display name '{display_name}' must not end with a period"),
            ));
        }
        if !is_sentence_cased(display_name) {
            issues.push(issue(
                self,
                listing,
                location,
                format!("Display name '{display_name}' must start with an upper-case letter"),
            ));
        }
        issues
    }
}

/// Rule: a non-empty description is sentence-cased and ends with a period
pub struct DescriptionRule;

impl ListingRule for DescriptionRule {
    fn rule_id(&self) -> &'static str {
        "description"
    }

    fn description(&self) -> &'static str {
        "Descriptions must be sentence-cased and end with a period"
    }

    fn check(&self, listing: &RecipeListing, location: &str) -> Vec<ValidationIssue> {
        let description = listing.description.as_str();
        let mut issues = Vec::new();
        if description.is_empty() {
            return issues;
        }

        if !is_sentence_cased(description) {
            issues.push(issue(
                self,
                listing,
                location,
                "Description must start with an upper-case letter".to_string(),
            ));
        }
        if !description.ends_with('.') {
            issues.push(issue(
                self,
                listing,
                location,
                "Description must end with a period".to_string(),
            ));
        }
        issues
    }
}
