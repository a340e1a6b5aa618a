//! Recipe listings and their documented options

use chrono::TimeDelta;
use std::collections::BTreeMap;

use crate::bundle::{Bundle, BundleRegistry, PreparedRecipe, RecipeDescriptor};
use crate::error::{MarketplaceError, MarketplaceResult};

/// Descriptive metadata about one recipe parameter
///
/// Options carry no typed value; every field may be absent when the catalog
/// only documents part of the option.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecipeOption {
    pub name: Option<String>,
    pub display_name: Option<String>,
    pub description: Option<String>,
}

impl RecipeOption {
    /// Create a fully documented option
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: Some(name.into()),
            display_name: Some(display_name.into()),
            description: Some(description.into()),
        }
    }
}

/// One cataloged recipe
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeListing {
    /// Canonical recipe id, intended to be unique across the marketplace
    pub name: String,

    /// Display name (defaults to `name`)
    pub display_name: String,

    /// Description (empty when absent)
    pub description: String,

    /// Estimated effort to apply the recipe once
    pub estimated_effort_per_occurrence: Option<TimeDelta>,

    /// Documented options in declaration order
    pub options: Vec<RecipeOption>,

    /// The bundle providing this recipe; `None` when provenance is unknown
    pub bundle: Option<Bundle>,
}

impl RecipeListing {
    /// Create a listing whose display name defaults to its name
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            description: String::new(),
            estimated_effort_per_occurrence: None,
            options: Vec::new(),
            bundle: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn with_estimated_effort(mut self, effort: TimeDelta) -> Self {
        self.estimated_effort_per_occurrence = Some(effort);
        self
    }

    pub fn with_option(mut self, option: RecipeOption) -> Self {
        self.options.push(option);
        self
    }

    pub fn with_bundle(mut self, bundle: Bundle) -> Self {
        self.bundle = Some(bundle);
        self
    }

    /// The attached bundle, or [`MarketplaceError::MissingBundle`]
    pub fn require_bundle(&self) -> MarketplaceResult<&Bundle> {
        self.bundle
            .as_ref()
            .ok_or_else(|| MarketplaceError::MissingBundle {
                recipe: self.name.clone(),
            })
    }

    /// Describe this recipe through its bundle's reader
    pub fn describe(&self, registry: &BundleRegistry) -> MarketplaceResult<RecipeDescriptor> {
        self.require_bundle()?.describe(registry, self)
    }

    /// Instantiate this recipe through its bundle's reader
    pub fn prepare(
        &self,
        registry: &BundleRegistry,
        options: &BTreeMap<String, String>,
    ) -> MarketplaceResult<PreparedRecipe> {
        self.require_bundle()?.prepare(registry, self, options)
    }
}
