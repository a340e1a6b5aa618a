//! Bundle resolution - from a listing's bundle identity to a live capability
//!
//! A [`Bundle`] is a cheap identity value: ecosystem, package name, and
//! optional version and team. Turning it into something that can describe or
//! instantiate recipes is the job of the resolution layer.
//!
//! # Architecture
//!
//! ```text
//! catalog row ──► BundleLoader   (per ecosystem)  ──► Bundle (identity)
//!                                                        │
//!                 BundleResolver (per ecosystem)  ◄──────┘  on first use
//!                        │
//!                        ▼
//!                 BundleReader ── IsolationContext (one per bundle)
//! ```
//!
//! Resolution may block on I/O, so it happens only when a listing is actually
//! used, and it is memoized per bundle identity by the [`BundleRegistry`]. A
//! failed resolution is captured in a [`FailedBundleReader`] which hands the
//! error back from each capability call, so one broken bundle never takes the
//! rest of the catalog down with it.

mod failed;
mod file;
mod isolation;
mod registry;

pub use failed::FailedBundleReader;
pub use file::{
    BundleManifest, FileBundleLoader, FileBundleReader, FileBundleResolver, FILE_ECOSYSTEM,
};
pub use isolation::{IsolationContext, IsolationFactory, NamespacedIsolationFactory, Symbol};
pub use registry::BundleRegistry;

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::error::MarketplaceResult;
use crate::marketplace::{parse_effort, RecipeListing, RecipeMarketplace, RecipeOption};

/// Identity of a shippable artifact that provides recipes
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bundle {
    ecosystem: String,
    pub package_name: String,
    pub version: Option<String>,
    pub team: Option<String>,
}

impl Bundle {
    /// Create a bundle identity; the ecosystem is canonicalized to lower-case
    pub fn new(ecosystem: &str, package_name: impl Into<String>) -> Self {
        Self {
            ecosystem: ecosystem.to_lowercase(),
            package_name: package_name.into(),
            version: None,
            team: None,
        }
    }

    pub fn with_version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }

    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = Some(team.into());
        self
    }

    /// Canonical (lower-case) ecosystem tag
    pub fn ecosystem(&self) -> &str {
        &self.ecosystem
    }

    /// Describe `listing` through this bundle's resolved reader
    pub fn describe(
        &self,
        registry: &BundleRegistry,
        listing: &RecipeListing,
    ) -> MarketplaceResult<RecipeDescriptor> {
        registry.reader(self).describe(listing)
    }

    /// Instantiate `listing` through this bundle's resolved reader
    pub fn prepare(
        &self,
        registry: &BundleRegistry,
        listing: &RecipeListing,
        options: &BTreeMap<String, String>,
    ) -> MarketplaceResult<PreparedRecipe> {
        registry.reader(self).prepare(listing, options)
    }
}

impl fmt::Display for Bundle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.ecosystem, self.package_name)?;
        if let Some(version) = &self.version {
            write!(f, "@{version}")?;
        }
        Ok(())
    }
}

/// A documented recipe parameter as reported by a bundle or environment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptionDescriptor {
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default)]
    pub required: bool,
}

/// Full description of a recipe as its provider knows it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeDescriptor {
    pub name: String,

    #[serde(default)]
    pub display_name: String,

    #[serde(default)]
    pub description: String,

    /// Category path, shallowest first
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub categories: Vec<String>,

    /// ISO-8601 duration literal
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_effort_per_occurrence: Option<String>,

    #[serde(default)]
    pub options: Vec<OptionDescriptor>,
}

impl RecipeDescriptor {
    /// Build the catalog listing for this recipe, attributed to `bundle`
    pub fn to_listing(&self, bundle: Option<Bundle>) -> MarketplaceResult<RecipeListing> {
        let mut listing = RecipeListing::new(&self.name).with_description(&self.description);
        if !self.display_name.is_empty() {
            listing.display_name = self.display_name.clone();
        }
        if let Some(effort) = &self.estimated_effort_per_occurrence {
            listing.estimated_effort_per_occurrence = Some(parse_effort(effort)?);
        }
        listing.options = self
            .options
            .iter()
            .map(|option| RecipeOption {
                name: Some(option.name.clone()),
                display_name: option.display_name.clone(),
                description: option.description.clone(),
            })
            .collect();
        listing.bundle = bundle;
        Ok(listing)
    }
}

/// A recipe instantiated with concrete options, ready for an execution engine
#[derive(Debug, Clone)]
pub struct PreparedRecipe {
    pub descriptor: RecipeDescriptor,
    pub options: BTreeMap<String, String>,
    pub bundle: Bundle,
    /// The isolation context the recipe must run in
    pub context: Arc<IsolationContext>,
}

/// Builds bundle identities for one ecosystem
pub trait BundleLoader: Send + Sync {
    /// Ecosystem handled by this loader (compared case-insensitively)
    fn ecosystem(&self) -> &str;

    /// Build a bundle, or `None` when this loader cannot handle the combination
    fn load(&self, package_name: &str, version: Option<&str>, team: Option<&str>)
        -> Option<Bundle>;
}

/// Turns bundle identities of one ecosystem into readers
pub trait BundleResolver: Send + Sync {
    /// Ecosystem handled by this resolver (compared case-insensitively)
    fn ecosystem(&self) -> &str;

    /// Resolve `bundle`; may block on file or network I/O
    fn resolve(
        &self,
        bundle: &Bundle,
        isolation: &dyn IsolationFactory,
    ) -> MarketplaceResult<Arc<dyn BundleReader>>;
}

/// The capability to enumerate, describe and instantiate a bundle's recipes
pub trait BundleReader: Send + Sync {
    /// The bundle this reader was resolved from
    fn bundle(&self) -> &Bundle;

    /// Every recipe the bundle provides, as a marketplace
    fn read(&self) -> MarketplaceResult<RecipeMarketplace>;

    /// Describe one of the bundle's recipes
    fn describe(&self, listing: &RecipeListing) -> MarketplaceResult<RecipeDescriptor>;

    /// Instantiate one of the bundle's recipes with the given options
    fn prepare(
        &self,
        listing: &RecipeListing,
        options: &BTreeMap<String, String>,
    ) -> MarketplaceResult<PreparedRecipe>;

    /// The isolation context recipes of this bundle are loaded into
    fn isolation(&self) -> MarketplaceResult<Arc<IsolationContext>>;
}
