//! Environments - the recipes that are actually available
//!
//! The completeness validator compares a catalog against an [`Environment`].
//! [`StaticEnvironment`] holds a fixed list (in memory or from a YAML file);
//! [`BundleEnvironment`] asks the bundles a catalog refers to what they
//! really provide.

use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, warn};

use crate::bundle::{Bundle, BundleManifest, BundleRegistry, RecipeDescriptor};
use crate::error::MarketplaceResult;
use crate::marketplace::RecipeMarketplace;

/// Source of the recipes available at runtime
pub trait Environment {
    /// Every recipe this environment provides
    fn recipe_descriptors(&self) -> Vec<RecipeDescriptor>;

    /// Bundles that could not be consulted, with the reason
    ///
    /// Recipes from these bundles are unknown rather than absent.
    fn unavailable_bundles(&self) -> Vec<(Bundle, String)> {
        Vec::new()
    }
}

/// A fixed set of recipe descriptors
///
/// The YAML form is the same as a `file` bundle manifest:
///
/// ```yaml
/// recipes:
///   - name: org.example.Foo
///     displayName: Foo
///     description: Does foo.
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StaticEnvironment {
    descriptors: Vec<RecipeDescriptor>,
}

impl StaticEnvironment {
    pub fn new(descriptors: Vec<RecipeDescriptor>) -> Self {
        Self { descriptors }
    }

    /// Parse an environment from YAML
    pub fn from_yaml(content: &str, path: &Path) -> MarketplaceResult<Self> {
        let manifest = BundleManifest::from_yaml(content, path)?;
        Ok(Self::new(manifest.recipes))
    }

    /// Read an environment file
    pub fn from_path(path: &Path) -> MarketplaceResult<Self> {
        let manifest = BundleManifest::from_path(path)?;
        debug!(
            "Loaded {} recipes from environment file {}",
            manifest.recipes.len(),
            path.display()
        );
        Ok(Self::new(manifest.recipes))
    }
}

impl Environment for StaticEnvironment {
    fn recipe_descriptors(&self) -> Vec<RecipeDescriptor> {
        self.descriptors.clone()
    }
}

/// The union of what every bundle referenced by a catalog provides
pub struct BundleEnvironment<'a> {
    registry: &'a BundleRegistry,
    bundles: BTreeSet<Bundle>,
}

impl<'a> BundleEnvironment<'a> {
    pub fn new(registry: &'a BundleRegistry, bundles: impl IntoIterator<Item = Bundle>) -> Self {
        Self {
            registry,
            bundles: bundles.into_iter().collect(),
        }
    }

    /// Use every distinct bundle attached to a listing in `marketplace`
    pub fn from_marketplace(registry: &'a BundleRegistry, marketplace: &RecipeMarketplace) -> Self {
        let bundles = marketplace
            .all_recipes()
            .into_iter()
            .filter_map(|listing| listing.bundle.clone());
        Self::new(registry, bundles)
    }

    /// Distinct bundles consulted, in identity order
    pub fn bundles(&self) -> impl Iterator<Item = &Bundle> {
        self.bundles.iter()
    }
}

impl Environment for BundleEnvironment<'_> {
    fn recipe_descriptors(&self) -> Vec<RecipeDescriptor> {
        let mut descriptors = Vec::new();
        for bundle in &self.bundles {
            let reader = self.registry.reader(bundle);
            let provided = match reader.read() {
                Ok(provided) => provided,
                Err(e) => {
                    warn!(bundle = %bundle, "Skipping bundle in environment: {}", e);
                    continue;
                }
            };

            for listing in provided.all_recipes() {
                match reader.describe(listing) {
                    Ok(descriptor) => descriptors.push(descriptor),
                    Err(e) => warn!(
                        bundle = %bundle,
                        recipe = %listing.name,
                        "Skipping undescribable recipe: {}",
                        e
                    ),
                }
            }
        }
        descriptors
    }
    fn unavailable_bundles(&self) -> Vec<(Bundle, String)> {
        self.bundles
            .iter()
            .filter_map(|bundle| match self.registry.reader(bundle).read() {
                Ok(_) => None,
                Err(e) => Some((bundle.clone(), e.to_string())),
            })
            .collect()
    }
}
