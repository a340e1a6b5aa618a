//! The plain file-based ecosystem
//!
//! A `file` bundle's package name is the path of a YAML manifest listing the
//! recipes it provides. Relative paths are resolved against the resolver's
//! root directory. The manifest is read when the bundle is first resolved.
//!
//! ```yaml
//! recipes:
//!   - name: org.example.Foo
//!     displayName: Foo
//!     description: Does foo.
//!     categories: [Java, Cleanup]
//!     options:
//!       - name: style
//!         required: true
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use super::{
    Bundle, BundleLoader, BundleReader, BundleResolver, IsolationContext, IsolationFactory,
    PreparedRecipe, RecipeDescriptor,
};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::marketplace::{RecipeListing, RecipeMarketplace};

/// Ecosystem tag of file-based bundles
pub const FILE_ECOSYSTEM: &str = "file";

/// A bundle manifest file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundleManifest {
    #[serde(default)]
    pub recipes: Vec<RecipeDescriptor>,
}

impl BundleManifest {
    /// Parse a manifest from YAML
    pub fn from_yaml(content: &str, path: &Path) -> MarketplaceResult<Self> {
        serde_yaml_ng::from_str(content).map_err(|source| MarketplaceError::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a manifest file
    pub fn from_path(path: &Path) -> MarketplaceResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketplaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml(&content, path)
    }
}

/// Loader for `file` bundles; only handles `.yaml` / `.yml` manifests
///
/// Leading `./` segments are dropped so `./java.yaml` and `java.yaml` name
/// the same bundle.
#[derive(Debug, Default, Clone, Copy)]
pub struct FileBundleLoader;

impl BundleLoader for FileBundleLoader {
    fn ecosystem(&self) -> &str {
        FILE_ECOSYSTEM
    }

    fn load(
        &self,
        package_name: &str,
        version: Option<&str>,
        team: Option<&str>,
    ) -> Option<Bundle> {
        let extension = Path::new(package_name).extension()?.to_str()?;
        if !matches!(extension, "yaml" | "yml") {
            return None;
        }

        let package_name = package_name.trim_start_matches("./");
        let mut bundle = Bundle::new(FILE_ECOSYSTEM, package_name);
        bundle.version = version.map(str::to_string);
        bundle.team = team.map(str::to_string);
        Some(bundle)
    }
}

/// Resolver for `file` bundles
#[derive(Debug, Clone)]
pub struct FileBundleResolver {
    root: PathBuf,
}

impl FileBundleResolver {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Where the manifest of `bundle` lives
    pub fn manifest_path(&self, bundle: &Bundle) -> PathBuf {
        let package = Path::new(&bundle.package_name);
        if package.is_absolute() {
            package.to_path_buf()
        } else {
            self.root.join(package)
        }
    }
}

impl BundleResolver for FileBundleResolver {
    fn ecosystem(&self) -> &str {
        FILE_ECOSYSTEM
    }

    fn resolve(
        &self,
        bundle: &Bundle,
        isolation: &dyn IsolationFactory,
    ) -> MarketplaceResult<Arc<dyn BundleReader>> {
        let path = self.manifest_path(bundle);
        debug!(bundle = %bundle, path = %path.display(), "Reading bundle manifest");

        let manifest = BundleManifest::from_path(&path)?;
        let context = isolation.create(bundle, None);
        Ok(Arc::new(FileBundleReader::new(bundle.clone(), manifest, context)))
    }
}

/// Reader over a parsed bundle manifest
///
/// Each recipe descriptor is defined in the bundle's isolation context under
/// its recipe name; lookups go through that namespace.
#[derive(Debug)]
pub struct FileBundleReader {
    bundle: Bundle,
    manifest: BundleManifest,
    context: Arc<IsolationContext>,
}

impl FileBundleReader {
    pub fn new(bundle: Bundle, manifest: BundleManifest, context: Arc<IsolationContext>) -> Self {
        for descriptor in &manifest.recipes {
            context.define(descriptor.name.clone(), Arc::new(descriptor.clone()));
        }
        Self {
            bundle,
            manifest,
            context,
        }
    }

    fn descriptor(&self, name: &str) -> MarketplaceResult<Arc<RecipeDescriptor>> {
        self.context
            .lookup_as::<RecipeDescriptor>(name)
            .ok_or_else(|| MarketplaceError::UnknownRecipe {
                bundle: self.bundle.to_string(),
                recipe: name.to_string(),
            })
    }
}

impl BundleReader for FileBundleReader {
    fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    fn read(&self) -> MarketplaceResult<RecipeMarketplace> {
        let mut marketplace = RecipeMarketplace::new();
        for descriptor in &self.manifest.recipes {
            let listing = descriptor.to_listing(Some(self.bundle.clone()))?;
            marketplace.install(listing, descriptor.categories.as_slice())?;
        }
        Ok(marketplace)
    }

    fn describe(&self, listing: &RecipeListing) -> MarketplaceResult<RecipeDescriptor> {
        self.descriptor(&listing.name).map(|d| (*d).clone())
    }

    fn prepare(
        &self,
        listing: &RecipeListing,
        options: &BTreeMap<String, String>,
    ) -> MarketplaceResult<PreparedRecipe> {
        let descriptor = self.descriptor(&listing.name)?;

        if let Some(unknown) = options
            .keys()
            .find(|key| !descriptor.options.iter().any(|o| &o.name == *key))
        {
            return Err(MarketplaceError::UnknownOption {
                recipe: descriptor.name.clone(),
                option: unknown.clone(),
            });
        }

        if let Some(missing) = descriptor
            .options
            .iter()
            .find(|o| o.required && !options.contains_key(&o.name))
        {
            return Err(MarketplaceError::MissingOption {
                recipe: descriptor.name.clone(),
                option: missing.name.clone(),
            });
        }

        Ok(PreparedRecipe {
            descriptor: (*descriptor).clone(),
            options: options.clone(),
            bundle: self.bundle.clone(),
            context: Arc::clone(&self.context),
        })
    }

    fn isolation(&self) -> MarketplaceResult<Arc<IsolationContext>> {
        Ok(Arc::clone(&self.context))
    }
}
