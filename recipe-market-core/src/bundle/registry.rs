//! Bundle registry
//!
//! Holds the loaders, resolvers and isolation factory for every supported
//! ecosystem, and memoizes resolved readers per bundle identity.

use once_cell::sync::OnceCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

use super::{
    Bundle, BundleLoader, BundleReader, BundleResolver, FailedBundleReader, FileBundleLoader,
    FileBundleResolver, IsolationFactory, NamespacedIsolationFactory,
};
use crate::error::MarketplaceError;

type ReaderCell = Arc<OnceCell<Arc<dyn BundleReader>>>;

/// Registry of bundle loaders and resolvers, keyed by canonical ecosystem
pub struct BundleRegistry {
    loaders: HashMap<String, Vec<Box<dyn BundleLoader>>>,
    resolvers: HashMap<String, Box<dyn BundleResolver>>,
    isolation: Box<dyn IsolationFactory>,
    readers: Mutex<HashMap<Bundle, ReaderCell>>,
}

impl Default for BundleRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl BundleRegistry {
    /// Create an empty registry using namespaced isolation
    pub fn new() -> Self {
        Self::with_isolation(Box::new(NamespacedIsolationFactory))
    }

    /// Create an empty registry with a custom isolation factory
    pub fn with_isolation(isolation: Box<dyn IsolationFactory>) -> Self {
        Self {
            loaders: HashMap::new(),
            resolvers: HashMap::new(),
            isolation,
            readers: Mutex::new(HashMap::new()),
        }
    }

    /// Create a registry with the built-in `file` ecosystem rooted at `file_root`
    pub fn with_file_ecosystem(file_root: impl Into<PathBuf>) -> Self {
        let mut registry = Self::new();
        registry.register_loader(Box::new(FileBundleLoader));
        registry.register_resolver(Box::new(FileBundleResolver::new(file_root)));
        registry
    }

    /// Add a loader; loaders of one ecosystem are tried in registration order
    pub fn register_loader(&mut self, loader: Box<dyn BundleLoader>) {
        let ecosystem = loader.ecosystem().to_lowercase();
        debug!(ecosystem = %ecosystem, "Registered bundle loader");
        self.loaders.entry(ecosystem).or_default().push(loader);
    }

    /// Set the resolver for an ecosystem, replacing any previous one
    pub fn register_resolver(&mut self, resolver: Box<dyn BundleResolver>) {
        let ecosystem = resolver.ecosystem().to_lowercase();
        if self.resolvers.insert(ecosystem.clone(), resolver).is_some() {
            warn!(ecosystem = %ecosystem, "Replaced existing bundle resolver");
        } else {
            debug!(ecosystem = %ecosystem, "Registered bundle resolver");
        }
    }

    /// Ecosystems that have a resolver, sorted
    pub fn ecosystems(&self) -> Vec<&str> {
        let mut ecosystems: Vec<&str> = self.resolvers.keys().map(String::as_str).collect();
        ecosystems.sort_unstable();
        ecosystems
    }

    /// Build a bundle identity
    ///
    /// The loaders registered for the ecosystem are asked in order; the first
    /// that can handle the combination wins. Without a willing loader the plain
    /// identity value is returned.
    pub fn load_bundle(
        &self,
        ecosystem: &str,
        package_name: &str,
        version: Option<&str>,
        team: Option<&str>,
    ) -> Bundle {
        let canonical = ecosystem.to_lowercase();
        if let Some(loaders) = self.loaders.get(&canonical) {
            if let Some(bundle) = loaders
                .iter()
                .find_map(|loader| loader.load(package_name, version, team))
            {
                return bundle;
            }
        }

        let mut bundle = Bundle::new(&canonical, package_name);
        bundle.version = version.map(str::to_string);
        bundle.team = team.map(str::to_string);
        bundle
    }

    /// The reader for `bundle`, resolving it on first request
    ///
    /// Never fails here: a resolution error (or an ecosystem without a
    /// resolver) produces a [`FailedBundleReader`] whose capability methods
    /// return the error. Concurrent callers for the same identity share one
    /// resolution.
    pub fn reader(&self, bundle: &Bundle) -> Arc<dyn BundleReader> {
        let cell = {
            let mut readers = self.readers.lock().unwrap_or_else(|e| e.into_inner());
            Arc::clone(readers.entry(bundle.clone()).or_default())
        };

        Arc::clone(cell.get_or_init(|| self.resolve_uncached(bundle)))
    }

    /// Resolve on the blocking thread pool
    pub async fn reader_async(self: Arc<Self>, bundle: Bundle) -> Arc<dyn BundleReader> {
        let fallback = bundle.clone();
        match tokio::task::spawn_blocking(move || self.reader(&bundle)).await {
            Ok(reader) => reader,
            Err(e) => {
                warn!(bundle = %fallback, "Bundle resolution task failed: {}", e);
                Arc::new(FailedBundleReader::new(
                    fallback,
                    MarketplaceError::Other(anyhow::anyhow!("resolution task failed: {e}")),
                ))
            }
        }
    }

    /// Number of bundle identities resolved so far (including failures)
    pub fn resolved_count(&self) -> usize {
        let readers = self.readers.lock().unwrap_or_else(|e| e.into_inner());
        readers.values().filter(|cell| cell.get().is_some()).count()
    }

    fn resolve_uncached(&self, bundle: &Bundle) -> Arc<dyn BundleReader> {
        let Some(resolver) = self.resolvers.get(bundle.ecosystem()) else {
            warn!(bundle = %bundle, "No resolver for ecosystem");
            return Arc::new(FailedBundleReader::new(
                bundle.clone(),
                MarketplaceError::UnknownEcosystem(bundle.ecosystem().to_string()),
            ));
        };

        match resolver.resolve(bundle, self.isolation.as_ref()) {
            Ok(reader) => {
                info!(bundle = %bundle, "Resolved bundle");
                reader
            }
            Err(e) => {
                warn!(bundle = %bundle, "Failed to resolve bundle: {}", e);
                Arc::new(FailedBundleReader::new(bundle.clone(), e))
            }
        }
    }
}
