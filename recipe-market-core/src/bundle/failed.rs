//! Reader standing in for a bundle whose resolution failed

use std::collections::BTreeMap;
use std::sync::Arc;

use super::{Bundle, BundleReader, IsolationContext, PreparedRecipe, RecipeDescriptor};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::marketplace::{RecipeListing, RecipeMarketplace};

/// A reader that holds a captured resolution error
///
/// Construction never fails. Every capability method returns
/// [`MarketplaceError::UnresolvableBundle`] wrapping the original cause.
#[derive(Debug, Clone)]
pub struct FailedBundleReader {
    bundle: Bundle,
    cause: Arc<MarketplaceError>,
}

impl FailedBundleReader {
    pub fn new(bundle: Bundle, cause: MarketplaceError) -> Self {
        Self {
            bundle,
            cause: Arc::new(cause),
        }
    }

    /// The error captured at resolution time
    pub fn cause(&self) -> &MarketplaceError {
        &self.cause
    }

    fn error(&self) -> MarketplaceError {
        MarketplaceError::UnresolvableBundle {
            bundle: self.bundle.to_string(),
            cause: Arc::clone(&self.cause),
        }
    }
}

impl BundleReader for FailedBundleReader {
    fn bundle(&self) -> &Bundle {
        &self.bundle
    }

    fn read(&self) -> MarketplaceResult<RecipeMarketplace> {
        Err(self.error())
    }

    fn describe(&self, _listing: &RecipeListing) -> MarketplaceResult<RecipeDescriptor> {
        Err(self.error())
    }

    fn prepare(
        &self,
        _listing: &RecipeListing,
        _options: &BTreeMap<String, String>,
    ) -> MarketplaceResult<PreparedRecipe> {
        Err(self.error())
    }

    fn isolation(&self) -> MarketplaceResult<Arc<IsolationContext>> {
        Err(self.error())
    }
}
