//! Marketplace error types with clear, actionable messages

use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;

/// Errors raised while decoding, navigating or resolving a marketplace
#[derive(Error, Debug)]
pub enum MarketplaceError {
    /// A required column is absent from the header or blank in a data row
    #[error("Missing required value for column '{column}' on row {row}")]
    MissingRequiredField { column: &'static str, row: usize },

    /// An effort literal could not be parsed as an ISO-8601 duration
    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    /// A category path used the display name reserved for the root
    #[error("Category name '{0}' is reserved for the marketplace root")]
    ReservedCategoryName(String),

    /// Delimited text could not be read or written
    #[error("Delimited text error: {0}")]
    Csv(#[from] csv::Error),

    /// A file could not be read or written
    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A bundle manifest was not valid YAML
    #[error("Failed to parse bundle manifest {path}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },

    /// `describe`/`prepare` was called on a listing with unknown provenance.
    ///
    /// This is an integration error rather than a data error: whoever built
    /// the listing was expected to attach a bundle.
    #[error("Recipe '{recipe}' has no bundle attached; it cannot be described or prepared")]
    MissingBundle { recipe: String },

    /// No resolver is registered for the bundle's ecosystem
    #[error("No resolver registered for ecosystem '{0}'")]
    UnknownEcosystem(String),

    /// Resolution of a bundle failed earlier; the failure is surfaced on use
    #[error("Bundle {bundle} could not be resolved: {cause}")]
    UnresolvableBundle {
        bundle: String,
        cause: Arc<MarketplaceError>,
    },

    /// The bundle does not provide the requested recipe
    #[error("Bundle {bundle} does not provide recipe '{recipe}'")]
    UnknownRecipe { bundle: String, recipe: String },

    /// An option was supplied that the recipe does not declare
    #[error("Recipe '{recipe}' has no option named '{option}'")]
    UnknownOption { recipe: String, option: String },

    /// A required option was not supplied
    #[error("Recipe '{recipe}' requires option '{option}'")]
    MissingOption { recipe: String, option: String },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// A specialized Result type for marketplace operations.
pub type MarketplaceResult<T> = Result<T, MarketplaceError>;
