//! Recipe Market library exports
//!
//! A recipe marketplace is a category tree of recipe listings. This crate
//! decodes and encodes it as delimited text, resolves the bundles listings
//! come from, validates catalogs and renders them as text.

pub mod bundle;
pub mod codec;
pub mod config;
pub mod environment;
pub mod error;
pub mod marketplace;
pub mod printer;
pub mod validator;

pub use error::{MarketplaceError, MarketplaceResult};
