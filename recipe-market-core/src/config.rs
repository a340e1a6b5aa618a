//! User configuration
//!
//! Resolution order:
//! 1. An explicit path (the CLI's `--config`)
//! 2. `$RECIPE_MARKET_CONFIG`
//! 3. `config.yaml` in the platform config directory
//!
//! A configuration file that does not exist yields the defaults; one that
//! exists but cannot be parsed is an error.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::bundle::BundleRegistry;
use crate::codec::Delimiter;
use crate::printer::{NameStyle, PrinterOptions};

/// Environment variable naming a configuration file
pub const CONFIG_ENV_VAR: &str = "RECIPE_MARKET_CONFIG";

const CONFIG_FILE_NAME: &str = "config.yaml";

/// Settings shared by every command
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MarketplaceConfig {
    /// Delimiter used when encoding
    pub delimiter: Delimiter,

    /// Default listing label style for printing
    pub name_style: NameStyle,

    /// Hide empty categories when printing
    pub omit_empty_categories: bool,

    /// Base directory for relative `file` bundle manifests
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_root: Option<PathBuf>,
}

impl MarketplaceConfig {
    /// Load configuration following the resolution order
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::load_from_path(path);
        }

        if let Ok(path) = std::env::var(CONFIG_ENV_VAR) {
            debug!("Using {} = {}", CONFIG_ENV_VAR, path);
            return Self::load_from_path(Path::new(&path));
        }

        match Self::default_config_path() {
            Some(path) => Self::load_from_path(&path),
            None => {
                debug!("No platform config directory, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load from `path`, or defaults when it does not exist
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            debug!("No configuration at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    /// Parse configuration YAML; an empty document yields the defaults
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml_ng::from_str(content).context("Invalid configuration")
    }

    /// Where the configuration lives when nothing else is specified
    pub fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "recipe-market")
            .map(|dirs| dirs.config_dir().to_path_buf())
            .or_else(|| dirs::config_dir().map(|d| d.join("recipe-market")))
            .map(|dir| dir.join(CONFIG_FILE_NAME))
    }

    /// Printer options from the configured defaults
    pub fn printer_options(&self) -> PrinterOptions {
        PrinterOptions {
            name_style: self.name_style,
            omit_empty_categories: self.omit_empty_categories,
        }
    }

    /// A registry with the `file` ecosystem rooted at `file_root`, or at
    /// `fallback` when no root is configured
    pub fn registry(&self, fallback: &Path) -> BundleRegistry {
        let root = self
            .file_root
            .clone()
            .unwrap_or_else(|| fallback.to_path_buf());
        BundleRegistry::with_file_ecosystem(root)
    }
}

#[cfg(test)]
mod config_tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serial_test::serial;
    use tempfile::TempDir;

    #[test]
    fn test_parse_full_config() {
        let config = MarketplaceConfig::from_yaml(
            "delimiter: tab\nnameStyle: displayName\nomitEmptyCategories: true\nfileRoot: /srv/bundles\n",
        )
        .unwrap();

        assert_eq!(
            config,
            MarketplaceConfig {
                delimiter: Delimiter::Tab,
                name_style: NameStyle::DisplayName,
                omit_empty_categories: true,
                file_root: Some(PathBuf::from("/srv/bundles")),
            }
        );
    }

    #[test]
    fn test_partial_and_empty_configs_use_defaults() {
        let partial = MarketplaceConfig::from_yaml("omitEmptyCategories: true\n").unwrap();
        assert_eq!(partial.delimiter, Delimiter::Comma);
        assert_eq!(partial.name_style, NameStyle::Both);
        assert!(partial.omit_empty_categories);

        assert_eq!(
            MarketplaceConfig::from_yaml("").unwrap(),
            MarketplaceConfig::default()
        );
    }

    #[test]
    fn test_invalid_config_is_an_error() {
        assert!(MarketplaceConfig::from_yaml("delimiter: pipe\n").is_err());
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let config =
            MarketplaceConfig::load_from_path(&temp_dir.path().join("missing.yaml")).unwrap();
        assert_eq!(config, MarketplaceConfig::default());
    }

    #[test]
    #[serial]
    fn test_explicit_path_wins_over_env() {
        let temp_dir = TempDir::new().unwrap();
        let explicit = temp_dir.path().join("explicit.yaml");
        let from_env = temp_dir.path().join("env.yaml");
        std::fs::write(&explicit, "delimiter: semicolon\n").unwrap();
        std::fs::write(&from_env, "delimiter: tab\n").unwrap();

        std::env::set_var(CONFIG_ENV_VAR, &from_env);
        let config = MarketplaceConfig::load(Some(&explicit)).unwrap();
        let env_config = MarketplaceConfig::load(None).unwrap();
        std::env::remove_var(CONFIG_ENV_VAR);

        assert_eq!(config.delimiter, Delimiter::Semicolon);
        assert_eq!(env_config.delimiter, Delimiter::Tab);
    }

    #[test]
    fn test_printer_options_and_registry() {
        let config = MarketplaceConfig {
            name_style: NameStyle::Name,
            omit_empty_categories: true,
            ..MarketplaceConfig::default()
        };
        assert_eq!(
            config.printer_options(),
            PrinterOptions {
                name_style: NameStyle::Name,
                omit_empty_categories: true,
            }
        );
        assert_eq!(config.registry(Path::new(".")).ecosystems(), vec!["file"]);
    }
}
