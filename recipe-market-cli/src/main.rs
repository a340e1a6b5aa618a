//! Recipe Market - inspect, validate and normalize recipe marketplace catalogs

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use recipe_market_core::codec::Delimiter;
use recipe_market_core::config::MarketplaceConfig;
use recipe_market_core::printer::NameStyle;

mod marketplace_cli;

/// Log levels
#[derive(Debug, Clone, ValueEnum)]
enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_filter_directive(&self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Parser, Debug)]
#[clap(
    name = "recipe-market",
    about = "Inspect, validate and normalize recipe marketplace catalogs",
    version
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,

    /// Set log level
    #[clap(long, default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Emit logs as JSON lines
    #[clap(long, global = true)]
    json_logs: bool,

    /// Configuration file (defaults to $RECIPE_MARKET_CONFIG, then the user config directory)
    #[clap(long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print a catalog as a category tree
    Print {
        /// Catalog file
        catalog: PathBuf,

        /// Listing labels: name, display-name or both
        #[clap(long)]
        name_style: Option<NameStyle>,

        /// Hide categories without any recipe beneath them
        #[clap(long)]
        omit_empty: bool,

        /// Only print this category, e.g. "Java/Cleanup"
        #[clap(long, value_delimiter = '/')]
        category: Vec<String>,
    },

    /// List every recipe in a catalog
    List {
        /// Catalog file
        catalog: PathBuf,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Show one recipe
    Find {
        /// Catalog file
        catalog: PathBuf,

        /// Recipe name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Check display names and descriptions, and optionally completeness
    Validate {
        /// Catalog file
        catalog: PathBuf,

        /// YAML file listing the recipes that should be cataloged
        #[clap(long, conflicts_with = "resolve")]
        environment: Option<PathBuf>,

        /// Compare against what the catalog's own bundles provide
        #[clap(long)]
        resolve: bool,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },

    /// Rewrite a catalog in canonical form
    Normalize {
        /// Catalog file
        catalog: PathBuf,

        /// Write here instead of stdout
        #[clap(long, short)]
        output: Option<PathBuf>,

        /// Output delimiter: comma, tab or semicolon
        #[clap(long)]
        delimiter: Option<Delimiter>,
    },

    /// Resolve a recipe's bundle and describe the recipe
    Describe {
        /// Catalog file
        catalog: PathBuf,

        /// Recipe name
        name: String,

        /// Output as JSON
        #[clap(long)]
        json: bool,
    },
}

/// Initialize tracing with CLI flags
///
/// Logs always go to stderr so command output on stdout stays clean.
fn initialize_tracing(log_level: &LogLevel, json_logs: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(log_level.to_filter_directive()));

    if json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr)
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    initialize_tracing(&cli.log_level, cli.json_logs);

    let config = MarketplaceConfig::load(cli.config.as_deref())?;
    debug!(?config, "Effective configuration");

    match cli.command {
        Command::Print {
            catalog,
            name_style,
            omit_empty,
            category,
        } => {
            let mut options = config.printer_options();
            if let Some(style) = name_style {
                options.name_style = style;
            }
            options.omit_empty_categories |= omit_empty;
            marketplace_cli::print_command(&catalog, options, &category)
        }
        Command::List { catalog, json } => marketplace_cli::list_command(&catalog, json),
        Command::Find {
            catalog,
            name,
            json,
        } => marketplace_cli::find_command(&catalog, &name, json),
        Command::Validate {
            catalog,
            environment,
            resolve,
            json,
        } => marketplace_cli::validate_command(
            &config,
            &catalog,
            environment.as_deref(),
            resolve,
            json,
        ),
        Command::Normalize {
            catalog,
            output,
            delimiter,
        } => marketplace_cli::normalize_command(
            &catalog,
            output.as_deref(),
            delimiter.unwrap_or(config.delimiter),
        ),
        Command::Describe {
            catalog,
            name,
            json,
        } => marketplace_cli::describe_command(&config, &catalog, &name, json).await,
    }
}

#[cfg(test)]
mod cli_tests {
    use super::*;

    #[test]
    fn test_parse_print_with_category_path() {
        let cli = Cli::try_parse_from([
            "recipe-market",
            "print",
            "catalog.csv",
            "--name-style",
            "display-name",
            "--category",
            "Java/Cleanup",
        ])
        .unwrap();

        match cli.command {
            Command::Print {
                name_style,
                category,
                omit_empty,
                ..
            } => {
                assert_eq!(name_style, Some(NameStyle::DisplayName));
                assert_eq!(category, vec!["Java", "Cleanup"]);
                assert!(!omit_empty);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn test_parse_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "recipe-market",
            "normalize",
            "catalog.csv",
            "--delimiter",
            "tab",
            "--log-level",
            "debug",
            "--json-logs",
        ])
        .unwrap();

        assert!(cli.json_logs);
        assert!(matches!(cli.log_level, LogLevel::Debug));
        assert!(matches!(
            cli.command,
            Command::Normalize {
                delimiter: Some(Delimiter::Tab),
                ..
            }
        ));
    }

    #[test]
    fn test_environment_conflicts_with_resolve() {
        let result = Cli::try_parse_from([
            "recipe-market",
            "validate",
            "catalog.csv",
            "--environment",
            "env.yaml",
            "--resolve",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_delimiter_is_rejected() {
        let result = Cli::try_parse_from([
            "recipe-market",
            "normalize",
            "catalog.csv",
            "--delimiter",
            "pipe",
        ]);
        assert!(result.is_err());
    }
}
