//! Decoding delimited text into a marketplace

use std::collections::BTreeMap;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use super::header::{self, Column, OptionField};
use super::Delimiter;
use crate::bundle::{Bundle, BundleRegistry};
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::marketplace::{parse_effort, RecipeListing, RecipeMarketplace, RecipeOption};

/// Reads catalog files into a [`RecipeMarketplace`]
///
/// Bundle identities are built by the registry's loaders when a registry is
/// attached, otherwise directly from the identity columns.
#[derive(Default, Clone, Copy)]
pub struct MarketplaceReader<'a> {
    registry: Option<&'a BundleRegistry>,
}

impl<'a> MarketplaceReader<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build bundles through `registry`'s loaders
    pub fn with_registry(registry: &'a BundleRegistry) -> Self {
        Self {
            registry: Some(registry),
        }
    }

    /// Read a catalog file
    pub fn read_path(&self, path: &Path) -> MarketplaceResult<RecipeMarketplace> {
        let content = std::fs::read_to_string(path).map_err(|source| MarketplaceError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Read catalog file {}", path.display());
        self.read_str(&content)
    }

    /// Read a catalog from any byte source
    pub fn read<R: Read>(&self, mut source: R) -> MarketplaceResult<RecipeMarketplace> {
        let mut content = String::new();
        source
            .read_to_string(&mut content)
            .map_err(csv::Error::from)?;
        self.read_str(&content)
    }

    /// Read a catalog from text
    ///
    /// The delimiter is sniffed from the header line; `\n`, `\r\n` and `\r`
    /// line endings are all accepted.
    pub fn read_str(&self, content: &str) -> MarketplaceResult<RecipeMarketplace> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let delimiter = Delimiter::sniff(content);

        let mut csv_reader = csv::ReaderBuilder::new()
            .delimiter(delimiter.as_byte())
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        let mut records = csv_reader.records();
        let columns: Vec<Column> = match records.next() {
            Some(header) => header?.iter().map(Column::classify).collect(),
            None => return Ok(RecipeMarketplace::new()),
        };

        let mut marketplace = RecipeMarketplace::new();
        let mut rows = 0;

        for (offset, record) in records.enumerate() {
            let record = record?;
            let row = record
                .position()
                .map(|p| p.line() as usize)
                .unwrap_or(offset + 2);

            if is_separator(&record) {
                continue;
            }

            let (listing, category_path) = self.decode_row(&columns, &record, row)?;
            debug!(recipe = %listing.name, row, "Decoded catalog row");
            marketplace.install(listing, category_path.as_slice())?;
            rows += 1;
        }

        info!(
            "Decoded {} recipes from catalog ({:?}-delimited)",
            rows, delimiter
        );
        Ok(marketplace)
    }

    fn decode_row(
        &self,
        columns: &[Column],
        record: &csv::StringRecord,
        row: usize,
    ) -> MarketplaceResult<(RecipeListing, Vec<String>)> {
        let mut name = None;
        let mut display_name = None;
        let mut description = None;
        let mut effort = None;
        let mut ecosystem = None;
        let mut package_name = None;
        let mut version = None;
        let mut team = None;
        let mut categories = Vec::new();
        let mut options: BTreeMap<usize, RecipeOption> = BTreeMap::new();

        for (column, cell) in columns.iter().zip(record.iter()) {
            let value = cell.trim();
            if value.is_empty() {
                continue;
            }
            let value = value.to_string();

            match *column {
                Column::Name => name = Some(value),
                Column::DisplayName => display_name = Some(value),
                Column::Description => description = Some(value),
                Column::EstimatedEffort => effort = Some(parse_effort(&value)?),
                Column::Category => categories.push(value),
                Column::Ecosystem => ecosystem = Some(value),
                Column::PackageName => package_name = Some(value),
                Column::Version => version = Some(value),
                Column::Team => team = Some(value),
                Column::Option { index, field } => {
                    let option = options.entry(index).or_default();
                    match field {
                        OptionField::Name => option.name = Some(value),
                        OptionField::DisplayName => option.display_name = Some(value),
                        OptionField::Description => option.description = Some(value),
                    }
                }
                Column::Ignored => {}
            }
        }

        let name = required(name, header::NAME, row)?;
        let ecosystem = required(ecosystem, header::ECOSYSTEM, row)?;
        let package_name = required(package_name, header::PACKAGE_NAME, row)?;

        let bundle = match self.registry {
            Some(registry) => registry.load_bundle(
                &ecosystem,
                &package_name,
                version.as_deref(),
                team.as_deref(),
            ),
            None => {
                let mut bundle = Bundle::new(&ecosystem, package_name);
                bundle.version = version;
                bundle.team = team;
                bundle
            }
        };

        let listing = RecipeListing {
            display_name: display_name.unwrap_or_else(|| name.clone()),
            name,
            description: description.unwrap_or_default(),
            estimated_effort_per_occurrence: effort,
            options: flatten_options(options),
            bundle: Some(bundle),
        };

        // Category columns run from the nearest ancestor outwards
        categories.reverse();
        Ok((listing, categories))
    }
}

fn is_separator(record: &csv::StringRecord) -> bool {
    match record.len() {
        0 => true,
        1 => record.get(0).map_or(true, |cell| cell.trim().is_empty()),
        _ => false,
    }
}

/// Dense option list from the sparse per-index cells
///
/// Gaps below the highest populated index become empty options so later
/// options keep their positions.
fn flatten_options(mut options: BTreeMap<usize, RecipeOption>) -> Vec<RecipeOption> {
    let (Some(&first), Some(&last)) = (options.keys().next(), options.keys().next_back()) else {
        return Vec::new();
    };
    (first.min(1)..=last)
        .map(|index| options.remove(&index).unwrap_or_default())
        .collect()
}

fn required(value: Option<String>, column: &'static str, row: usize) -> MarketplaceResult<String> {
    value.ok_or(MarketplaceError::MissingRequiredField { column, row })
}
