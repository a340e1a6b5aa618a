//! Encoding a marketplace as delimited text
//!
//! All rows share one header, so the widest category path and the longest
//! option list are measured over the whole tree first. Category columns are
//! right-aligned: `category1` is always the nearest ancestor, and a shallow
//! row leaves the far-ancestor columns blank.

use std::io::Write;
use std::path::Path;
use tracing::{debug, info};

use super::header::{self, OptionField};
use super::Delimiter;
use crate::error::{MarketplaceError, MarketplaceResult};
use crate::marketplace::{format_effort, Category, RecipeListing, RecipeOption};

/// One listing together with its category path, shallowest first
struct Row<'a> {
    path: Vec<&'a str>,
    listing: &'a RecipeListing,
}

/// Which optional columns the tree needs
#[derive(Debug, Default, PartialEq, Eq)]
struct Layout {
    max_category_depth: usize,
    max_options: usize,
    bundle: bool,
    version: bool,
    team: bool,
    effort: bool,
}

impl Layout {
    fn measure(rows: &[Row<'_>]) -> Self {
        let mut layout = Layout::default();
        for row in rows {
            layout.max_category_depth = layout.max_category_depth.max(row.path.len());
            layout.max_options = layout.max_options.max(row.listing.options.len());
            layout.effort |= row.listing.estimated_effort_per_occurrence.is_some();
            if let Some(bundle) = &row.listing.bundle {
                layout.bundle = true;
                layout.version |= bundle.version.is_some();
                layout.team |= bundle.team.is_some();
            }
        }
        layout
    }

    fn header(&self) -> Vec<String> {
        let mut header = Vec::new();
        if self.bundle {
            header.push(header::ECOSYSTEM.to_string());
            header.push(header::PACKAGE_NAME.to_string());
        }
        if self.version {
            header.push(header::VERSION.to_string());
        }
        header.push(header::NAME.to_string());
        header.push(header::DISPLAY_NAME.to_string());
        header.push(header::DESCRIPTION.to_string());
        if self.effort {
            header.push(header::ESTIMATED_EFFORT.to_string());
        }
        for position in 1..=self.max_category_depth {
            header.push(header::category_header(position));
        }
        for position in 1..=self.max_options {
            for field in OptionField::ALL {
                header.push(header::option_header(position, field));
            }
        }
        if self.team {
            header.push(header::TEAM.to_string());
        }
        header
    }

    fn cells(&self, row: &Row<'_>) -> Vec<String> {
        let listing = row.listing;
        let bundle = listing.bundle.as_ref();
        let mut cells = Vec::new();

        if self.bundle {
            cells.push(bundle.map(|b| b.ecosystem().to_string()).unwrap_or_default());
            cells.push(bundle.map(|b| b.package_name.clone()).unwrap_or_default());
        }
        if self.version {
            cells.push(bundle.and_then(|b| b.version.clone()).unwrap_or_default());
        }
        cells.push(listing.name.clone());
        cells.push(listing.display_name.clone());
        cells.push(listing.description.clone());
        if self.effort {
            cells.push(
                listing
                    .estimated_effort_per_occurrence
                    .as_ref()
                    .map(format_effort)
                    .unwrap_or_default(),
            );
        }

        // Nearest ancestor first; blanks pad the far end
        let mut nearest_first = row.path.iter().rev();
        for _ in 0..self.max_category_depth {
            cells.push(nearest_first.next().map(|s| s.to_string()).unwrap_or_default());
        }

        for position in 0..self.max_options {
            match listing.options.get(position) {
                Some(option) => cells.extend(option_cells(option)),
                None => cells.extend(std::iter::repeat(String::new()).take(3)),
            }
        }

        if self.team {
            cells.push(bundle.and_then(|b| b.team.clone()).unwrap_or_default());
        }
        cells
    }
}

fn option_cells(option: &RecipeOption) -> [String; 3] {
    [
        option.name.clone().unwrap_or_default(),
        option.display_name.clone().unwrap_or_default(),
        option.description.clone().unwrap_or_default(),
    ]
}

/// Pre-order walk: a category's own listings, then each child in order
fn collect_rows<'a>(category: &'a Category, path: &mut Vec<&'a str>, rows: &mut Vec<Row<'a>>) {
    for listing in category.recipes() {
        rows.push(Row {
            path: path.clone(),
            listing,
        });
    }
    for child in category.categories() {
        path.push(&child.display_name);
        collect_rows(child, path, rows);
        path.pop();
    }
}

/// Writes a category tree as a catalog file
#[derive(Debug, Default, Clone, Copy)]
pub struct MarketplaceWriter {
    delimiter: Delimiter,
}

impl MarketplaceWriter {
    /// Create a comma-delimited writer
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(delimiter: Delimiter) -> Self {
        Self { delimiter }
    }

    /// Encode `category` and everything beneath it
    ///
    /// When `category` is not the root its own name becomes the farthest
    /// category of every row, so the sub-tree decodes back under that name.
    pub fn write<W: Write>(&self, category: &Category, sink: W) -> MarketplaceResult<()> {
        let mut path = Vec::new();
        if !category.is_root() {
            path.push(category.display_name.as_str());
        }
        let mut rows = Vec::new();
        collect_rows(category, &mut path, &mut rows);

        let layout = Layout::measure(&rows);
        debug!(?layout, "Measured catalog layout");

        let mut csv_writer = csv::WriterBuilder::new()
            .delimiter(self.delimiter.as_byte())
            .terminator(csv::Terminator::Any(b'\n'))
            .flexible(false)
            .from_writer(sink);

        csv_writer.write_record(layout.header())?;
        for row in &rows {
            csv_writer.write_record(layout.cells(row))?;
        }
        csv_writer.flush().map_err(csv::Error::from)?;

        info!("Encoded {} recipes", rows.len());
        Ok(())
    }

    /// Encode into a string
    pub fn write_string(&self, category: &Category) -> MarketplaceResult<String> {
        let mut buffer = Vec::new();
        self.write(category, &mut buffer)?;
        String::from_utf8(buffer)
            .map_err(|e| MarketplaceError::Other(anyhow::anyhow!("encoded catalog is not UTF-8: {e}")))
    }

    /// Encode into a file
    pub fn write_path(&self, category: &Category, path: &Path) -> MarketplaceResult<()> {
        let content = self.write_string(category)?;
        std::fs::write(path, content).map_err(|source| MarketplaceError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}
