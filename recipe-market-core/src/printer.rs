//! Plain-text tree rendering of a marketplace
//!
//! ```text
//! ├── Java
//! │   ├── Cleanup
//! │   │   └── Remove unused imports (org.example.RemoveUnusedImports)
//! │   └── Upgrade to Java 17 (org.example.UpgradeJava17)
//! └── Format everything (org.example.FormatEverything)
//! ```
//!
//! Within a category, child categories come first and its own listings
//! after. Output is deterministic for a given tree and options.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Write as _};
use std::str::FromStr;

use crate::marketplace::{Category, RecipeListing};

const BRANCH: &str = "├── ";
const LAST_BRANCH: &str = "└── ";
const PIPE: &str = "│   ";
const BLANK: &str = "    ";

/// How listings are labelled
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum NameStyle {
    /// The canonical recipe name
    Name,
    /// The display name
    DisplayName,
    /// `Display name (name)`
    #[default]
    Both,
}

impl NameStyle {
    fn label(self, listing: &RecipeListing) -> String {
        match self {
            NameStyle::Name => listing.name.clone(),
            NameStyle::DisplayName => listing.display_name.clone(),
            NameStyle::Both => format!("{} ({})", listing.display_name, listing.name),
        }
    }
}

impl FromStr for NameStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace(['-', '_'], "").as_str() {
            "name" => Ok(NameStyle::Name),
            "displayname" => Ok(NameStyle::DisplayName),
            "both" => Ok(NameStyle::Both),
            _ => Err(format!(
                "Invalid name style: {s}. Expected name, display-name or both"
            )),
        }
    }
}

impl fmt::Display for NameStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            NameStyle::Name => "name",
            NameStyle::DisplayName => "display-name",
            NameStyle::Both => "both",
        })
    }
}

/// Rendering options
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct PrinterOptions {
    pub name_style: NameStyle,
    /// Hide categories with no listing anywhere beneath them
    pub omit_empty_categories: bool,
}

/// Renders category trees as text
#[derive(Debug, Default, Clone, Copy)]
pub struct MarketplacePrinter {
    options: PrinterOptions,
}

impl MarketplacePrinter {
    pub fn new(options: PrinterOptions) -> Self {
        Self { options }
    }

    /// Render `category` and everything beneath it
    ///
    /// The root's sentinel name is not printed; any other category starts
    /// with a line holding its own name.
    pub fn print(&self, category: &Category) -> String {
        let mut out = String::new();
        if !category.is_root() {
            out.push_str(&category.display_name);
            out.push('\n');
        }
        self.render_children(category, &mut Vec::new(), &mut out);
        out
    }

    fn is_visible(&self, category: &Category) -> bool {
        !self.options.omit_empty_categories || category.recipe_count() > 0
    }

    /// `last_at_depth[d]` records whether the ancestor at depth `d` was the
    /// last of its siblings, which decides between a pipe and blank indent
    fn render_children(&self, category: &Category, last_at_depth: &mut Vec<bool>, out: &mut String) {
        let categories: Vec<&Category> = category
            .categories()
            .iter()
            .filter(|child| self.is_visible(child))
            .collect();
        let total = categories.len() + category.recipes().len();

        for (i, child) in categories.iter().enumerate() {
            let is_last = i + 1 == total;
            self.line(last_at_depth, is_last, &child.display_name, out);
            last_at_depth.push(is_last);
            self.render_children(child, last_at_depth, out);
            last_at_depth.pop();
        }

        for (i, listing) in category.recipes().iter().enumerate() {
            let is_last = categories.len() + i + 1 == total;
            let label = self.options.name_style.label(listing);
            self.line(last_at_depth, is_last, &label, out);
        }
    }

    fn line(&self, last_at_depth: &[bool], is_last: bool, label: &str, out: &mut String) {
        for ancestor_was_last in last_at_depth {
            out.push_str(if *ancestor_was_last { BLANK } else { PIPE });
        }
        out.push_str(if is_last { LAST_BRANCH } else { BRANCH });
        // Writing to a String cannot fail
        let _ = writeln!(out, "{label}");
    }
}

#[cfg(test)]
mod printer_tests {
    use super::*;
    use crate::marketplace::RecipeMarketplace;
    use pretty_assertions::assert_eq;

    fn sample() -> RecipeMarketplace {
        let mut marketplace = RecipeMarketplace::new();
        marketplace
            .install(
                RecipeListing::new("org.example.RemoveUnusedImports")
                    .with_display_name("Remove unused imports"),
                &["Java", "Cleanup"],
            )
            .unwrap();
        marketplace
            .install(
                RecipeListing::new("org.example.UpgradeJava17")
                    .with_display_name("Upgrade to Java 17"),
                &["Java"],
            )
            .unwrap();
        marketplace
            .install(
                RecipeListing::new("org.example.FormatEverything")
                    .with_display_name("Format everything"),
                &[] as &[&str],
            )
            .unwrap();
        marketplace
            .root_mut()
            .add_category(Category::new("Python"))
            .unwrap();
        marketplace
    }

    #[test]
    fn test_print_root_with_both_names() {
        let printed = MarketplacePrinter::default().print(sample().root());
        assert_eq!(
            printed,
            "├── Java\n\
             │   ├── Cleanup\n\
             │   │   └── Remove unused imports (org.example.RemoveUnusedImports)\n\
             │   └── Upgrade to Java 17 (org.example.UpgradeJava17)\n\
             ├── Python\n\
             └── Format everything (org.example.FormatEverything)\n"
        );
    }

    #[test]
    fn test_omit_empty_categories_and_name_only() {
        let printer = MarketplacePrinter::new(PrinterOptions {
            name_style: NameStyle::Name,
            omit_empty_categories: true,
        });
        let marketplace = sample();
        let printed = printer.print(marketplace.root());
        assert_eq!(
            printed,
            "├── Java\n\
             │   ├── Cleanup\n\
             │   │   └── org.example.RemoveUnusedImports\n\
             │   └── org.example.UpgradeJava17\n\
             └── org.example.FormatEverything\n"
        );
        assert_eq!(marketplace.root().categories().len(), 2);
    }

    #[test]
    fn test_print_sub_tree_starts_with_its_name() {
        let printer = MarketplacePrinter::new(PrinterOptions {
            name_style: NameStyle::DisplayName,
            omit_empty_categories: false,
        });
        let marketplace = sample();
        let printed = printer.print(&marketplace.root().categories()[0]);
        assert_eq!(
            printed,
            "Java\n\
             ├── Cleanup\n\
             │   └── Remove unused imports\n\
             └── Upgrade to Java 17\n"
        );
    }

    #[test]
    fn test_last_category_uses_blank_indent() {
        let mut marketplace = RecipeMarketplace::new();
        marketplace
            .install(RecipeListing::new("a"), &["Outer", "Inner"])
            .unwrap();
        let printed = MarketplacePrinter::new(PrinterOptions {
            name_style: NameStyle::Name,
            omit_empty_categories: false,
        })
        .print(marketplace.root());
        assert_eq!(printed, "└── Outer\n    └── Inner\n        └── a\n");
    }

    #[test]
    fn test_empty_marketplace_prints_nothing() {
        assert_eq!(MarketplacePrinter::default().print(RecipeMarketplace::new().root()), "");
    }

    #[test]
    fn test_name_style_parsing() {
        assert_eq!("name".parse::<NameStyle>().unwrap(), NameStyle::Name);
        assert_eq!("display-name".parse::<NameStyle>().unwrap(), NameStyle::DisplayName);
        assert_eq!("displayName".parse::<NameStyle>().unwrap(), NameStyle::DisplayName);
        assert_eq!("BOTH".parse::<NameStyle>().unwrap(), NameStyle::Both);
        assert!("full".parse::<NameStyle>().is_err());
    }
}
