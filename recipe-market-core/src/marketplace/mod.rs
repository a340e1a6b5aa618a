//! Recipe Marketplace - the category tree of recipe listings
//!
//! A marketplace is a tree of [`Category`] nodes hanging off a single
//! sentinel root. Each category owns its child categories and the
//! [`RecipeListing`]s filed directly beneath it.
//!
//! # Overview
//!
//! ```text
//! <root>
//!   ├── Java
//!   │     ├── Cleanup
//!   │     │     └── org.example.RemoveUnusedImports
//!   │     └── org.example.UpgradeJava17
//!   └── org.example.FormatEverything
//! ```
//!
//! Child and listing order is insertion order. It is significant: the tabular
//! codec writes rows in that order and the printer renders in that order.

mod effort;
mod listing;

pub use effort::{format_effort, parse_effort};
pub use listing::{RecipeListing, RecipeOption};

use tracing::debug;

use crate::error::{MarketplaceError, MarketplaceResult};

/// Display name reserved for the root category
pub const ROOT_CATEGORY: &str = "<root>";

/// A node in the marketplace tree
#[derive(Debug, Clone, PartialEq)]
pub struct Category {
    /// Human-readable category name; also the path segment used by `install`
    pub display_name: String,

    /// Free-form description (empty when absent)
    pub description: String,

    categories: Vec<Category>,
    recipes: Vec<RecipeListing>,
}

impl Category {
    /// Create an empty, non-root category
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            description: String::new(),
            categories: Vec::new(),
            recipes: Vec::new(),
        }
    }

    /// Create the sentinel root category
    pub fn root() -> Self {
        Self::new(ROOT_CATEGORY)
    }

    /// Set the description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Whether this node is the marketplace root
    pub fn is_root(&self) -> bool {
        self.display_name == ROOT_CATEGORY
    }

    /// Child categories in insertion order
    pub fn categories(&self) -> &[Category] {
        &self.categories
    }

    /// Listings filed directly under this category, in insertion order
    pub fn recipes(&self) -> &[RecipeListing] {
        &self.recipes
    }

    /// Append a child category
    pub fn add_category(&mut self, category: Category) -> MarketplaceResult<&mut Category> {
        if category.is_root() {
            return Err(MarketplaceError::ReservedCategoryName(category.display_name));
        }
        self.categories.push(category);
        let last = self.categories.len() - 1;
        Ok(&mut self.categories[last])
    }

    /// File `listing` under the category reached by `category_path`
    ///
    /// `category_path` runs from the shallowest category to the deepest. At
    /// each level the first child with exactly the same name is followed, and
    /// a new child is appended when none exists. An empty path files the
    /// listing directly under `self`.
    pub fn install<S: AsRef<str>>(
        &mut self,
        listing: RecipeListing,
        category_path: &[S],
    ) -> MarketplaceResult<()> {
        if let Some(reserved) = category_path
            .iter()
            .map(AsRef::as_ref)
            .find(|segment| *segment == ROOT_CATEGORY)
        {
            return Err(MarketplaceError::ReservedCategoryName(reserved.to_string()));
        }

        let mut node = self;
        for segment in category_path.iter().map(AsRef::as_ref) {
            let position = match node
                .categories
                .iter()
                .position(|child| child.display_name == segment)
            {
                Some(position) => position,
                None => {
                    debug!(category = segment, parent = %node.display_name, "Creating category");
                    node.categories.push(Category::new(segment));
                    node.categories.len() - 1
                }
            };
            node = &mut node.categories[position];
        }

        node.recipes.push(listing);
        Ok(())
    }

    /// Find a listing by name
    ///
    /// Searches depth-first, pre-order: a category's own listings are checked
    /// before its children, children in order. When the same name is filed in
    /// more than one place the first match in that order is returned.
    pub fn find_recipe(&self, name: &str) -> Option<&RecipeListing> {
        self.recipes
            .iter()
            .find(|listing| listing.name == name)
            .or_else(|| {
                self.categories
                    .iter()
                    .find_map(|child| child.find_recipe(name))
            })
    }

    /// Navigate to a descendant category by a shallow-to-deep path
    pub fn find_category<S: AsRef<str>>(&self, path: &[S]) -> Option<&Category> {
        path.iter().try_fold(self, |node, segment| {
            node.categories
                .iter()
                .find(|child| child.display_name == segment.as_ref())
        })
    }

    /// Every listing in this sub-tree; order carries no meaning
    pub fn all_recipes(&self) -> Vec<&RecipeListing> {
        let mut out = Vec::new();
        self.collect_recipes(&mut out);
        out
    }

    fn collect_recipes<'a>(&'a self, out: &mut Vec<&'a RecipeListing>) {
        out.extend(self.recipes.iter());
        for child in &self.categories {
            child.collect_recipes(out);
        }
    }

    /// Number of listings in this sub-tree
    pub fn recipe_count(&self) -> usize {
        self.recipes.len()
            + self
                .categories
                .iter()
                .map(Category::recipe_count)
                .sum::<usize>()
    }
}

/// A full marketplace: the root category and everything beneath it
#[derive(Debug, Clone, PartialEq)]
pub struct RecipeMarketplace {
    root: Category,
}

impl Default for RecipeMarketplace {
    fn default() -> Self {
        Self {
            root: Category::root(),
        }
    }
}

impl RecipeMarketplace {
    /// Create an empty marketplace
    pub fn new() -> Self {
        Self::default()
    }

    /// The root category
    pub fn root(&self) -> &Category {
        &self.root
    }

    /// Mutable access to the root category
    pub fn root_mut(&mut self) -> &mut Category {
        &mut self.root
    }

    /// File `listing` under `category_path` (shallowest first)
    pub fn install<S: AsRef<str>>(
        &mut self,
        listing: RecipeListing,
        category_path: &[S],
    ) -> MarketplaceResult<()> {
        self.root.install(listing, category_path)
    }

    /// Find a listing by name (first pre-order match)
    pub fn find_recipe(&self, name: &str) -> Option<&RecipeListing> {
        self.root.find_recipe(name)
    }

    /// Every listing in the marketplace; order carries no meaning
    pub fn all_recipes(&self) -> Vec<&RecipeListing> {
        self.root.all_recipes()
    }

    /// Number of listings in the marketplace
    pub fn recipe_count(&self) -> usize {
        self.root.recipe_count()
    }
}
