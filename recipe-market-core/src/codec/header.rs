//! Column roles of the tabular catalog format
//!
//! The header row is not fixed. Each header cell is matched case-insensitively
//! against the known roles; anything unrecognized is ignored so that newer
//! files with extra columns can still be read.

use once_cell::sync::Lazy;
use regex::Regex;

pub const NAME: &str = "name";
pub const DISPLAY_NAME: &str = "displayName";
pub const DESCRIPTION: &str = "description";
pub const ESTIMATED_EFFORT: &str = "estimatedEffortPerOccurrence";
pub const CATEGORY_PREFIX: &str = "category";
pub const ECOSYSTEM: &str = "ecosystem";
pub const PACKAGE_NAME: &str = "packageName";
pub const VERSION: &str = "version";
pub const TEAM: &str = "team";

static OPTION_COLUMN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^option(\d+)(name|displayname|description)$").unwrap());

/// Which part of an option an option column carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptionField {
    Name,
    DisplayName,
    Description,
}

impl OptionField {
    pub const ALL: [OptionField; 3] = [
        OptionField::Name,
        OptionField::DisplayName,
        OptionField::Description,
    ];

    fn suffix(self) -> &'static str {
        match self {
            OptionField::Name => "Name",
            OptionField::DisplayName => "DisplayName",
            OptionField::Description => "Description",
        }
    }
}

/// The role of one column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    DisplayName,
    Description,
    EstimatedEffort,
    /// Any `category*` column; only its position in the row matters
    Category,
    Ecosystem,
    PackageName,
    Version,
    Team,
    Option { index: usize, field: OptionField },
    Ignored,
}

impl Column {
    /// Classify a header cell
    pub fn classify(header: &str) -> Self {
        let lower = header.trim().to_lowercase();

        let exact = [
            (NAME, Column::Name),
            (DISPLAY_NAME, Column::DisplayName),
            (DESCRIPTION, Column::Description),
            (ESTIMATED_EFFORT, Column::EstimatedEffort),
            (ECOSYSTEM, Column::Ecosystem),
            (PACKAGE_NAME, Column::PackageName),
            (VERSION, Column::Version),
            (TEAM, Column::Team),
        ];
        if let Some((_, column)) = exact
            .iter()
            .find(|(label, _)| label.eq_ignore_ascii_case(&lower))
        {
            return *column;
        }

        if lower.starts_with(CATEGORY_PREFIX) {
            return Column::Category;
        }

        if let Some(captures) = OPTION_COLUMN.captures(&lower) {
            let field = match &captures[2] {
                "name" => OptionField::Name,
                "displayname" => OptionField::DisplayName,
                _ => OptionField::Description,
            };
            if let Ok(index) = captures[1].parse::<usize>() {
                return Column::Option { index, field };
            }
        }

        Column::Ignored
    }
}

/// Header label of the 1-based category column `position`
pub fn category_header(position: usize) -> String {
    format!("{CATEGORY_PREFIX}{position}")
}

/// Header label of one field of the 1-based option `position`
pub fn option_header(position: usize, field: OptionField) -> String {
    format!("option{position}{}", field.suffix())
}

#[cfg(test)]
mod header_tests {
    use super::*;

    #[test]
    fn test_classify_known_columns_case_insensitively() {
        assert_eq!(Column::classify("name"), Column::Name);
        assert_eq!(Column::classify("NAME"), Column::Name);
        assert_eq!(Column::classify(" displayname "), Column::DisplayName);
        assert_eq!(Column::classify("PackageName"), Column::PackageName);
        assert_eq!(
            Column::classify("estimatedEffortPerOccurrence"),
            Column::EstimatedEffort
        );
        assert_eq!(Column::classify("Team"), Column::Team);
    }

    #[test]
    fn test_any_category_prefix_is_a_category_column() {
        for header in ["category", "category1", "Category7", "categoryDeep", "CATEGORY_X"] {
            assert_eq!(Column::classify(header), Column::Category, "{header}");
        }
    }

    #[test]
    fn test_option_columns() {
        assert_eq!(
            Column::classify("option2DisplayName"),
            Column::Option {
                index: 2,
                field: OptionField::DisplayName
            }
        );
        assert_eq!(
            Column::classify("OPTION10NAME"),
            Column::Option {
                index: 10,
                field: OptionField::Name
            }
        );
        assert_eq!(Column::classify("optionName"), Column::Ignored);
        assert_eq!(Column::classify("option1Type"), Column::Ignored);
    }

    #[test]
    fn test_unknown_columns_are_ignored() {
        assert_eq!(Column::classify("tags"), Column::Ignored);
        assert_eq!(Column::classify(""), Column::Ignored);
    }

    #[test]
    fn test_generated_headers_classify_back() {
        assert_eq!(Column::classify(&category_header(3)), Column::Category);
        for field in OptionField::ALL {
            assert_eq!(
                Column::classify(&option_header(4, field)),
                Column::Option { index: 4, field }
            );
        }
    }
}
