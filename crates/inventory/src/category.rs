//! Item categories and the category filter used by the derived view.

use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use stockroom_core::{DomainError, ValueObject};

/// Fixed category enumeration an item may belong to.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Category {
    Vegetable,
    Fruit,
    Dairy,
    Grain,
    Protein,
    Beverage,
    Snack,
    Condiment,
    Frozen,
    Other,
}

impl ValueObject for Category {}

impl Category {
    /// All categories, in display order.
    pub const ALL: [Category; 10] = [
        Category::Vegetable,
        Category::Fruit,
        Category::Dairy,
        Category::Grain,
        Category::Protein,
        Category::Beverage,
        Category::Snack,
        Category::Condiment,
        Category::Frozen,
        Category::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Category::Vegetable => "Vegetable",
            Category::Fruit => "Fruit",
            Category::Dairy => "Dairy",
            Category::Grain => "Grain",
            Category::Protein => "Protein",
            Category::Beverage => "Beverage",
            Category::Snack => "Snack",
            Category::Condiment => "Condiment",
            Category::Frozen => "Frozen",
            Category::Other => "Other",
        }
    }

    /// Parse an optional category from form/query text.
    ///
    /// Blank text means "no category".
    pub fn parse_optional(s: &str) -> Result<Option<Category>, DomainError> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(None);
        }
        s.parse().map(Some)
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Category::ALL
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| DomainError::validation(format!("unknown category '{s}'")))
    }
}

/// Category selection for the derived view.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CategoryFilter {
    /// Wildcard: every category (and uncategorised items) pass.
    #[default]
    All,
    Only(Category),
}

impl CategoryFilter {
    pub fn admits(self, category: Option<Category>) -> bool {
        match self {
            CategoryFilter::All => true,
            CategoryFilter::Only(wanted) => category == Some(wanted),
        }
    }
}

impl From<Option<Category>> for CategoryFilter {
    fn from(value: Option<Category>) -> Self {
        value.map_or(CategoryFilter::All, CategoryFilter::Only)
    }
}
