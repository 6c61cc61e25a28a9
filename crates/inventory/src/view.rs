//! Derived view: the filtered and ranked item list shown to the user.

use serde::{Deserialize, Serialize};

use crate::category::CategoryFilter;
use crate::item::InventoryItem;

/// Inputs of the derived view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewQuery {
    pub search: String,
    pub category: CategoryFilter,
}

impl ViewQuery {
    pub fn new(search: impl Into<String>, category: CategoryFilter) -> Self {
        Self {
            search: search.into(),
            category,
        }
    }
}

/// Filter and rank `items` for display.
///
/// Keeps items whose name contains the search text (case-insensitive) and
/// whose category passes the filter. Names that start with the search text
/// rank ahead of names that merely contain it; the sort is stable, so the
/// input order is otherwise preserved.
pub fn derive_view<'a, I>(items: I, query: &ViewQuery) -> Vec<InventoryItem>
where
    I: IntoIterator<Item = &'a InventoryItem>,
{
    let needle = query.search.to_lowercase();

    let mut ranked: Vec<(bool, &InventoryItem)> = items
        .into_iter()
        .filter(|item| query.category.admits(item.category))
        .filter_map(|item| {
            let haystack = item.name.as_str().to_lowercase();
            haystack
                .contains(&needle)
                .then(|| (haystack.starts_with(&needle), item))
        })
        .collect();

    ranked.sort_by_key(|(is_prefix, _)| !*is_prefix);
    ranked.into_iter().map(|(_, item)| item.clone()).collect()
}
