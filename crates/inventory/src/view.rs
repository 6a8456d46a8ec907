//! Derived views over the collection: filters, category options, ordering.
//!
//! Nothing here mutates or caches. Every call walks the current items.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::item::Item;

/// Two independent case-insensitive substring filters, combined with AND.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewFilter {
    pub category: String,
    pub name: String,
}

impl ViewFilter {
    pub fn is_empty(&self) -> bool {
        self.category.is_empty() && self.name.is_empty()
    }

    pub fn matches(&self, item: &Item) -> bool {
        contains_ignore_case(item.category(), &self.category)
            && contains_ignore_case(item.name(), &self.name)
    }
}

/// View-level ordering applied after filtering.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortDirective {
    /// Stored order.
    #[default]
    None,
    QuantityAscending,
}

/// One displayed row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewRow<'a> {
    pub item: &'a Item,
    pub low_stock: bool,
}

/// Filter, then order, the given items.
pub fn derive_view<'a, I>(
    items: I,
    filter: &ViewFilter,
    sort: SortDirective,
    low_stock_threshold: u64,
) -> Vec<ViewRow<'a>>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut rows: Vec<ViewRow<'a>> = items
        .into_iter()
        .filter(|item| filter.matches(item))
        .map(|item| ViewRow {
            item,
            low_stock: item.is_low_stock(low_stock_threshold),
        })
        .collect();

    if sort == SortDirective::QuantityAscending {
        rows.sort_by_key(|row| row.item.quantity());
    }
    rows
}

/// Distinct categories in first-seen order.
pub fn category_list<'a, I>(items: I) -> Vec<&'a str>
where
    I: IntoIterator<Item = &'a Item>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .map(Item::category)
        .filter(|category| seen.insert(*category))
        .collect()
}

fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    needle.is_empty() || haystack.to_lowercase().contains(&needle.to_lowercase())
}
