//! Ordered item collection with unique ids.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use stocktrack_core::{DomainError, DomainResult, Entity};

use crate::item::{Item, ItemId};

/// The authoritative ordered list of items.
///
/// Order is insertion order until [`Collection::sort_by_quantity`] reorders it.
/// Lookups are linear; the collection is meant for a single screen of items.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection {
    items: Vec<Item>,
}

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a list, rejecting duplicate ids.
    pub fn from_items(items: Vec<Item>) -> DomainResult<Self> {
        let mut seen = HashSet::with_capacity(items.len());
        for item in &items {
            if !seen.insert(*item.id()) {
                return Err(DomainError::invariant(format!("duplicate item id {}", item.id())));
            }
        }
        Ok(Self { items })
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn as_slice(&self) -> &[Item] {
        &self.items
    }

    pub fn iter(&self) -> core::slice::Iter<'_, Item> {
        self.items.iter()
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.position(id).is_some()
    }

    pub fn position(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| *item.id() == id)
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.items.iter().find(|item| *item.id() == id)
    }

    /// Append at the end. Fails if the id is already present.
    pub fn push(&mut self, item: Item) -> DomainResult<()> {
        if self.contains(*item.id()) {
            return Err(DomainError::conflict(format!("item {} already exists", item.id())));
        }
        self.items.push(item);
        Ok(())
    }

    /// Replace the item carrying the same id, keeping its position.
    ///
    /// Returns the previous value, or `None` (and changes nothing) when the id
    /// is unknown.
    pub fn replace(&mut self, item: Item) -> Option<Item> {
        let idx = self.position(*item.id())?;
        Some(core::mem::replace(&mut self.items[idx], item))
    }

    pub fn remove(&mut self, id: ItemId) -> Option<Item> {
        let idx = self.position(id)?;
        Some(self.items.remove(idx))
    }

    /// Stable ascending sort by quantity; ties keep their relative order.
    pub fn sort_by_quantity(&mut self) {
        self.items.sort_by_key(Item::quantity);
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Item;
    type IntoIter = core::slice::Iter<'a, Item>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::Draft;
    use stocktrack_core::AggregateId;

    fn item(n: u128, name: &str, qty: u64) -> Item {
        Item::from_draft(ItemId::new(AggregateId::from_u128(n)), &Draft::new(name, "Misc", qty))
    }

    fn names(c: &Collection) -> Vec<&str> {
        c.iter().map(Item::name).collect()
    }

    #[test]
    fn push_rejects_duplicate_ids() {
        let mut c = Collection::new();
        c.push(item(1, "a", 1)).unwrap();
        let err = c.push(item(1, "b", 2)).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert_eq!(c.len(), 1);
    }

    #[test]
    fn replace_keeps_position() {
        let mut c = Collection::from_items(vec![item(1, "a", 1), item(2, "b", 2), item(3, "c", 3)]).unwrap();
        let old = c.replace(item(2, "B", 20)).unwrap();
        assert_eq!(old.name(), "b");
        assert_eq!(names(&c), vec!["a", "B", "c"]);
    }

    #[test]
    fn replace_and_remove_of_unknown_id_change_nothing() {
        let mut c = Collection::from_items(vec![item(1, "a", 1)]).unwrap();
        let before = c.clone();
        assert!(c.replace(item(9, "x", 1)).is_none());
        assert!(c.remove(ItemId::new(AggregateId::from_u128(9))).is_none());
        assert_eq!(c, before);
    }

    #[test]
    fn sort_is_stable_for_ties() {
        let mut c = Collection::from_items(vec![
            item(1, "first-five", 5),
            item(2, "one", 1),
            item(3, "second-five", 5),
        ])
        .unwrap();
        c.sort_by_quantity();
        assert_eq!(names(&c), vec!["one", "first-five", "second-five"]);
    }

    #[test]
    fn from_items_rejects_duplicates() {
        let err = Collection::from_items(vec![item(1, "a", 1), item(1, "a", 1)]).unwrap_err();
        assert!(matches!(err, DomainError::InvariantViolation(_)));
    }
}
