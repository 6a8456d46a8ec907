use serde::{Deserialize, Serialize};

use stocktrack_core::{AggregateId, DomainError, DomainResult, Entity, ValueObject};

/// Inventory item identifier.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub AggregateId);

impl ItemId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for ItemId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

impl core::str::FromStr for ItemId {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse::<AggregateId>().map(Self)
    }
}

/// One inventory record.
///
/// Items are never patched field by field: an edit builds a fresh `Item`
/// from the original id and a [`Draft`], then replaces the stored one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    id: ItemId,
    name: String,
    category: String,
    quantity: u64,
}

impl Item {
    /// Attach an identity to a draft.
    pub fn from_draft(id: ItemId, draft: &Draft) -> Self {
        Self {
            id,
            name: draft.name.clone(),
            category: draft.category.clone(),
            quantity: draft.quantity,
        }
    }

    pub fn id_typed(&self) -> ItemId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn quantity(&self) -> u64 {
        self.quantity
    }

    /// Rows below `threshold` units are flagged as low stock.
    pub fn is_low_stock(&self, threshold: u64) -> bool {
        self.quantity < threshold
    }
}

impl Entity for Item {
    type Id = ItemId;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Committed-ready form values: everything an [`Item`] has except its id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub name: String,
    pub category: String,
    pub quantity: u64,
}

impl Draft {
    pub fn new(name: impl Into<String>, category: impl Into<String>, quantity: u64) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            quantity,
        }
    }

    /// Pre-populate a draft from an existing item (edit path).
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name.clone(),
            category: item.category.clone(),
            quantity: item.quantity,
        }
    }

    /// Presence check for the text fields. Quantity is type-enforced.
    pub fn validate(&self) -> DomainResult<()> {
        if self.name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::missing("category"));
        }
        Ok(())
    }
}

impl ValueObject for Draft {}

/// Source of fresh item identities.
pub trait ItemIdGenerator: Send + core::fmt::Debug {
    fn next_id(&mut self) -> ItemId;

    /// Note an id that entered the collection from elsewhere (e.g. a load),
    /// so `next_id` never hands it out again.
    fn observe(&mut self, _id: ItemId) {}
}

/// Time-ordered UUIDv7 ids with a random tail; safe under rapid successive adds.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidV7Ids;

impl ItemIdGenerator for UuidV7Ids {
    fn next_id(&mut self) -> ItemId {
        ItemId::new(AggregateId::new())
    }
}

/// Monotonic counter ids, starting at 1. Deterministic.
#[derive(Debug, Clone)]
pub struct SequentialIds {
    next: u128,
}

impl SequentialIds {
    pub fn new() -> Self {
        Self::starting_at(1)
    }

    pub fn starting_at(first: u128) -> Self {
        Self { next: first }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::new()
    }
}

impl ItemIdGenerator for SequentialIds {
    fn next_id(&mut self) -> ItemId {
        let id = ItemId::new(AggregateId::from_u128(self.next));
        self.next += 1;
        id
    }

    fn observe(&mut self, id: ItemId) {
        let seen = id.0.as_uuid().as_u128();
        if seen >= self.next {
            self.next = seen.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn from_draft_copies_every_field() {
        let id = ItemId::new(AggregateId::from_u128(9));
        let item = Item::from_draft(id, &Draft::new("Bolt", "Hardware", 5));
        assert_eq!(item.id_typed(), id);
        assert_eq!(item.name(), "Bolt");
        assert_eq!(item.category(), "Hardware");
        assert_eq!(item.quantity(), 5);
        assert_eq!(Draft::from_item(&item), Draft::new("Bolt", "Hardware", 5));
    }

    #[test]
    fn blank_fields_are_missing() {
        assert_eq!(
            Draft::new("  ", "Food", 1).validate(),
            Err(DomainError::MissingRequiredField("name"))
        );
        assert_eq!(
            Draft::new("Apple", "", 1).validate(),
            Err(DomainError::MissingRequiredField("category"))
        );
        assert!(Draft::new("Apple", "Food", 0).validate().is_ok());
    }

    #[test]
    fn low_stock_is_strictly_below_threshold() {
        let id = ItemId::new(AggregateId::from_u128(1));
        assert!(Item::from_draft(id, &Draft::new("a", "b", 9)).is_low_stock(10));
        assert!(!Item::from_draft(id, &Draft::new("a", "b", 10)).is_low_stock(10));
    }

    #[test]
    fn sequential_ids_count_up() {
        let mut ids = SequentialIds::new();
        let first = ids.next_id();
        let second = ids.next_id();
        assert_eq!(first, ItemId::new(AggregateId::from_u128(1)));
        assert_eq!(second, ItemId::new(AggregateId::from_u128(2)));
    }

    #[test]
    fn sequential_ids_skip_past_observed_ids() {
        let mut ids = SequentialIds::new();
        ids.observe(ItemId::new(AggregateId::from_u128(5)));
        ids.observe(ItemId::new(AggregateId::from_u128(2)));
        assert_eq!(ids.next_id(), ItemId::new(AggregateId::from_u128(6)));
    }

    #[test]
    fn uuid_ids_do_not_collide_in_a_tight_loop() {
        let mut ids = UuidV7Ids;
        let seen: HashSet<ItemId> = (0..10_000).map(|_| ids.next_id()).collect();
        assert_eq!(seen.len(), 10_000);
    }

    #[test]
    fn item_id_round_trips_through_text() {
        let id = ItemId::new(AggregateId::from_u128(77));
        assert_eq!(id.to_string().parse::<ItemId>().unwrap(), id);
        assert!("nope".parse::<ItemId>().is_err());
    }
}
