//! The inventory aggregate: the only writer of the item collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use stocktrack_core::{Aggregate, AggregateId, AggregateRoot, DomainError};
use stocktrack_events::Event;

use crate::collection::Collection;
use crate::config::StaleReferencePolicy;
use crate::item::{Draft, Item, ItemId};

/// Identifier of one inventory (one store instance).
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct InventoryId(pub AggregateId);

impl InventoryId {
    pub fn new(id: AggregateId) -> Self {
        Self(id)
    }
}

impl core::fmt::Display for InventoryId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        core::fmt::Display::fmt(&self.0, f)
    }
}

/// Aggregate root: Inventory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inventory {
    id: InventoryId,
    items: Collection,
    stale_references: StaleReferencePolicy,
    version: u64,
}

impl Inventory {
    pub fn new(id: InventoryId, stale_references: StaleReferencePolicy) -> Self {
        Self {
            id,
            items: Collection::new(),
            stale_references,
            version: 0,
        }
    }

    pub fn id_typed(&self) -> InventoryId {
        self.id
    }

    pub fn items(&self) -> &Collection {
        &self.items
    }

    pub fn stale_references(&self) -> StaleReferencePolicy {
        self.stale_references
    }
}

impl AggregateRoot for Inventory {
    type Id = InventoryId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: AddItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddItem {
    pub inventory_id: InventoryId,
    pub item_id: ItemId,
    pub draft: Draft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: UpdateItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateItem {
    pub inventory_id: InventoryId,
    pub item_id: ItemId,
    pub draft: Draft,
    pub occurred_at: DateTime<Utc>,
}

/// Command: DeleteItem.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteItem {
    pub inventory_id: InventoryId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SortByQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortByQuantity {
    pub inventory_id: InventoryId,
    pub occurred_at: DateTime<Utc>,
}

/// Command: RestoreItems (replace the whole collection, e.g. after a load).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestoreItems {
    pub inventory_id: InventoryId,
    pub items: Vec<Item>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryCommand {
    AddItem(AddItem),
    UpdateItem(UpdateItem),
    DeleteItem(DeleteItem),
    SortByQuantity(SortByQuantity),
    RestoreItems(RestoreItems),
}

/// Event: ItemAdded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemAdded {
    pub inventory_id: InventoryId,
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemUpdated (wholesale replacement).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemUpdated {
    pub inventory_id: InventoryId,
    pub item: Item,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemDeleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemDeleted {
    pub inventory_id: InventoryId,
    pub item_id: ItemId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SortedByQuantity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortedByQuantity {
    pub inventory_id: InventoryId,
    pub occurred_at: DateTime<Utc>,
}

/// Event: ItemsRestored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemsRestored {
    pub inventory_id: InventoryId,
    pub items: Vec<Item>,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InventoryEvent {
    ItemAdded(ItemAdded),
    ItemUpdated(ItemUpdated),
    ItemDeleted(ItemDeleted),
    SortedByQuantity(SortedByQuantity),
    ItemsRestored(ItemsRestored),
}

impl Event for InventoryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            InventoryEvent::ItemAdded(_) => "inventory.item.added",
            InventoryEvent::ItemUpdated(_) => "inventory.item.updated",
            InventoryEvent::ItemDeleted(_) => "inventory.item.deleted",
            InventoryEvent::SortedByQuantity(_) => "inventory.sorted_by_quantity",
            InventoryEvent::ItemsRestored(_) => "inventory.restored",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            InventoryEvent::ItemAdded(e) => e.occurred_at,
            InventoryEvent::ItemUpdated(e) => e.occurred_at,
            InventoryEvent::ItemDeleted(e) => e.occurred_at,
            InventoryEvent::SortedByQuantity(e) => e.occurred_at,
            InventoryEvent::ItemsRestored(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Inventory {
    type Command = InventoryCommand;
    type Event = InventoryEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            InventoryEvent::ItemAdded(e) => {
                let pushed = self.items.push(e.item.clone());
                debug_assert!(pushed.is_ok(), "handle_add admits only fresh ids");
            }
            InventoryEvent::ItemUpdated(e) => {
                self.items.replace(e.item.clone());
            }
            InventoryEvent::ItemDeleted(e) => {
                self.items.remove(e.item_id);
            }
            InventoryEvent::SortedByQuantity(_) => {
                self.items.sort_by_quantity();
            }
            InventoryEvent::ItemsRestored(e) => {
                let restored = Collection::from_items(e.items.clone());
                debug_assert!(restored.is_ok(), "handle_restore admits only unique ids");
                if let Ok(items) = restored {
                    self.items = items;
                }
            }
        }

        // Deterministic version tracking: +1 per applied event.
        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            InventoryCommand::AddItem(cmd) => self.handle_add(cmd),
            InventoryCommand::UpdateItem(cmd) => self.handle_update(cmd),
            InventoryCommand::DeleteItem(cmd) => self.handle_delete(cmd),
            InventoryCommand::SortByQuantity(cmd) => self.handle_sort(cmd),
            InventoryCommand::RestoreItems(cmd) => self.handle_restore(cmd),
        }
    }
}

impl Inventory {
    fn ensure_inventory_id(&self, inventory_id: InventoryId) -> Result<(), DomainError> {
        if self.id != inventory_id {
            return Err(DomainError::invariant("inventory_id mismatch"));
        }
        Ok(())
    }

    /// `Ok(true)` when the item exists, `Ok(false)` for an ignorable stale
    /// reference.
    fn resolve(&self, item_id: ItemId) -> Result<bool, DomainError> {
        if self.items.contains(item_id) {
            return Ok(true);
        }
        match self.stale_references {
            StaleReferencePolicy::Ignore => Ok(false),
            StaleReferencePolicy::Reject => Err(DomainError::not_found()),
        }
    }

    fn handle_add(&self, cmd: &AddItem) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_inventory_id(cmd.inventory_id)?;
        cmd.draft.validate()?;
        if self.items.contains(cmd.item_id) {
            return Err(DomainError::conflict(format!("item {} already exists", cmd.item_id)));
        }
        Ok(vec![InventoryEvent::ItemAdded(ItemAdded {
            inventory_id: cmd.inventory_id,
            item: Item::from_draft(cmd.item_id, &cmd.draft),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_update(&self, cmd: &UpdateItem) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_inventory_id(cmd.inventory_id)?;
        cmd.draft.validate()?;
        if !self.resolve(cmd.item_id)? {
            return Ok(vec![]);
        }
        Ok(vec![InventoryEvent::ItemUpdated(ItemUpdated {
            inventory_id: cmd.inventory_id,
            item: Item::from_draft(cmd.item_id, &cmd.draft),
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_delete(&self, cmd: &DeleteItem) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_inventory_id(cmd.inventory_id)?;
        if !self.resolve(cmd.item_id)? {
            return Ok(vec![]);
        }
        Ok(vec![InventoryEvent::ItemDeleted(ItemDeleted {
            inventory_id: cmd.inventory_id,
            item_id: cmd.item_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_sort(&self, cmd: &SortByQuantity) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_inventory_id(cmd.inventory_id)?;
        Ok(vec![InventoryEvent::SortedByQuantity(SortedByQuantity {
            inventory_id: cmd.inventory_id,
            occurred_at: cmd.occurred_at,
        })])
    }

    fn handle_restore(&self, cmd: &RestoreItems) -> Result<Vec<InventoryEvent>, DomainError> {
        self.ensure_inventory_id(cmd.inventory_id)?;
        // Validates uniqueness up front so `apply` never sees a bad list.
        Collection::from_items(cmd.items.clone())?;
        for item in &cmd.items {
            Draft::from_item(item).validate()?;
        }
        Ok(vec![InventoryEvent::ItemsRestored(ItemsRestored {
            inventory_id: cmd.inventory_id,
            items: cmd.items.clone(),
            occurred_at: cmd.occurred_at,
        })])
    }
}
