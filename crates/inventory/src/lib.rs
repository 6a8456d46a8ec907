//! Inventory tracking domain module.
//!
//! Deterministic in-memory logic for a single inventory screen: the item
//! collection and its mutations, derived (filtered/sorted) views, and the
//! add/edit form state machine. No IO beyond the optional persistence
//! contract, no rendering.

pub mod collection;
pub mod config;
pub mod form;
pub mod inventory;
pub mod item;
pub mod persistence;
pub mod store;
pub mod view;

pub use collection::Collection;
pub use config::{SortMode, StaleReferencePolicy, StoreConfig};
pub use form::{Form, FormFields, FormState, SubmitOutcome, parse_quantity};
pub use inventory::{
    AddItem, DeleteItem, Inventory, InventoryCommand, InventoryEvent, InventoryId, ItemAdded,
    ItemDeleted, ItemUpdated, ItemsRestored, RestoreItems, SortByQuantity, SortedByQuantity,
    UpdateItem,
};
pub use item::{Draft, Item, ItemId, ItemIdGenerator, SequentialIds, UuidV7Ids};
pub use persistence::{InMemoryRepository, InventoryRepository, InventorySnapshot};
pub use store::InventoryStore;
pub use view::{SortDirective, ViewFilter, ViewRow, category_list, derive_view};
