//! `InventoryStore`: the single owned state object a UI layer composes.
//!
//! Owns the collection (through the [`Inventory`] aggregate), the add/edit
//! form, the view directives and a change bus. Every operation runs to
//! completion synchronously through `&mut self`.

use anyhow::Context;
use chrono::Utc;

use stocktrack_core::{AggregateId, AggregateRoot, DomainError, DomainResult};
use stocktrack_events::{Event, EventBus, InMemoryEventBus, Subscription, execute};

use crate::collection::Collection;
use crate::config::{SortMode, StaleReferencePolicy, StoreConfig};
use crate::form::{Form, FormFields, FormState, SubmitOutcome};
use crate::inventory::{
    AddItem, DeleteItem, Inventory, InventoryCommand, InventoryEvent, InventoryId, RestoreItems,
    SortByQuantity, UpdateItem,
};
use crate::item::{Draft, Item, ItemId, ItemIdGenerator, UuidV7Ids};
use crate::persistence::InventoryRepository;
use crate::view::{SortDirective, ViewFilter, ViewRow, category_list, derive_view};

#[derive(Debug)]
pub struct InventoryStore {
    inventory: Inventory,
    form: Form,
    filter: ViewFilter,
    sort: SortDirective,
    config: StoreConfig,
    ids: Box<dyn ItemIdGenerator>,
    changes: InMemoryEventBus<InventoryEvent>,
}

impl Default for InventoryStore {
    fn default() -> Self {
        Self::new(StoreConfig::default())
    }
}

impl InventoryStore {
    pub fn new(config: StoreConfig) -> Self {
        Self::with_id_generator(config, UuidV7Ids)
    }

    pub fn with_id_generator(config: StoreConfig, ids: impl ItemIdGenerator + 'static) -> Self {
        let inventory_id = InventoryId::new(AggregateId::new());
        Self {
            inventory: Inventory::new(inventory_id, config.stale_references),
            form: Form::new(),
            filter: ViewFilter::default(),
            sort: SortDirective::None,
            config,
            ids: Box::new(ids),
            changes: InMemoryEventBus::new(),
        }
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    pub fn inventory_id(&self) -> InventoryId {
        self.inventory.id_typed()
    }

    /// Number of applied changes since creation.
    pub fn version(&self) -> u64 {
        self.inventory.version()
    }

    // ---- collection -------------------------------------------------------

    pub fn items(&self) -> &[Item] {
        self.inventory.items().as_slice()
    }

    pub fn collection(&self) -> &Collection {
        self.inventory.items()
    }

    pub fn get(&self, id: ItemId) -> Option<&Item> {
        self.inventory.items().get(id)
    }

    pub fn len(&self) -> usize {
        self.inventory.items().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inventory.items().is_empty()
    }

    /// Append a new item with a fresh id.
    pub fn add(&mut self, draft: Draft) -> DomainResult<ItemId> {
        let item_id = self.ids.next_id();
        self.dispatch(InventoryCommand::AddItem(AddItem {
            inventory_id: self.inventory_id(),
            item_id,
            draft,
            occurred_at: Utc::now(),
        }))?;
        Ok(item_id)
    }

    /// Replace the item with `id` wholesale. `Ok(false)` for an ignored stale
    /// reference.
    pub fn update(&mut self, id: ItemId, draft: Draft) -> DomainResult<bool> {
        let applied = self.dispatch(InventoryCommand::UpdateItem(UpdateItem {
            inventory_id: self.inventory_id(),
            item_id: id,
            draft,
            occurred_at: Utc::now(),
        }))?;
        Ok(applied > 0)
    }

    /// Remove the item with `id`. `Ok(false)` for an ignored stale reference.
    pub fn delete(&mut self, id: ItemId) -> DomainResult<bool> {
        let applied = self.dispatch(InventoryCommand::DeleteItem(DeleteItem {
            inventory_id: self.inventory_id(),
            item_id: id,
            occurred_at: Utc::now(),
        }))?;
        Ok(applied > 0)
    }

    /// Ascending by quantity. Reorders storage under [`SortMode::InPlace`],
    /// only the view under [`SortMode::View`].
    pub fn sort_by_quantity(&mut self) -> DomainResult<()> {
        match self.config.sort_mode {
            SortMode::InPlace => {
                self.dispatch(InventoryCommand::SortByQuantity(SortByQuantity {
                    inventory_id: self.inventory_id(),
                    occurred_at: Utc::now(),
                }))?;
            }
            SortMode::View => {
                tracing::debug!(inventory_id = %self.inventory_id(), "view sort directive set");
                self.sort = SortDirective::QuantityAscending;
            }
        }
        Ok(())
    }

    /// Drop the view sort directive. Stored order is not restored by this.
    pub fn clear_sort(&mut self) {
        self.sort = SortDirective::None;
    }

    // ---- view -------------------------------------------------------------

    pub fn set_category_filter(&mut self, text: impl Into<String>) {
        self.filter.category = text.into();
    }

    pub fn set_name_filter(&mut self, text: impl Into<String>) {
        self.filter.name = text.into();
    }

    pub fn clear_filters(&mut self) {
        self.filter = ViewFilter::default();
    }

    pub fn filter(&self) -> &ViewFilter {
        &self.filter
    }

    pub fn sort_directive(&self) -> SortDirective {
        self.sort
    }

    /// Rows to display, recomputed from current state on every call.
    pub fn view(&self) -> Vec<ViewRow<'_>> {
        derive_view(
            self.inventory.items(),
            &self.filter,
            self.sort,
            self.config.low_stock_threshold,
        )
    }

    /// Category filter options, distinct and in first-seen order.
    pub fn categories(&self) -> Vec<&str> {
        category_list(self.inventory.items())
    }

    // ---- form -------------------------------------------------------------

    pub fn form_state(&self) -> &FormState {
        self.form.state()
    }

    pub fn form_fields(&self) -> &FormFields {
        self.form.fields()
    }

    pub fn form_fields_mut(&mut self) -> &mut FormFields {
        self.form.fields_mut()
    }

    pub fn set_form_name(&mut self, value: impl Into<String>) {
        self.form.fields_mut().name = value.into();
    }

    pub fn set_form_category(&mut self, value: impl Into<String>) {
        self.form.fields_mut().category = value.into();
    }

    pub fn set_form_quantity(&mut self, value: impl Into<String>) {
        self.form.fields_mut().quantity = value.into();
    }

    /// Idle/Editing → Editing(item) with fields pre-populated.
    pub fn begin_edit(&mut self, id: ItemId) -> DomainResult<()> {
        match self.inventory.items().get(id) {
            Some(item) => {
                self.form.begin_edit(item);
                Ok(())
            }
            None => self.stale(id, "edit"),
        }
    }

    /// Editing → Idle, fields cleared. A no-op when already Idle.
    pub fn cancel_edit(&mut self) {
        self.form.reset();
    }

    /// Commit the form: add when Idle, update the edited item when Editing.
    ///
    /// On validation failure nothing changes. On success the form is Idle
    /// with cleared fields.
    pub fn submit(&mut self) -> DomainResult<SubmitOutcome> {
        let draft = self.form.fields().to_draft()?;
        let outcome = match self.form.editing_id() {
            None => SubmitOutcome::Added(self.add(draft)?),
            Some(id) => {
                if self.update(id, draft)? {
                    SubmitOutcome::Updated(id)
                } else {
                    SubmitOutcome::Ignored(id)
                }
            }
        };
        self.form.reset();
        Ok(outcome)
    }

    // ---- notifications & persistence --------------------------------------

    /// Receive every event applied from now on.
    ///
    /// Queues are unbounded: a subscription kept alive must be drained
    /// regularly (e.g. once per render), or dropped when no longer needed.
    pub fn subscribe(&self) -> Subscription<InventoryEvent> {
        self.changes.subscribe()
    }

    /// Replace the collection with what `repo` holds. Resets form and view
    /// directives.
    pub fn load_from<R>(&mut self, repo: &R) -> anyhow::Result<usize>
    where
        R: InventoryRepository + ?Sized,
    {
        let items = repo.load().context("failed to load inventory")?;
        let count = items.len();
        self.dispatch(InventoryCommand::RestoreItems(RestoreItems {
            inventory_id: self.inventory_id(),
            items,
            occurred_at: Utc::now(),
        }))
        .context("loaded inventory is inconsistent")?;
        for item in self.inventory.items() {
            self.ids.observe(item.id_typed());
        }
        self.form.reset();
        self.clear_filters();
        self.clear_sort();
        tracing::info!(inventory_id = %self.inventory_id(), count, "inventory loaded");
        Ok(count)
    }

    pub fn save_to<R>(&self, repo: &R) -> anyhow::Result<()>
    where
        R: InventoryRepository + ?Sized,
    {
        repo.save(self.items()).context("failed to save inventory")?;
        tracing::info!(inventory_id = %self.inventory_id(), count = self.len(), "inventory saved");
        Ok(())
    }

    // ---- internals --------------------------------------------------------

    /// Run a command through the aggregate and publish what was applied.
    fn dispatch(&mut self, command: InventoryCommand) -> DomainResult<usize> {
        let events = match execute(&mut self.inventory, &command) {
            Ok(events) => events,
            Err(err) => {
                tracing::debug!(inventory_id = %self.inventory_id(), error = %err, ?command, "command rejected");
                return Err(err);
            }
        };

        if events.is_empty() {
            tracing::warn!(inventory_id = %self.inventory_id(), ?command, "stale reference ignored");
        }

        for event in &events {
            tracing::debug!(
                inventory_id = %self.inventory_id(),
                event_type = event.event_type(),
                version = self.inventory.version(),
                "event applied"
            );
            if let Err(err) = self.changes.publish(event.clone()) {
                tracing::warn!(event_type = event.event_type(), error = ?err, "failed to publish change");
            }
        }
        Ok(events.len())
    }

    fn stale(&self, id: ItemId, operation: &'static str) -> DomainResult<()> {
        match self.inventory.stale_references() {
            StaleReferencePolicy::Ignore => {
                tracing::warn!(inventory_id = %self.inventory_id(), item_id = %id, operation, "stale reference ignored");
                Ok(())
            }
            StaleReferencePolicy::Reject => Err(DomainError::not_found()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::SequentialIds;
    use crate::persistence::InMemoryRepository;

    fn store() -> InventoryStore {
        InventoryStore::with_id_generator(StoreConfig::default(), SequentialIds::new())
    }

    fn hardened() -> InventoryStore {
        let config = StoreConfig {
            stale_references: StaleReferencePolicy::Reject,
            ..StoreConfig::default()
        };
        InventoryStore::with_id_generator(config, SequentialIds::new())
    }

    fn fill(store: &mut InventoryStore, name: &str, category: &str, quantity: &str) {
        store.set_form_name(name);
        store.set_form_category(category);
        store.set_form_quantity(quantity);
    }

    fn names(store: &InventoryStore) -> Vec<&str> {
        store.items().iter().map(Item::name).collect()
    }

    #[test]
    fn add_assigns_fresh_ids() {
        let mut s = store();
        let a = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        let b = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        assert_ne!(a, b);
        assert_eq!(s.len(), 2);
        assert_eq!(s.version(), 2);
    }

    #[test]
    fn default_store_uses_uuid_ids() {
        let mut s = InventoryStore::default();
        let id = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        assert_eq!(id.0.as_uuid().get_version_num(), 7);
    }

    #[test]
    fn stale_update_and_delete_return_false() {
        let mut s = store();
        let id = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.delete(id).unwrap();
        assert!(!s.update(id, Draft::new("Bolt", "Hardware", 6)).unwrap());
        assert!(!s.delete(id).unwrap());
        assert!(s.is_empty());
    }

    #[test]
    fn hardened_store_reports_not_found() {
        let mut s = hardened();
        let id = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.delete(id).unwrap();
        assert_eq!(s.delete(id), Err(DomainError::NotFound));
        assert_eq!(s.begin_edit(id), Err(DomainError::NotFound));
    }

    #[test]
    fn submit_while_idle_adds_and_clears() {
        let mut s = store();
        fill(&mut s, "Apple", "Food", "20");
        let outcome = s.submit().unwrap();
        let SubmitOutcome::Added(id) = outcome else {
            panic!("expected Added, got {outcome:?}");
        };
        assert_eq!(s.get(id).unwrap().quantity(), 20);
        assert_eq!(s.form_state(), &FormState::Idle);
        assert!(s.form_fields().is_cleared());
    }

    #[test]
    fn submit_with_missing_field_changes_nothing() {
        let mut s = store();
        fill(&mut s, "Apple", "", "20");
        assert_eq!(s.submit(), Err(DomainError::MissingRequiredField("category")));
        assert!(s.is_empty());
        assert_eq!(s.form_fields().name, "Apple");
    }

    #[test]
    fn edit_cycle_updates_in_place() {
        let mut s = store();
        let bolt = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.add(Draft::new("Apple", "Food", 20)).unwrap();

        s.begin_edit(bolt).unwrap();
        assert_eq!(s.form_fields().quantity, "5");
        s.set_form_quantity("50");

        assert_eq!(s.submit().unwrap(), SubmitOutcome::Updated(bolt));
        assert_eq!(names(&s), vec!["Bolt", "Apple"]);
        assert_eq!(s.get(bolt).unwrap().quantity(), 50);
        assert_eq!(s.form_state(), &FormState::Idle);
    }

    #[test]
    fn cancel_returns_to_idle_without_changes() {
        let mut s = store();
        let bolt = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.begin_edit(bolt).unwrap();
        s.set_form_name("Changed");
        s.cancel_edit();

        assert_eq!(s.form_state(), &FormState::Idle);
        assert!(s.form_fields().is_cleared());
        assert_eq!(s.get(bolt).unwrap().name(), "Bolt");
    }

    #[test]
    fn submitting_an_edit_of_a_deleted_item_is_ignored() {
        let mut s = store();
        let bolt = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.begin_edit(bolt).unwrap();
        s.delete(bolt).unwrap();
        assert!(matches!(s.form_state(), FormState::Editing(_)));

        assert_eq!(s.submit().unwrap(), SubmitOutcome::Ignored(bolt));
        assert!(s.is_empty());
        assert_eq!(s.form_state(), &FormState::Idle);
    }

    #[test]
    fn hardened_edit_of_deleted_item_keeps_editing() {
        let mut s = hardened();
        let bolt = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.begin_edit(bolt).unwrap();
        s.delete(bolt).unwrap();

        assert_eq!(s.submit(), Err(DomainError::NotFound));
        assert!(matches!(s.form_state(), FormState::Editing(item) if item.id_typed() == bolt));
    }

    #[test]
    fn begin_edit_of_unknown_id_is_ignored_by_default() {
        let mut s = store();
        let bolt = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.delete(bolt).unwrap();
        s.begin_edit(bolt).unwrap();
        assert_eq!(s.form_state(), &FormState::Idle);
    }

    #[test]
    fn view_sort_mode_leaves_storage_alone() {
        let config = StoreConfig {
            sort_mode: SortMode::View,
            ..StoreConfig::default()
        };
        let mut s = InventoryStore::with_id_generator(config, SequentialIds::new());
        s.add(Draft::new("Apple", "Food", 20)).unwrap();
        s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();

        s.sort_by_quantity().unwrap();
        let viewed: Vec<&str> = s.view().iter().map(|r| r.item.name()).collect();
        assert_eq!(viewed, vec!["Bolt", "Apple"]);
        assert_eq!(names(&s), vec!["Apple", "Bolt"]);

        s.clear_sort();
        let viewed: Vec<&str> = s.view().iter().map(|r| r.item.name()).collect();
        assert_eq!(viewed, vec!["Apple", "Bolt"]);
    }

    #[test]
    fn add_after_load_does_not_reuse_restored_ids() {
        let repo = InMemoryRepository::new();
        let mut first = store();
        first.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        first.add(Draft::new("Apple", "Food", 20)).unwrap();
        first.save_to(&repo).unwrap();

        let mut second = store();
        second.load_from(&repo).unwrap();
        let id = second.add(Draft::new("Nail", "Hardware", 1)).unwrap();

        assert_eq!(second.len(), 3);
        assert!(first.get(id).is_none());
        assert_eq!(second.get(id).unwrap().name(), "Nail");
    }

    #[test]
    fn changes_are_published() {
        let mut s = store();
        let changes = s.subscribe();
        let id = s.add(Draft::new("Bolt", "Hardware", 5)).unwrap();
        s.sort_by_quantity().unwrap();
        s.delete(id).unwrap();
        s.delete(id).unwrap();

        let types: Vec<&str> = changes.drain().iter().map(Event::event_type).collect();
        assert_eq!(
            types,
            vec!["inventory.item.added", "inventory.sorted_by_quantity", "inventory.item.deleted"]
        );
    }
}
