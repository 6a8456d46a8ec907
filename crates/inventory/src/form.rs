//! Add/edit form: raw field values plus the Idle/Editing state machine.

use serde::{Deserialize, Serialize};

use stocktrack_core::{DomainError, DomainResult};

use crate::item::{Draft, Item, ItemId};

/// What the user typed, before coercion.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormFields {
    pub name: String,
    pub category: String,
    pub quantity: String,
}

impl FormFields {
    pub fn from_item(item: &Item) -> Self {
        Self {
            name: item.name().to_string(),
            category: item.category().to_string(),
            quantity: item.quantity().to_string(),
        }
    }

    pub fn is_cleared(&self) -> bool {
        *self == Self::default()
    }

    /// Presence checks in field order, then quantity coercion.
    pub fn to_draft(&self) -> DomainResult<Draft> {
        if self.name.trim().is_empty() {
            return Err(DomainError::missing("name"));
        }
        if self.category.trim().is_empty() {
            return Err(DomainError::missing("category"));
        }
        let quantity = parse_quantity(&self.quantity)?;
        Ok(Draft::new(self.name.clone(), self.category.clone(), quantity))
    }
}

/// Coerce quantity text to a non-negative integer.
pub fn parse_quantity(raw: &str) -> DomainResult<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(DomainError::missing("quantity"));
    }
    raw.parse::<u64>().map_err(|_| {
        DomainError::validation(format!("quantity must be a non-negative whole number, got '{raw}'"))
    })
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum FormState {
    #[default]
    Idle,
    /// Editing a snapshot of the item taken when editing began.
    Editing(Item),
}

/// Result of a successful submit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Added(ItemId),
    Updated(ItemId),
    /// The edited item was gone by submit time; nothing changed.
    Ignored(ItemId),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Form {
    state: FormState,
    fields: FormFields,
}

impl Form {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &FormState {
        &self.state
    }

    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    pub fn fields_mut(&mut self) -> &mut FormFields {
        &mut self.fields
    }

    pub fn editing_id(&self) -> Option<ItemId> {
        match &self.state {
            FormState::Idle => None,
            FormState::Editing(item) => Some(item.id_typed()),
        }
    }

    pub fn is_editing(&self) -> bool {
        self.editing_id().is_some()
    }

    /// Enter Editing with fields pre-populated from `item`. Editing another
    /// item while already editing switches the target.
    pub fn begin_edit(&mut self, item: &Item) {
        self.fields = FormFields::from_item(item);
        self.state = FormState::Editing(item.clone());
    }

    /// Back to Idle with cleared fields.
    pub fn reset(&mut self) {
        self.state = FormState::Idle;
        self.fields = FormFields::default();
    }
}
