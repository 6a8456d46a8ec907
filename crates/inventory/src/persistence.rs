//! Persistence contract for the item collection.
//!
//! The store is the only writer; repositories just hold snapshots.

use std::sync::{Arc, RwLock};

use anyhow::{Context, anyhow, bail};
use serde::{Deserialize, Serialize};

use crate::item::Item;

pub const SNAPSHOT_SCHEMA_VERSION: u32 = 1;

/// Serialized shape of a saved collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub schema_version: u32,
    pub items: Vec<Item>,
}

impl InventorySnapshot {
    pub fn new(items: Vec<Item>) -> Self {
        Self {
            schema_version: SNAPSHOT_SCHEMA_VERSION,
            items,
        }
    }

    pub fn to_json(&self) -> anyhow::Result<String> {
        serde_json::to_string(self).context("failed to serialize inventory snapshot")
    }

    pub fn from_json(raw: &str) -> anyhow::Result<Self> {
        let snapshot: Self =
            serde_json::from_str(raw).context("failed to deserialize inventory snapshot")?;
        if snapshot.schema_version != SNAPSHOT_SCHEMA_VERSION {
            bail!(
                "unsupported inventory snapshot schema version {} (expected {})",
                snapshot.schema_version,
                SNAPSHOT_SCHEMA_VERSION
            );
        }
        Ok(snapshot)
    }
}

/// Load/save contract for whole collections.
pub trait InventoryRepository: Send + Sync {
    /// Saved items in stored order. Nothing saved yet means an empty list.
    fn load(&self) -> anyhow::Result<Vec<Item>>;

    fn save(&self, items: &[Item]) -> anyhow::Result<()>;
}

impl<R> InventoryRepository for Arc<R>
where
    R: InventoryRepository + ?Sized,
{
    fn load(&self) -> anyhow::Result<Vec<Item>> {
        (**self).load()
    }

    fn save(&self, items: &[Item]) -> anyhow::Result<()> {
        (**self).save(items)
    }
}

/// Keeps the last saved snapshot as JSON text in memory.
#[derive(Debug, Default)]
pub struct InMemoryRepository {
    snapshot: RwLock<Option<String>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with raw snapshot JSON (e.g. produced elsewhere).
    pub fn with_snapshot_json(raw: impl Into<String>) -> Self {
        Self {
            snapshot: RwLock::new(Some(raw.into())),
        }
    }

    /// Last saved JSON, if any.
    pub fn snapshot_json(&self) -> Option<String> {
        self.snapshot.read().ok().and_then(|s| s.clone())
    }
}

impl InventoryRepository for InMemoryRepository {
    fn load(&self) -> anyhow::Result<Vec<Item>> {
        let guard = self
            .snapshot
            .read()
            .map_err(|_| anyhow!("inventory snapshot lock poisoned"))?;
        match guard.as_deref() {
            None => Ok(Vec::new()),
            Some(raw) => Ok(InventorySnapshot::from_json(raw)?.items),
        }
    }

    fn save(&self, items: &[Item]) -> anyhow::Result<()> {
        let raw = InventorySnapshot::new(items.to_vec()).to_json()?;
        let mut guard = self
            .snapshot
            .write()
            .map_err(|_| anyhow!("inventory snapshot lock poisoned"))?;
        *guard = Some(raw);
        Ok(())
    }
}
