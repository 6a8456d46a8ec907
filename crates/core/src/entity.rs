//! Identity-bearing domain records.

/// A record whose identity outlives any change to its fields.
///
/// Lookups, replacement and removal key on `id()` alone: a record rebuilt
/// from new field values with the same id is the same record.
pub trait Entity {
    type Id: Clone + Eq + core::hash::Hash + core::fmt::Debug;

    fn id(&self) -> &Self::Id;
}
