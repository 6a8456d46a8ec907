//! Value object trait: equality by value, not identity.
//!
//! Value objects have **no identity**. Two value objects holding the same
//! values are interchangeable. Form drafts are the canonical example here: a
//! draft only gains an identity once it is committed as an entity.

/// Marker trait for value objects.
///
/// ```ignore
/// #[derive(Debug, Clone, PartialEq, Eq)]
/// struct Draft {
///     name: String,
///     category: String,
///     quantity: u64,
/// }
///
/// impl ValueObject for Draft {}
/// ```
pub trait ValueObject: Clone + PartialEq + core::fmt::Debug {}
