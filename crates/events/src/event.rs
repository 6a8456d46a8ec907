use chrono::{DateTime, Utc};

/// A fact emitted by an aggregate after a command was accepted.
///
/// Applying the same events in the same order always rebuilds the same state,
/// so events never reference anything outside themselves.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Dotted name, e.g. `inventory.item.added`. Stable across releases.
    fn event_type(&self) -> &'static str;

    /// Payload schema revision; bumped when fields change meaning.
    fn version(&self) -> u32;

    /// Wall-clock time of the user action that produced the event.
    fn occurred_at(&self) -> DateTime<Utc>;
}
