//! Event publishing/subscription abstraction (mechanics only).
//!
//! The bus distributes applied events to whoever renders or mirrors the
//! collection. It carries notifications only: the aggregate stays the source
//! of truth, and a subscriber that misses a message simply re-derives its
//! view from current state on the next read.

use std::sync::Arc;
use std::sync::mpsc::Receiver;

/// A subscription to an event stream.
///
/// Each subscription gets a copy of every message published after it was
/// created (broadcast semantics), in publication order.
///
/// Only non-blocking reads are offered: publishers run on the same thread as
/// the reader, so waiting for a message would never return.
///
/// ```ignore
/// let changes = store.subscribe();
/// store.add(draft)?;
/// while let Ok(event) = changes.try_recv() {
///     redraw_for(&event);
/// }
/// ```
#[derive(Debug)]
pub struct Subscription<M> {
    receiver: Receiver<M>,
}

impl<M> Subscription<M> {
    pub fn new(receiver: Receiver<M>) -> Self {
        Self { receiver }
    }

    /// Try to receive a message without blocking.
    pub fn try_recv(&self) -> Result<M, std::sync::mpsc::TryRecvError> {
        self.receiver.try_recv()
    }

    /// Drain everything currently queued without blocking.
    pub fn drain(&self) -> Vec<M> {
        self.receiver.try_iter().collect()
    }
}

/// Domain-agnostic event bus (pub/sub abstraction).
///
/// `publish()` can fail (e.g. lock poisoning). Callers decide whether that
/// matters; the inventory store logs and carries on because state was
/// already applied.
pub trait EventBus<M>: Send + Sync {
    type Error: core::fmt::Debug + Send + Sync + 'static;

    fn publish(&self, message: M) -> Result<(), Self::Error>;

    fn subscribe(&self) -> Subscription<M>;
}

impl<M, B> EventBus<M> for Arc<B>
where
    B: EventBus<M> + ?Sized,
{
    type Error = B::Error;

    fn publish(&self, message: M) -> Result<(), Self::Error> {
        (**self).publish(message)
    }

    fn subscribe(&self) -> Subscription<M> {
        (**self).subscribe()
    }
}
