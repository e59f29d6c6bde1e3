//! Synchronous listener registry used for every observable in the domain.
//!
//! [`Listeners`] plays the role that the async event bus plays for the
//! network side, but delivers in-line on the thread that raised the event.
//! Subscribing returns a [`ListenerId`]; the same handle detaches the
//! listener again. Emission snapshots the listener list and releases the
//! lock before any listener runs, so a listener may subscribe, unsubscribe
//! or trigger further events on the same registry without deadlocking.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// Handle returned by [`Listeners::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener<E> = Arc<dyn Fn(&E) + Send + Sync>;

/// Ordered set of callbacks for events of type `E`.
pub struct Listeners<E> {
    next_id: AtomicU64,
    entries: Mutex<Vec<(ListenerId, Listener<E>)>>,
}

impl<E> Listeners<E> {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_id: AtomicU64::new(1),
            entries: Mutex::new(Vec::new()),
        }
    }

    /// Registers `listener` and returns the handle that detaches it.
    pub fn subscribe<F>(&self, listener: F) -> ListenerId
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.lock().push((id, Arc::new(listener)));
        id
    }

    /// Detaches the listener behind `id`.
    ///
    /// Returns `false` if it was already detached.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut entries = self.lock();
        let before = entries.len();
        entries.retain(|(entry_id, _)| *entry_id != id);
        entries.len() != before
    }

    /// Invokes every listener registered at the time of the call, in
    /// subscription order.
    pub fn emit(&self, event: &E) {
        let snapshot: Vec<Listener<E>> = self
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();
        for listener in snapshot {
            listener(event);
        }
    }

    /// Returns the number of attached listeners.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Returns `true` if no listener is attached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(ListenerId, Listener<E>)>> {
        // A panicking listener runs outside the lock, so the list itself
        // cannot be left half-updated.
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<E> Default for Listeners<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> fmt::Debug for Listeners<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listeners")
            .field("count", &self.len())
            .finish()
    }
}
