//! Cart change notifications.
//!
//! Every cart write publishes a [`CartUpdated`] event. Listeners get no cart
//! data with it; they re-read the store so they always see what was actually
//! persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::Mutex;

/// Where a cart change came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeSource {
    /// A mutation on this page.
    Local,
    /// Another page on the same origin wrote the store.
    External,
}

/// The cart in storage may have changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartUpdated {
    pub source: ChangeSource,
}

type Listener = Arc<dyn Fn(&CartUpdated) + Send + Sync>;

struct EventsInner {
    next_id: AtomicU64,
    listeners: Mutex<Vec<(u64, Listener)>>,
}

/// Publish/subscribe hub for [`CartUpdated`].
///
/// Cheaply cloneable; clones share the same listener list.
#[derive(Clone)]
pub struct CartEvents {
    inner: Arc<EventsInner>,
}

impl Default for CartEvents {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CartEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartEvents")
            .field("listeners", &self.listener_count())
            .finish()
    }
}

impl CartEvents {
    /// Create a hub with no listeners.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(EventsInner {
                next_id: AtomicU64::new(1),
                listeners: Mutex::new(Vec::new()),
            }),
        }
    }

    /// Register `listener`. It stays registered until the returned
    /// [`Subscription`] is dropped.
    #[must_use = "dropping the subscription unsubscribes the listener"]
    pub fn subscribe<F>(&self, listener: F) -> Subscription
    where
        F: Fn(&CartUpdated) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.lock().push((id, Arc::new(listener)));
        Subscription {
            id,
            events: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver `event` to every current listener and return how many got it.
    ///
    /// The listener list is copied before delivery, so a listener may publish,
    /// subscribe or unsubscribe without deadlocking.
    pub fn publish(&self, event: CartUpdated) -> usize {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .lock()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        tracing::trace!(source = ?event.source, listeners = listeners.len(), "cart updated");
        for listener in &listeners {
            listener(&event);
        }
        listeners.len()
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.inner.listeners.lock().len()
    }
}

/// Keeps a listener registered; unsubscribes on drop.
#[derive(Debug)]
pub struct Subscription {
    id: u64,
    events: Weak<EventsInner>,
}

impl Subscription {
    /// Unsubscribe now.
    pub fn cancel(self) {
        drop(self);
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(inner) = self.events.upgrade() {
            inner.listeners.lock().retain(|(id, _)| *id != self.id);
        }
    }
}
