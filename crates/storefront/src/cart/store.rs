//! The persistent cart store.
//!
//! Storage is the only source of truth for the cart. Nothing here caches a
//! cart between calls: every [`CartStore::load`] reads storage again.

use std::sync::Arc;

use aymodines_core::Cart;

use super::events::{CartEvents, CartUpdated, ChangeSource};
use crate::storage::{KeyValueStorage, StorageError};

/// Reads and writes the cart under one storage key.
#[derive(Clone)]
pub struct CartStore {
    storage: Arc<dyn KeyValueStorage>,
    key: Arc<str>,
    events: CartEvents,
}

impl std::fmt::Debug for CartStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartStore")
            .field("key", &self.key)
            .field("events", &self.events)
            .finish_non_exhaustive()
    }
}

impl CartStore {
    /// Create a store over `storage`, keeping the cart under `key`.
    pub fn new(storage: Arc<dyn KeyValueStorage>, key: impl Into<Arc<str>>, events: CartEvents) -> Self {
        Self {
            storage,
            key: key.into(),
            events,
        }
    }

    /// The storage key holding the cart.
    #[must_use]
    pub fn key(&self) -> &str {
        &self.key
    }

    /// The hub `save` publishes to.
    #[must_use]
    pub const fn events(&self) -> &CartEvents {
        &self.events
    }

    /// Read the current cart.
    ///
    /// A missing value is an empty cart. So is anything that doesn't decode
    /// to a valid cart (not JSON, not a list, a bad line, a duplicate id, a
    /// zero quantity) or a storage read failure; those are logged and never
    /// surfaced.
    #[must_use]
    pub fn load(&self) -> Cart {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Cart::new(),
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Failed to read cart, using empty cart");
                return Cart::new();
            }
        };

        match serde_json::from_str::<Cart>(&raw) {
            Ok(cart) => cart,
            Err(e) => {
                tracing::warn!(key = %self.key, error = %e, "Stored cart is malformed, using empty cart");
                Cart::new()
            }
        }
    }

    /// Overwrite the stored cart with `cart`, then publish [`CartUpdated`].
    ///
    /// The event is published even if nothing changed and even if the write
    /// failed; listeners re-read storage and converge either way.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the cart couldn't be serialized or written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        let result = serde_json::to_string(cart)
            .map_err(StorageError::from)
            .and_then(|body| self.storage.set(&self.key, &body));

        if let Err(e) = &result {
            tracing::error!(key = %self.key, error = %e, "Failed to save cart");
        }

        self.events.publish(CartUpdated {
            source: ChangeSource::Local,
        });
        result
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use aymodines_core::{ItemId, NewItem, Price};

    use crate::storage::MemoryStorage;

    fn store_over(storage: MemoryStorage) -> (CartStore, Arc<MemoryStorage>) {
        let storage = Arc::new(storage);
        let store = CartStore::new(storage.clone(), "cart", CartEvents::new());
        (store, storage)
    }

    /// Storage whose writes always fail.
    struct ReadOnlyStorage;

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> crate::storage::Result<Option<String>> {
            Ok(None)
        }

        fn set(&self, _key: &str, _value: &str) -> crate::storage::Result<()> {
            Err(std::io::Error::new(std::io::ErrorKind::PermissionDenied, "read only").into())
        }
    }

    #[test]
    fn test_missing_key_loads_empty_cart() {
        let (store, _) = store_over(MemoryStorage::new());
        assert!(store.load().is_empty());
    }

    #[test]
    fn test_malformed_values_load_empty_cart() {
        for raw in [
            "not json",
            "{\"id\": 1}",
            "42",
            "null",
            "[{\"id\": 1}]",
            "[{\"id\": 1, \"name\": \"Rice\", \"price\": 5.5, \"quantity\": 0}]",
        ] {
            let (store, _) = store_over(MemoryStorage::with_value("cart", raw));
            assert!(store.load().is_empty(), "expected empty cart for {raw}");
        }
    }

    #[test]
    fn test_save_then_load_round_trips() {
        let (store, storage) = store_over(MemoryStorage::new());
        let mut cart = Cart::new();
        cart.add(NewItem::new(ItemId::new(1), "Rice", Price::from_minor(550)))
            .unwrap();

        store.save(&cart).unwrap();

        assert_eq!(store.load(), cart);
        assert_eq!(
            storage.get("cart").unwrap().as_deref(),
            Some(r#"[{"id":1,"name":"Rice","price":5.5,"quantity":1}]"#)
        );
    }

    #[test]
    fn test_save_notifies_even_without_changes() {
        let (store, _) = store_over(MemoryStorage::new());
        let hits = Arc::new(AtomicUsize::new(0));
        let _subscription = {
            let hits = Arc::clone(&hits);
            store.events().subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        store.save(&Cart::new()).unwrap();
        store.save(&Cart::new()).unwrap();
        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_failed_write_still_notifies() {
        let events = CartEvents::new();
        let store = CartStore::new(Arc::new(ReadOnlyStorage), "cart", events.clone());
        let hits = Arc::new(AtomicUsize::new(0));
        let _subscription = {
            let hits = Arc::clone(&hits);
            events.subscribe(move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };

        assert!(store.save(&Cart::new()).is_err());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }
}
