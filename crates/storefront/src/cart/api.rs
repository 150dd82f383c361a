//! Cart mutations.
//!
//! Each operation is a full round trip: load the cart from storage, apply
//! one transition, save the whole cart back. Saving always publishes a
//! change event, including when the transition was a no-op.

use aymodines_core::{CartError, ItemId, LineChange, NewItem};
use tracing::instrument;

use super::store::CartStore;

/// Add, update and remove cart lines.
#[derive(Debug, Clone)]
pub struct CartApi {
    store: CartStore,
}

impl CartApi {
    /// Create the API over `store`.
    #[must_use]
    pub const fn new(store: CartStore) -> Self {
        Self { store }
    }

    /// The store this API writes to.
    #[must_use]
    pub const fn store(&self) -> &CartStore {
        &self.store
    }

    /// Add one unit of `item` to the cart.
    ///
    /// An item already in the cart gets its quantity bumped and keeps its
    /// stored attributes. A new item is appended with quantity 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError` when the item has no id or can't start a line.
    /// The error has already been logged; nothing is written and no event
    /// is published.
    #[instrument(skip(self, item), fields(item_id = ?item.id))]
    pub fn add_item(&self, item: NewItem) -> Result<LineChange, CartError> {
        let mut cart = self.store.load();
        let change = cart.add(item).inspect_err(|e| {
            tracing::error!(error = %e, "Invalid item added to cart");
        })?;

        // A failed write is logged by the store; the page re-renders from
        // whatever storage holds.
        let _ = self.store.save(&cart);
        tracing::debug!(?change, "item added");
        Ok(change)
    }

    /// Change the quantity of `id` by `delta`.
    ///
    /// A line whose quantity drops to zero or below is removed. An id that
    /// isn't in the cart changes nothing, but the cart is still saved.
    #[instrument(skip(self))]
    pub fn update_quantity(&self, id: ItemId, delta: i32) -> LineChange {
        let mut cart = self.store.load();
        let change = cart.adjust(id, delta);
        let _ = self.store.save(&cart);
        tracing::debug!(?change, "quantity updated");
        change
    }

    /// Remove `id` from the cart. Removing a missing id is not an error.
    #[instrument(skip(self))]
    pub fn remove_item(&self, id: ItemId) -> LineChange {
        let mut cart = self.store.load();
        let change = cart.remove(id);
        let _ = self.store.save(&cart);
        tracing::debug!(?change, "item removed");
        change
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use std::collections::BTreeMap;

    use aymodines_core::Price;
    use proptest::prelude::*;

    use crate::cart::CartEvents;
    use crate::storage::MemoryStorage;
    use crate::test_support::capture_logs;

    fn api() -> (CartApi, Arc<AtomicUsize>, crate::cart::Subscription) {
        let events = CartEvents::new();
        let store = CartStore::new(Arc::new(MemoryStorage::new()), "cart", events.clone());
        let saves = Arc::new(AtomicUsize::new(0));
        let subscription = {
            let saves = Arc::clone(&saves);
            events.subscribe(move |_| {
                saves.fetch_add(1, Ordering::SeqCst);
            })
        };
        (CartApi::new(store), saves, subscription)
    }

    fn rice() -> NewItem {
        NewItem::new(ItemId::new(1), "Rice", Price::from_minor(550))
    }

    #[test]
    fn test_add_to_empty_cart() {
        let (api, saves, _sub) = api();
        assert_eq!(api.add_item(rice()).unwrap(), LineChange::Added);

        let cart = api.store().load();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 1);
        assert_eq!(cart.item_count(), 1);
        assert_eq!(saves.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_repeated_adds_merge() {
        let (api, _, _sub) = api();
        for _ in 0..3 {
            api.add_item(rice()).unwrap();
        }
        let cart = api.store().load();
        assert_eq!(cart.len(), 1);
        assert_eq!(cart.items()[0].quantity, 3);
    }

    #[test]
    fn test_add_without_id_logs_and_leaves_cart_alone() {
        let (api, saves, _sub) = api();
        api.add_item(rice()).unwrap();
        let before = api.store().load();

        let (result, logs) = capture_logs(|| api.add_item(NewItem::default()));

        assert_eq!(result, Err(CartError::MissingId));
        assert_eq!(api.store().load(), before);
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert!(logs.contains("ERROR"), "logs: {logs}");
        assert!(logs.contains("Invalid item added to cart"), "logs: {logs}");
    }

    #[test]
    fn test_decrement_to_zero_removes() {
        let (api, _, _sub) = api();
        api.add_item(rice()).unwrap();

        assert_eq!(api.update_quantity(ItemId::new(1), -1), LineChange::Removed);
        let cart = api.store().load();
        assert!(cart.is_empty());
        assert_eq!(cart.item_count(), 0);
    }

    #[test]
    fn test_decrement_from_two() {
        let (api, _, _sub) = api();
        api.add_item(rice()).unwrap();
        api.add_item(rice()).unwrap();

        assert_eq!(
            api.update_quantity(ItemId::new(1), -1),
            LineChange::Updated { quantity: 1 }
        );
        assert_eq!(api.store().load().subtotal().fixed_2(), "5.50");
    }

    #[test]
    fn test_update_missing_still_saves() {
        let (api, saves, _sub) = api();
        assert_eq!(api.update_quantity(ItemId::new(7), 1), LineChange::NotInCart);
        assert_eq!(saves.load(Ordering::SeqCst), 1);
        assert!(api.store().load().is_empty());
    }

    #[test]
    fn test_remove_twice_matches_remove_once() {
        let (api, saves, _sub) = api();
        api.add_item(rice()).unwrap();
        api.add_item(NewItem::new(ItemId::new(2), "Tea", Price::from_minor(200)))
            .unwrap();

        assert_eq!(api.remove_item(ItemId::new(1)), LineChange::Removed);
        let once = api.store().load();
        assert_eq!(api.remove_item(ItemId::new(1)), LineChange::NotInCart);
        assert_eq!(api.store().load(), once);
        assert_eq!(saves.load(Ordering::SeqCst), 4);
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(i32),
        Adjust(i32, i32),
        Remove(i32),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            (1..5i32).prop_map(Op::Add),
            (1..5i32, -3..3i32).prop_map(|(id, delta)| Op::Adjust(id, delta)),
            (1..5i32).prop_map(Op::Remove),
        ]
    }

    proptest! {
        #[test]
        fn prop_store_matches_quantity_model(ops in proptest::collection::vec(op(), 0..40)) {
            let (api, _, _sub) = api();
            let mut model: BTreeMap<i32, i64> = BTreeMap::new();

            for op in ops {
                match op {
                    Op::Add(id) => {
                        api.add_item(NewItem::new(ItemId::new(id), "Dish", Price::from_minor(150)))
                            .unwrap();
                        *model.entry(id).or_default() += 1;
                    }
                    Op::Adjust(id, delta) => {
                        api.update_quantity(ItemId::new(id), delta);
                        if let Some(quantity) = model.get_mut(&id) {
                            *quantity += i64::from(delta);
                            if *quantity <= 0 {
                                model.remove(&id);
                            }
                        }
                    }
                    Op::Remove(id) => {
                        api.remove_item(ItemId::new(id));
                        model.remove(&id);
                    }
                }
            }

            let cart = api.store().load();
            let stored: BTreeMap<i32, i64> = cart
                .items()
                .iter()
                .map(|item| (item.id.as_i32(), i64::from(item.quantity)))
                .collect();
            prop_assert_eq!(&stored, &model);
            prop_assert_eq!(cart.len(), model.len());

            let units: i64 = model.values().sum();
            prop_assert_eq!(i64::try_from(cart.item_count()).unwrap(), units);
            prop_assert_eq!(cart.subtotal(), Price::from_minor(150 * units));
        }
    }
}
