//! The cart collection and its state transitions.
//!
//! A [`Cart`] is an ordered list of [`CartItem`] lines keyed by [`ItemId`].
//! Insertion order is display order and is never re-sorted. Every line has a
//! quantity of at least one and no two lines share an id; both invariants are
//! checked when a cart is deserialized, so a `Cart` value is always valid.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::id::ItemId;
use super::item::{CartItem, NewItem};
use super::price::Price;

/// Why an add was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    #[error("item has no id")]
    MissingId,
    #[error("item {0} has no price")]
    MissingPrice(ItemId),
    #[error("item {0} has a negative price")]
    NegativePrice(ItemId),
}

/// A stored cart value that doesn't describe a valid cart.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartInvariantError {
    #[error("item {0} has a quantity of zero")]
    ZeroQuantity(ItemId),
    #[error("item {0} appears more than once")]
    DuplicateId(ItemId),
}

/// What a transition did to the cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineChange {
    /// A new line was appended with quantity 1.
    Added,
    /// An existing line now has this quantity.
    Updated { quantity: u32 },
    /// The line was taken out of the cart.
    Removed,
    /// No line with that id; the cart is unchanged.
    NotInCart,
}

/// Ordered, id-unique collection of cart lines.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<CartItem>", into = "Vec<CartItem>")]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    /// An empty cart.
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Build a cart from stored lines, checking the invariants.
    ///
    /// # Errors
    ///
    /// Returns `CartInvariantError` if a line has quantity zero or an id
    /// appears twice.
    pub fn from_items(items: Vec<CartItem>) -> Result<Self, CartInvariantError> {
        for (index, item) in items.iter().enumerate() {
            if item.quantity == 0 {
                return Err(CartInvariantError::ZeroQuantity(item.id));
            }
            if items.iter().take(index).any(|other| other.id == item.id) {
                return Err(CartInvariantError::DuplicateId(item.id));
            }
        }
        Ok(Self { items })
    }

    /// Lines in display order.
    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Look up a line by id.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&CartItem> {
        self.items.iter().find(|item| item.id == id)
    }

    /// Number of distinct lines.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the cart has no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Total number of units across all lines (the badge count).
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }

    /// Sum of `price * quantity` over all lines.
    #[must_use]
    pub fn subtotal(&self) -> Price {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Add one unit of `item`.
    ///
    /// If a line with the same id exists its quantity goes up by one and the
    /// incoming attributes are discarded. Otherwise the item is appended with
    /// quantity 1.
    ///
    /// # Errors
    ///
    /// Returns `CartError` if the item has no id, or if it would start a new
    /// line without a usable price. The cart is unchanged on error.
    pub fn add(&mut self, item: NewItem) -> Result<LineChange, CartError> {
        let id = match item.id {
            Some(id) if !id.is_unset() => id,
            _ => return Err(CartError::MissingId),
        };

        if let Some(existing) = self.items.iter_mut().find(|line| line.id == id) {
            existing.quantity = existing.quantity.saturating_add(1);
            return Ok(LineChange::Updated {
                quantity: existing.quantity,
            });
        }

        let price = item.price.ok_or(CartError::MissingPrice(id))?;
        if price.is_negative() {
            return Err(CartError::NegativePrice(id));
        }

        self.items.push(item.into_line(id, price));
        Ok(LineChange::Added)
    }

    /// Change a line's quantity by `delta`, removing it if the result is not
    /// positive.
    pub fn adjust(&mut self, id: ItemId, delta: i32) -> LineChange {
        let Some(position) = self.items.iter().position(|item| item.id == id) else {
            return LineChange::NotInCart;
        };

        let Some(line) = self.items.get_mut(position) else {
            return LineChange::NotInCart;
        };

        let next = i64::from(line.quantity) + i64::from(delta);
        if next <= 0 {
            self.items.remove(position);
            return LineChange::Removed;
        }

        line.quantity = u32::try_from(next).unwrap_or(u32::MAX);
        LineChange::Updated {
            quantity: line.quantity,
        }
    }

    /// Remove the line with `id`, if any.
    pub fn remove(&mut self, id: ItemId) -> LineChange {
        let before = self.items.len();
        self.items.retain(|item| item.id != id);
        if self.items.len() == before {
            LineChange::NotInCart
        } else {
            LineChange::Removed
        }
    }
}

impl TryFrom<Vec<CartItem>> for Cart {
    type Error = CartInvariantError;

    fn try_from(items: Vec<CartItem>) -> Result<Self, Self::Error> {
        Self::from_items(items)
    }
}

impl From<Cart> for Vec<CartItem> {
    fn from(cart: Cart) -> Self {
        cart.items
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
