//! Cart lines and incoming add-to-cart payloads.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::id::ItemId;
use super::price::Price;

/// Attribute name the cart owns; an incoming value for it is never copied.
const QUANTITY_KEY: &str = "quantity";

/// One line in the cart.
///
/// Attributes the cart doesn't interpret (description, category, ...) ride
/// along in `extra` and are written back out unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: ItemId,
    #[serde(default)]
    pub name: String,
    pub price: Price,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Always at least 1 for a stored line.
    pub quantity: u32,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl CartItem {
    /// Line total (`price * quantity`).
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.times(self.quantity)
    }
}

/// An item as a menu page describes it, before it is in the cart.
///
/// Every field is optional at this stage so that a payload like `{}` parses
/// and is then rejected by the cart with a precise reason.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewItem {
    #[serde(default)]
    pub id: Option<ItemId>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: Option<Price>,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl NewItem {
    /// Create a payload with the attributes every menu card carries.
    #[must_use]
    pub fn new(id: ItemId, name: impl Into<String>, price: Price) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            price: Some(price),
            image: None,
            extra: Map::new(),
        }
    }

    /// Set the display image.
    #[must_use]
    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    /// Attach a passthrough attribute.
    #[must_use]
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(key.into(), value.into());
        self
    }

    /// Turn the payload into a fresh cart line with quantity 1.
    ///
    /// Callers validate `id` and `price` first.
    pub(crate) fn into_line(mut self, id: ItemId, price: Price) -> CartItem {
        self.extra.remove(QUANTITY_KEY);
        CartItem {
            id,
            name: self.name,
            price,
            image: self.image,
            quantity: 1,
            extra: self.extra,
        }
    }
}
