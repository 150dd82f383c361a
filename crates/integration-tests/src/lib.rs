//! Integration tests for the AYMODINES cart.
//!
//! Tests drive a whole page through [`CartApp`] with a headless
//! [`MemoryDocument`], the way a browser host would: page ready, clicks,
//! storage events from other tabs, and timer ticks.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p aymodines-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use aymodines_storefront::CartApp;
use aymodines_storefront::config::CartConfig;
use aymodines_storefront::dispatch::{Action, ClickEvent, EventNode, ITEM_ID_KEY, ITEM_PAYLOAD_KEY};
use aymodines_storefront::document::{Document, MemoryDocument, NodeRef, regions};
use aymodines_storefront::storage::{KeyValueStorage, MemoryStorage};
pub use aymodines_storefront::test_support::capture_logs;
use serde_json::{Value, json};

/// A page with the cart modal, shell placeholders and one add-to-cart button.
pub struct Page {
    pub document: Arc<MemoryDocument>,
    pub storage: Arc<dyn KeyValueStorage>,
    pub app: CartApp,
    pub add_button: NodeRef,
}

impl Page {
    /// A fresh page over empty in-memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::with_storage(Arc::new(MemoryStorage::new()))
    }

    /// A fresh page over `storage`, with default configuration.
    #[must_use]
    pub fn with_storage(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self::with_config(CartConfig::default(), storage)
    }

    /// A fresh page over `storage` with `config`.
    #[must_use]
    pub fn with_config(config: CartConfig, storage: Arc<dyn KeyValueStorage>) -> Self {
        let document = Arc::new(MemoryDocument::new());
        document.create_element(Some(regions::HEADER_PLACEHOLDER), &[]);
        let modal = document.create_element(Some(regions::CART_MODAL), &["invisible", "opacity-0"]);
        document.append_child(modal, Some(regions::CART_PANEL), &["translate-x-full"]);
        let add_button = document.create_element(None, &[]);
        document.create_element(Some(regions::FOOTER_PLACEHOLDER), &[]);

        let app = CartApp::new(config, Arc::clone(&storage), document.clone());
        Self {
            document,
            storage,
            app,
            add_button,
        }
    }

    /// Click the page's add-to-cart button with `item` as the card payload.
    pub fn add(&self, item: &Value) -> Vec<Action> {
        self.add_raw(&item.to_string())
    }

    /// Click the add-to-cart button with a raw payload string.
    pub fn add_raw(&self, payload: &str) -> Vec<Action> {
        let event = ClickEvent::on(
            EventNode::new()
                .with_node(self.add_button)
                .with_action(Action::AddToCart),
        )
        .within(EventNode::new().with_data(ITEM_PAYLOAD_KEY, payload));
        self.app.on_click(&event)
    }

    /// Click a panel control tagged with `action` for `id`.
    pub fn click_line(&self, action: Action, id: &str) -> Vec<Action> {
        self.app.on_click(&ClickEvent::on(
            EventNode::new().with_action(action).with_data(ITEM_ID_KEY, id),
        ))
    }

    /// Click an element nested inside one tagged with `action`.
    pub fn click_inside(&self, action: Action) -> Vec<Action> {
        self.app.on_click(
            &ClickEvent::on(EventNode::new()).within(EventNode::new().with_action(action)),
        )
    }

    /// Current badge text.
    #[must_use]
    pub fn badge(&self) -> Option<String> {
        self.document.text_of(regions::CART_BADGE)
    }

    /// Current panel markup.
    #[must_use]
    pub fn panel(&self) -> String {
        self.document.html_of(regions::CART_PANEL).unwrap_or_default()
    }

    /// Whether the element with `id` carries `class`.
    #[must_use]
    pub fn has_class(&self, id: &str, class: &str) -> bool {
        self.document
            .element_by_id(id)
            .is_some_and(|node| self.document.has_class(node, class))
    }

    /// The raw value stored under the cart key.
    #[must_use]
    pub fn stored(&self) -> Option<String> {
        self.storage
            .get(self.app.store().key())
            .ok()
            .flatten()
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new()
    }
}

/// A menu item payload as a listing page would embed it.
#[must_use]
pub fn menu_item(id: i32, name: &str, price: f64) -> Value {
    json!({ "id": id, "name": name, "price": price })
}
